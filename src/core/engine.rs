use chrono::Utc;
use uuid::Uuid;

use crate::core::aggregator::{aggregate, Aggregation, GroupOrder};
use crate::core::distance::is_within_bounding_box;
use crate::core::formatter::{
    active_offers_label, contract_label, full_time_label, group_badge, CompensationFormat,
};
use crate::core::selection::{FocusRequest, MapEvent, SelectionState};
use crate::core::viewport::{ViewportConfig, ViewportController};
use crate::models::{
    BoundingBox, CameraCommand, CameraDelta, CameraView, FetchStatus, LocationGroup,
    MarkerClass, MarkerPlacement, OfferRecord, PanelEntry, PanelPosting, Posting, PostingDetail,
};

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub viewport: ViewportConfig,
    pub compensation: CompensationFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            compensation: CompensationFormat::with_currency("€"),
        }
    }
}

/// Summary of one applied store snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub snapshot_id: Uuid,
    pub groups: usize,
    pub postings: usize,
    pub excluded: usize,
    pub selection_cleared: bool,
}

/// Map engine: aggregation, camera and selection behind one dispatch point
///
/// Events are processed one at a time; each call runs to completion and
/// never fails. Markers and the list panel are projections of the same
/// state, so they cannot disagree about the selection.
#[derive(Debug, Clone)]
pub struct MapEngine {
    config: EngineConfig,
    aggregation: Aggregation,
    viewport: ViewportController,
    selection: SelectionState,
    fetch_status: FetchStatus,
    snapshot_id: Option<Uuid>,
    /// Last fetch ticket handed out, and the one behind the current snapshot
    issued_ticket: u64,
    applied_ticket: u64,
}

impl MapEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            viewport: ViewportController::new(config.viewport),
            config,
            aggregation: Aggregation::default(),
            selection: SelectionState::default(),
            fetch_status: FetchStatus::default(),
            snapshot_id: None,
            issued_ticket: 0,
            applied_ticket: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Single entry point for pointer and data events
    ///
    /// Returns the camera transition to hand to the renderer, if any.
    pub fn dispatch(&mut self, event: MapEvent) -> Option<CameraCommand> {
        let FocusRequest(location_id) = self.selection.apply(&event, &self.aggregation)?;
        let viewport = self.config.viewport;
        self.viewport.focus(
            &self.aggregation,
            &location_id,
            viewport.focus_zoom,
            viewport.focus_duration_ms,
        )
    }

    /// Replace the aggregation with a fresh store snapshot
    pub fn apply_refresh(&mut self, records: Vec<OfferRecord>) -> RefreshSummary {
        let ticket = self.begin_fetch();
        self.applied_ticket = ticket;
        self.replace_snapshot(records)
    }

    /// Hand out a ticket before starting a store fetch
    ///
    /// Tickets order fetches by start time, so results can be applied in
    /// that order whatever order the responses arrive in.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued_ticket += 1;
        self.issued_ticket
    }

    /// Apply the result of the fetch holding `ticket`
    ///
    /// Returns `None` and leaves the engine untouched when a fetch started
    /// later has already been applied.
    pub fn apply_fetched(&mut self, ticket: u64, records: Vec<OfferRecord>) -> Option<RefreshSummary> {
        if ticket <= self.applied_ticket {
            tracing::debug!(
                ticket,
                applied_ticket = self.applied_ticket,
                "Dropping offers from a superseded fetch"
            );
            return None;
        }
        self.applied_ticket = ticket;
        Some(self.replace_snapshot(records))
    }

    fn replace_snapshot(&mut self, records: Vec<OfferRecord>) -> RefreshSummary {
        let had_selection = self.selection.selected().is_some();

        self.aggregation = aggregate(&records);
        let snapshot_id = Uuid::new_v4();
        self.snapshot_id = Some(snapshot_id);
        self.fetch_status.record_success(Utc::now());
        self.dispatch(MapEvent::DataRefresh);

        let summary = RefreshSummary {
            snapshot_id,
            groups: self.aggregation.len(),
            postings: self.aggregation.posting_count(),
            excluded: self.aggregation.excluded().len(),
            selection_cleared: had_selection && self.selection.selected().is_none(),
        };

        tracing::info!(
            snapshot_id = %summary.snapshot_id,
            groups = summary.groups,
            postings = summary.postings,
            excluded = summary.excluded,
            "Applied offer snapshot"
        );

        summary
    }

    /// Note a failed fetch; the current snapshot stays in place
    pub fn record_fetch_failure(&mut self, error: impl Into<String>) {
        self.fetch_status.record_failure(Utc::now(), error);
    }

    pub fn pan_zoom(&mut self, delta: CameraDelta) -> CameraView {
        self.viewport.pan_zoom(delta)
    }

    pub fn move_camera(&mut self, target: CameraView) -> CameraView {
        self.viewport.move_to(target)
    }

    pub fn focus(&mut self, location_id: &str, zoom: f64, duration_ms: u64) -> Option<CameraCommand> {
        self.viewport
            .focus(&self.aggregation, location_id, zoom, duration_ms)
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn camera(&self) -> CameraView {
        self.viewport.view()
    }

    pub fn viewport_config(&self) -> &ViewportConfig {
        self.viewport.config()
    }

    pub fn fetch_status(&self) -> &FetchStatus {
        &self.fetch_status
    }

    pub fn snapshot_id(&self) -> Option<Uuid> {
        self.snapshot_id
    }

    /// One marker per location group, sorted by location id
    pub fn markers(&self) -> Vec<MarkerPlacement> {
        self.aggregation
            .ordered(GroupOrder::LocationId)
            .into_iter()
            .map(|group| self.marker(group))
            .collect()
    }

    /// Markers whose location lies inside `bounds`
    pub fn markers_within(&self, bounds: &BoundingBox) -> Vec<MarkerPlacement> {
        self.aggregation
            .ordered(GroupOrder::LocationId)
            .into_iter()
            .filter(|g| is_within_bounding_box(g.location.latitude, g.location.longitude, bounds))
            .map(|group| self.marker(group))
            .collect()
    }

    /// List panel entries in the requested order
    pub fn panel(&self, order: GroupOrder) -> Vec<PanelEntry> {
        let selected_location = self.selected_location_id();

        self.aggregation
            .ordered(order)
            .into_iter()
            .map(|group| PanelEntry {
                location: group.location.clone(),
                postings: group
                    .postings
                    .iter()
                    .map(|p| self.panel_posting(p))
                    .collect(),
                badge: group_badge(group),
                highlighted: selected_location == Some(group.location.id.as_str()),
            })
            .collect()
    }

    /// Panel ordered by distance from the current camera center
    pub fn panel_by_distance(&self) -> Vec<PanelEntry> {
        let view = self.camera();
        self.panel(GroupOrder::DistanceFrom {
            latitude: view.latitude,
            longitude: view.longitude,
        })
    }

    pub fn panel_header(&self) -> String {
        active_offers_label(self.aggregation.posting_count())
    }

    /// Selected posting resolved against the current snapshot
    pub fn selected_detail(&self) -> Option<PostingDetail> {
        let posting_id = self.selection.selected()?;
        let group = self.aggregation.group_of(posting_id)?;
        let posting = group.postings.iter().find(|p| p.id == posting_id)?;

        Some(PostingDetail {
            posting: posting.clone(),
            location: group.location.clone(),
            contract: contract_label(posting.contract_type).to_string(),
            full_time: full_time_label(posting.is_full_time).map(str::to_string),
            compensation: self
                .config
                .compensation
                .format(posting.salary_min, posting.salary_max),
        })
    }

    fn selected_location_id(&self) -> Option<&str> {
        let posting_id = self.selection.selected()?;
        self.aggregation
            .group_of(posting_id)
            .map(|g| g.location.id.as_str())
    }

    fn marker(&self, group: &LocationGroup) -> MarkerPlacement {
        let location = &group.location;
        MarkerPlacement {
            location_id: location.id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            badge: group_badge(group),
            class: MarkerClass::from(location),
            hovered: self.selection.hovered() == Some(location.id.as_str()),
            selected: self.selected_location_id() == Some(location.id.as_str()),
        }
    }

    fn panel_posting(&self, posting: &Posting) -> PanelPosting {
        PanelPosting {
            id: posting.id.clone(),
            title: posting.title.clone(),
            specialty: posting.specialty.clone(),
            contract: contract_label(posting.contract_type).to_string(),
            full_time: full_time_label(posting.is_full_time).map(str::to_string),
            compensation: self
                .config
                .compensation
                .format(posting.salary_min, posting.salary_max),
            selected: self.selection.selected() == Some(posting.id.as_str()),
        }
    }
}

impl Default for MapEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
