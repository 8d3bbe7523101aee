use serde::{Deserialize, Serialize};

use crate::core::aggregator::Aggregation;
use crate::models::{LocationId, PostingId};

/// Discrete inputs from the map, the list panel and the data layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    MarkerEnter(LocationId),
    MarkerLeave(LocationId),
    MarkerClick(LocationId),
    /// Same effect as a marker click; the list and the map share one state
    ListItemClick(LocationId),
    CloseSelection,
    /// The aggregation was replaced by a fresh store snapshot
    DataRefresh,
}

/// Single-slot view of the selection state
///
/// A selection wins over a hover when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "lowercase")]
pub enum SelectionPhase {
    Idle,
    Hovered(LocationId),
    Selected(PostingId),
}

/// Camera focus requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest(pub LocationId);

/// Hover and selection, tracked independently
///
/// Hovering never clears a selection and selecting never needs a hover.
/// Unknown identifiers make a transition a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    hovered: Option<LocationId>,
    selected: Option<PostingId>,
}

impl SelectionState {
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn phase(&self) -> SelectionPhase {
        match (&self.selected, &self.hovered) {
            (Some(posting_id), _) => SelectionPhase::Selected(posting_id.clone()),
            (None, Some(location_id)) => SelectionPhase::Hovered(location_id.clone()),
            (None, None) => SelectionPhase::Idle,
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            phase: self.phase(),
            hovered_location_id: self.hovered.clone(),
            selected_posting_id: self.selected.clone(),
        }
    }

    /// Apply one event against the current aggregation
    pub fn apply(&mut self, event: &MapEvent, aggregation: &Aggregation) -> Option<FocusRequest> {
        match event {
            MapEvent::MarkerEnter(location_id) => {
                if aggregation.group(location_id).is_some() {
                    self.hovered = Some(location_id.clone());
                }
                None
            }
            MapEvent::MarkerLeave(location_id) => {
                if self.hovered.as_ref() == Some(location_id) {
                    self.hovered = None;
                }
                None
            }
            MapEvent::MarkerClick(location_id) | MapEvent::ListItemClick(location_id) => {
                // groups always hold at least one posting
                let posting = aggregation.group(location_id)?.first_posting()?;
                self.selected = Some(posting.id.clone());
                Some(FocusRequest(location_id.clone()))
            }
            MapEvent::CloseSelection => {
                self.selected = None;
                None
            }
            MapEvent::DataRefresh => {
                if let Some(posting_id) = &self.selected {
                    if !aggregation.contains_posting(posting_id) {
                        tracing::debug!(%posting_id, "Selected offer left the active set");
                        self.selected = None;
                    }
                }
                if let Some(location_id) = &self.hovered {
                    if aggregation.group(location_id).is_none() {
                        self.hovered = None;
                    }
                }
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub phase: SelectionPhase,
    #[serde(rename = "hoveredLocationId")]
    pub hovered_location_id: Option<LocationId>,
    #[serde(rename = "selectedPostingId")]
    pub selected_posting_id: Option<PostingId>,
}
