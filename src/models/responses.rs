use serde::{Deserialize, Serialize};

use crate::core::selection::SelectionSnapshot;
use crate::models::domain::{
    BoundingBox, CameraCommand, CameraView, FetchStatus, MarkerPlacement, PanelEntry, PostingDetail,
};

/// Markers for the map renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersResponse {
    #[serde(rename = "snapshotId")]
    pub snapshot_id: Option<String>,
    pub markers: Vec<MarkerPlacement>,
    pub total: usize,
    /// Area used for filtering, when the client sent its size
    pub visible: Option<BoundingBox>,
}

/// List panel content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelResponse {
    #[serde(rename = "snapshotId")]
    pub snapshot_id: Option<String>,
    pub header: String,
    pub entries: Vec<PanelEntry>,
}

/// Result of a pointer event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub selection: SelectionSnapshot,
    pub camera: Option<CameraCommand>,
}

/// Current camera and its limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportResponse {
    pub camera: CameraView,
    pub bounds: BoundingBox,
    #[serde(rename = "minZoom")]
    pub min_zoom: f64,
    #[serde(rename = "maxZoom")]
    pub max_zoom: f64,
}

/// Selected posting for the detail card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionDetailResponse {
    pub selection: SelectionSnapshot,
    pub detail: Option<PostingDetail>,
}

/// Result of a manual refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "snapshotId")]
    pub snapshot_id: String,
    pub groups: usize,
    pub postings: usize,
    pub excluded: usize,
    #[serde(rename = "selectionCleared")]
    pub selection_cleared: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fetch: FetchStatus,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
