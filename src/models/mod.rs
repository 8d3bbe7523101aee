// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, CameraCommand, CameraDelta, CameraView, ContractType, FetchStatus, Location,
    LocationGroup, LocationId, MarkerClass, MarkerPlacement, OfferRecord, PanelEntry, PanelPosting,
    Posting, PostingDetail, PostingId,
};
pub use requests::{AbsoluteMove, CameraMove, CameraMoveRequest, RelativeMove, MapEventKind, MapEventRequest, MarkersQuery, PanelOrder, PanelQuery};
pub use responses::{
    ErrorResponse, EventResponse, HealthResponse, MarkersResponse, PanelResponse, RefreshResponse,
    SelectionDetailResponse, ViewportResponse,
};
