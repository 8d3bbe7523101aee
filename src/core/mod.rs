// Core engine exports
pub mod aggregator;
pub mod distance;
pub mod engine;
pub mod formatter;
pub mod selection;
pub mod viewport;

pub use aggregator::{aggregate, Aggregation, ExcludedRecord, ExclusionReason, GroupOrder};
pub use distance::{haversine_distance, is_within_bounding_box, clamp_to_bounding_box, visible_bounds};
pub use engine::{EngineConfig, MapEngine, RefreshSummary};
pub use formatter::{format_compensation, format_thousands, badge_label, CompensationFormat};
pub use selection::{MapEvent, SelectionPhase, SelectionSnapshot, SelectionState};
pub use viewport::{ViewportConfig, ViewportConfigError, ViewportController};
