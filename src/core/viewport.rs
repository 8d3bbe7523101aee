use thiserror::Error;

use crate::core::aggregator::Aggregation;
use crate::core::distance::{clamp_component, clamp_to_bounding_box, is_within_bounding_box};
use crate::models::{BoundingBox, CameraCommand, CameraDelta, CameraView};

/// Default camera: metropolitan France overview
pub const DEFAULT_CENTER_LON: f64 = 2.3522;
pub const DEFAULT_CENTER_LAT: f64 = 46.8;
pub const DEFAULT_ZOOM: f64 = 5.5;
pub const MIN_ZOOM: f64 = 5.0;
pub const MAX_ZOOM: f64 = 18.0;
/// Close-in zoom used when a location is selected
pub const FOCUS_ZOOM: f64 = 12.0;
pub const FOCUS_DURATION_MS: u64 = 1000;

/// Navigation limits: south-west (-5.5, 41.0) to north-east (10.0, 51.5)
pub const DEFAULT_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 41.0,
    max_lat: 51.5,
    min_lon: -5.5,
    max_lon: 10.0,
};

#[derive(Debug, Error, PartialEq)]
pub enum ViewportConfigError {
    #[error("Bounding box is inverted or not finite: {0:?}")]
    InvalidBounds(BoundingBox),

    #[error("Zoom range is invalid: min {min} > max {max}")]
    InvalidZoomRange { min: f64, max: f64 },

    #[error("Default center ({lat}, {lon}) lies outside the bounding box")]
    CenterOutOfBounds { lat: f64, lon: f64 },
}

/// Fixed camera configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub default_view: CameraView,
    pub bounds: BoundingBox,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub focus_zoom: f64,
    pub focus_duration_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            default_view: CameraView {
                latitude: DEFAULT_CENTER_LAT,
                longitude: DEFAULT_CENTER_LON,
                zoom: DEFAULT_ZOOM,
            },
            bounds: DEFAULT_BOUNDS,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            focus_zoom: FOCUS_ZOOM,
            focus_duration_ms: FOCUS_DURATION_MS,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ViewportConfigError> {
        if !self.bounds.is_well_formed() {
            return Err(ViewportConfigError::InvalidBounds(self.bounds));
        }

        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) || self.min_zoom > self.max_zoom {
            return Err(ViewportConfigError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }

        let center = self.default_view;
        if !is_within_bounding_box(center.latitude, center.longitude, &self.bounds) {
            return Err(ViewportConfigError::CenterOutOfBounds {
                lat: center.latitude,
                lon: center.longitude,
            });
        }

        Ok(())
    }
}

/// Owns the camera and keeps it inside the configured limits
///
/// Every mutation clamps: the center stays in the bounding box and the zoom
/// in `[min_zoom, max_zoom]`. Out-of-range requests are never rejected.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    view: CameraView,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let mut controller = Self {
            config,
            view: config.default_view,
        };
        controller.view = controller.clamp(config.default_view);
        controller
    }

    pub fn view(&self) -> CameraView {
        self.view
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Apply a relative pan/zoom gesture
    pub fn pan_zoom(&mut self, delta: CameraDelta) -> CameraView {
        let target = CameraView {
            latitude: self.view.latitude + delta.delta_lat,
            longitude: self.view.longitude + delta.delta_lon,
            zoom: self.view.zoom + delta.delta_zoom,
        };
        self.move_to(target)
    }

    /// Apply an absolute camera position reported by the renderer after a drag
    pub fn move_to(&mut self, target: CameraView) -> CameraView {
        let clamped = self.clamp(target);
        if clamped != target {
            tracing::debug!(?target, ?clamped, "Camera request clamped");
        }
        self.view = clamped;
        self.view
    }

    /// Back to the configured overview
    pub fn reset(&mut self) -> CameraView {
        self.move_to(self.config.default_view)
    }

    /// Center the camera on a location from the current aggregation
    ///
    /// Unknown locations are ignored: the location may have left the active
    /// set since the request was made. The returned command is fire-and-forget;
    /// a newer command supersedes it at the renderer.
    pub fn focus(
        &mut self,
        aggregation: &Aggregation,
        location_id: &str,
        target_zoom: f64,
        duration_ms: u64,
    ) -> Option<CameraCommand> {
        let Some(group) = aggregation.group(location_id) else {
            tracing::debug!(location_id, "Focus on unknown location ignored");
            return None;
        };

        let view = self.move_to(CameraView {
            latitude: group.location.latitude,
            longitude: group.location.longitude,
            zoom: target_zoom,
        });

        Some(CameraCommand {
            latitude: view.latitude,
            longitude: view.longitude,
            zoom: view.zoom,
            duration_ms,
        })
    }

    fn clamp(&self, target: CameraView) -> CameraView {
        let (latitude, longitude) = clamp_to_bounding_box(
            target.latitude,
            target.longitude,
            &self.config.bounds,
            (self.view.latitude, self.view.longitude),
        );
        let zoom = clamp_component(
            target.zoom,
            self.config.min_zoom,
            self.config.max_zoom,
            self.view.zoom,
        );

        CameraView {
            latitude,
            longitude,
            zoom,
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}
