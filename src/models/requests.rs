use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::selection::MapEvent;
use crate::models::domain::{CameraDelta, CameraView};

/// Pointer event kinds sent by the map and list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapEventKind {
    MarkerEnter,
    MarkerLeave,
    MarkerClick,
    ListItemClick,
    CloseSelection,
}

/// Request to apply a pointer event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MapEventRequest {
    #[serde(rename = "type")]
    pub kind: MapEventKind,
    #[validate(length(min = 1))]
    #[serde(rename = "locationId", alias = "location_id", default)]
    pub location_id: Option<String>,
}

impl MapEventRequest {
    /// Convert into an engine event; every kind but `closeSelection` needs a location
    pub fn into_event(self) -> Result<MapEvent, String> {
        let location = |kind: MapEventKind| {
            self.location_id
                .clone()
                .ok_or_else(|| format!("locationId is required for {:?}", kind))
        };

        Ok(match self.kind {
            MapEventKind::MarkerEnter => MapEvent::MarkerEnter(location(self.kind)?),
            MapEventKind::MarkerLeave => MapEvent::MarkerLeave(location(self.kind)?),
            MapEventKind::MarkerClick => MapEvent::MarkerClick(location(self.kind)?),
            MapEventKind::ListItemClick => MapEvent::ListItemClick(location(self.kind)?),
            MapEventKind::CloseSelection => MapEvent::CloseSelection,
        })
    }
}

/// Camera move: an absolute position after a drag, or a relative pan/zoom
///
/// Both shapes reject unknown fields; a body matching neither fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraMoveRequest {
    Absolute(AbsoluteMove),
    Relative(RelativeMove),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbsoluteMove {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl From<AbsoluteMove> for CameraView {
    fn from(m: AbsoluteMove) -> Self {
        CameraView {
            latitude: m.latitude,
            longitude: m.longitude,
            zoom: m.zoom,
        }
    }
}

/// Pan/zoom gesture; omitted components stay put
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelativeMove {
    #[serde(rename = "deltaLat", default)]
    pub delta_lat: Option<f64>,
    #[serde(rename = "deltaLon", default)]
    pub delta_lon: Option<f64>,
    #[serde(rename = "deltaZoom", default)]
    pub delta_zoom: Option<f64>,
}

impl RelativeMove {
    /// None when the body names no component at all
    pub fn into_delta(self) -> Option<CameraDelta> {
        if self.delta_lat.is_none() && self.delta_lon.is_none() && self.delta_zoom.is_none() {
            return None;
        }
        Some(CameraDelta {
            delta_lat: self.delta_lat.unwrap_or_default(),
            delta_lon: self.delta_lon.unwrap_or_default(),
            delta_zoom: self.delta_zoom.unwrap_or_default(),
        })
    }
}

/// Decoded camera move, ready for the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMove {
    To(CameraView),
    By(CameraDelta),
}

impl CameraMoveRequest {
    /// Convert into a camera move; a relative body must name at least one component
    pub fn into_move(self) -> Result<CameraMove, String> {
        match self {
            CameraMoveRequest::Absolute(target) => Ok(CameraMove::To(target.into())),
            CameraMoveRequest::Relative(relative) => relative
                .into_delta()
                .map(CameraMove::By)
                .ok_or_else(|| "deltaLat, deltaLon or deltaZoom is required".to_string()),
        }
    }
}

/// Optional client viewport size, to only receive visible markers
///
/// Width and height come together or not at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_viewport_size"))]
pub struct MarkersQuery {
    #[validate(range(min = 1.0, max = 16384.0))]
    pub width: Option<f64>,
    #[validate(range(min = 1.0, max = 16384.0))]
    pub height: Option<f64>,
}

fn validate_viewport_size(query: &MarkersQuery) -> Result<(), ValidationError> {
    if query.width.is_some() != query.height.is_some() {
        let mut error = ValidationError::new("viewport_size");
        error.message = Some("width and height must be sent together".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelOrder {
    #[default]
    Recency,
    Location,
    Distance,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelQuery {
    #[serde(default)]
    pub order: Option<PanelOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_request_parsing() {
        let req: MapEventRequest =
            serde_json::from_str(r#"{"type": "markerClick", "locationId": "l1"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.into_event(), Ok(MapEvent::MarkerClick("l1".to_string())));

        let req: MapEventRequest = serde_json::from_str(r#"{"type": "closeSelection"}"#).unwrap();
        assert_eq!(req.into_event(), Ok(MapEvent::CloseSelection));
    }

    #[test]
    fn test_event_request_missing_location() {
        let req: MapEventRequest = serde_json::from_str(r#"{"type": "markerEnter"}"#).unwrap();
        assert!(req.into_event().is_err());
    }

    #[test]
    fn test_event_request_empty_location_fails_validation() {
        let req: MapEventRequest =
            serde_json::from_str(r#"{"type": "markerLeave", "locationId": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_camera_move_variants() {
        let absolute: CameraMoveRequest =
            serde_json::from_str(r#"{"latitude": 48.0, "longitude": 2.0, "zoom": 7.0}"#).unwrap();
        assert_eq!(
            absolute.into_move(),
            Ok(CameraMove::To(CameraView { latitude: 48.0, longitude: 2.0, zoom: 7.0 }))
        );

        let relative: CameraMoveRequest = serde_json::from_str(r#"{"deltaZoom": 1.5}"#).unwrap();
        assert_eq!(
            relative.into_move(),
            Ok(CameraMove::By(CameraDelta { delta_lat: 0.0, delta_lon: 0.0, delta_zoom: 1.5 }))
        );
    }

    #[test]
    fn test_camera_move_rejects_mismatched_bodies() {
        for body in [
            r#"{"latitude": 43.3, "longitude": 5.4}"#,
            r#"{"delta_zoom": 3.0}"#,
            r#"{"foo": 1}"#,
            r#"{"latitude": 43.3, "longitude": 5.4, "zoom": 9.0, "deltaZoom": 1.0}"#,
        ] {
            assert!(
                serde_json::from_str::<CameraMoveRequest>(body).is_err(),
                "{} should not decode",
                body
            );
        }
    }

    #[test]
    fn test_empty_relative_move_has_no_delta() {
        let req: CameraMoveRequest = serde_json::from_str("{}").unwrap();
        assert!(req.into_move().is_err());
    }

    #[test]
    fn test_markers_query_validation() {
        let ok = MarkersQuery { width: Some(1280.0), height: Some(800.0) };
        assert!(ok.validate().is_ok());

        let bad = MarkersQuery { width: Some(0.0), height: Some(800.0) };
        assert!(bad.validate().is_err());

        assert!(MarkersQuery::default().validate().is_ok());
    }

    #[test]
    fn test_markers_query_needs_both_dimensions() {
        let width_only = MarkersQuery { width: Some(1280.0), height: None };
        assert!(width_only.validate().is_err());

        let height_only = MarkersQuery { width: None, height: Some(800.0) };
        assert!(height_only.validate().is_err());
    }
}
