use geo::{Coord, Intersects, Rect};

use crate::models::{BoundingBox, CameraView};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Tile size used by the map renderer, in pixels
const TILE_SIZE: f64 = 512.0;

/// Web Mercator latitude limit
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// True when min <= max on both axes and every edge is finite
    pub fn is_well_formed(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }

    /// Rectangle in (x = longitude, y = latitude) space
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord { x: self.min_lon, y: self.min_lat },
            Coord { x: self.max_lon, y: self.max_lat },
        )
    }
}

/// Check if a point is within a bounding box, edges included
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    bbox.to_rect().intersects(&Coord { x: lon, y: lat })
}

/// Clamp a point into a bounding box, each axis independently
///
/// A non-finite component falls back to `fallback` on that axis.
pub fn clamp_to_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
    fallback: (f64, f64),
) -> (f64, f64) {
    (
        clamp_component(lat, bbox.min_lat, bbox.max_lat, fallback.0),
        clamp_component(lon, bbox.min_lon, bbox.max_lon, fallback.1),
    )
}

/// Clamp `value` into `[min, max]`; NaN yields the clamped fallback
///
/// Unlike `f64::clamp` this never panics, even for an inverted range.
#[inline]
pub fn clamp_component(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    let value = if value.is_nan() { fallback } else { value };
    value.max(min).min(max)
}

/// Geographic area visible from a camera, for a viewport of the given pixel size
///
/// Uses the Web Mercator projection with 512px tiles. Longitudes are not
/// wrapped; latitudes are limited to the projection's range.
pub fn visible_bounds(view: &CameraView, width_px: f64, height_px: f64) -> BoundingBox {
    let world_size = TILE_SIZE * 2f64.powf(view.zoom);

    let center_x = (view.longitude + 180.0) / 360.0 * world_size;
    let lat = view.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let center_y = mercator_y(lat) * world_size;

    let half_w = width_px.max(0.0) / 2.0;
    let half_h = height_px.max(0.0) / 2.0;

    let to_lon = |x: f64| x / world_size * 360.0 - 180.0;
    let to_lat = |y: f64| {
        let n = std::f64::consts::PI * (1.0 - 2.0 * y / world_size);
        n.sinh().atan().to_degrees()
    };

    BoundingBox {
        min_lon: to_lon(center_x - half_w),
        max_lon: to_lon(center_x + half_w),
        // screen y grows southwards
        max_lat: to_lat((center_y - half_h).max(0.0)),
        min_lat: to_lat((center_y + half_h).min(world_size)),
    }
}

fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.to_radians();
    let y = (std::f64::consts::FRAC_PI_4 + lat_rad / 2.0).tan().ln();
    (1.0 - y / std::f64::consts::PI) / 2.0
}
