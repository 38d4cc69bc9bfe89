//! Viewport requests sent to the feed server
//!
//! The server only streams vessels inside the reported bounds, so the
//! consumer sends its viewport periodically and after every camera move.

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 20;

/// Visible map area in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl Bounds {
    pub fn new(min_latitude: f64, min_longitude: f64, max_latitude: f64, max_longitude: f64) -> Self {
        Self {
            min_latitude,
            min_longitude,
            max_latitude,
            max_longitude,
        }
    }

    /// Box of `lat_span` x `lon_span` degrees centred on a point
    pub fn around(latitude: f64, longitude: f64, lat_span: f64, lon_span: f64) -> Self {
        let half_lat = lat_span / 2.0;
        let half_lon = lon_span / 2.0;
        Self::new(
            latitude - half_lat,
            longitude - half_lon,
            latitude + half_lat,
            longitude + half_lon,
        )
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

/// Outbound frame: current bounds plus zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRequest {
    pub bounds: Bounds,
    pub zoom: u8,
}

impl ViewportRequest {
    /// Zoom is clamped to `MIN_ZOOM..=MAX_ZOOM`
    pub fn new(bounds: Bounds, zoom: u8) -> Self {
        Self {
            bounds,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom_in(self) -> Self {
        Self::new(self.bounds, self.zoom.saturating_add(1))
    }

    pub fn zoom_out(self) -> Self {
        Self::new(self.bounds, self.zoom.saturating_sub(1))
    }

    pub fn with_bounds(self, bounds: Bounds) -> Self {
        Self { bounds, ..self }
    }

    /// JSON text sent over the socket
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let request = ViewportRequest::new(Bounds::new(59.5, 10.0, 60.5, 11.5), 10);
        let value: serde_json::Value = serde_json::from_str(&request.to_payload().unwrap()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "bounds": {
                    "minLatitude": 59.5,
                    "minLongitude": 10.0,
                    "maxLatitude": 60.5,
                    "maxLongitude": 11.5
                },
                "zoom": 10
            })
        );
    }

    #[test]
    fn test_non_finite_bounds_still_serialize() {
        let request = ViewportRequest::new(Bounds::new(f64::NAN, 10.0, f64::INFINITY, 11.0), 3);
        let payload = request.to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert!(value["bounds"]["minLatitude"].is_null());
        assert_eq!(value["bounds"]["minLongitude"], 10.0);
        assert_eq!(value["zoom"], 3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(ViewportRequest::new(bounds, 42).zoom, MAX_ZOOM);

        let top = ViewportRequest::new(bounds, MAX_ZOOM);
        assert_eq!(top.zoom_in().zoom, MAX_ZOOM);
        assert_eq!(top.zoom_out().zoom, MAX_ZOOM - 1);

        let bottom = ViewportRequest::new(bounds, MIN_ZOOM);
        assert_eq!(bottom.zoom_out().zoom, MIN_ZOOM);
        assert_eq!(bottom.zoom_in().zoom, 1);
    }

    #[test]
    fn test_bounds_around_point() {
        let bounds = Bounds::around(59.878, 10.683, 0.2, 0.4);
        assert!(bounds.contains(59.878, 10.683));
        assert!(bounds.contains(59.97, 10.85));
        assert!(!bounds.contains(60.0, 10.683));
        assert!((bounds.max_longitude - bounds.min_longitude - 0.4).abs() < 1e-9);
    }
}
