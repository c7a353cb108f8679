use async_trait::async_trait;
use navride_common::{CameraRegion, EdgePadding, GeoPoint};

/// A single camera instruction produced by the ride state machine. Each
/// accepted event yields at most a couple of these; the dispatcher forwards
/// them to the surface unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CameraCommand {
    /// Continuous follow: recenter on the device and rotate to its heading.
    Follow {
        position: GeoPoint,
        heading: f64,
        pitch: f64,
    },

    /// One-time snap to a region at the default zoom.
    Recenter(CameraRegion),

    /// Fit the viewport so all points are simultaneously visible.
    FitBounds {
        points: Vec<GeoPoint>,
        padding: EdgePadding,
    },

    /// Take pan/zoom/rotate away from the user for the rest of the ride.
    LockGestures,
}

/// The rendering surface's camera API. The host implements this over its
/// actual map widget; marker and route-overlay drawing stay on the host
/// side.
#[async_trait]
pub trait MapSurface: Send + Sync {
    async fn animate_camera_to(&self, position: GeoPoint, heading: f64, pitch: f64);

    async fn animate_to_region(&self, region: CameraRegion);

    async fn fit_to_bounds(&self, points: &[GeoPoint], padding: EdgePadding);

    async fn set_gestures_enabled(&self, enabled: bool);
}
