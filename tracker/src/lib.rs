pub use navride_common::{
    estimate_heading, CameraRegion, EdgePadding, GeoPoint, PositionSample, REGION_SPAN_DEG,
};

pub mod dispatch;
pub mod location;
pub mod ride;
pub mod service;
pub mod surface;

/// Camera tilt used for every follow command (**in degrees**). A
/// presentation constant, not derived from motion.
pub const FOLLOW_PITCH_DEG: f64 = 45.0;

/// Edge padding for the initial fit-bounds call, px-equivalent units.
pub const FIT_BOUNDS_PADDING: f64 = 150.0;

/// Static configuration for one navigation session.
///
/// `destination` and `routing_key` are required; everything else has the
/// stock defaults. The host reads `accent_color`, `stroke_width` and
/// `driver_image` when it draws the markers and the route overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationConfig {
    pub destination: GeoPoint,
    pub routing_key: String,
    pub driver_image: Option<String>,
    pub accent_color: String,
    pub stroke_width: u32,
}

impl NavigationConfig {
    pub fn new(destination: GeoPoint, routing_key: impl Into<String>) -> Self {
        Self {
            destination,
            routing_key: routing_key.into(),
            driver_image: None,
            accent_color: "#F54A39".to_string(),
            stroke_width: 5,
        }
    }

    pub fn with_driver_image(mut self, v: impl Into<String>) -> Self {
        self.driver_image = Some(v.into());
        self
    }

    pub fn with_accent_color(mut self, v: impl Into<String>) -> Self {
        self.accent_color = v.into();
        self
    }

    pub fn with_stroke_width(mut self, v: u32) -> Self {
        self.stroke_width = v;
        self
    }
}
