use std::{fmt::Display, time::Instant};

pub mod heading;

pub use heading::estimate_heading;

/// Fixed latitude/longitude span of the follow viewport (**in degrees**).
///
/// A display fit-width, not a measurement.
pub const REGION_SPAN_DEG: f64 = 0.005;

/// A WGS84 coordinate pair as reported by the location source.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}; {:.6})", self.latitude, self.longitude)
    }
}

/// A single accepted location fix. Superseded by the next sample, never
/// mutated.
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    pub point: GeoPoint,
    pub observed_at: Instant,
}

impl PositionSample {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            observed_at: Instant::now(),
        }
    }

    pub const fn new_at(point: GeoPoint, observed_at: Instant) -> Self {
        Self { point, observed_at }
    }
}

impl Display for PositionSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.point)
    }
}

/// A map viewport: a center point plus the visible span on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraRegion {
    pub center: GeoPoint,
    pub span_lat: f64,
    pub span_lon: f64,
}

impl CameraRegion {
    /// The default-zoom viewport around a point.
    pub const fn around(center: GeoPoint) -> Self {
        Self {
            center,
            span_lat: REGION_SPAN_DEG,
            span_lon: REGION_SPAN_DEG,
        }
    }
}

/// Viewport edge insets for fit-bounds calls, in px-equivalent units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgePadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl EdgePadding {
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}
