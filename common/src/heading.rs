use crate::GeoPoint;

/// Compass bearing between two consecutive fixes, in degrees.
///
/// Planar approximation: `atan2` over the raw coordinate deltas, ignoring
/// great-circle distortion. Successive fixes are meters apart, so the error
/// is negligible. With no previous fix there is no heading information yet
/// and the defined default `0.0` is returned.
pub fn estimate_heading(prev: Option<GeoPoint>, cur: GeoPoint) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };

    let lat_diff = cur.latitude - prev.latitude;
    let lon_diff = cur.longitude - prev.longitude;

    lon_diff.atan2(lat_diff).to_degrees()
}
