use navride_common::{estimate_heading, CameraRegion, EdgePadding, GeoPoint, PositionSample};
use thiserror::Error as ThisError;

use crate::{surface::CameraCommand, FIT_BOUNDS_PADDING, FOLLOW_PITCH_DEG};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RideState {
    Idle,
    Following,
}

#[derive(Debug, ThisError)]
pub enum RideError {
    /// `start_ride` was called before the first fix. The start control must
    /// stay hidden until a position exists, so this is a programming error
    /// in the integration, not a runtime condition.
    #[error("ride started before the first position fix")]
    PreconditionViolated,
}

/// The position-tracking state machine.
///
/// Pure: every event returns the camera commands it produced and all I/O
/// stays with the dispatcher, so the machine is unit-testable without a
/// live surface. Owns the one-way `Idle -> Following` transition and the
/// two most recent accepted samples.
#[derive(Debug)]
pub struct RideTracker {
    destination: GeoPoint,
    prev: Option<PositionSample>,
    cur: Option<PositionSample>,
    state: RideState,
}

impl RideTracker {
    pub fn new(destination: GeoPoint) -> Self {
        Self {
            destination,
            prev: None,
            cur: None,
            state: RideState::Idle,
        }
    }

    pub fn state(&self) -> RideState {
        self.state
    }

    pub fn current_position(&self) -> Option<GeoPoint> {
        self.cur.map(|s| s.point)
    }

    pub fn destination(&self) -> GeoPoint {
        self.destination
    }

    /// Records an accepted sample, shifting previous <- current.
    ///
    /// Heading comes from the two most recent samples. A follow command is
    /// emitted only while the ride is underway; while idle the sample is
    /// recorded and the camera stays under free user control.
    pub fn on_position(&mut self, sample: PositionSample) -> Option<CameraCommand> {
        let heading = estimate_heading(self.current_position(), sample.point);

        self.prev = self.cur;
        self.cur = Some(sample);

        if self.state != RideState::Following {
            return None;
        }

        Some(CameraCommand::Follow {
            position: sample.point,
            heading,
            pitch: FOLLOW_PITCH_DEG,
        })
    }

    /// Starts the ride: locks map gestures and snaps the camera to the
    /// current position at the default zoom. One-way; `Following` is sticky
    /// for the machine's lifetime.
    pub fn start_ride(&mut self) -> Result<[CameraCommand; 2], RideError> {
        let Some(cur) = self.cur else {
            return Err(RideError::PreconditionViolated);
        };

        self.state = RideState::Following;

        Ok([
            CameraCommand::LockGestures,
            CameraCommand::Recenter(CameraRegion::around(cur.point)),
        ])
    }

    /// Fits the viewport around the device and the destination. Independent
    /// of the ride state. Calling it again re-fits (wasteful, not an
    /// error); before the first fix there is nothing to frame and `None` is
    /// returned.
    pub fn on_map_surface_ready(&self) -> Option<CameraCommand> {
        let cur = self.current_position()?;

        Some(CameraCommand::FitBounds {
            points: vec![cur, self.destination],
            padding: EdgePadding::uniform(FIT_BOUNDS_PADDING),
        })
    }
}
