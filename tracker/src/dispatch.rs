use tracing::trace;

use crate::surface::{CameraCommand, MapSurface};

/// Forwards state machine commands to the rendering surface.
///
/// Holds the explicit attached flag, flipped by the surface's own lifecycle
/// events. Commands arriving while detached drop silently; a camera call on
/// an unmounted surface must never become an error.
pub struct CameraDispatcher<S> {
    surface: S,
    attached: bool,
}

impl<S: MapSurface> CameraDispatcher<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// One surface call per command, no batching or coalescing. If the
    /// surface cannot keep up with follow animations, that is its own
    /// backpressure to manage.
    pub async fn dispatch(&self, command: CameraCommand) {
        if !self.attached {
            trace!(?command, "surface detached, dropping camera command");
            return;
        }

        match command {
            CameraCommand::Follow {
                position,
                heading,
                pitch,
            } => self.surface.animate_camera_to(position, heading, pitch).await,

            CameraCommand::Recenter(region) => self.surface.animate_to_region(region).await,

            CameraCommand::FitBounds { points, padding } => {
                self.surface.fit_to_bounds(&points, padding).await
            }

            CameraCommand::LockGestures => self.surface.set_gestures_enabled(false).await,
        }
    }
}
