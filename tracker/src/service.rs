use anyhow::Result;
use futures::StreamExt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{
    spawn,
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use navride_common::{GeoPoint, PositionSample};

use crate::{
    dispatch::CameraDispatcher,
    location::{Fix, LocationSource, PermissionStatus, SubscriptionConfig},
    ride::{RideError, RideState, RideTracker},
    surface::MapSurface,
    NavigationConfig,
};

/// What the host view should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewState {
    /// No fix yet (or permission denied): indeterminate progress indicator.
    AcquiringPosition,
    /// Map with markers, route overlay and the conditional start control.
    Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    PositionUpdate(GeoPoint),
    RideStarted,
    PermissionDenied,
}

struct Inner<S> {
    dispatcher: Mutex<CameraDispatcher<S>>,
    event_tx: watch::Sender<Option<Event>>,
    view_tx: watch::Sender<ViewState>,
    cancel_token: CancellationToken,
    tracker: Mutex<RideTracker>,
    send_events: AtomicBool,
    config: NavigationConfig,
}

/// Handle to a running navigation session. Dropping it cancels the
/// background tracking task; in-flight camera commands complete.
pub struct NavigationService<S> {
    service_task_handle: Option<JoinHandle<Result<()>>>,
    event_rx: watch::Receiver<Option<Event>>,
    view_rx: watch::Receiver<ViewState>,
    inner: Arc<Inner<S>>,
}

pub struct Builder<L, S> {
    subscription: SubscriptionConfig,
    cancel_token: CancellationToken,
    config: NavigationConfig,
    source: L,
    surface: S,
}

impl<L, S> Builder<L, S> {
    pub fn new(config: NavigationConfig, source: L, surface: S) -> Self {
        Self {
            subscription: SubscriptionConfig::default(),
            cancel_token: CancellationToken::new(),
            config,
            source,
            surface,
        }
    }

    pub fn with_subscription(mut self, v: SubscriptionConfig) -> Self {
        self.subscription = v;
        self
    }

    pub fn with_cancellation_token(mut self, v: CancellationToken) -> Self {
        self.cancel_token = v;
        self
    }
}

impl<L: LocationSource + 'static, S: MapSurface + 'static> Builder<L, S> {
    /// Spawns the tracking task. Permission denial is not a start failure:
    /// the session simply never leaves `AcquiringPosition`.
    pub fn start(self) -> NavigationService<S> {
        let (event_tx, event_rx) = watch::channel(None);
        let (view_tx, view_rx) = watch::channel(ViewState::AcquiringPosition);

        let destination = self.config.destination;

        let inner = Arc::new(Inner {
            dispatcher: Mutex::new(CameraDispatcher::new(self.surface)),
            tracker: Mutex::new(RideTracker::new(destination)),
            send_events: AtomicBool::new(false),
            cancel_token: self.cancel_token,
            config: self.config,
            event_tx,
            view_tx,
        });

        let service_task_handle = Some(spawn(inner.clone().run(self.source, self.subscription)));

        NavigationService {
            service_task_handle,
            event_rx,
            view_rx,
            inner,
        }
    }
}

impl<S: MapSurface> Inner<S> {
    fn send_event(&self, e: Event) {
        if self.send_events.load(Ordering::SeqCst) {
            let _ = self.event_tx.send(Some(e));
        }
    }

    async fn run<L: LocationSource>(
        self: Arc<Self>,
        mut source: L,
        subscription: SubscriptionConfig,
    ) -> Result<()> {
        match source.request_permission().await {
            Ok(PermissionStatus::Granted) => (),

            // terminal for the session, no retry: the view keeps showing
            // the acquiring indicator. Sent ungated so a host subscribing
            // late still observes the denial.
            Ok(PermissionStatus::Denied) => {
                warn!("location permission denied, tracking will not start");
                let _ = self.event_tx.send(Some(Event::PermissionDenied));
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "location permission request failed, tracking will not start");
                let _ = self.event_tx.send(Some(Event::PermissionDenied));
                return Ok(());
            }
        }

        let mut fixes = match source.subscribe(subscription).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "location subscription failed");
                return Ok(());
            }
        };

        loop {
            let fix = tokio::select! {
                f = fixes.next() => f,
                _ = self.cancel_token.cancelled() => return Ok(()),
            };

            match fix {
                Some(Ok(fix)) => self.on_fix(fix).await,

                // best-effort tracking: a dropped fix leaves the camera
                // stationary until the next one arrives
                Some(Err(e)) => {
                    debug!(error = %e, "location stream error, waiting for next fix");
                }

                None => return Ok(()),
            }
        }
    }

    async fn on_fix(&self, fix: Fix) {
        let sample = PositionSample::new(GeoPoint::new(fix.latitude, fix.longitude));

        let mut tracker = self.tracker.lock().await;
        let first_fix = tracker.current_position().is_none();
        let command = tracker.on_position(sample);
        drop(tracker);

        if let Some(command) = command {
            self.dispatcher.lock().await.dispatch(command).await;
        }

        if first_fix {
            let _ = self.view_tx.send(ViewState::Tracking);
        }
        self.send_event(Event::PositionUpdate(sample.point));
    }
}

impl<S: MapSurface> NavigationService<S> {
    /// Transitions `Idle -> Following`: locks map gestures and snaps the
    /// camera to the current position. Valid only once a fix exists.
    pub async fn start_ride(&self) -> Result<(), RideError> {
        let mut tracker = self.inner.tracker.lock().await;
        let commands = tracker.start_ride()?;
        drop(tracker);

        let dispatcher = self.inner.dispatcher.lock().await;
        for command in commands {
            dispatcher.dispatch(command).await;
        }
        drop(dispatcher);

        self.inner.send_event(Event::RideStarted);
        Ok(())
    }

    /// One-shot viewport fit around the device and the destination, fired
    /// when the map surface reports ready. Repeat calls re-fit.
    pub async fn notify_map_ready(&self) {
        let tracker = self.inner.tracker.lock().await;
        let command = tracker.on_map_surface_ready();
        drop(tracker);

        match command {
            Some(command) => self.inner.dispatcher.lock().await.dispatch(command).await,
            None => debug!("map surface ready before the first fix, nothing to frame"),
        }
    }

    pub async fn attach_surface(&self) {
        self.inner.dispatcher.lock().await.attach();
    }

    pub async fn detach_surface(&self) {
        self.inner.dispatcher.lock().await.detach();
    }

    pub fn view_state(&self) -> ViewState {
        *self.view_rx.borrow()
    }

    pub async fn ride_state(&self) -> RideState {
        self.inner.tracker.lock().await.state()
    }

    pub async fn current_position(&self) -> Option<GeoPoint> {
        self.inner.tracker.lock().await.current_position()
    }

    /// Whether the host should show the tappable start control.
    pub async fn show_start_control(&self) -> bool {
        let tracker = self.inner.tracker.lock().await;
        tracker.state() == RideState::Idle && tracker.current_position().is_some()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.inner.config
    }

    pub fn enable_events(&self) {
        self.set_events(true);
    }

    pub fn set_events(&self, enable: bool) {
        self.inner.send_events.store(enable, Ordering::SeqCst);
    }

    pub fn disable_events(&self) {
        self.set_events(false);
    }

    /// Awaits the next event not yet observed through this handle.
    pub async fn next_event(&mut self) -> Result<Event> {
        loop {
            self.event_rx.changed().await?;
            if let Some(e) = *self.event_rx.borrow_and_update() {
                return Ok(e);
            }
        }
    }

    /// Awaits the next view-state change.
    pub async fn view_changed(&mut self) -> Result<ViewState> {
        self.view_rx.changed().await?;
        Ok(*self.view_rx.borrow())
    }

    pub async fn stop(mut self) -> Result<()> {
        let Some(h) = self.service_task_handle.take() else {
            return Err(anyhow::Error::msg("Service background task already joined"));
        };
        drop(self);
        h.await?
    }
}

impl<S> Drop for NavigationService<S> {
    fn drop(&mut self) {
        self.inner.cancel_token.cancel();
    }
}
