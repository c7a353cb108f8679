use async_trait::async_trait;
use navride_common::{CameraRegion, EdgePadding, GeoPoint};
use navride_tracker::{
    location::{Fix, FixStream, LocationSource, LocationStreamError, PermissionStatus, SubscriptionConfig},
    ride::RideState,
    service::{Builder, Event, ViewState},
    surface::MapSurface,
    NavigationConfig, FOLLOW_PITCH_DEG,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const DESTINATION: GeoPoint = GeoPoint::new(37.771707, -122.4053769);

/// Location capability driven by the test: fixes are pushed through a
/// channel so delivery interleaves with service calls.
struct ScriptedSource {
    permission: PermissionStatus,
    fixes: Option<mpsc::UnboundedReceiver<Result<Fix, LocationStreamError>>>,
}

fn scripted_source(
    permission: PermissionStatus,
) -> (
    ScriptedSource,
    mpsc::UnboundedSender<Result<Fix, LocationStreamError>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ScriptedSource {
            permission,
            fixes: Some(rx),
        },
        tx,
    )
}

#[async_trait]
impl LocationSource for ScriptedSource {
    async fn request_permission(&mut self) -> Result<PermissionStatus, LocationStreamError> {
        Ok(self.permission)
    }

    async fn subscribe(
        &mut self,
        _config: SubscriptionConfig,
    ) -> Result<FixStream, LocationStreamError> {
        if self.permission == PermissionStatus::Denied {
            panic!("subscribe must not be called after a denial");
        }

        let rx = self.fixes.take().expect("single subscription per source");
        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|fix| (fix, rx))
        })))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SurfaceCall {
    Animate {
        position: GeoPoint,
        heading: f64,
        pitch: f64,
    },
    Region(CameraRegion),
    FitBounds(Vec<GeoPoint>, EdgePadding),
    Gestures(bool),
}

#[derive(Clone, Default)]
struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MapSurface for RecordingSurface {
    async fn animate_camera_to(&self, position: GeoPoint, heading: f64, pitch: f64) {
        self.calls.lock().unwrap().push(SurfaceCall::Animate {
            position,
            heading,
            pitch,
        });
    }

    async fn animate_to_region(&self, region: CameraRegion) {
        self.calls.lock().unwrap().push(SurfaceCall::Region(region));
    }

    async fn fit_to_bounds(&self, points: &[GeoPoint], padding: EdgePadding) {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::FitBounds(points.to_vec(), padding));
    }

    async fn set_gestures_enabled(&self, enabled: bool) {
        self.calls.lock().unwrap().push(SurfaceCall::Gestures(enabled));
    }
}

fn config() -> NavigationConfig {
    NavigationConfig::new(DESTINATION, "routing-key")
}

fn fix(latitude: f64, longitude: f64) -> Result<Fix, LocationStreamError> {
    Ok(Fix::new(latitude, longitude))
}

#[tokio::test]
async fn idle_positions_never_move_the_camera() {
    let (source, tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    service.attach_surface().await;
    service.enable_events();

    for i in 0..10 {
        tx.send(fix(37.0 + i as f64 * 1e-4, -122.0)).unwrap();
        let event = service.next_event().await.unwrap();
        assert!(matches!(event, Event::PositionUpdate(_)));
    }

    assert_eq!(service.ride_state().await, RideState::Idle);
    assert_eq!(surface.calls(), vec![]);
}

#[tokio::test]
async fn start_ride_snaps_then_follows() {
    let (source, tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    service.attach_surface().await;
    service.enable_events();

    tx.send(fix(37.0, -122.0)).unwrap();
    service.next_event().await.unwrap();

    service.start_ride().await.unwrap();
    assert_eq!(service.next_event().await.unwrap(), Event::RideStarted);
    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Gestures(false),
            SurfaceCall::Region(CameraRegion::around(GeoPoint::new(37.0, -122.0))),
        ]
    );

    tx.send(fix(37.001, -122.0005)).unwrap();
    service.next_event().await.unwrap();

    let calls = surface.calls();
    assert_eq!(calls.len(), 3);
    let SurfaceCall::Animate {
        position,
        heading,
        pitch,
    } = &calls[2]
    else {
        panic!("expected a follow animation, got {:?}", calls[2]);
    };

    assert_eq!(*position, GeoPoint::new(37.001, -122.0005));
    assert!((heading + 26.565).abs() < 1e-3);
    assert_eq!(*pitch, FOLLOW_PITCH_DEG);

    assert_eq!(service.ride_state().await, RideState::Following);
    assert!(!service.show_start_control().await);
}

#[tokio::test]
async fn start_ride_before_first_fix_fails_and_stays_idle() {
    let (source, _tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let service = Builder::new(config(), source, surface.clone()).start();
    service.attach_surface().await;

    assert!(service.start_ride().await.is_err());
    assert_eq!(service.ride_state().await, RideState::Idle);
    assert_eq!(surface.calls(), vec![]);
}

#[tokio::test]
async fn permission_denied_keeps_acquiring_forever() {
    let (source, _tx) = scripted_source(PermissionStatus::Denied);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    service.attach_surface().await;
    service.enable_events();

    assert_eq!(service.next_event().await.unwrap(), Event::PermissionDenied);
    assert_eq!(service.view_state(), ViewState::AcquiringPosition);
    assert_eq!(surface.calls(), vec![]);

    // the task ended cleanly, nothing escaped
    service.stop().await.unwrap();
}

#[tokio::test]
async fn stream_errors_are_swallowed() {
    let (source, tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    service.attach_surface().await;
    service.enable_events();

    tx.send(Err(LocationStreamError::Provider(
        "gps glitch".to_string(),
    )))
    .unwrap();
    tx.send(fix(37.0, -122.0)).unwrap();

    let event = service.next_event().await.unwrap();
    assert_eq!(event, Event::PositionUpdate(GeoPoint::new(37.0, -122.0)));
    assert_eq!(service.view_state(), ViewState::Tracking);
}

#[tokio::test]
async fn map_ready_fits_device_and_destination() {
    let (source, tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    service.attach_surface().await;
    service.enable_events();

    // before the first fix there is nothing to frame
    service.notify_map_ready().await;
    assert_eq!(surface.calls(), vec![]);

    tx.send(fix(37.0, -122.0)).unwrap();
    service.next_event().await.unwrap();

    service.notify_map_ready().await;
    assert_eq!(
        surface.calls(),
        vec![SurfaceCall::FitBounds(
            vec![GeoPoint::new(37.0, -122.0), DESTINATION],
            EdgePadding::uniform(150.0),
        )]
    );
}

#[tokio::test]
async fn detached_surface_drops_follow_commands() {
    let (source, tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    service.enable_events();

    tx.send(fix(37.0, -122.0)).unwrap();
    service.next_event().await.unwrap();

    // surface never attached: the snap and the follows all no-op
    service.start_ride().await.unwrap();
    assert_eq!(service.next_event().await.unwrap(), Event::RideStarted);

    tx.send(fix(37.001, -122.0)).unwrap();
    service.next_event().await.unwrap();

    assert_eq!(surface.calls(), vec![]);
    assert_eq!(service.ride_state().await, RideState::Following);
}

#[tokio::test]
async fn view_state_flips_on_first_fix() {
    let (source, tx) = scripted_source(PermissionStatus::Granted);
    let surface = RecordingSurface::default();

    let mut service = Builder::new(config(), source, surface.clone()).start();
    assert_eq!(service.view_state(), ViewState::AcquiringPosition);

    tx.send(fix(37.0, -122.0)).unwrap();
    assert_eq!(service.view_changed().await.unwrap(), ViewState::Tracking);
    assert!(service.show_start_control().await);
    assert_eq!(service.current_position().await, Some(GeoPoint::new(37.0, -122.0)));
}
