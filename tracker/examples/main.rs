use anyhow::Result;
use async_trait::async_trait;
use navride_common::{CameraRegion, EdgePadding, GeoPoint};
use navride_tracker::{
    location::{Fix, FixStream, LocationSource, LocationStreamError, PermissionStatus, SubscriptionConfig},
    service::{Builder, Event},
    surface::MapSurface,
    NavigationConfig,
};
use std::time::Duration;
use tokio::spawn;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DESTINATION: GeoPoint = GeoPoint::new(37.771707, -122.4053769);
const START: GeoPoint = GeoPoint::new(37.764, -122.397);

/// Fakes a driver moving toward the destination, one fix every half second.
struct SimulatedDrive;

#[async_trait]
impl LocationSource for SimulatedDrive {
    async fn request_permission(&mut self) -> Result<PermissionStatus, LocationStreamError> {
        Ok(PermissionStatus::Granted)
    }

    async fn subscribe(
        &mut self,
        _config: SubscriptionConfig,
    ) -> Result<FixStream, LocationStreamError> {
        let steps = 30u32;
        Ok(Box::pin(futures::stream::unfold(0u32, move |i| async move {
            if i > steps {
                return None;
            }

            tokio::time::sleep(Duration::from_millis(500)).await;

            let t = f64::from(i) / f64::from(steps);
            // a little sideways wobble so the heading keeps changing
            let wobble = (t * 20.0).sin() * 5e-4;
            let fix = Fix::new(
                START.latitude + (DESTINATION.latitude - START.latitude) * t,
                START.longitude + (DESTINATION.longitude - START.longitude) * t + wobble,
            );

            Some((Ok(fix), i + 1))
        })))
    }
}

struct ConsoleSurface;

#[async_trait]
impl MapSurface for ConsoleSurface {
    async fn animate_camera_to(&self, position: GeoPoint, heading: f64, pitch: f64) {
        println!("camera -> {position} heading {heading:.1}° pitch {pitch:.0}°");
    }

    async fn animate_to_region(&self, region: CameraRegion) {
        println!(
            "camera -> snap to {} (span {:.3}°)",
            region.center, region.span_lat
        );
    }

    async fn fit_to_bounds(&self, points: &[GeoPoint], padding: EdgePadding) {
        let points = points
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("camera -> fit [{points}] padding {:.0}", padding.top);
    }

    async fn set_gestures_enabled(&self, enabled: bool) {
        println!("gestures -> {}", if enabled { "unlocked" } else { "locked" });
    }
}

fn main() {
    if let Err(e) = run() {
        println!("Exiting with error: {e}");
    } else {
        println!("Ride finished");
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NavigationConfig::new(DESTINATION, "API_KEY").with_driver_image("car.png");

    let cancel_parent = CancellationToken::new();
    let cancel = cancel_parent.child_token();
    spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        cancel_parent.cancel();
    });

    let mut service = Builder::new(config, SimulatedDrive, ConsoleSurface)
        .with_cancellation_token(cancel.clone())
        .start();

    service.attach_surface().await;
    service.enable_events();

    let mut fixes_seen = 0u32;
    loop {
        let event = tokio::select! {
            e = service.next_event() => e?,
            _ = cancel.cancelled() => break,
        };

        match event {
            Event::PositionUpdate(point) => {
                fixes_seen += 1;

                if fixes_seen == 1 {
                    println!("first fix at {point}, framing the trip");
                    service.notify_map_ready().await;
                } else if fixes_seen == 4 {
                    println!("starting the ride");
                    service.start_ride().await?;
                } else {
                    println!("fix at {point}");
                }

                if fixes_seen > 30 {
                    break;
                }
            }

            Event::RideStarted => println!("ride is underway"),

            Event::PermissionDenied => {
                println!("permission denied, still waiting for a position");
                break;
            }
        }
    }

    Ok(())
}
