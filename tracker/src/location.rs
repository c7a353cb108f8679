use async_trait::async_trait;
use futures::Stream;
use std::{pin::Pin, time::Duration};
use thiserror::Error as ThisError;

/// Outcome of the one-shot permission request. A denial is terminal for the
/// session, there is no automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// A raw device location with its accuracy/recency metadata, as delivered
/// by the provider.
#[derive(Debug, Clone, Copy)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated horizontal error radius.
    pub accuracy_meters: f64,
    /// How old the reading already was when delivered.
    pub age: Duration,
}

impl Fix {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: 0.0,
            age: Duration::ZERO,
        }
    }
}

/// Options handed to the provider when subscribing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriptionConfig {
    pub high_accuracy: bool,
    /// Oldest reading the provider may deliver.
    pub max_age: Duration,
    /// Minimum movement before a new fix is emitted.
    pub min_distance_meters: f64,
    /// Stalls beyond this are still delivered best-effort, never turned
    /// into errors by this subsystem.
    pub liveness_timeout: Duration,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_age: Duration::from_secs(10),
            min_distance_meters: 2.0,
            liveness_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum LocationStreamError {
    #[error("location provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type FixStream = Pin<Box<dyn Stream<Item = Result<Fix, LocationStreamError>> + Send>>;

/// The external location capability. Implementations wrap the platform
/// geolocation API; the tracking service only ever talks to this trait.
#[async_trait]
pub trait LocationSource: Send {
    async fn request_permission(&mut self) -> Result<PermissionStatus, LocationStreamError>;

    async fn subscribe(
        &mut self,
        config: SubscriptionConfig,
    ) -> Result<FixStream, LocationStreamError>;
}
