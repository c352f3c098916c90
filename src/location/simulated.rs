use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use crate::geo::Coordinate;

use super::{LocationConfig, LocationError, LocationSource, LocationUpdate, LocationWatch};

// ============================================================================
// Simulated Location Source
// ============================================================================
//
// Plays back a fixed route of coordinates at the configured watch interval.
// Stands in for device GPS in the demo binary and in tests; the trait keeps
// a real provider swappable without touching any consumer.
//
// ============================================================================

pub struct SimulatedLocationSource {
    config: LocationConfig,
    route: Vec<Coordinate>,
    /// Index of the most recently played route point, shared with watch tasks
    /// so one-shot fixes line up with the playback position.
    cursor: Arc<AtomicUsize>,
    /// When set, every request fails with this error. Models a user denying
    /// the permission prompt or a device without positioning.
    failure: Option<LocationError>,
    /// Artificial latency before a one-shot fix responds. Lets tests drive
    /// the timeout path.
    fix_delay: Option<Duration>,
}

impl SimulatedLocationSource {
    pub fn new(route: Vec<Coordinate>, config: LocationConfig) -> Self {
        Self {
            config,
            route,
            cursor: Arc::new(AtomicUsize::new(0)),
            failure: None,
            fix_delay: None,
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self {
            config: LocationConfig::default(),
            route: Vec::new(),
            cursor: Arc::new(AtomicUsize::new(0)),
            failure: Some(error),
            fix_delay: None,
        }
    }

    pub fn with_fix_delay(mut self, delay: Duration) -> Self {
        self.fix_delay = Some(delay);
        self
    }

    fn current_point(&self) -> Option<Coordinate> {
        let idx = self.cursor.load(Ordering::SeqCst);
        self.route.get(idx).or_else(|| self.route.last()).copied()
    }
}

#[async_trait]
impl LocationSource for SimulatedLocationSource {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let delay = self.fix_delay;
        let point = self.current_point();

        let fix = async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            point.ok_or(LocationError::Unavailable)
        };

        match timeout(self.config.fix_timeout, fix).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout(self.config.fix_timeout)),
        }
    }

    fn watch_location(&self) -> LocationWatch {
        let (tx, watch) = LocationWatch::channel();

        let route = self.route.clone();
        let cursor = self.cursor.clone();
        let interval = self.config.watch_interval;
        let failure = self.failure.clone();

        tokio::spawn(async move {
            if let Some(error) = failure {
                let _ = tx.send(Err(error)).await;
                return;
            }
            if route.is_empty() {
                let _ = tx.send(Err(LocationError::Unavailable)).await;
                return;
            }

            for (idx, point) in route.iter().enumerate() {
                cursor.store(idx, Ordering::SeqCst);
                let update: LocationUpdate = Ok(*point);
                // A closed channel means the watch was cancelled; stop polling.
                if tx.send(update).await.is_err() {
                    tracing::debug!("Location watch cancelled, stopping playback");
                    return;
                }
                sleep(interval).await;
            }

            tracing::debug!(points = route.len(), "Simulated route exhausted");
        });

        watch
    }
}
