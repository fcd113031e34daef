//! Prediction rounds over the shared registry.
//!
//! A [`PredictionSession`] owns the registry holder, the current result
//! collection and the in-flight gate. At most one round runs at a time; a
//! second request while one is outstanding is refused without contacting
//! the service. A round that fails leaves the previous results in place.

use crate::assembler::assemble;
use crate::error::{Result, TelemetryError};
use crate::models::{PredictionRequest, RaceConditions, RaceResultRecord};
use crate::registry::RegistryHandle;
use crate::service::PredictionService;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub type ResultSet = Arc<Vec<RaceResultRecord>>;

pub struct PredictionSession<S> {
    service: S,
    registry: RegistryHandle,
    results: RwLock<ResultSet>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the round ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: PredictionService> PredictionSession<S> {
    pub fn new(service: S, registry: RegistryHandle) -> Self {
        Self {
            service,
            registry,
            results: RwLock::new(Arc::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Results of the last successful round
    pub async fn results(&self) -> ResultSet {
        Arc::clone(&*self.results.read().await)
    }

    pub fn is_predicting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one prediction round against the latest registry snapshot.
    ///
    /// Eligibility is checked before the service is called. On success the
    /// result collection is replaced as a whole and returned.
    pub async fn run_prediction(&self, conditions: &RaceConditions) -> Result<ResultSet> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Prediction requested while another round is running");
            return Err(TelemetryError::PredictionInProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);
        let start_time = Instant::now();

        let snapshot = self.registry.snapshot().await;
        let request = PredictionRequest::from_registry(&snapshot, conditions).inspect_err(|e| {
            warn!(reason = %e, "Prediction round not eligible");
        })?;

        let response = self.service.predict(&request).await.inspect_err(|e| {
            warn!(error = %e, "Prediction service call failed");
        })?;

        let records: ResultSet = Arc::new(assemble(&snapshot, &response)?);
        *self.results.write().await = Arc::clone(&records);

        info!(
            cars = records.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Prediction round complete"
        );
        Ok(records)
    }
}
