//! Race-result assembly from a prediction service response.
//!
//! The response carries four car-keyed maps. Only `predictions` is iterated;
//! the other three are looked up per car and every missing entry falls back to
//! an explicit default, so each assembled record is complete:
//!
//! | field           | source                     | default |
//! |-----------------|----------------------------|---------|
//! | `TYRE_STRATEGY` | `tyre_strategies[car]`     | `[]`    |
//! | `PITSTOPS`      | `pitstop_strategies[car]`  | `[]`    |
//! | `CONFIDENCE`    | `confidence[car]`          | `0.8`   |

use crate::constants::{
    CONFIDENCE_KEY, DEFAULT_CONFIDENCE, DEFAULT_DEGRADATION, DEFAULT_STINTS, PIT_LAP_CADENCE,
    PITSTOPS_KEY, TYRE_STRATEGY_KEY,
};
use crate::error::Result;
use crate::models::{
    DecodedRecord, PitStop, PitstopStrategy, PredictionResponse, RaceResultRecord, TyreStint,
    TyreStrategy,
};
use crate::registry::IngestionRegistry;
use tracing::{debug, info};

/// Assemble one record per car of `response.predictions`, in response order.
///
/// The registry is only consulted for eligibility; cars present in an
/// auxiliary map but absent from `predictions` are dropped.
pub fn assemble(
    registry: &IngestionRegistry,
    response: &PredictionResponse,
) -> Result<Vec<RaceResultRecord>> {
    registry.check_eligibility()?;

    let records: Vec<RaceResultRecord> = response
        .predictions
        .iter()
        .map(|(car, fields)| assemble_record(car, fields, response))
        .collect();

    info!(cars = records.len(), "Assembled race results");
    Ok(records)
}

/// Build the record for a single car
pub fn assemble_record(
    car: &str,
    fields: &DecodedRecord,
    response: &PredictionResponse,
) -> RaceResultRecord {
    let mut base = fields.clone();
    for assembled_key in [TYRE_STRATEGY_KEY, PITSTOPS_KEY, CONFIDENCE_KEY] {
        base.shift_remove(assembled_key);
    }

    let tyre_strategy = match response.tyre_strategies.get(car) {
        Some(strategy) => tyre_stints(strategy),
        None => {
            debug!(car, "No tyre strategy for car");
            Vec::new()
        }
    };

    let pitstops = match response.pitstop_strategies.get(car) {
        Some(strategy) => pit_stops(strategy),
        None => {
            debug!(car, "No pitstop strategy for car");
            Vec::new()
        }
    };

    let confidence = match response.confidence.get(car).copied().flatten() {
        Some(confidence) => confidence,
        None => DEFAULT_CONFIDENCE,
    };

    RaceResultRecord {
        fields: base,
        tyre_strategy,
        pitstops,
        confidence,
    }
}

/// One stint per compound; missing or null stint counts default to one
fn tyre_stints(strategy: &TyreStrategy) -> Vec<TyreStint> {
    strategy
        .compound_sequence
        .iter()
        .enumerate()
        .map(|(i, compound)| TyreStint {
            compound: compound.clone(),
            stints: strategy
                .expected_stints
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(DEFAULT_STINTS),
            degradation: DEFAULT_DEGRADATION,
        })
        .collect()
}

/// One stop per timestamp, placed on a fixed lap cadence
fn pit_stops(strategy: &PitstopStrategy) -> Vec<PitStop> {
    (0..strategy.pit_timestamps.len())
        .map(|i| PitStop {
            lap: pit_lap(i),
            duration: strategy.pit_durations.get(i).copied().flatten(),
        })
        .collect()
}

/// Lap of the stop at `index`, saturating at `u32::MAX`
fn pit_lap(index: usize) -> u32 {
    u32::try_from(index + 1).map_or(u32::MAX, |stop| stop.saturating_mul(PIT_LAP_CADENCE))
}
