use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::models::{EnvironmentalState, SignalReading};

const STATES: [EnvironmentalState; 4] = [
    EnvironmentalState::Expansive,
    EnvironmentalState::Restrictive,
    EnvironmentalState::Neutral,
    EnvironmentalState::Charged,
];

/// Capture one simulated reading. Conductance follows the
/// psychophysiological EDA baseline range of 0.5 to 6.0 microsiemens.
pub fn capture() -> SignalReading {
    let mut rng = rand::thread_rng();
    let raw: f64 = rng.gen_range(0.5..=6.0);
    SignalReading {
        signal_id: Uuid::new_v4(),
        timestamp_utc: Utc::now(),
        skin_conductance: (raw * 100.0).round() / 100.0,
        environmental_state: STATES[rng.gen_range(0..STATES.len())],
    }
}

/// Human-readable summary of a reading for terminal output and logs.
pub fn summarize(reading: &SignalReading) -> String {
    format!(
        "Signal summary:\n- Time: {}\n- EDA level: {:.2} µS\n- Stimulus classification: {}",
        reading.timestamp_utc.format("%Y-%m-%d %H:%M:%S UTC"),
        reading.skin_conductance,
        reading.environmental_state
    )
}
