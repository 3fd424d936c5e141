use std::collections::BTreeSet;

use crate::models::{
    AlignmentResult, AlignmentStatus, EnvironmentalState, MismatchMarker, SignalReading,
};

/// Evaluate alignment between a signal reading and a behavioral tag set.
/// Every rule runs independently; all matching markers accumulate, so rule
/// order only affects display order.
pub fn evaluate(reading: &SignalReading, tags: &BTreeSet<String>) -> AlignmentResult {
    let mut mismatches = Vec::new();

    // Introvert-aligned profiles overstimulate when EDA runs high.
    if tags.contains("introvert-aligned") && reading.skin_conductance > 4.5 {
        mismatches.push(MismatchMarker::OverstimulatedResponse);
    }

    // Morning-energy profiles underperform on low EDA.
    if tags.contains("early-peak") && reading.skin_conductance < 1.5 {
        mismatches.push(MismatchMarker::UnderactiveMorning);
    }

    // Restrictive stimulus plus reactive traits signals burnout pressure.
    if tags.contains("reactive")
        && reading.environmental_state == EnvironmentalState::Restrictive
    {
        mismatches.push(MismatchMarker::EmotionalConstraint);
    }

    let status = if mismatches.is_empty() {
        AlignmentStatus::Aligned
    } else {
        AlignmentStatus::Misaligned
    };

    AlignmentResult { status, mismatches }
}
