use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary element classification, keyed off the signature stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CognitiveStyle {
    Analytical,
    Creative,
    Practical,
    Intuitive,
}

impl fmt::Display for CognitiveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CognitiveStyle::Analytical => "Analytical",
            CognitiveStyle::Creative => "Creative",
            CognitiveStyle::Practical => "Practical",
            CognitiveStyle::Intuitive => "Intuitive",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressResponse {
    High,
    Moderate,
    Low,
}

impl fmt::Display for StressResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StressResponse::High => "High",
            StressResponse::Moderate => "Moderate",
            StressResponse::Low => "Low",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyPattern {
    Steady,
    Variable,
    Intense,
    Cyclical,
}

impl fmt::Display for EnergyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnergyPattern::Steady => "Steady",
            EnergyPattern::Variable => "Variable",
            EnergyPattern::Intense => "Intense",
            EnergyPattern::Cyclical => "Cyclical",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        };
        write!(f, "{name}")
    }
}

/// Behavioral signature derived from a birth date. Wholly deterministic:
/// the same date always yields the same signature, tags, and rationale.
#[derive(Debug, Clone, PartialEq)]
pub struct ChronoSignature {
    /// Two-part stem/branch label, e.g. "Geng-Chou".
    pub name: String,
    pub stem_index: usize,
    pub branch_index: usize,
    pub element: Element,
    pub cognitive_style: CognitiveStyle,
    pub stress_response: StressResponse,
    pub energy_pattern: EnergyPattern,
    pub recommended_focus: String,
    pub pattern_tags: BTreeSet<String>,
    /// Ordered "Category: Value" lines explaining the classification.
    pub rationale: Vec<String>,
}

/// Static per-signature timing markers. Descriptive, not computed from the
/// current date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingProfile {
    pub current_risk: RiskLevel,
    pub next_high_risk_month: u32,
    pub recovery_months: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentalState {
    Expansive,
    Restrictive,
    Neutral,
    Charged,
}

impl fmt::Display for EnvironmentalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvironmentalState::Expansive => "expansive",
            EnvironmentalState::Restrictive => "restrictive",
            EnvironmentalState::Neutral => "neutral",
            EnvironmentalState::Charged => "charged",
        };
        write!(f, "{name}")
    }
}

/// One simulated biometric capture. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub signal_id: Uuid,
    pub timestamp_utc: DateTime<Utc>,
    /// Electrodermal activity in microsiemens, two-decimal precision,
    /// always within [0.5, 6.0].
    pub skin_conductance: f64,
    pub environmental_state: EnvironmentalState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentStatus {
    Aligned,
    Misaligned,
}

/// Fixed catalogue of signal/trait incongruity markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchMarker {
    OverstimulatedResponse,
    UnderactiveMorning,
    EmotionalConstraint,
}

impl fmt::Display for MismatchMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MismatchMarker::OverstimulatedResponse => "overstimulated_response",
            MismatchMarker::UnderactiveMorning => "underactive_morning",
            MismatchMarker::EmotionalConstraint => "emotional_constraint",
        };
        write!(f, "{name}")
    }
}

/// Result of matching a reading against a tag set. Status is misaligned
/// iff the mismatch list is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub status: AlignmentStatus,
    pub mismatches: Vec<MismatchMarker>,
}

impl AlignmentResult {
    pub fn is_aligned(&self) -> bool {
        self.status == AlignmentStatus::Aligned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    External,
    Fallback,
}

impl fmt::Display for NarrativeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NarrativeSource::External => "external",
            NarrativeSource::Fallback => "fallback",
        };
        write!(f, "{name}")
    }
}

/// Narrative text plus where it came from. `degraded` carries the backend
/// error detail when the fallback path was taken for a reason other than
/// the integration being disabled.
#[derive(Debug, Clone)]
pub struct NarrativeOutcome {
    pub text: String,
    pub source: NarrativeSource,
    pub model_label: String,
    pub prompt: String,
    pub degraded: Option<String>,
}

/// Final user-facing output of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryResult {
    pub summary: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unreachable,
}

/// Narrative backend health snapshot.
#[derive(Debug, Clone)]
pub struct BackendHealth {
    pub status: HealthStatus,
    pub available_models: Vec<String>,
    pub model_available: bool,
    pub error: Option<String>,
}

/// Entry appended to the insight log after each analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    pub timestamp: DateTime<Utc>,
    pub pattern_tags: Vec<String>,
    pub signal: SignalReading,
    pub prompt_used: String,
    pub narrative: String,
    pub narrative_source: NarrativeSource,
    pub model_label: String,
    pub summary: String,
    pub recommendation: String,
}
