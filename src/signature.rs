use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::InputError;
use crate::models::{
    ChronoSignature, CognitiveStyle, Element, EnergyPattern, RiskLevel, StressResponse,
    TimingProfile,
};

const STEMS: [&str; 10] = [
    "Jia", "Yi", "Bing", "Ding", "Wu", "Ji", "Geng", "Xin", "Ren", "Gui",
];

const BRANCHES: [&str; 12] = [
    "Zi", "Chou", "Yin", "Mao", "Chen", "Si", "Wu", "Wei", "Shen", "You", "Xu", "Hai",
];

// Stems map to elements in adjacent pairs: Jia/Yi wood, Bing/Ding fire, and
// so on through the cycle.
const ELEMENT_CYCLE: [Element; 5] = [
    Element::Wood,
    Element::Fire,
    Element::Earth,
    Element::Metal,
    Element::Water,
];

const COGNITIVE_STYLES: [CognitiveStyle; 4] = [
    CognitiveStyle::Analytical,
    CognitiveStyle::Creative,
    CognitiveStyle::Practical,
    CognitiveStyle::Intuitive,
];

const STRESS_RESPONSES: [StressResponse; 3] = [
    StressResponse::High,
    StressResponse::Moderate,
    StressResponse::Low,
];

const ENERGY_PATTERNS: [EnergyPattern; 4] = [
    EnergyPattern::Steady,
    EnergyPattern::Variable,
    EnergyPattern::Intense,
    EnergyPattern::Cyclical,
];

/// Human-authored profile entry for one signature. Narrative content lives
/// in data/signature_traits.json, not in code.
#[derive(Debug, Deserialize)]
pub struct TraitEntry {
    pub cognitive_style: CognitiveStyle,
    pub stress_response: StressResponse,
    pub energy_pattern: EnergyPattern,
    pub focus: String,
    pub narrative: String,
}

static TRAIT_TABLE: OnceLock<HashMap<String, TraitEntry>> = OnceLock::new();

fn trait_table() -> &'static HashMap<String, TraitEntry> {
    TRAIT_TABLE.get_or_init(|| {
        serde_json::from_str(include_str!("../data/signature_traits.json"))
            .expect("bundled signature trait table must parse")
    })
}

/// Parse a birth date from the two accepted input formats.
pub fn parse_birth_date(input: &str) -> Result<NaiveDate, InputError> {
    let trimmed = input.trim();
    let format = if trimmed.contains('/') {
        "%d/%m/%Y"
    } else {
        "%Y-%m-%d"
    };
    NaiveDate::parse_from_str(trimmed, format).map_err(|_| InputError::InvalidDateFormat {
        input: input.to_string(),
    })
}

/// Derive the chrono-signature for a birth date. Total over valid calendar
/// dates: never fails, never returns an empty tag set.
pub fn derive(birth_date: NaiveDate) -> ChronoSignature {
    let stem_index = (birth_date.year().rem_euclid(10) as usize + 6) % 10;
    let branch_index =
        (birth_date.ordinal() as i64 + birth_date.year() as i64).rem_euclid(12) as usize;
    let name = format!("{}-{}", STEMS[stem_index], BRANCHES[branch_index]);
    let element = ELEMENT_CYCLE[stem_index / 2];

    let (cognitive_style, stress_response, energy_pattern, recommended_focus) =
        match trait_table().get(&name) {
            Some(entry) => (
                entry.cognitive_style,
                entry.stress_response,
                entry.energy_pattern,
                entry.focus.clone(),
            ),
            // Signatures without an authored entry fall through to modular
            // arithmetic on month/day, so every date gets a full profile.
            None => {
                let month = birth_date.month() as usize;
                let day = birth_date.day() as usize;
                let style = COGNITIVE_STYLES[(month + day) % 4];
                let stress = STRESS_RESPONSES[day % 3];
                let energy = ENERGY_PATTERNS[(month * day) % 4];
                (style, stress, energy, default_focus(stress).to_string())
            }
        };

    let pattern_tags = assemble_tags(element, cognitive_style, stress_response, energy_pattern);
    let rationale = vec![
        format!("Primary element influence: {element}"),
        format!(
            "Current burnout risk level: {}",
            risk_level(stress_response)
        ),
        format!("Cognitive processing style: {cognitive_style}"),
        format!("Energy rhythm pattern: {energy_pattern}"),
        format!("Recommended focus: {recommended_focus}"),
    ];

    ChronoSignature {
        name,
        stem_index,
        branch_index,
        element,
        cognitive_style,
        stress_response,
        energy_pattern,
        recommended_focus,
        pattern_tags,
        rationale,
    }
}

fn assemble_tags(
    element: Element,
    style: CognitiveStyle,
    stress: StressResponse,
    energy: EnergyPattern,
) -> BTreeSet<String> {
    let element_tag = match element {
        Element::Wood => "expansion-prone",
        Element::Fire => "volatile",
        Element::Earth => "grounded",
        Element::Metal => "structured",
        Element::Water => "introvert-aligned",
    };
    let style_tag = match style {
        CognitiveStyle::Analytical => "analytical",
        CognitiveStyle::Creative => "creative",
        CognitiveStyle::Practical => "practical",
        CognitiveStyle::Intuitive => "intuitive",
    };
    let stress_tag = match stress {
        StressResponse::High => "reactive",
        StressResponse::Moderate => "buffered",
        StressResponse::Low => "resilient",
    };
    let energy_tag = match energy {
        EnergyPattern::Steady => "steady-rhythm",
        EnergyPattern::Variable => "stimulus-seeking",
        EnergyPattern::Intense => "early-peak",
        EnergyPattern::Cyclical => "cyclical-rhythm",
    };

    [element_tag, style_tag, stress_tag, energy_tag]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn risk_level(stress: StressResponse) -> RiskLevel {
    match stress {
        StressResponse::High => RiskLevel::High,
        StressResponse::Moderate => RiskLevel::Medium,
        StressResponse::Low => RiskLevel::Low,
    }
}

fn default_focus(stress: StressResponse) -> &'static str {
    match stress {
        StressResponse::High => "Protect rest windows and reduce stimulation load",
        StressResponse::Moderate => "Balance output with deliberate recovery blocks",
        StressResponse::Low => "Maintain current pacing and reinforce familiar habits",
    }
}

/// Static timing markers for a signature. The months are descriptive risk
/// placements on the cycle, not predictions anchored to today's date.
pub fn timing_profile(signature: &ChronoSignature) -> TimingProfile {
    let branch = signature.branch_index as u32;
    TimingProfile {
        current_risk: risk_level(signature.stress_response),
        next_high_risk_month: (branch + 6) % 12 + 1,
        recovery_months: vec![(branch + 3) % 12 + 1, (branch + 9) % 12 + 1],
    }
}

/// Authored narrative text for signatures present in the trait table.
pub fn narrative_for(signature: &ChronoSignature) -> Option<&'static str> {
    trait_table()
        .get(&signature.name)
        .map(|entry| entry.narrative.as_str())
}

/// Recovery recommendations keyed on the profile classifications.
pub fn recovery_recommendations(signature: &ChronoSignature) -> Vec<(&'static str, String)> {
    vec![
        (
            "Stress management",
            format!(
                "For a {} stress response: practice regular breathing exercises and keep a consistent sleep schedule.",
                signature.stress_response
            ),
        ),
        (
            "Energy optimization",
            format!(
                "As a {} type: plan around structured blocks with regular breaks.",
                signature.cognitive_style
            ),
        ),
        (
            "Recovery timing",
            "Reserve the recovery months for rest and low-commitment work.".to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
        let first = derive(date);
        let second = derive(date);
        assert_eq!(first, second);
    }

    #[test]
    fn known_date_yields_stable_signature() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
        let signature = derive(date);
        // 1990 -> Geng stem; day-of-year 135 + 1990 = 2125 -> branch 1 (Chou).
        assert_eq!(signature.name, "Geng-Chou");
        assert_eq!(signature.element, Element::Metal);
    }

    #[test]
    fn every_date_gets_a_full_profile() {
        let dates = [
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1984, 1, 8).unwrap(),
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2015, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(1969, 7, 20).unwrap(),
        ];
        for date in dates {
            let signature = derive(date);
            assert!(!signature.pattern_tags.is_empty());
            assert_eq!(signature.rationale.len(), 5);
            assert!(signature
                .rationale
                .iter()
                .all(|line| line.contains(": ")));
        }
    }

    #[test]
    fn table_entry_overrides_modular_fallback() {
        // 1984-01-08 falls on Jia-Zi, which carries an authored entry.
        let date = NaiveDate::from_ymd_opt(1984, 1, 8).unwrap();
        let signature = derive(date);
        assert_eq!(signature.name, "Jia-Zi");
        let entry = trait_table().get("Jia-Zi").unwrap();
        assert_eq!(signature.cognitive_style, entry.cognitive_style);
        assert_eq!(signature.stress_response, entry.stress_response);
        assert_eq!(signature.recommended_focus, entry.focus);
        assert!(narrative_for(&signature).is_some());
    }

    #[test]
    fn untabled_signature_uses_modular_arithmetic() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
        let signature = derive(date);
        assert!(trait_table().get(&signature.name).is_none());
        // month 5, day 15: (5+15)%4=0, 15%3=0, (5*15)%4=3
        assert_eq!(signature.cognitive_style, CognitiveStyle::Analytical);
        assert_eq!(signature.stress_response, StressResponse::High);
        assert_eq!(signature.energy_pattern, EnergyPattern::Cyclical);
        assert!(narrative_for(&signature).is_none());
    }

    #[test]
    fn tags_cover_all_classification_axes() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
        let signature = derive(date);
        let expected: BTreeSet<String> =
            ["structured", "analytical", "reactive", "cyclical-rhythm"]
                .into_iter()
                .map(String::from)
                .collect();
        assert_eq!(signature.pattern_tags, expected);
    }

    #[test]
    fn timing_profile_months_are_calendar_months() {
        for day in 1..=28 {
            let date = NaiveDate::from_ymd_opt(1992, 3, day).unwrap();
            let signature = derive(date);
            let timing = timing_profile(&signature);
            assert!((1..=12).contains(&timing.next_high_risk_month));
            assert_eq!(timing.recovery_months.len(), 2);
            assert!(timing
                .recovery_months
                .iter()
                .all(|month| (1..=12).contains(month)));
        }
    }

    #[test]
    fn timing_profile_is_static_per_signature() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
        let signature = derive(date);
        assert_eq!(timing_profile(&signature), timing_profile(&signature));
    }

    #[test]
    fn parses_both_date_formats() {
        let iso = parse_birth_date("1990-05-15").unwrap();
        let euro = parse_birth_date("15/05/1990").unwrap();
        assert_eq!(iso, euro);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_birth_date("not-a-date").is_err());
        assert!(parse_birth_date("1990-13-40").is_err());
        assert!(parse_birth_date("05/1990").is_err());
    }
}
