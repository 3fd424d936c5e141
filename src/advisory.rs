use crate::models::{AdvisoryResult, AlignmentResult};

/// Merge the alignment evaluation with the narrative text into the final
/// advisory. The recommendation passes through verbatim; this component
/// performs no judgment on narrative content.
pub fn compose(alignment: &AlignmentResult, narrative_text: &str) -> AdvisoryResult {
    let summary = if alignment.is_aligned() {
        "Your biometric rhythm aligns well with behavioral traits today.".to_string()
    } else {
        let indicators = alignment
            .mismatches
            .iter()
            .map(|marker| marker.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Misalignment detected. Indicators: {indicators}. Consider adjusting mental pacing or stimulus exposure."
        )
    };

    AdvisoryResult {
        summary,
        recommendation: narrative_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlignmentStatus, MismatchMarker};

    #[test]
    fn aligned_result_gets_affirming_summary() {
        let alignment = AlignmentResult {
            status: AlignmentStatus::Aligned,
            mismatches: vec![],
        };
        let advisory = compose(&alignment, "keep pacing steady");
        assert_eq!(
            advisory.summary,
            "Your biometric rhythm aligns well with behavioral traits today."
        );
        assert_eq!(advisory.recommendation, "keep pacing steady");
    }

    #[test]
    fn misaligned_summary_lists_markers_in_order() {
        let alignment = AlignmentResult {
            status: AlignmentStatus::Misaligned,
            mismatches: vec![
                MismatchMarker::OverstimulatedResponse,
                MismatchMarker::EmotionalConstraint,
            ],
        };
        let advisory = compose(&alignment, "take a walk");
        assert!(advisory
            .summary
            .contains("overstimulated_response, emotional_constraint"));
        assert!(advisory.summary.contains("Misalignment detected"));
    }

    #[test]
    fn recommendation_passes_through_verbatim() {
        let alignment = AlignmentResult {
            status: AlignmentStatus::Misaligned,
            mismatches: vec![MismatchMarker::UnderactiveMorning],
        };
        let text = "Narrative text with  odd   spacing.";
        let advisory = compose(&alignment, text);
        assert_eq!(advisory.recommendation, text);
    }
}
