//! Deterministic verdict from the two analyses.

use crate::llm::{QualityAnalysis, QuietAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Both labels positive and both scores at or above the threshold.
    pub recommended: bool,
    /// Quality score alone meets the threshold.
    pub quality: bool,
    /// Quiet score alone meets the threshold.
    pub quiet: bool,
}

impl Verdict {
    pub fn from_analysis(quality: &QualityAnalysis, quiet: &QuietAnalysis, threshold: f64) -> Self {
        let quality_ok = quality.score >= threshold;
        let quiet_ok = quiet.score >= threshold;
        Self {
            recommended: quality.recommended && quiet.is_quiet && quality_ok && quiet_ok,
            quality: quality_ok,
            quiet: quiet_ok,
        }
    }
}

/// One-line human summary stored with the recommendation.
pub fn recommendation_summary(
    quality: &QualityAnalysis,
    quiet: &QuietAnalysis,
    recommended: bool,
) -> String {
    format!(
        "Quality: {:.1}/1.0 (confidence: {:.1}%) | Quiet: {:.1}/1.0 (confidence: {:.1}%) | Overall: {}",
        quality.score,
        quality.confidence * 100.0,
        quiet.score,
        quiet.confidence * 100.0,
        if recommended {
            "RECOMMENDED"
        } else {
            "NOT RECOMMENDED"
        }
    )
}

/// Note written onto the hotel explaining the scores.
pub fn important_note(quality: &QualityAnalysis, quiet: &QuietAnalysis) -> String {
    format!("Quality: {} | Quiet: {}", quality.reasoning, quiet.reasoning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality(score: f64, recommended: bool) -> QualityAnalysis {
        QualityAnalysis {
            score,
            confidence: 0.9,
            reasoning: "attentive staff".into(),
            recommended,
        }
    }

    fn quiet(score: f64, is_quiet: bool) -> QuietAnalysis {
        QuietAnalysis {
            score,
            confidence: 0.85,
            reasoning: "thick walls".into(),
            is_quiet,
        }
    }

    #[test]
    fn test_weak_quiet_score_fails_conjunction() {
        let v = Verdict::from_analysis(&quality(0.8, true), &quiet(0.6, true), 0.7);
        assert!(!v.recommended);
        assert!(v.quality);
        assert!(!v.quiet);
    }

    #[test]
    fn test_negative_label_fails_conjunction() {
        let v = Verdict::from_analysis(&quality(0.95, false), &quiet(0.9, true), 0.7);
        assert!(!v.recommended);
        assert!(v.quality);
        assert!(v.quiet);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let v = Verdict::from_analysis(&quality(0.7, true), &quiet(0.7, true), 0.7);
        assert!(v.recommended);
    }

    #[test]
    fn test_summary_format() {
        let s = recommendation_summary(&quality(0.8, true), &quiet(0.75, true), true);
        assert_eq!(
            s,
            "Quality: 0.8/1.0 (confidence: 90.0%) | Quiet: 0.8/1.0 (confidence: 85.0%) | Overall: RECOMMENDED"
        );
        assert_eq!(
            important_note(&quality(0.8, true), &quiet(0.75, true)),
            "Quality: attentive staff | Quiet: thick walls"
        );
    }
}
