//! Rubric data model: the five scoring dimensions and a validated score.
//!
//! Every place that needs the dimension list (judge prompt, reply parsing,
//! retry feedback, threshold gating, console output) iterates
//! [`Dimension::ALL`] so the lists cannot drift apart.

use serde::Serialize;

use crate::core::rubric_parse::JudgeParseError;

/// Lowest valid score for a dimension.
pub const MIN_SCORE: u8 = 1;
/// Highest valid score for a dimension.
pub const MAX_SCORE: u8 = 5;
/// Gating dimensions must score at least this much to pass. Dimensions below
/// this value are reported back to the storyteller on retry.
pub const PASSING_DIMENSION_SCORE: u8 = 4;
/// Minimum average across all dimensions required to pass.
pub const PASSING_AVERAGE: f64 = 4.0;
/// Feedback attached to every dimension of [`RubricScore::default_failing`].
pub const PARSE_FAILURE_FEEDBACK: &str = "Judge evaluation failed to parse";

const DEFAULT_FAILING_VALUE: u8 = 3;

/// One rubric dimension, in the fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Safety,
    AgeFit,
    Coherence,
    Engagement,
    LanguageSimplicity,
}

impl Dimension {
    /// All dimensions in evaluation order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Safety,
        Dimension::AgeFit,
        Dimension::Coherence,
        Dimension::Engagement,
        Dimension::LanguageSimplicity,
    ];

    /// Label used on the judge wire format (`SAFETY: 5`).
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Safety => "SAFETY",
            Dimension::AgeFit => "AGE_FIT",
            Dimension::Coherence => "COHERENCE",
            Dimension::Engagement => "ENGAGEMENT",
            Dimension::LanguageSimplicity => "LANGUAGE_SIMPLICITY",
        }
    }

    /// Human-readable name for console output.
    pub fn display_name(self) -> &'static str {
        match self {
            Dimension::Safety => "Safety",
            Dimension::AgeFit => "Age Fit",
            Dimension::Coherence => "Coherence",
            Dimension::Engagement => "Engagement",
            Dimension::LanguageSimplicity => "Language Simplicity",
        }
    }

    /// Scale description shown to the judge.
    pub fn scale(self) -> &'static str {
        match self {
            Dimension::Safety => "1=inappropriate, 5=perfectly safe for ages 5-10",
            Dimension::AgeFit => "1=wrong age level, 5=perfect for ages 5-10",
            Dimension::Coherence => "1=confusing, 5=clear narrative arc",
            Dimension::Engagement => "1=boring, 5=captivating yet calming",
            Dimension::LanguageSimplicity => "1=too complex, 5=appropriately simple",
        }
    }

    /// What the judge should look at when scoring this dimension.
    pub fn criteria(self) -> &'static [&'static str] {
        match self {
            Dimension::Safety => &[
                "Check for: violence, horror, mature content, self-harm, drugs/alcohol, cruelty",
                "Score 4-5 only if completely appropriate for bedtime",
            ],
            Dimension::AgeFit => &[
                "Vocabulary complexity",
                "Sentence structure",
                "Conceptual appropriateness",
            ],
            Dimension::Coherence => &[
                "Beginning, middle, end structure",
                "Logical flow",
                "Story completeness",
            ],
            Dimension::Engagement => &[
                "Maintains interest",
                "Appropriate pacing for bedtime",
                "Emotionally warm",
            ],
            Dimension::LanguageSimplicity => &[
                "Word choice for age 5-10",
                "Sentence length",
                "Readability",
            ],
        }
    }

    /// Whether a low score on this dimension alone fails the threshold.
    pub fn gates_threshold(self) -> bool {
        matches!(self, Dimension::Safety | Dimension::Coherence)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Score and one-sentence feedback for a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: u8,
    pub feedback: String,
}

/// Judge verdict across all five dimensions.
///
/// Scores are validated to lie in `[1, 5]` at construction and the value is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RubricScore {
    entries: [DimensionScore; 5],
}

impl RubricScore {
    /// Build a score from `(score, feedback)` pairs given in [`Dimension::ALL`] order.
    pub fn new(values: [(u8, String); 5]) -> Result<Self, JudgeParseError> {
        let [safety, age_fit, coherence, engagement, language_simplicity] = values;
        Ok(Self {
            entries: [
                checked_entry(Dimension::Safety, safety)?,
                checked_entry(Dimension::AgeFit, age_fit)?,
                checked_entry(Dimension::Coherence, coherence)?,
                checked_entry(Dimension::Engagement, engagement)?,
                checked_entry(Dimension::LanguageSimplicity, language_simplicity)?,
            ],
        })
    }

    /// Stand-in score used when the judge reply could not be parsed twice in a row.
    ///
    /// Every dimension is 3, so the average is 3.0 and the score never passes.
    pub fn default_failing() -> Self {
        Self {
            entries: Dimension::ALL.map(|dimension| DimensionScore {
                dimension,
                score: DEFAULT_FAILING_VALUE,
                feedback: PARSE_FAILURE_FEEDBACK.to_string(),
            }),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        &self.entries[dimension.index()]
    }

    pub fn score(&self, dimension: Dimension) -> u8 {
        self.get(dimension).score
    }

    pub fn feedback(&self, dimension: Dimension) -> &str {
        &self.get(dimension).feedback
    }

    pub fn safety(&self) -> u8 {
        self.score(Dimension::Safety)
    }

    pub fn age_fit(&self) -> u8 {
        self.score(Dimension::AgeFit)
    }

    pub fn coherence(&self) -> u8 {
        self.score(Dimension::Coherence)
    }

    pub fn engagement(&self) -> u8 {
        self.score(Dimension::Engagement)
    }

    pub fn language_simplicity(&self) -> u8 {
        self.score(Dimension::LanguageSimplicity)
    }

    /// Entries in [`Dimension::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionScore> {
        self.entries.iter()
    }

    /// Mean of the five dimension scores.
    pub fn average(&self) -> f64 {
        let sum: u32 = self.entries.iter().map(|entry| u32::from(entry.score)).sum();
        f64::from(sum) / 5.0
    }

    /// Pass condition: every gating dimension (safety, coherence) scores at
    /// least 4 and the average is at least 4.0. Non-gating dimensions only
    /// count through the average.
    pub fn meets_threshold(&self) -> bool {
        let gates_pass = self
            .entries
            .iter()
            .filter(|entry| entry.dimension.gates_threshold())
            .all(|entry| entry.score >= PASSING_DIMENSION_SCORE);
        gates_pass && self.average() >= PASSING_AVERAGE
    }
}

fn checked_entry(
    dimension: Dimension,
    (score, feedback): (u8, String),
) -> Result<DimensionScore, JudgeParseError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(JudgeParseError::ScoreOutOfRange {
            dimension,
            value: u64::from(score),
        });
    }
    Ok(DimensionScore {
        dimension,
        score,
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(values: [u8; 5]) -> RubricScore {
        RubricScore::new(values.map(|value| (value, "ok".to_string()))).expect("valid score")
    }

    #[test]
    fn average_is_exact_mean() {
        let cases: [([u8; 5], f64); 5] = [
            ([5, 5, 5, 5, 5], 5.0),
            ([1, 1, 1, 1, 1], 1.0),
            ([5, 4, 5, 4, 3], 4.2),
            ([1, 2, 3, 4, 5], 3.0),
            ([4, 4, 4, 4, 5], 4.2),
        ];
        for (values, expected) in cases {
            let sum: u32 = values.iter().map(|v| u32::from(*v)).sum();
            let got = score(values).average();
            assert_eq!(got, f64::from(sum) / 5.0, "values {values:?}");
            assert!((got - expected).abs() < 1e-9, "values {values:?}");
        }
    }

    #[test]
    fn threshold_passes_when_all_conditions_hold() {
        assert!(score([4, 4, 4, 4, 4]).meets_threshold());
        assert!(score([5, 4, 5, 4, 3]).meets_threshold());
    }

    #[test]
    fn threshold_fails_on_low_safety_alone() {
        // Average 4.2 and coherence 5, only safety fails.
        let s = score([3, 5, 5, 5, 3]);
        assert!(s.average() >= PASSING_AVERAGE);
        assert!(!s.meets_threshold());
    }

    #[test]
    fn threshold_fails_on_low_coherence_alone() {
        let s = score([5, 5, 3, 5, 3]);
        assert!(s.average() >= PASSING_AVERAGE);
        assert!(!s.meets_threshold());
    }

    #[test]
    fn threshold_fails_on_low_average_alone() {
        let s = score([4, 3, 4, 4, 4]);
        assert!(s.safety() >= 4 && s.coherence() >= 4);
        assert!((s.average() - 3.8).abs() < 1e-9);
        assert!(!s.meets_threshold());
    }

    #[test]
    fn threshold_accepts_low_non_gating_dimensions() {
        // age_fit and language_simplicity are only checked through the average.
        let s = score([5, 1, 5, 5, 5]);
        assert!(s.meets_threshold());
    }

    #[test]
    fn threshold_matches_conjunction_for_every_combination() {
        for safety in MIN_SCORE..=MAX_SCORE {
            for coherence in MIN_SCORE..=MAX_SCORE {
                for rest in MIN_SCORE..=MAX_SCORE {
                    let s = score([safety, rest, coherence, rest, rest]);
                    let expected = safety >= 4 && coherence >= 4 && s.average() >= 4.0;
                    assert_eq!(s.meets_threshold(), expected);
                }
            }
        }
    }

    #[test]
    fn new_rejects_out_of_range_scores() {
        let err = RubricScore::new([
            (5, "a".to_string()),
            (0, "b".to_string()),
            (5, "c".to_string()),
            (5, "d".to_string()),
            (5, "e".to_string()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            JudgeParseError::ScoreOutOfRange {
                dimension: Dimension::AgeFit,
                value: 0
            }
        );

        let err = RubricScore::new([
            (6, "a".to_string()),
            (5, "b".to_string()),
            (5, "c".to_string()),
            (5, "d".to_string()),
            (5, "e".to_string()),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            JudgeParseError::ScoreOutOfRange {
                dimension: Dimension::Safety,
                value: 6
            }
        ));
    }

    #[test]
    fn default_failing_score_never_passes() {
        let s = RubricScore::default_failing();
        for entry in s.iter() {
            assert_eq!(entry.score, 3);
            assert_eq!(entry.feedback, PARSE_FAILURE_FEEDBACK);
        }
        assert_eq!(s.average(), 3.0);
        assert!(!s.meets_threshold());
    }

    #[test]
    fn entries_follow_dimension_order() {
        let s = score([1, 2, 3, 4, 5]);
        let dims: Vec<Dimension> = s.iter().map(|entry| entry.dimension).collect();
        assert_eq!(dims, Dimension::ALL.to_vec());
        assert_eq!(s.language_simplicity(), 5);
        assert_eq!(s.engagement(), 4);
    }

    #[test]
    fn only_safety_and_coherence_gate() {
        let gating: Vec<Dimension> = Dimension::ALL
            .into_iter()
            .filter(|dimension| dimension.gates_threshold())
            .collect();
        assert_eq!(gating, vec![Dimension::Safety, Dimension::Coherence]);
    }
}
