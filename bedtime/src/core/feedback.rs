//! Retry feedback derived from a judge score.

use crate::core::rubric::{PASSING_DIMENSION_SCORE, RubricScore};

/// Format actionable feedback for the next storyteller attempt.
///
/// One `<LABEL> (score <n>): <feedback>` line per dimension scoring below 4,
/// in rubric order. Returns an empty string when every dimension scored 4+.
pub fn format_judge_feedback(score: &RubricScore) -> String {
    score
        .iter()
        .filter(|entry| entry.score < PASSING_DIMENSION_SCORE)
        .map(|entry| {
            format!(
                "{} (score {}): {}",
                entry.dimension.label(),
                entry.score,
                entry.feedback
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
