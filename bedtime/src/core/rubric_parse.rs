//! Line-oriented grammar for judge replies.
//!
//! Each dimension needs a `<LABEL>: <integer>` line and a
//! `<LABEL>_FEEDBACK: <text>` line. Lines may appear in any order and need
//! not be adjacent; labels are anchored at line start and must be followed
//! directly by a colon, so `AGE_FIT:` never matches `AGE_FIT_FEEDBACK:`.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::rubric::{Dimension, MAX_SCORE, MIN_SCORE, RubricScore};

/// Why a judge reply could not be mapped onto the rubric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JudgeParseError {
    #[error("missing score for dimension {}", .0.label())]
    MissingScore(Dimension),
    #[error("missing feedback for dimension {}", .0.label())]
    MissingFeedback(Dimension),
    #[error("score for {} is not a usable integer: {raw}", .dimension.label())]
    InvalidScore { dimension: Dimension, raw: String },
    #[error("score for {} out of range (got {value}, expected 1-5)", .dimension.label())]
    ScoreOutOfRange { dimension: Dimension, value: u64 },
}

struct DimensionPatterns {
    dimension: Dimension,
    score: Regex,
    feedback: Regex,
}

static PATTERNS: LazyLock<[DimensionPatterns; 5]> = LazyLock::new(|| {
    Dimension::ALL.map(|dimension| {
        let label = regex::escape(dimension.label());
        DimensionPatterns {
            dimension,
            score: Regex::new(&format!(r"(?m)^{label}:[ \t]*(\d+)")).unwrap(),
            feedback: Regex::new(&format!(r"(?m)^{label}_FEEDBACK:[ \t]*(.+)")).unwrap(),
        }
    })
});

/// Parse a judge reply into a validated [`RubricScore`].
///
/// The first matching line wins when a label is repeated. Errors are
/// reported for the earliest failing dimension in rubric order.
pub fn parse_rubric_score(response: &str) -> Result<RubricScore, JudgeParseError> {
    let [safety, age_fit, coherence, engagement, language_simplicity] = PATTERNS
        .each_ref()
        .map(|patterns| parse_dimension(response, patterns));
    RubricScore::new([
        safety?,
        age_fit?,
        coherence?,
        engagement?,
        language_simplicity?,
    ])
}

fn parse_dimension(
    response: &str,
    patterns: &DimensionPatterns,
) -> Result<(u8, String), JudgeParseError> {
    let dimension = patterns.dimension;
    let raw = patterns
        .score
        .captures(response)
        .and_then(|caps| caps.get(1))
        .ok_or(JudgeParseError::MissingScore(dimension))?
        .as_str();
    let value: u64 = raw.parse().map_err(|_| JudgeParseError::InvalidScore {
        dimension,
        raw: raw.to_string(),
    })?;
    let score = u8::try_from(value)
        .ok()
        .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
        .ok_or(JudgeParseError::ScoreOutOfRange { dimension, value })?;

    let feedback = patterns
        .feedback
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .ok_or(JudgeParseError::MissingFeedback(dimension))?;

    Ok((score, feedback.to_string()))
}
