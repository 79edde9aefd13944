//! Per-session attempt accounting for the retry loop.
//!
//! The ledger is a plain value owned by one orchestrator call. It is moved
//! into the final [`GenerationResult`] once the loop stops, so nothing
//! survives between sessions.

use crate::core::feedback::format_judge_feedback;
use crate::core::rubric::RubricScore;
use crate::core::types::{Attempt, GenerationResult, StoryDraft};

/// Hard ceiling on generation attempts, whatever the caller asks for.
pub const MAX_ATTEMPTS_CEILING: u32 = 3;

/// Disclaimer attached to a revision that failed the threshold.
pub const REVISION_DISCLAIMER: &str = "Note: The revised story did not meet all quality thresholds.";

/// Clamp a requested attempt budget to `1..=MAX_ATTEMPTS_CEILING`.
///
/// A request of 0 still runs one attempt so a result always exists.
pub fn effective_max_attempts(requested: u32) -> u32 {
    requested.clamp(1, MAX_ATTEMPTS_CEILING)
}

/// Disclaimer for a generation loop that ran out of attempts.
pub fn exhausted_disclaimer(attempts: u32) -> String {
    format!(
        "Note: This story did not fully meet all quality thresholds after {attempts} attempts. \
         This is the best version generated."
    )
}

/// Append-only attempt log with best-so-far tracking.
#[derive(Debug, Default)]
pub struct AttemptLedger {
    attempts: Vec<Attempt>,
    best_index: Option<usize>,
    judge_parse_failures: u32,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `score` to `draft` and append the pair.
    ///
    /// The best draft only changes on a strictly greater average, so the
    /// earliest draft wins ties. Returns the logged attempt.
    pub fn record(&mut self, draft: StoryDraft, score: RubricScore, parse_failed: bool) -> &Attempt {
        if parse_failed {
            self.judge_parse_failures += 1;
        }
        let average = score.average();
        let improves = match self.best_index {
            Some(best) => average > self.attempts[best].score.average(),
            None => true,
        };
        let index = self.attempts.len();
        if improves {
            self.best_index = Some(index);
        }
        self.attempts.push(Attempt {
            draft: draft.scored(score.clone()),
            score,
        });
        &self.attempts[index]
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn judge_parse_failures(&self) -> u32 {
        self.judge_parse_failures
    }

    pub fn best(&self) -> Option<&Attempt> {
        self.best_index.map(|index| &self.attempts[index])
    }

    /// Feedback for the next attempt, derived from the most recent score.
    pub fn retry_feedback(&self) -> Option<String> {
        self.attempts
            .last()
            .map(|attempt| format_judge_feedback(&attempt.score))
    }

    /// Close the loop on the latest attempt, which met the threshold.
    pub fn into_passed(self) -> Option<GenerationResult> {
        let final_index = self.attempts.len().checked_sub(1)?;
        Some(GenerationResult {
            final_index,
            retry_count: final_index as u32,
            attempts: self.attempts,
            passed_threshold: true,
            disclaimer: None,
            judge_parse_failures: self.judge_parse_failures,
            revision_used: false,
        })
    }

    /// Close the loop after the last allowed attempt failed; the best draft
    /// across all attempts becomes final.
    pub fn into_exhausted(self, max_attempts: u32) -> Option<GenerationResult> {
        let final_index = self.best_index?;
        Some(GenerationResult {
            final_index,
            retry_count: max_attempts.saturating_sub(1),
            attempts: self.attempts,
            passed_threshold: false,
            disclaimer: Some(exhausted_disclaimer(max_attempts)),
            judge_parse_failures: self.judge_parse_failures,
            revision_used: false,
        })
    }
}

/// Extend a finished result with a judged revision.
///
/// The previous result is left untouched; the revised draft becomes final.
pub fn append_revision(
    previous: &GenerationResult,
    draft: StoryDraft,
    score: RubricScore,
    parse_failed: bool,
) -> GenerationResult {
    let passed = score.meets_threshold();
    let mut attempts = previous.attempts.clone();
    attempts.push(Attempt {
        draft: draft.scored(score.clone()),
        score,
    });
    GenerationResult {
        final_index: attempts.len() - 1,
        attempts,
        retry_count: previous.retry_count + 1,
        passed_threshold: passed,
        disclaimer: (!passed).then(|| REVISION_DISCLAIMER.to_string()),
        judge_parse_failures: previous.judge_parse_failures + u32::from(parse_failed),
        revision_used: true,
    }
}
