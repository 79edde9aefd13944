//! Bounded generate→judge retry loop and the one-shot user revision.

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::agents::judge::JudgeAgent;
use crate::agents::storyteller::StorytellerAgent;
use crate::core::ledger::{AttemptLedger, append_revision, effective_max_attempts};
use crate::core::types::{GenerationResult, StoryBrief};
use crate::io::config::CallsConfig;
use crate::io::model::ModelClient;

/// Why a revision was refused or could not complete.
#[derive(Debug, Error)]
pub enum RevisionError {
    /// The result already carries a revision; one per session.
    #[error("only one revision per session is allowed")]
    AlreadyUsed,
    /// The model call failed.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Loop position. Attempts are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Attempting(u32),
    Passed,
    Exhausted,
}

/// Drives the storyteller and the judge for one session.
///
/// All accounting lives in values local to each call; the orchestrator
/// itself holds only configuration.
pub struct Orchestrator<'a, M: ModelClient> {
    model: &'a M,
    storyteller: StorytellerAgent,
    judge: JudgeAgent,
}

impl<'a, M: ModelClient> Orchestrator<'a, M> {
    pub fn new(model: &'a M, calls: &CallsConfig) -> Self {
        Self {
            model,
            storyteller: StorytellerAgent::new(calls),
            judge: JudgeAgent::new(calls.judge),
        }
    }

    /// Normalize a free-form request into a [`StoryBrief`].
    pub fn normalize(&self, user_request: &str) -> Result<StoryBrief> {
        self.storyteller.normalize(self.model, user_request)
    }

    /// Run up to `max_attempts` (clamped to 1..=3) generate→judge cycles.
    ///
    /// Stops at the first draft that meets the threshold. Otherwise returns
    /// the best draft seen, with a disclaimer. Judge parse failures never
    /// abort the loop; model transport errors do.
    #[instrument(skip_all, fields(requested_attempts = max_attempts))]
    pub fn generate(&self, brief: &StoryBrief, max_attempts: u32) -> Result<GenerationResult> {
        let max_attempts = effective_max_attempts(max_attempts);
        let mut ledger = AttemptLedger::new();
        let mut state = LoopState::Attempting(0);

        loop {
            state = match state {
                LoopState::Attempting(attempt) => {
                    if self.run_attempt(brief, attempt, &mut ledger)? {
                        LoopState::Passed
                    } else if attempt + 1 < max_attempts {
                        LoopState::Attempting(attempt + 1)
                    } else {
                        LoopState::Exhausted
                    }
                }
                LoopState::Passed => {
                    info!(attempts = ledger.len(), "story met quality threshold");
                    return ledger.into_passed().context("no attempt was recorded");
                }
                LoopState::Exhausted => {
                    warn!(
                        attempts = max_attempts,
                        parse_failures = ledger.judge_parse_failures(),
                        "attempts exhausted, returning best draft"
                    );
                    return ledger
                        .into_exhausted(max_attempts)
                        .context("no attempt was recorded");
                }
            };
        }
    }

    /// Generate, judge and record one attempt. Returns whether it passed.
    fn run_attempt(
        &self,
        brief: &StoryBrief,
        attempt: u32,
        ledger: &mut AttemptLedger,
    ) -> Result<bool> {
        let feedback = if attempt > 0 {
            ledger.retry_feedback()
        } else {
            None
        };
        info!(
            attempt = attempt + 1,
            with_feedback = feedback.as_deref().is_some_and(|f| !f.is_empty()),
            "generating draft"
        );

        let draft = self
            .storyteller
            .generate(self.model, brief, feedback.as_deref())
            .with_context(|| format!("attempt {}", attempt + 1))?;
        let judged = self
            .judge
            .evaluate_with_retry(self.model, &draft, brief)
            .with_context(|| format!("judge attempt {}", attempt + 1))?;

        let recorded = ledger.record(draft, judged.score, judged.parse_failed);
        let passed = recorded.score.meets_threshold();
        info!(
            attempt = attempt + 1,
            average = recorded.score.average(),
            word_count = recorded.draft.word_count(),
            passed,
            "draft judged"
        );
        Ok(passed)
    }

    /// Apply the user's single revision to a finished result.
    ///
    /// Refuses with [`RevisionError::AlreadyUsed`] if `result` already holds a
    /// revision. `result` itself is never modified; the returned result
    /// extends its attempt log by exactly one entry.
    #[instrument(skip_all)]
    pub fn revise(
        &self,
        result: &GenerationResult,
        revision_request: &str,
        brief: &StoryBrief,
    ) -> Result<GenerationResult, RevisionError> {
        if result.revision_used() {
            warn!("revision requested after one was already used");
            return Err(RevisionError::AlreadyUsed);
        }

        let revised = self
            .storyteller
            .revise(self.model, brief, result.final_draft(), revision_request)?;
        let judged = self
            .judge
            .evaluate_with_retry(self.model, &revised, brief)
            .context("judge revision")?;

        let next = append_revision(result, revised, judged.score, judged.parse_failed);
        info!(
            average = next.final_score().average(),
            passed = next.passed_threshold(),
            "revision judged"
        );
        Ok(next)
    }
}
