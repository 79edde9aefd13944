//! Judge agent: scores drafts against the rubric.
//!
//! A reply that cannot be parsed is an expected outcome, reported as the
//! `Err` arm of [`Evaluation`]. Only transport failures surface as errors.

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::rubric::RubricScore;
use crate::core::rubric_parse::{JudgeParseError, parse_rubric_score};
use crate::core::types::{StoryBrief, StoryDraft};
use crate::io::config::CallSettings;
use crate::io::model::ModelClient;
use crate::io::prompt::PromptEngine;

/// Outcome of one judge call: a score, or the reason the reply was unusable.
pub type Evaluation = std::result::Result<RubricScore, JudgeParseError>;

/// Score produced by the retry-then-default policy.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgedScore {
    pub score: RubricScore,
    /// True when both judge replies were unusable and the default failing
    /// score was substituted.
    pub parse_failed: bool,
}

/// Judge wrapper that owns the rubric prompt and call settings.
pub struct JudgeAgent {
    prompts: PromptEngine,
    settings: CallSettings,
}

impl JudgeAgent {
    pub fn new(settings: CallSettings) -> Self {
        Self {
            prompts: PromptEngine::new(),
            settings,
        }
    }

    /// Ask the model to score `draft` once.
    pub fn evaluate<M: ModelClient>(
        &self,
        model: &M,
        draft: &StoryDraft,
        brief: &StoryBrief,
    ) -> Result<Evaluation> {
        let prompt = self.prompts.render_judge(brief, draft)?;
        let reply = model
            .call(&prompt, self.settings.max_tokens, self.settings.temperature)
            .context("request judge evaluation")?;
        Ok(parse_rubric_score(&reply))
    }

    /// Score `draft`, retrying the judge call once on an unusable reply and
    /// falling back to [`RubricScore::default_failing`] after a second one.
    ///
    /// The draft is never regenerated here.
    #[instrument(skip_all, fields(title = %draft.title()))]
    pub fn evaluate_with_retry<M: ModelClient>(
        &self,
        model: &M,
        draft: &StoryDraft,
        brief: &StoryBrief,
    ) -> Result<JudgedScore> {
        let first = match self.evaluate(model, draft, brief)? {
            Ok(score) => return Ok(scored(score)),
            Err(err) => err,
        };
        warn!(error = %first, "judge reply unparseable, retrying evaluation");

        match self.evaluate(model, draft, brief)? {
            Ok(score) => Ok(scored(score)),
            Err(err) => {
                warn!(error = %err, "judge reply unparseable twice, using default failing score");
                Ok(JudgedScore {
                    score: RubricScore::default_failing(),
                    parse_failed: true,
                })
            }
        }
    }
}

fn scored(score: RubricScore) -> JudgedScore {
    debug!(average = score.average(), passed = score.meets_threshold(), "draft judged");
    JudgedScore {
        score,
        parse_failed: false,
    }
}
