//! Storyteller agent: request normalization, drafts and revisions.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::story_parse::parse_story_reply;
use crate::core::types::{StoryBrief, StoryDraft};
use crate::io::config::{CallSettings, CallsConfig};
use crate::io::model::ModelClient;
use crate::io::prompt::PromptEngine;

/// Storyteller wrapper that owns prompt templates and call settings.
pub struct StorytellerAgent {
    prompts: PromptEngine,
    normalize: CallSettings,
    story: CallSettings,
}

impl StorytellerAgent {
    pub fn new(calls: &CallsConfig) -> Self {
        Self {
            prompts: PromptEngine::new(),
            normalize: calls.normalize,
            story: calls.story,
        }
    }

    /// Turn a free-form request into a brief with a model-chosen bedtime goal.
    ///
    /// The reply is trimmed and accepted as-is.
    #[instrument(skip_all)]
    pub fn normalize<M: ModelClient>(&self, model: &M, user_request: &str) -> Result<StoryBrief> {
        let prompt = self.prompts.render_normalize(user_request)?;
        let goal = model
            .call(&prompt, self.normalize.max_tokens, self.normalize.temperature)
            .context("request bedtime goal")?;
        let brief = StoryBrief::new(user_request, goal.trim());
        debug!(bedtime_goal = brief.bedtime_goal(), "brief normalized");
        Ok(brief)
    }

    /// Write a new draft, optionally addressing judge feedback from the previous attempt.
    #[instrument(skip_all, fields(has_feedback = feedback.is_some_and(|f| !f.trim().is_empty())))]
    pub fn generate<M: ModelClient>(
        &self,
        model: &M,
        brief: &StoryBrief,
        feedback: Option<&str>,
    ) -> Result<StoryDraft> {
        let prompt = self.prompts.render_story(brief, feedback)?;
        let reply = model
            .call(&prompt, self.story.max_tokens, self.story.temperature)
            .context("request story draft")?;
        let draft = parse_story_reply(&reply);
        debug!(title = %draft.title(), word_count = draft.word_count(), "draft parsed");
        Ok(draft)
    }

    /// Rewrite `draft` according to the user's request, keeping the safety rules.
    #[instrument(skip_all)]
    pub fn revise<M: ModelClient>(
        &self,
        model: &M,
        brief: &StoryBrief,
        draft: &StoryDraft,
        request: &str,
    ) -> Result<StoryDraft> {
        let prompt = self.prompts.render_revision(brief, draft, request)?;
        let reply = model
            .call(&prompt, self.story.max_tokens, self.story.temperature)
            .context("request story revision")?;
        let revised = parse_story_reply(&reply);
        debug!(title = %revised.title(), word_count = revised.word_count(), "revision parsed");
        Ok(revised)
    }
}
