//! Prompt rendering for the storyteller and the judge.
//!
//! Templates live in `io/prompts/` and are compiled into the binary. The
//! judge template receives the rubric table from [`Dimension::ALL`] so the
//! requested reply format always matches what the parser expects.

use anyhow::Result;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::rubric::Dimension;
use crate::core::types::{StoryBrief, StoryDraft};

const SAFETY_TEMPLATE: &str = include_str!("prompts/safety.md");
const NORMALIZE_TEMPLATE: &str = include_str!("prompts/normalize.md");
const STORY_TEMPLATE: &str = include_str!("prompts/story.md");
const REVISION_TEMPLATE: &str = include_str!("prompts/revision.md");
const JUDGE_TEMPLATE: &str = include_str!("prompts/judge.md");

/// Rubric row for template rendering.
#[derive(Debug, Clone, Serialize)]
struct DimensionContext {
    label: &'static str,
    scale: &'static str,
    criteria: &'static [&'static str],
}

impl DimensionContext {
    fn from_dimension(dimension: Dimension) -> Self {
        Self {
            label: dimension.label(),
            scale: dimension.scale(),
            criteria: dimension.criteria(),
        }
    }
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("safety", SAFETY_TEMPLATE)
            .expect("safety template should be valid");
        env.add_template("normalize", NORMALIZE_TEMPLATE)
            .expect("normalize template should be valid");
        env.add_template("story", STORY_TEMPLATE)
            .expect("story template should be valid");
        env.add_template("revision", REVISION_TEMPLATE)
            .expect("revision template should be valid");
        env.add_template("judge", JUDGE_TEMPLATE)
            .expect("judge template should be valid");
        Self { env }
    }

    /// Bedtime-goal classification prompt.
    pub fn render_normalize(&self, request: &str) -> Result<String> {
        let template = self.env.get_template("normalize")?;
        Ok(template.render(context! { request => request.trim() })?)
    }

    /// Story prompt; `feedback` adds a block asking the model to fix prior issues.
    pub fn render_story(&self, brief: &StoryBrief, feedback: Option<&str>) -> Result<String> {
        let template = self.env.get_template("story")?;
        let rendered = template.render(context! {
            brief => brief,
            feedback => feedback.map(str::trim).filter(|s| !s.is_empty()),
        })?;
        Ok(rendered)
    }

    /// Revision prompt carrying the current draft and the user's change request.
    pub fn render_revision(
        &self,
        brief: &StoryBrief,
        draft: &StoryDraft,
        request: &str,
    ) -> Result<String> {
        let template = self.env.get_template("revision")?;
        let rendered = template.render(context! {
            brief => brief,
            draft => draft,
            request => request.trim(),
        })?;
        Ok(rendered)
    }

    /// Rubric prompt for the judge.
    pub fn render_judge(&self, brief: &StoryBrief, draft: &StoryDraft) -> Result<String> {
        let dimensions: Vec<DimensionContext> = Dimension::ALL
            .into_iter()
            .map(DimensionContext::from_dimension)
            .collect();
        let template = self.env.get_template("judge")?;
        let rendered = template.render(context! {
            brief => brief,
            draft => draft,
            dimensions => dimensions,
        })?;
        Ok(rendered)
    }
}
