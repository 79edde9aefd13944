//! Test-only helpers: a scripted model client and reply builders.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::rubric::{Dimension, RubricScore};
use crate::core::types::StoryBrief;
use crate::io::model::ModelClient;

/// Judge reply that matches none of the rubric lines.
pub const UNPARSEABLE_JUDGE_REPLY: &str = "What a lovely story! I would give it top marks.";

/// One scripted model reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    /// Simulated upstream/transport failure.
    Fail(String),
}

/// A model call as observed by [`ScriptedModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Model client that returns queued replies in order and records every call.
///
/// Running out of replies is an error so tests notice unexpected extra calls.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: RefCell<VecDeque<ScriptedReply>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_replies(replies.into_iter().map(|r| ScriptedReply::Text(r.into())))
    }

    pub fn with_replies<I: IntoIterator<Item = ScriptedReply>>(replies: I) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl ModelClient for ScriptedModel {
    fn call(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        self.calls.borrow_mut().push(RecordedCall {
            prompt: prompt.to_string(),
            max_tokens,
            temperature,
        });
        match self.replies.borrow_mut().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted model has no reply left")),
        }
    }
}

/// Well-formed judge reply with the given scores in rubric order.
pub fn judge_reply(scores: [u8; 5]) -> String {
    Dimension::ALL
        .iter()
        .zip(scores)
        .map(|(dimension, score)| {
            format!(
                "{label}: {score}\n{label}_FEEDBACK: {name} feedback for a {score}.\n",
                label = dimension.label(),
                name = dimension.display_name(),
            )
        })
        .collect()
}

/// Storyteller reply in the `Title:` + body format.
pub fn story_reply(title: &str, body: &str) -> String {
    format!("Title: {title}\n\n{body}\n")
}

/// Deterministic brief for tests.
pub fn brief() -> StoryBrief {
    StoryBrief::new("A story about a sleepy bunny", "calming")
}

/// Valid score with placeholder feedback.
pub fn score(values: [u8; 5]) -> RubricScore {
    RubricScore::new(values.map(|value| (value, format!("scored {value}"))))
        .expect("test scores must be within 1-5")
}
