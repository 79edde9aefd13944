//! Story data shared between the storyteller, the judge and the orchestrator.
//!
//! These types carry no I/O. Audience constraints on [`StoryBrief`] are fixed
//! constants so every prompt stays inside the same safety envelope.

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::core::rubric::RubricScore;

/// Reader age range every story is written for.
pub const AGE_BAND: (u32, u32) = (5, 10);
/// Advisory story length in words. Reported, never enforced.
pub const TARGET_LENGTH: (u32, u32) = (450, 700);

/// Normalized story request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryBrief {
    user_request: String,
    bedtime_goal: String,
    age_band: (u32, u32),
    target_length: (u32, u32),
}

impl StoryBrief {
    pub fn new(user_request: impl Into<String>, bedtime_goal: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            bedtime_goal: bedtime_goal.into(),
            age_band: AGE_BAND,
            target_length: TARGET_LENGTH,
        }
    }

    pub fn user_request(&self) -> &str {
        &self.user_request
    }

    pub fn bedtime_goal(&self) -> &str {
        &self.bedtime_goal
    }

    pub fn age_band(&self) -> (u32, u32) {
        self.age_band
    }

    pub fn target_length(&self) -> (u32, u32) {
        self.target_length
    }
}

/// One generated story attempt.
///
/// Fields are read-only outside the crate; the score is attached once, when
/// the draft enters the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryDraft {
    title: String,
    story_text: String,
    word_count: usize,
    rubric_score: Option<RubricScore>,
}

impl StoryDraft {
    /// Create an unscored draft; `word_count` is derived from `story_text`.
    pub fn new(title: impl Into<String>, story_text: impl Into<String>) -> Self {
        let story_text = story_text.into();
        Self {
            title: title.into(),
            word_count: story_text.split_whitespace().count(),
            story_text,
            rubric_score: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn story_text(&self) -> &str {
        &self.story_text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Judge score, present once the draft has been logged as an attempt.
    pub fn rubric_score(&self) -> Option<&RubricScore> {
        self.rubric_score.as_ref()
    }

    /// Whether the word count falls inside [`TARGET_LENGTH`]. Informational only.
    pub fn within_target_length(&self) -> bool {
        let (min, max) = TARGET_LENGTH;
        (min as usize..=max as usize).contains(&self.word_count)
    }

    pub(crate) fn scored(mut self, score: RubricScore) -> Self {
        self.rubric_score = Some(score);
        self
    }
}

/// A judged draft as recorded in the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub draft: StoryDraft,
    pub score: RubricScore,
}

/// Outcome of a generation session.
///
/// Built only by the orchestrator, which guarantees at least one attempt and
/// that the final draft is one of the logged, scored attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub(crate) final_index: usize,
    pub(crate) attempts: Vec<Attempt>,
    pub(crate) retry_count: u32,
    pub(crate) passed_threshold: bool,
    pub(crate) disclaimer: Option<String>,
    pub(crate) judge_parse_failures: u32,
    pub(crate) revision_used: bool,
}

impl GenerationResult {
    pub fn final_attempt(&self) -> &Attempt {
        &self.attempts[self.final_index]
    }

    pub fn final_draft(&self) -> &StoryDraft {
        &self.final_attempt().draft
    }

    pub fn final_score(&self) -> &RubricScore {
        &self.final_attempt().score
    }

    /// Every judged attempt in order, including a revision if one was made.
    pub fn all_attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn passed_threshold(&self) -> bool {
        self.passed_threshold
    }

    pub fn disclaimer(&self) -> Option<&str> {
        self.disclaimer.as_deref()
    }

    pub fn judge_parse_failures(&self) -> u32 {
        self.judge_parse_failures
    }

    pub fn revision_used(&self) -> bool {
        self.revision_used
    }
}

impl Serialize for GenerationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GenerationResult", 7)?;
        state.serialize_field("final_draft", self.final_draft())?;
        state.serialize_field("all_attempts", &self.attempts)?;
        state.serialize_field("retry_count", &self.retry_count)?;
        state.serialize_field("passed_threshold", &self.passed_threshold)?;
        state.serialize_field("disclaimer", &self.disclaimer)?;
        state.serialize_field("judge_parse_failures", &self.judge_parse_failures)?;
        state.serialize_field("revision_used", &self.revision_used)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_uses_fixed_audience_constraints() {
        let brief = StoryBrief::new("a sleepy bunny", "calming");
        assert_eq!(brief.age_band(), (5, 10));
        assert_eq!(brief.target_length(), (450, 700));
        assert_eq!(brief.user_request(), "a sleepy bunny");
        assert_eq!(brief.bedtime_goal(), "calming");
    }

    #[test]
    fn draft_counts_whitespace_separated_words() {
        let draft = StoryDraft::new("T", "Once  upon\na time,\tthere was.");
        assert_eq!(draft.word_count, 6);
        assert!(draft.rubric_score.is_none());
        assert!(!draft.within_target_length());
    }

    #[test]
    fn scored_draft_exposes_score_through_accessor() {
        let score = RubricScore::default_failing();
        let draft = StoryDraft::new("Moon", "Goodnight moon.");
        assert_eq!(draft.rubric_score(), None);

        let draft = draft.scored(score.clone());
        assert_eq!(draft.title(), "Moon");
        assert_eq!(draft.story_text(), "Goodnight moon.");
        assert_eq!(draft.word_count(), 2);
        assert_eq!(draft.rubric_score(), Some(&score));
    }

    #[test]
    fn target_length_bounds_are_inclusive() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert!(!StoryDraft::new("T", words(449)).within_target_length());
        assert!(StoryDraft::new("T", words(450)).within_target_length());
        assert!(StoryDraft::new("T", words(700)).within_target_length());
        assert!(!StoryDraft::new("T", words(701)).within_target_length());
    }

    #[test]
    fn result_serializes_final_draft() {
        let score = RubricScore::default_failing();
        let draft = StoryDraft::new("Moon", "Goodnight moon.").scored(score.clone());
        let result = GenerationResult {
            final_index: 0,
            attempts: vec![Attempt { draft, score }],
            retry_count: 0,
            passed_threshold: false,
            disclaimer: Some("note".to_string()),
            judge_parse_failures: 1,
            revision_used: false,
        };

        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["final_draft"]["title"], "Moon");
        assert_eq!(json["all_attempts"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["all_attempts"][0]["score"][0]["dimension"], "safety");
        assert_eq!(json["judge_parse_failures"], 1);
        assert_eq!(json["disclaimer"], "note");
    }
}
