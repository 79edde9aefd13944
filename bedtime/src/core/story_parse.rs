//! Story reply grammar: `Title: <text>` on the first line, body after it.

use crate::core::types::StoryDraft;

const TITLE_MARKER: &str = "Title:";

/// Parse a storyteller reply into an unscored draft.
///
/// The title is the text after the first `Title:` marker on the first
/// non-blank line (the whole line when the marker is absent). Every later line
/// is the body, trimmed as a block.
pub fn parse_story_reply(response: &str) -> StoryDraft {
    let trimmed = response.trim();
    let (first_line, body) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    let title = match first_line.split_once(TITLE_MARKER) {
        Some((_, rest)) => rest,
        None => first_line,
    };
    StoryDraft::new(title.trim(), body.trim())
}
