//! Interactive console session: request → story → optional revision.
//!
//! Generic over reader and writer so tests can drive the whole flow with
//! in-memory buffers. Diagnostics go through `tracing` (stderr); only the
//! conversation is written to `out`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};

use crate::core::rubric::Dimension;
use crate::core::types::{GenerationResult, StoryBrief};
use crate::io::model::ModelClient;
use crate::orchestrator::Orchestrator;

const RULE_WIDTH: usize = 60;

/// Run one full session and return the last result shown to the user.
pub fn run_session<M, R, W>(
    orchestrator: &Orchestrator<'_, M>,
    max_attempts: u32,
    input: &mut R,
    out: &mut W,
) -> Result<GenerationResult>
where
    M: ModelClient,
    R: BufRead,
    W: Write,
{
    writeln!(out, "=== Bedtime Story Generator with Quality Judge ===\n")?;

    let request = ask(input, out, "What kind of story would you like to hear? ")?
        .context("no story request provided")?;

    writeln!(out, "\nPreparing your story request...")?;
    let brief = orchestrator.normalize(&request)?;
    print_brief(out, &brief)?;

    writeln!(
        out,
        "Generating and evaluating story (this may take a moment)...\n"
    )?;
    let result = orchestrator.generate(&brief, max_attempts)?;
    print_result(out, &result, "TITLE", true)?;

    writeln!(out, "\n{}", rule())?;
    let answer = ask(input, out, "\nWould you like to request a revision? (yes/no): ")?;
    let wants_revision = answer
        .map(|a| matches!(a.trim().to_lowercase().as_str(), "yes" | "y"))
        .unwrap_or(false);

    let result = if wants_revision {
        let Some(change) = ask(input, out, "What would you like to change? ")? else {
            bail!("no revision request provided");
        };
        writeln!(out, "\nGenerating revised story...\n")?;
        let revised = orchestrator.revise(&result, &change, &brief)?;
        print_result(out, &revised, "REVISED TITLE", false)?;
        revised
    } else {
        result
    };

    writeln!(
        out,
        "\nThank you for using Bedtime Story Generator! Sweet dreams!"
    )?;
    Ok(result)
}

/// Print `question`, then read one line. `None` at end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line).context("read answer")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn print_brief<W: Write>(out: &mut W, brief: &StoryBrief) -> Result<()> {
    let (min_age, max_age) = brief.age_band();
    let (min_words, max_words) = brief.target_length();
    writeln!(out, "Bedtime goal: {}", brief.bedtime_goal())?;
    writeln!(out, "Target audience: Ages {min_age}-{max_age}")?;
    writeln!(out, "Target length: {min_words}-{max_words} words\n")?;
    Ok(())
}

fn print_result<W: Write>(
    out: &mut W,
    result: &GenerationResult,
    heading: &str,
    with_feedback: bool,
) -> Result<()> {
    let draft = result.final_draft();
    writeln!(out, "{}", rule())?;
    writeln!(out, "{heading}: {}", draft.title())?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "{}", draft.story_text())?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "\nWord count: {}", draft.word_count())?;
    let in_range = if draft.within_target_length() { "Yes" } else { "No" };
    writeln!(out, "Within target length: {in_range}")?;
    if !result.revision_used() {
        writeln!(out, "Attempts: {}", result.retry_count() + 1)?;
    }
    let passed = if result.passed_threshold() { "Yes" } else { "No" };
    writeln!(out, "Quality threshold met: {passed}")?;
    if result.judge_parse_failures() > 0 {
        writeln!(out, "Judge parse failures: {}", result.judge_parse_failures())?;
    }
    if let Some(disclaimer) = result.disclaimer() {
        writeln!(out, "\n{disclaimer}")?;
    }

    let score = result.final_score();
    let heading = if result.revision_used() {
        "Revised Quality Scores"
    } else {
        "Quality Scores"
    };
    writeln!(out, "\n{heading}:")?;
    for dimension in Dimension::ALL {
        let entry = score.get(dimension);
        if with_feedback {
            writeln!(
                out,
                "  {}: {}/5 - {}",
                dimension.display_name(),
                entry.score,
                entry.feedback
            )?;
        } else {
            writeln!(out, "  {}: {}/5", dimension.display_name(), entry.score)?;
        }
    }
    writeln!(out, "  Average: {:.1}/5", score.average())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::CallsConfig;
    use crate::test_support::{ScriptedModel, judge_reply, story_reply};
    use std::io::Cursor;

    fn run(model: &ScriptedModel, stdin: &str) -> (Result<GenerationResult>, String) {
        let orchestrator = Orchestrator::new(model, &CallsConfig::default());
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = run_session(&orchestrator, 3, &mut input, &mut out);
        (result, String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn session_without_revision_prints_story_and_scores() {
        let model = ScriptedModel::new([
            "calming".to_string(),
            story_reply("The Sleepy Bunny", "Bunny yawned and slept."),
            judge_reply([5, 4, 5, 4, 3]),
        ]);
        let (result, output) = run(&model, "a sleepy bunny\nno\n");
        let result = result.expect("session");

        assert!(!result.revision_used());
        assert!(output.contains("Bedtime goal: calming"));
        assert!(output.contains("Target audience: Ages 5-10"));
        assert!(output.contains("Target length: 450-700 words"));
        assert!(output.contains("TITLE: The Sleepy Bunny"));
        assert!(output.contains("Attempts: 1"));
        assert!(output.contains("Quality threshold met: Yes"));
        assert!(output.contains("Word count: 4\nWithin target length: No\n"));
        assert!(output.contains("  Language Simplicity: 3/5 - Language Simplicity feedback for a 3."));
        assert!(output.contains("  Average: 4.2/5"));
        assert!(!output.contains("Judge parse failures"));
        assert!(!output.contains("REVISED TITLE"));
        assert!(output.ends_with("Sweet dreams!\n"));
    }

    #[test]
    fn session_with_revision_prints_revised_story() {
        let model = ScriptedModel::new([
            "calming".to_string(),
            story_reply("The Sleepy Bunny", "Bunny slept."),
            judge_reply([5, 5, 5, 5, 5]),
            story_reply("The Bunny and the Owl", "Owl hooted softly."),
            judge_reply([3, 3, 3, 3, 3]),
        ]);
        let (result, output) = run(&model, "a sleepy bunny\nY\nadd an owl\n");
        let result = result.expect("session");

        assert!(result.revision_used());
        assert_eq!(result.all_attempts().len(), 2);
        assert!(output.contains("REVISED TITLE: The Bunny and the Owl"));
        assert!(output.contains("Revised Quality Scores:"));
        assert!(output.contains("  Safety: 3/5\n"));
        assert!(output.contains("The revised story did not meet all quality thresholds."));
        assert!(model.calls()[3].prompt.contains("add an owl"));
    }

    #[test]
    fn story_inside_target_length_is_reported() {
        let body = vec!["sleepy"; 500].join(" ");
        let model = ScriptedModel::new([
            "calming".to_string(),
            story_reply("Long Night", &body),
            judge_reply([5, 5, 5, 5, 5]),
        ]);
        let (result, output) = run(&model, "a bunny\nno\n");

        assert_eq!(result.expect("session").final_draft().word_count(), 500);
        assert!(output.contains("Word count: 500\nWithin target length: Yes\n"));
    }

    #[test]
    fn end_of_input_at_revision_prompt_means_no() {
        let model = ScriptedModel::new([
            "calming".to_string(),
            story_reply("T", "Body."),
            judge_reply([5, 5, 5, 5, 5]),
        ]);
        let (result, _) = run(&model, "a bunny\n");
        assert!(!result.expect("session").revision_used());
        assert_eq!(model.remaining(), 0);
    }

    #[test]
    fn missing_request_is_an_error() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let (result, _) = run(&model, "");
        assert!(result.unwrap_err().to_string().contains("no story request"));
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn exhausted_session_shows_disclaimer_and_parse_failures() {
        let bad = "no rubric here".to_string();
        let mut replies = vec!["calming".to_string()];
        for title in ["A", "B", "C"] {
            replies.push(story_reply(title, "text"));
            replies.push(bad.clone());
            replies.push(bad.clone());
        }
        let model = ScriptedModel::new(replies);
        let (result, output) = run(&model, "a bunny\nno\n");
        let result = result.expect("session");

        assert!(!result.passed_threshold());
        assert!(output.contains("TITLE: A"));
        assert!(output.contains("Attempts: 3"));
        assert!(output.contains("Judge parse failures: 3"));
        assert!(output.contains("after 3 attempts"));
        assert!(output.contains("Judge evaluation failed to parse"));
    }
}
