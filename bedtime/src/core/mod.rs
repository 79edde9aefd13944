//! Deterministic, pure logic for the story loop.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values (drafts, scores, the attempt ledger) and return deterministic
//! outputs suitable for tests.

pub mod feedback;
pub mod ledger;
pub mod rubric;
pub mod rubric_parse;
pub mod story_parse;
pub mod types;
