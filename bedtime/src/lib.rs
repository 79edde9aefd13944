//! Bedtime story generator with an LLM judge loop.
//!
//! A storyteller model writes a draft, a judge model scores it against a
//! five-dimension rubric, and the orchestrator retries (at most three
//! attempts) until the draft passes or attempts run out. The architecture
//! keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (rubric, reply grammars, attempt
//!   accounting). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (model calls, config files, prompt
//!   templates). Isolated behind [`io::model::ModelClient`] so tests can
//!   script replies.
//!
//! [`agents`] pair a prompt with one model call and a parser;
//! [`orchestrator`] runs the retry loop and the single revision; [`session`]
//! is the console front end.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod orchestrator;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
