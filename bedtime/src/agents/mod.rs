//! Model-backed agents: the storyteller and the rubric judge.

pub mod judge;
pub mod storyteller;
