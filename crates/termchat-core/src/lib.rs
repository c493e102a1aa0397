//! Provider abstraction and request execution for termchat.
//!
//! This crate defines the `LlmProvider` port that the infrastructure layer
//! implements, plus the retry state machine that drives it. It depends only
//! on `termchat-types` -- never on `termchat-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
