//! Shared domain types for termchat.
//!
//! Completion request/response shapes, the provider error taxonomy,
//! configuration, and startup errors.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod llm;
