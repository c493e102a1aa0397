//! Infrastructure layer for termchat.
//!
//! Contains the implementations behind the ports defined in `termchat-core`:
//! the OpenAI-compatible HTTP provider, environment credentials, and the
//! TOML config file loader.

pub mod config;
pub mod llm;
pub mod secret;
