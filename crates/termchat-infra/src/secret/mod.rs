//! Credential sources.
//!
//! - `env`: Environment variable provider (read-only)
//! - [`load_dotenv`]: optional `.env` file merged into the environment first

pub mod env;

use std::path::PathBuf;

use tracing::{debug, warn};

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. Variables already set are not overridden.
///
/// A missing file is normal and only logged at debug level; a malformed
/// file is logged as a warning and otherwise ignored.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(err) if err.not_found() => {
            debug!("No .env file found");
            None
        }
        Err(err) => {
            warn!(error = %err, "Failed to load .env file");
            None
        }
    }
}
