//! Chat configuration loader.
//!
//! Reads `config.toml` (`~/.termchat/config.toml` unless a path is given)
//! and deserializes it into [`ChatConfig`].

use std::path::{Path, PathBuf};

use termchat_types::config::ChatConfig;
use termchat_types::error::ConfigError;

/// `~/.termchat/config.toml`, or `None` when the home directory is unknown.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".termchat").join("config.toml"))
}

/// Load the chat configuration.
///
/// - With an explicit `path`, the file must exist and parse.
/// - Without one, the default path is used if it exists; otherwise
///   [`ChatConfig::default()`] is returned.
/// - A file that exists but fails to parse is always an error.
pub async fn load_chat_config(path: Option<&Path>) -> Result<ChatConfig, ConfigError> {
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => {
                tracing::debug!("No home directory, using default config");
                return Ok(ChatConfig::default());
            }
        },
    };

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if explicit {
                return Err(ConfigError::FileNotFound(config_path.display().to_string()));
            }
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(ChatConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<ChatConfig>(&content).map_err(|err| ConfigError::Parse {
        path: config_path.display().to_string(),
        reason: err.to_string(),
    })?;

    tracing::debug!(path = %config_path.display(), model = %config.model, "Loaded config file");
    Ok(config)
}
