use thiserror::Error;

/// Fatal startup errors. These are reported once and end the process;
/// nothing about them is ever retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name} (also accepted: {})", fallbacks.join(", "))]
    MissingVariable {
        name: String,
        fallbacks: Vec<String>,
    },

    #[error("environment variable {0} is not valid unicode")]
    InvalidVariable(String),

    #[error("config file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_names_the_variable() {
        let err = ConfigError::MissingVariable {
            name: "OPENAI_API_KEY".to_string(),
            fallbacks: vec!["API_KEY".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("OPENAI_API_KEY"));
        assert!(msg.contains("API_KEY"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ConfigError::Parse {
            path: "/tmp/config.toml".to_string(),
            reason: "expected a table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config file /tmp/config.toml: expected a table"
        );
    }
}
