//! Environment variable credential provider.
//!
//! Reads the API key and organization id once at startup. Each credential
//! has a primary variable name and legacy fallbacks, checked in order:
//!
//! - API key: `OPENAI_API_KEY`, then `API_KEY`
//! - Organization: `OPENAI_ORGANIZATION`, then `ORGANIZATION`
//!
//! Both are required. An empty value counts as unset.

use std::env::VarError;

use secrecy::SecretString;
use tracing::debug;

use termchat_types::error::ConfigError;

/// Names under which a credential may be supplied.
#[derive(Debug, Clone, Copy)]
pub struct CredentialVar {
    pub primary: &'static str,
    pub fallbacks: &'static [&'static str],
}

pub const API_KEY_VAR: CredentialVar = CredentialVar {
    primary: "OPENAI_API_KEY",
    fallbacks: &["API_KEY"],
};

pub const ORGANIZATION_VAR: CredentialVar = CredentialVar {
    primary: "OPENAI_ORGANIZATION",
    fallbacks: &["ORGANIZATION"],
};

/// Credentials for the completion endpoint.
///
/// `Debug` is derived only because `SecretString` redacts itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: SecretString,
    pub organization: String,
}

/// Read-only credential source backed by environment variables.
///
/// The variable lookup is injectable so tests never touch the real process
/// environment.
pub struct EnvCredentialProvider<F = fn(&str) -> Result<String, VarError>> {
    lookup: F,
}

impl EnvCredentialProvider {
    /// Create a provider that reads the process environment.
    pub fn new() -> Self {
        Self {
            lookup: process_env,
        }
    }
}

fn process_env(key: &str) -> Result<String, VarError> {
    std::env::var(key)
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> EnvCredentialProvider<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    pub fn with_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    /// Resolve a single credential, trying the primary name first.
    pub fn get(&self, var: &CredentialVar) -> Result<String, ConfigError> {
        for name in std::iter::once(var.primary).chain(var.fallbacks.iter().copied()) {
            match (self.lookup)(name) {
                Ok(value) if !value.trim().is_empty() => {
                    debug!(variable = name, "Credential resolved from environment");
                    return Ok(value);
                }
                Ok(_) | Err(VarError::NotPresent) => continue,
                Err(VarError::NotUnicode(_)) => {
                    return Err(ConfigError::InvalidVariable(name.to_string()));
                }
            }
        }

        Err(ConfigError::MissingVariable {
            name: var.primary.to_string(),
            fallbacks: var.fallbacks.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Load both credentials. The API key is checked first, so when both
    /// are missing the error names the API key variable.
    pub fn load(&self) -> Result<Credentials, ConfigError> {
        let api_key = self.get(&API_KEY_VAR)?;
        let organization = self.get(&ORGANIZATION_VAR)?;
        Ok(Credentials {
            api_key: SecretString::from(api_key),
            organization,
        })
    }
}
