//! Controller startup configuration.
//!
//! The session id is resolved once at load time from the page URL's query
//! string; a missing or invalid id is a configuration error and fatal for
//! the controller (there is nothing to pair with).

use protocol::{ProtocolError, SessionId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing `session` query parameter")]
    MissingSession,
    #[error(transparent)]
    InvalidSession(#[from] ProtocolError),
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub session: SessionId,
}

impl ControllerConfig {
    /// Parse the page URL query string (`?session=<id>` or bare
    /// `session=<id>`).
    ///
    /// # Errors
    ///
    /// Returns `MissingSession` if no `session` key is present and
    /// `InvalidSession` if its value fails validation.
    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == "session" {
                return Ok(Self { session: value.parse()? });
            }
        }
        Err(ConfigError::MissingSession)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
