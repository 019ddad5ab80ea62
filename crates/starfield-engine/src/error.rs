//! Error types for the starfield engine.
//!
//! Nothing in the engine panics on bad host input: configuration and viewport
//! problems come back as `EngineError` and the previous state is kept.

use std::fmt;

/// Errors surfaced by the engine's control surface and tick path.
#[derive(Debug)]
pub enum EngineError {
    /// Viewport dimensions were zero, negative or not finite.
    InvalidViewport { width: f32, height: f32 },
    /// A known setting received a value it cannot hold.
    InvalidSetting { key: String, reason: String },
    /// `update_setting` was called with a key the config does not have.
    UnknownSetting(String),
    /// Config JSON could not be (de)serialized.
    Serialization(serde_json::Error),
    /// A required collaborator (surface, entities) is not available yet.
    NotReady(&'static str),
    /// An id passed by the host does not name a live entity.
    UnknownEntity(String),
    /// A tick panicked; the payload message is preserved when it was a string.
    TickPanicked(String),
    /// A simulation step produced NaN or infinity.
    NonFinite { what: &'static str },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidViewport { width, height } => {
                write!(f, "Invalid viewport {}x{}: dimensions must be positive", width, height)
            }
            EngineError::InvalidSetting { key, reason } => {
                write!(f, "Invalid value for setting '{}': {}", key, reason)
            }
            EngineError::UnknownSetting(key) => write!(f, "Unknown setting '{}'", key),
            EngineError::Serialization(e) => write!(f, "Config serialization failed: {}", e),
            EngineError::NotReady(what) => write!(f, "Not ready: {}", what),
            EngineError::UnknownEntity(id) => write!(f, "No entity with id {}", id),
            EngineError::TickPanicked(msg) => write!(f, "Tick panicked: {}", msg),
            EngineError::NonFinite { what } => write!(f, "Simulation produced a non-finite {}", what),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_setting() {
        let err = EngineError::InvalidSetting {
            key: "starDensity".into(),
            reason: "must be finite".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("starDensity"), "message was {}", msg);
    }

    #[test]
    fn serde_errors_convert_and_keep_source() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: EngineError = bad.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
