//! Error types for the simulation.
//!
//! Configuration problems are fatal at construction time; shape extraction
//! failures are local and surface as a rejected claim.

/// Errors raised while loading or validating [`crate::Tuning`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the tuning file from disk.
    #[error("failed to read tuning file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse tuning JSON.
    #[error("failed to parse tuning JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Reasons a territory shape could not be extracted from a trail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    /// The trail is too short to yield a closed polygon.
    #[error("insufficient shape points: trail holds {count} samples")]
    InsufficientPoints { count: usize },

    /// The re-entry point has a NaN or infinite component.
    #[error("re-entry point is not finite")]
    NonFiniteReentry,
}
