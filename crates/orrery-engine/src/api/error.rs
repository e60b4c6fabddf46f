use thiserror::Error;

/// Errors raised while building or driving an orrery.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A path was requested with unusable parameters (zero segments, NaN radius, ...).
    #[error("invalid orbit path: {0}")]
    InvalidPath(String),

    /// The host container reported a zero or non-finite size.
    #[error("invalid viewport {width}x{height}: container must have a non-zero size")]
    InvalidViewport { width: f32, height: f32 },

    /// Calendar with a non-positive cycle length.
    #[error("invalid calendar: {0}")]
    InvalidCalendar(String),

    /// Scene configuration failed validation.
    #[error("invalid scene config: {0}")]
    InvalidConfig(String),

    /// Scene configuration JSON could not be parsed.
    #[error("failed to parse scene config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// No preset with this name.
    #[error("unknown preset '{0}' (expected one of: spiral, calendar, textured)")]
    UnknownPreset(String),
}
