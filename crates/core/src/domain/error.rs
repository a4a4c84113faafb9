//! Error taxonomy for a generation run

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComboError>;

/// Errors that abort a generation run
///
/// Parse misses are deliberately absent: a line or field that does not match
/// simply yields nothing.
#[derive(Debug, Error)]
pub enum ComboError {
    /// Fewer than two playback cards were enumerated
    #[error("Insufficient devices: need at least 2 playback cards, found {found}")]
    InsufficientDevices { found: usize },

    /// A selected card number is not in the enumerated list
    #[error("Invalid selection: card {0} is not in the list")]
    InvalidSelection(u32),

    /// Both selections name the same card
    #[error("Duplicate selection: card {0} was chosen twice, pick two different cards")]
    DuplicateSelection(u32),

    /// Negotiation could not settle on a rate and/or a format
    #[error(
        "No common parameters (rate: {}, format: {}). Try different devices or use plughw-only (no multi)",
        or_none(.rate),
        or_none(.format)
    )]
    NoCommonParameters {
        rate: Option<u32>,
        format: Option<String>,
    },

    /// The external inspection tool could not be run
    #[error("Inspection failed: {0}")]
    Inspection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn or_none<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}
