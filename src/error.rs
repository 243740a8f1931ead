//! Error types for SVG to G-code conversion.
//!
//! Each stage of the pipeline has its own error enum so callers can tell a
//! malformed drawing apart from a bad configuration. [`ConversionError`]
//! wraps all of them for the top-level driver.

use std::io;
use thiserror::Error;

/// Errors raised while parsing SVG path data (`d` attributes).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// A character that starts neither a command nor a number.
    #[error("Unexpected character '{ch}' at offset {position} in path data")]
    UnexpectedCharacter { ch: char, position: usize },

    /// A command was given too few parameters, or a parameter was not a number.
    #[error("Command '{command}' expects a number at offset {position}")]
    ExpectedNumber { command: char, position: usize },

    /// An arc flag was something other than `0` or `1`.
    #[error("Invalid arc flag at offset {position}: expected 0 or 1")]
    InvalidFlag { position: usize },

    /// Path data must open with a move-to.
    #[error("Path data must start with a move-to command, found '{command}'")]
    MissingMoveTo { command: char },
}

/// Errors raised while loading or walking an SVG document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The XML itself could not be read.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// The document has no root element.
    #[error("SVG document has no root element")]
    Empty,

    /// Canvas height is needed but the root `height` attribute is unusable.
    #[error("Cannot resolve canvas height from '{0}'")]
    UnresolvableHeight(String),

    /// Bed size was requested from the document but width/height are missing.
    #[error("Document size not found in SVG")]
    MissingDimensions,

    /// A drawable element lacks an attribute it cannot do without.
    #[error("<{element}> element is missing the '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    /// A `transform` attribute could not be parsed.
    #[error("Invalid transform '{0}'")]
    InvalidTransform(String),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors raised by a G-code interface while emitting instructions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterfaceError {
    /// A move was requested before any travel or cutting speed was set.
    #[error(
        "Undefined movement speed. Set a travel or cutting speed before executing movement commands"
    )]
    UndefinedSpeed,

    /// Laser power is a fraction and must stay within [0, 1].
    #[error("Laser power {0} is out of bounds, it must be between 0 and 1")]
    PowerOutOfRange(f64),
}

/// Errors related to conversion settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown unit '{0}' (expected 'mm' or 'in')")]
    UnknownUnit(String),

    #[error("Unknown machine origin '{0}' (expected 'bottom-left', 'center' or 'top-left')")]
    UnknownOrigin(String),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Any failure of a full SVG to G-code conversion.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("SVG error: {0}")]
    Document(#[from] DocumentError),

    #[error("G-code error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<PathError> for ConversionError {
    fn from(err: PathError) -> Self {
        ConversionError::Document(DocumentError::Path(err))
    }
}

pub type PathResult<T> = Result<T, PathError>;
pub type DocumentResult<T> = Result<T, DocumentError>;
pub type InterfaceResult<T> = Result<T, InterfaceError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ConversionResult<T> = Result<T, ConversionError>;
