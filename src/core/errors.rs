// src/core/errors.rs

use thiserror::Error;

/// Fatal precondition errors. Every variant prevents the batch from starting
/// and propagates untouched to the process boundary, where it terminates the
/// invocation with a non-zero exit code. Failures inside a single run are
/// deliberately *not* represented here; they are caught and logged at the
/// per-run iteration boundary and never escape it.
#[derive(Error, Debug)]
pub enum FatalError {
    #[error("Configuration file {0} does not exist")]
    ConfigFileNotFound(String),

    #[error("Configuration file {path} is not readable: {source}")]
    ConfigFileNotReadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file {path} could not be parsed: {source}")]
    ConfigFileInvalid {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error(
        "Option name collision: '-{name}' is declared by both group '{existing_group}' and group '{new_group}'"
    )]
    OptionNameCollision {
        name: String,
        existing_group: String,
        new_group: String,
    },

    #[error("Required option -{0} not set")]
    MissingRequiredOption(String),

    #[error("Invalid value '{value}' for option -{name}; allowed values: {allowed}")]
    ValueNotAllowed {
        name: String,
        value: String,
        allowed: String,
    },

    #[error("Context generator for option -{0} produced no contexts")]
    EmptyFanOut(String),
}
