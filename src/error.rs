use core::fmt::Display;

use thiserror::Error;

use crate::Level;

/// Errors reported by the logger.
#[derive(Debug, Error)]
pub enum Error {
    /// An unrecognized level name or rank was given.
    #[error("invalid level `{input}`: level must be one of [{}]", Level::names())]
    InvalidLevel {
        /// The rejected input, as text
        input: String,
    },

    /// A level without a style was dispatched (`all`/`off` are thresholds, not message levels).
    #[error("got unexpected log level `{0}`: no style is mapped for it")]
    UnknownLevelStyle(Level),

    /// The date format pattern could not be parsed.
    #[error("invalid date format `{pattern}`: {reason}")]
    InvalidDateFormat {
        /// The rejected pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// The log file could not be opened.
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_level(input: impl Display) -> Self {
        Self::InvalidLevel {
            input: input.to_string(),
        }
    }
}

/// Result alias for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
