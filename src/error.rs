use thiserror::Error;

/// Message carried by [`ParseError::SourceDestinationUndecipherable`].
///
/// Kept stable so callers can match on it.
pub const SOURCE_DESTINATION_UNDECIPHERABLE: &str = "source and destination could not be deciphered";

/// Failure to turn text into a [`CopyJob`](crate::CopyJob).
#[derive(Debug, Error)]
pub enum ParseError {
    /// Fewer than two positional arguments precede the first switch.
    #[error("{}", SOURCE_DESTINATION_UNDECIPHERABLE)]
    SourceDestinationUndecipherable,

    #[error("invalid argument `{parameter}`: {reason}")]
    InvalidArgument {
        parameter: &'static str,
        reason: String,
    },

    #[error("failed to read job file: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// True when the text simply had no source and destination.
    pub fn is_missing_source_destination(&self) -> bool {
        matches!(self, ParseError::SourceDestinationUndecipherable)
    }

    /// The argument the failure is about, when there is one.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            ParseError::SourceDestinationUndecipherable => Some("command"),
            ParseError::InvalidArgument { parameter, .. } => Some(*parameter),
            ParseError::Io(_) => None,
        }
    }
}

/// A value rejected while mutating an option group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("thread count {0} is outside 0..=128")]
    ThreadCountOutOfRange(u32),

    #[error("run hours `{0}` must look like hhmm-hhmm")]
    InvalidRunHours(String),
}
