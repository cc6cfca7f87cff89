//! RBCP job model.
//!
//! Translates between a structured copy job and its two textual forms: a
//! single-line `robocopy`-style command and the line-oriented job file.
//! Serializing a job and parsing the result gives back an equal job.

pub mod args;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod job_file;
pub mod parser;
pub mod serialize;
pub mod utils;

pub use args::{
    Capabilities, CopyActionFlags, CopyJob, CopyOptions, JobOptions, LoggingOptions, RetryOptions,
    SelectionFlags, SelectionOptions,
};
pub use error::{OptionError, ParseError, SOURCE_DESTINATION_UNDECIPHERABLE};
pub use job_file::{parse_job_file, parse_job_file_with, read_job_file, write_job_file, write_job_file_with, JobFile};
pub use parser::{parse_command_with, parse_options_with, ParseSettings};
pub use serialize::serialize_with;
pub use utils::Logger;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "RBCP";

/// Parses a full command line with default settings.
pub fn parse_command(text: &str) -> Result<CopyJob, ParseError> {
    parse_command_with(text, &ParseSettings::default())
}

/// Parses switches only; positional arguments are rejected.
pub fn parse_options(text: &str) -> Result<CopyJob, ParseError> {
    parse_options_with(text, &ParseSettings::default())
}

/// Like [`parse_command`] but reports failure as `None`.
pub fn try_parse_command(text: &str) -> Option<CopyJob> {
    parse_command(text).ok()
}

/// Like [`parse_options`] but reports failure as `None`.
pub fn try_parse_options(text: &str) -> Option<CopyJob> {
    parse_options(text).ok()
}

/// Prints `job` in canonical command line form for a fully capable target.
pub fn serialize(job: &CopyJob) -> String {
    serialize_with(job, &Capabilities::default())
}
