//! Command line parsing pipeline.
//!
//! Text flows through the source/destination extractor, the file-filter
//! extractor and then the option-group builders, each of which takes its
//! switches out of the shrinking remainder.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::args::{Capabilities, CopyActionFlags, CopyJob, SelectionFlags};
use crate::error::ParseError;
use crate::extract::{extract_file_filters, extract_source_destination, CommandText};

/// Per-call parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSettings {
    /// Applied before the text is read; switches in the text only add to it.
    pub copy_action_flags: CopyActionFlags,
    /// Applied before the text is read; switches in the text only add to it.
    pub selection_flags: SelectionFlags,
    pub capabilities: Capabilities,
}

/// Parses a full command: executable (optional), source, destination,
/// include filters and switches.
pub fn parse_command_with(text: &str, settings: &ParseSettings) -> Result<CopyJob, ParseError> {
    parse(text, settings, false)
}

/// Parses switches only; any positional argument is an error.
pub fn parse_options_with(text: &str, settings: &ParseSettings) -> Result<CopyJob, ParseError> {
    parse(text, settings, true)
}

fn parse(text: &str, settings: &ParseSettings, options_only: bool) -> Result<CopyJob, ParseError> {
    let positionals = extract_source_destination(text, options_only)?;
    let (file_filter, remainder) = extract_file_filters(&positionals.remainder);

    let mut job = CopyJob::default();
    job.copy.source = positionals.source.unwrap_or_default();
    job.copy.destination = positionals.destination.unwrap_or_default();
    job.copy.file_filter = file_filter;
    job.copy.apply_action_flags(settings.copy_action_flags);
    job.selection.apply_selection_flags(settings.selection_flags);

    let mut flags = CommandText::new(remainder);
    job.read_flags(&mut flags, &settings.capabilities);

    let leftover = flags.into_remainder();
    if !leftover.is_empty() {
        debug!(%leftover, "ignoring unrecognized text");
    }
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(text: &str) -> CopyJob {
        parse_command_with(text, &ParseSettings::default()).unwrap()
    }

    #[test]
    fn full_command() {
        let job = parse_default(r#"robocopy C:\source "D:\my dest" *.txt /MIR /MT:16 /XD bin obj /R:3 /W:5 /LOG:run.log"#);
        assert_eq!(job.copy.source, r"C:\source");
        assert_eq!(job.copy.destination, r"D:\my dest");
        assert_eq!(job.copy.file_filter, vec!["*.txt"]);
        assert!(job.copy.mirror);
        assert_eq!(job.copy.threads(), 16);
        assert_eq!(job.selection.excluded_directories, vec!["bin", "obj"]);
        assert_eq!(job.retry.retry_count, 3);
        assert_eq!(job.retry.retry_wait_time, 5);
        assert_eq!(job.logging.log_path, "run.log");
    }

    #[test]
    fn settings_flags_are_applied_first() {
        let settings = ParseSettings {
            copy_action_flags: CopyActionFlags::COPY_SUBDIRECTORIES,
            selection_flags: SelectionFlags::EXCLUDE_OLDER,
            ..ParseSettings::default()
        };
        let job = parse_command_with("a b /PURGE", &settings).unwrap();
        assert!(job.copy.copy_subdirectories);
        assert!(job.copy.purge);
        assert!(job.selection.exclude_older);
    }

    #[test]
    fn options_only() {
        let job = parse_options_with("/E /XO /NP", &ParseSettings::default()).unwrap();
        assert!(job.copy.copy_subdirectories_including_empty);
        assert!(job.selection.exclude_older);
        assert!(job.logging.no_progress);
        assert!(job.copy.source.is_empty());

        assert!(parse_options_with(r"C:\src D:\dst /E", &ParseSettings::default()).is_err());
    }

    #[test]
    fn unknown_switches_are_ignored() {
        let job = parse_default("a b /S /BOGUS:1 /E");
        assert!(job.copy.copy_subdirectories);
        assert!(job.copy.copy_subdirectories_including_empty);
    }

    #[test]
    fn empty_values_are_consumed() {
        let settings = ParseSettings::default();
        let mut flags = CommandText::new("/LOG: /LEV: /S");
        let mut job = CopyJob::default();
        job.read_flags(&mut flags, &settings.capabilities);
        assert!(job.logging.log_path.is_empty());
        assert_eq!(job.copy.depth, 0);
        assert!(job.copy.copy_subdirectories);
        assert_eq!(flags.remainder(), "");
    }

    #[test]
    fn legacy_target_drops_gated_switches() {
        let settings = ParseSettings {
            capabilities: Capabilities::legacy(),
            ..ParseSettings::default()
        };
        let job = parse_command_with("a b /MT:8 /COMPRESS /J", &settings).unwrap();
        assert_eq!(job.copy.threads(), 0);
        assert!(!job.copy.network_compression);
        assert!(!job.copy.unbuffered_io);
    }
}
