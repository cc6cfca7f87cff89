use serde::{Deserialize, Serialize};

use super::{emit_flag, emit_text, take_text};
use crate::extract::FlagSource;
use crate::grammar::*;
use crate::serialize::Emitted;

/// What the copy tool reports and where.
///
/// Sizes are always reported in bytes: `/BYTES` is consumed when parsing and
/// always printed, so it has no field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingOptions {
    pub list_only: bool,
    pub report_extra_files: bool,
    pub verbose_output: bool,
    pub include_source_timestamps: bool,
    pub include_full_path_names: bool,
    pub no_file_sizes: bool,
    pub no_file_classes: bool,
    pub no_file_list: bool,
    pub no_directory_list: bool,
    pub no_progress: bool,
    pub show_estimated_time_of_arrival: bool,
    pub log_path: String,
    pub append_log_path: String,
    pub unicode_log_path: String,
    pub append_unicode_log_path: String,
    pub output_to_console_and_log: bool,
    pub no_job_header: bool,
    pub no_job_summary: bool,
    pub output_as_unicode: bool,
}

impl LoggingOptions {
    pub(crate) fn read_flags(&mut self, flags: &mut dyn FlagSource) {
        self.list_only |= flags.take_flag(&LIST_ONLY);
        self.report_extra_files |= flags.take_flag(&REPORT_EXTRA_FILES);
        self.verbose_output |= flags.take_flag(&VERBOSE_OUTPUT);
        self.include_source_timestamps |= flags.take_flag(&INCLUDE_SOURCE_TIMESTAMPS);
        self.include_full_path_names |= flags.take_flag(&INCLUDE_FULL_PATH_NAMES);
        flags.take_flag(&PRINT_SIZES_AS_BYTES);
        self.no_file_sizes |= flags.take_flag(&NO_FILE_SIZES);
        self.no_file_classes |= flags.take_flag(&NO_FILE_CLASSES);
        self.no_file_list |= flags.take_flag(&NO_FILE_LIST);
        self.no_directory_list |= flags.take_flag(&NO_DIRECTORY_LIST);
        self.no_progress |= flags.take_flag(&NO_PROGRESS);
        self.show_estimated_time_of_arrival |= flags.take_flag(&SHOW_ETA);
        if let Some(path) = take_text(flags, &LOG_PATH) {
            self.log_path = path;
        }
        if let Some(path) = take_text(flags, &APPEND_LOG_PATH) {
            self.append_log_path = path;
        }
        if let Some(path) = take_text(flags, &UNICODE_LOG_PATH) {
            self.unicode_log_path = path;
        }
        if let Some(path) = take_text(flags, &APPEND_UNICODE_LOG_PATH) {
            self.append_unicode_log_path = path;
        }
        self.output_to_console_and_log |= flags.take_flag(&OUTPUT_TO_CONSOLE_AND_LOG);
        self.no_job_header |= flags.take_flag(&NO_JOB_HEADER);
        self.no_job_summary |= flags.take_flag(&NO_JOB_SUMMARY);
        self.output_as_unicode |= flags.take_flag(&OUTPUT_AS_UNICODE);
    }

    pub(crate) fn emit<'a>(&'a self, out: &mut Vec<Emitted<'a>>) {
        emit_flag(out, &LIST_ONLY, self.list_only);
        emit_flag(out, &REPORT_EXTRA_FILES, self.report_extra_files);
        emit_flag(out, &VERBOSE_OUTPUT, self.verbose_output);
        emit_flag(out, &INCLUDE_SOURCE_TIMESTAMPS, self.include_source_timestamps);
        emit_flag(out, &INCLUDE_FULL_PATH_NAMES, self.include_full_path_names);
        emit_flag(out, &PRINT_SIZES_AS_BYTES, true);
        emit_flag(out, &NO_FILE_SIZES, self.no_file_sizes);
        emit_flag(out, &NO_FILE_CLASSES, self.no_file_classes);
        emit_flag(out, &NO_FILE_LIST, self.no_file_list);
        emit_flag(out, &NO_DIRECTORY_LIST, self.no_directory_list);
        emit_flag(out, &NO_PROGRESS, self.no_progress);
        emit_flag(out, &SHOW_ETA, self.show_estimated_time_of_arrival);
        emit_text(out, &LOG_PATH, &self.log_path);
        emit_text(out, &APPEND_LOG_PATH, &self.append_log_path);
        emit_text(out, &UNICODE_LOG_PATH, &self.unicode_log_path);
        emit_text(out, &APPEND_UNICODE_LOG_PATH, &self.append_unicode_log_path);
        emit_flag(out, &OUTPUT_TO_CONSOLE_AND_LOG, self.output_to_console_and_log);
        emit_flag(out, &NO_JOB_HEADER, self.no_job_header);
        emit_flag(out, &NO_JOB_SUMMARY, self.no_job_summary);
        emit_flag(out, &OUTPUT_AS_UNICODE, self.output_as_unicode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CommandText;

    #[test]
    fn log_path_variants_are_distinct() {
        let mut options = LoggingOptions::default();
        let mut flags = CommandText::new(r#"/LOG+:a.log /UNILOG:"C:\logs dir\u.log" /LOG:b.log /UNILOG+:c.log /BYTES"#);
        options.read_flags(&mut flags);
        assert_eq!(options.log_path, "b.log");
        assert_eq!(options.append_log_path, "a.log");
        assert_eq!(options.unicode_log_path, r"C:\logs dir\u.log");
        assert_eq!(options.append_unicode_log_path, "c.log");
        assert_eq!(flags.remainder(), "");
    }

    #[test]
    fn unicode_flag_is_not_unilog() {
        let mut options = LoggingOptions::default();
        let mut flags = CommandText::new("/UNICODE /NP /NFL /NDL /ETA");
        options.read_flags(&mut flags);
        assert!(options.output_as_unicode);
        assert!(options.no_progress && options.no_file_list && options.no_directory_list);
        assert!(options.show_estimated_time_of_arrival);
        assert!(options.unicode_log_path.is_empty());
    }
}
