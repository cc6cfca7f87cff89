//! Canonical command line printer.

use std::fmt;

use crate::args::{Capabilities, CopyJob};
use crate::grammar::Switch;
use crate::utils::{quote_filter, quote_path};

/// One printed switch, before the surface syntax decides on quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Emitted<'a> {
    Flag(&'static Switch),
    Value(&'static Switch, String),
    List(&'static Switch, &'a [String]),
}

impl Emitted<'_> {
    pub(crate) fn switch(&self) -> &'static Switch {
        match self {
            Emitted::Flag(switch) | Emitted::Value(switch, _) | Emitted::List(switch, _) => switch,
        }
    }
}

/// Prints `job` as a single command line, without the executable name.
///
/// Source and destination come first (`""` when empty), then the include
/// filters, each quoted, then every switch in grammar table order. Retry
/// count, retry wait and `/BYTES` are always present.
pub fn serialize_with(job: &CopyJob, caps: &Capabilities) -> String {
    let mut parts = vec![quote_path(&job.copy.source), quote_path(&job.copy.destination)];
    parts.extend(job.copy.file_filter.iter().map(|f| quote_filter(f)));
    for emitted in job.emit(caps) {
        parts.push(match emitted {
            Emitted::Flag(switch) => switch.render(""),
            Emitted::Value(switch, value) => switch.render(&quote_path(&value)),
            Emitted::List(switch, values) => {
                let values: Vec<String> = values.iter().map(|v| quote_path(v)).collect();
                switch.render(&values.join(" "))
            }
        });
    }
    parts.join(" ")
}

impl fmt::Display for CopyJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_with(self, &Capabilities::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::TABLE;

    fn everything() -> CopyJob {
        let mut job = CopyJob::new(r"C:\source", r"D:\dest");
        let c = &mut job.copy;
        c.copy_subdirectories = true;
        c.copy_subdirectories_including_empty = true;
        c.depth = 2;
        c.restartable = true;
        c.backup_mode = true;
        c.restartable_with_backup_fallback = true;
        c.unbuffered_io = true;
        c.efs_raw_mode = true;
        c.copy_flags = "DAT".into();
        c.copy_with_security = true;
        c.copy_all = true;
        c.remove_file_information = true;
        c.fix_file_security = true;
        c.fix_file_times = true;
        c.purge = true;
        c.mirror = true;
        c.move_files = true;
        c.move_files_and_directories = true;
        c.set_attributes_add("R");
        c.set_attributes_remove("H");
        c.create_directory_and_file_tree = true;
        c.fat_files = true;
        c.long_path_off = true;
        c.monitor_changes = 3;
        c.monitor_minutes = 4;
        c.set_run_hours("2200-0600").unwrap();
        c.check_per_file = true;
        c.inter_packet_gap = 5;
        c.copy_symbolic_link = true;
        c.set_threads(16).unwrap();
        c.directory_copy_flags = "DA".into();
        c.no_directory_info = true;
        c.no_offload = true;
        c.network_compression = true;

        let s = &mut job.selection;
        s.only_copy_archive_files = true;
        s.only_copy_archive_files_and_reset_archive_flag = true;
        s.set_include_attributes("RS");
        s.set_exclude_attributes("H");
        s.excluded_files = vec!["a.tmp".into()];
        s.excluded_directories = vec!["bin".into()];
        s.exclude_changed = true;
        s.exclude_newer = true;
        s.exclude_older = true;
        s.exclude_extra = true;
        s.exclude_lonely = true;
        s.include_same = true;
        s.include_tweaked = true;
        s.include_modified = true;
        s.max_file_size = 100;
        s.min_file_size = 1;
        s.max_file_age = "30".into();
        s.min_file_age = "1".into();
        s.max_last_access_date = "20240101".into();
        s.min_last_access_date = "2".into();
        s.exclude_junction_points = true;
        s.use_fat_file_times = true;
        s.compensate_for_dst_difference = true;
        s.exclude_directory_junction_points = true;
        s.exclude_file_junction_points = true;

        let l = &mut job.logging;
        l.list_only = true;
        l.report_extra_files = true;
        l.verbose_output = true;
        l.include_source_timestamps = true;
        l.include_full_path_names = true;
        l.no_file_sizes = true;
        l.no_file_classes = true;
        l.no_file_list = true;
        l.no_directory_list = true;
        l.no_progress = true;
        l.show_estimated_time_of_arrival = true;
        l.log_path = "a.log".into();
        l.append_log_path = "b.log".into();
        l.unicode_log_path = "c.log".into();
        l.append_unicode_log_path = "d.log".into();
        l.output_to_console_and_log = true;
        l.no_job_header = true;
        l.no_job_summary = true;
        l.output_as_unicode = true;

        job.retry.save_to_registry = true;
        job.retry.wait_for_share_names = true;

        job.job.load_job = "in".into();
        job.job.save_job = "out".into();
        job.job.quit_after_processing = true;
        job.job.no_source_directory = true;
        job.job.no_destination_directory = true;
        job
    }

    #[test]
    fn printer_order_matches_grammar_table() {
        let job = everything();
        let printed: Vec<&str> = job
            .emit(&Capabilities::default())
            .iter()
            .map(|e| e.switch().token)
            .collect();
        let table: Vec<&str> = TABLE.iter().map(|s| s.token).collect();
        assert_eq!(printed, table);
    }

    #[test]
    fn default_job_prints_explicit_defaults() {
        let text = serialize_with(&CopyJob::default(), &Capabilities::default());
        assert_eq!(text, r#""" "" /BYTES /R:1000000 /W:30"#);
    }

    #[test]
    fn paths_and_filters_are_quoted() {
        let mut job = CopyJob::new(r"C:\my source\", r"D:\dest");
        job.copy.file_filter = vec!["*.txt".into(), "a b.doc".into()];
        job.selection.excluded_files = vec![r"c:\MyFile.txt".into(), r"d:\File 2.pdf".into()];
        let text = serialize_with(&job, &Capabilities::default());
        assert_eq!(
            text,
            r#""C:\my source\." D:\dest "*.txt" "a b.doc" /XF c:\MyFile.txt "d:\File 2.pdf" /BYTES /R:1000000 /W:30"#
        );
    }

    #[test]
    fn gated_switches_are_not_printed() {
        let mut job = CopyJob::default();
        job.copy.network_compression = true;
        job.copy.unbuffered_io = true;
        job.copy.set_threads(4).unwrap();
        let text = serialize_with(&job, &Capabilities::legacy());
        assert!(!text.contains("/COMPRESS"));
        assert!(!text.contains("/J "));
        assert!(!text.contains("/MT"));
        let text = serialize_with(&job, &Capabilities::default());
        assert!(text.contains("/J /MT:4 /COMPRESS"));
    }
}
