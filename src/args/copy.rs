use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    emit_flag, emit_number, emit_text, filter_attributes, parse_number, take_number, take_text,
    Capabilities, CopyActionFlags,
};
use crate::error::OptionError;
use crate::extract::FlagSource;
use crate::grammar::*;
use crate::serialize::Emitted;

/// Highest thread count `/MT` accepts.
pub const MAX_THREADS: u32 = 128;

/// Thread count implied by a bare `/MT`.
pub const DEFAULT_THREADS: u32 = 8;

static RUN_HOURS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[01]\d|2[0-3])[0-5]\d-(?:[01]\d|2[0-3])[0-5]\d$").expect("run hours pattern is a literal")
});

/// Paths, include filters and everything that controls how files are copied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOptions {
    /// Empty when no source was given.
    pub source: String,
    /// Empty when no destination was given.
    pub destination: String,
    /// Include filters; empty means every file.
    pub file_filter: Vec<String>,

    pub copy_subdirectories: bool,
    pub copy_subdirectories_including_empty: bool,
    /// `/LEV:n`, 0 when unlimited.
    pub depth: u32,
    pub restartable: bool,
    pub backup_mode: bool,
    pub restartable_with_backup_fallback: bool,
    pub unbuffered_io: bool,
    pub efs_raw_mode: bool,
    /// `/COPY:` letters, e.g. `DAT`.
    pub copy_flags: String,
    pub copy_with_security: bool,
    pub copy_all: bool,
    pub remove_file_information: bool,
    pub fix_file_security: bool,
    pub fix_file_times: bool,
    pub purge: bool,
    pub mirror: bool,
    pub move_files: bool,
    pub move_files_and_directories: bool,
    attributes_add: String,
    attributes_remove: String,
    pub create_directory_and_file_tree: bool,
    pub fat_files: bool,
    pub long_path_off: bool,
    pub monitor_changes: u32,
    pub monitor_minutes: u32,
    run_hours: String,
    pub check_per_file: bool,
    pub inter_packet_gap: u32,
    pub copy_symbolic_link: bool,
    threads: u32,
    /// `/DCOPY:` letters, e.g. `DAT`.
    pub directory_copy_flags: String,
    pub no_directory_info: bool,
    pub no_offload: bool,
    pub network_compression: bool,
}

impl CopyOptions {
    pub fn attributes_add(&self) -> &str {
        &self.attributes_add
    }

    /// Letters outside [`FILE_ATTRIBUTES`](super::FILE_ATTRIBUTES) are dropped.
    pub fn set_attributes_add(&mut self, value: &str) {
        self.attributes_add = filter_attributes(value);
    }

    pub fn attributes_remove(&self) -> &str {
        &self.attributes_remove
    }

    pub fn set_attributes_remove(&mut self, value: &str) {
        self.attributes_remove = filter_attributes(value);
    }

    /// `/MT` thread count, 0 when single threaded.
    pub fn threads(&self) -> u32 {
        self.threads
    }

    pub fn set_threads(&mut self, threads: u32) -> Result<(), OptionError> {
        if threads > MAX_THREADS {
            return Err(OptionError::ThreadCountOutOfRange(threads));
        }
        self.threads = threads;
        Ok(())
    }

    /// `/RH` window as `hhmm-hhmm`, empty when copying at any time.
    pub fn run_hours(&self) -> &str {
        &self.run_hours
    }

    /// Rejects anything but `0000`-`2359` on both sides. An empty string
    /// clears the window.
    pub fn set_run_hours(&mut self, value: &str) -> Result<(), OptionError> {
        let value = value.trim();
        if !value.is_empty() && !RUN_HOURS_PATTERN.is_match(value) {
            return Err(OptionError::InvalidRunHours(value.to_string()));
        }
        self.run_hours = value.to_string();
        Ok(())
    }

    pub fn action_flags(&self) -> CopyActionFlags {
        let mut flags = CopyActionFlags::NONE;
        let pairs = [
            (self.copy_subdirectories, CopyActionFlags::COPY_SUBDIRECTORIES),
            (self.copy_subdirectories_including_empty, CopyActionFlags::COPY_SUBDIRECTORIES_INCLUDING_EMPTY),
            (self.create_directory_and_file_tree, CopyActionFlags::CREATE_DIRECTORY_AND_FILE_TREE),
            (self.purge, CopyActionFlags::PURGE),
            (self.mirror, CopyActionFlags::MIRROR),
            (self.move_files, CopyActionFlags::MOVE_FILES),
            (self.move_files_and_directories, CopyActionFlags::MOVE_FILES_AND_DIRECTORIES),
        ];
        for (on, flag) in pairs {
            if on {
                flags |= flag;
            }
        }
        flags
    }

    /// Turns on every field named by `flags`; fields already set stay set.
    pub fn apply_action_flags(&mut self, flags: CopyActionFlags) {
        self.copy_subdirectories |= flags.contains(CopyActionFlags::COPY_SUBDIRECTORIES);
        self.copy_subdirectories_including_empty |= flags.contains(CopyActionFlags::COPY_SUBDIRECTORIES_INCLUDING_EMPTY);
        self.create_directory_and_file_tree |= flags.contains(CopyActionFlags::CREATE_DIRECTORY_AND_FILE_TREE);
        self.purge |= flags.contains(CopyActionFlags::PURGE);
        self.mirror |= flags.contains(CopyActionFlags::MIRROR);
        self.move_files |= flags.contains(CopyActionFlags::MOVE_FILES);
        self.move_files_and_directories |= flags.contains(CopyActionFlags::MOVE_FILES_AND_DIRECTORIES);
    }

    pub(crate) fn read_flags(&mut self, flags: &mut dyn FlagSource, caps: &Capabilities) {
        self.copy_subdirectories |= flags.take_flag(&COPY_SUBDIRECTORIES);
        self.copy_subdirectories_including_empty |= flags.take_flag(&COPY_SUBDIRECTORIES_INCLUDING_EMPTY);
        if let Some(depth) = take_number(flags, &DEPTH) {
            self.depth = depth;
        }
        self.restartable |= flags.take_flag(&RESTARTABLE);
        self.backup_mode |= flags.take_flag(&BACKUP_MODE);
        self.restartable_with_backup_fallback |= flags.take_flag(&RESTARTABLE_WITH_BACKUP_FALLBACK);
        if flags.take_flag(&UNBUFFERED_IO) {
            if caps.unbuffered_io {
                self.unbuffered_io = true;
            } else {
                debug!(switch = UNBUFFERED_IO.token, "unsupported by target, ignored");
            }
        }
        self.efs_raw_mode |= flags.take_flag(&EFS_RAW_MODE);
        if let Some(value) = take_text(flags, &COPY_FLAGS) {
            self.copy_flags = value;
        }
        self.copy_with_security |= flags.take_flag(&COPY_WITH_SECURITY);
        self.copy_all |= flags.take_flag(&COPY_ALL);
        self.remove_file_information |= flags.take_flag(&REMOVE_FILE_INFORMATION);
        self.fix_file_security |= flags.take_flag(&FIX_FILE_SECURITY);
        self.fix_file_times |= flags.take_flag(&FIX_FILE_TIMES);
        self.purge |= flags.take_flag(&PURGE);
        self.mirror |= flags.take_flag(&MIRROR);
        self.move_files |= flags.take_flag(&MOVE_FILES);
        self.move_files_and_directories |= flags.take_flag(&MOVE_FILES_AND_DIRECTORIES);
        if let Some(value) = take_text(flags, &ADD_ATTRIBUTES) {
            self.set_attributes_add(&value);
        }
        if let Some(value) = take_text(flags, &REMOVE_ATTRIBUTES) {
            self.set_attributes_remove(&value);
        }
        self.create_directory_and_file_tree |= flags.take_flag(&CREATE_TREE);
        self.fat_files |= flags.take_flag(&FAT_FILES);
        self.long_path_off |= flags.take_flag(&LONG_PATH_OFF);
        if let Some(n) = take_number(flags, &MONITOR_CHANGES) {
            self.monitor_changes = n;
        }
        if let Some(n) = take_number(flags, &MONITOR_MINUTES) {
            self.monitor_minutes = n;
        }
        if let Some(value) = take_text(flags, &RUN_HOURS) {
            if let Err(error) = self.set_run_hours(&value) {
                warn!(%error, "keeping previous run hours");
            }
        }
        self.check_per_file |= flags.take_flag(&CHECK_PER_FILE);
        if let Some(n) = take_number(flags, &INTER_PACKET_GAP) {
            self.inter_packet_gap = n;
        }
        self.copy_symbolic_link |= flags.take_flag(&COPY_SYMBOLIC_LINK);
        if let Some(raw) = flags.take_value(&THREADS) {
            let threads = if raw.is_empty() {
                Some(DEFAULT_THREADS)
            } else {
                parse_number(&THREADS, &raw)
            };
            match threads {
                Some(_) if !caps.multithreading => {
                    debug!(switch = THREADS.token, "unsupported by target, ignored");
                }
                Some(threads) => {
                    if let Err(error) = self.set_threads(threads) {
                        warn!(%error, "keeping previous thread count");
                    }
                }
                None => {}
            }
        }
        if let Some(value) = take_text(flags, &DIRECTORY_COPY_FLAGS) {
            self.directory_copy_flags = value;
        }
        self.no_directory_info |= flags.take_flag(&NO_DIRECTORY_INFO);
        self.no_offload |= flags.take_flag(&NO_OFFLOAD);
        if flags.take_flag(&NETWORK_COMPRESSION) {
            if caps.network_compression {
                self.network_compression = true;
            } else {
                debug!(switch = NETWORK_COMPRESSION.token, "unsupported by target, ignored");
            }
        }
    }

    pub(crate) fn emit<'a>(&'a self, out: &mut Vec<Emitted<'a>>, caps: &Capabilities) {
        emit_flag(out, &COPY_SUBDIRECTORIES, self.copy_subdirectories);
        emit_flag(out, &COPY_SUBDIRECTORIES_INCLUDING_EMPTY, self.copy_subdirectories_including_empty);
        emit_number(out, &DEPTH, self.depth);
        emit_flag(out, &RESTARTABLE, self.restartable);
        emit_flag(out, &BACKUP_MODE, self.backup_mode);
        emit_flag(out, &RESTARTABLE_WITH_BACKUP_FALLBACK, self.restartable_with_backup_fallback);
        emit_flag(out, &UNBUFFERED_IO, self.unbuffered_io && caps.unbuffered_io);
        emit_flag(out, &EFS_RAW_MODE, self.efs_raw_mode);
        emit_text(out, &COPY_FLAGS, &self.copy_flags);
        emit_flag(out, &COPY_WITH_SECURITY, self.copy_with_security);
        emit_flag(out, &COPY_ALL, self.copy_all);
        emit_flag(out, &REMOVE_FILE_INFORMATION, self.remove_file_information);
        emit_flag(out, &FIX_FILE_SECURITY, self.fix_file_security);
        emit_flag(out, &FIX_FILE_TIMES, self.fix_file_times);
        emit_flag(out, &PURGE, self.purge);
        emit_flag(out, &MIRROR, self.mirror);
        emit_flag(out, &MOVE_FILES, self.move_files);
        emit_flag(out, &MOVE_FILES_AND_DIRECTORIES, self.move_files_and_directories);
        emit_text(out, &ADD_ATTRIBUTES, &self.attributes_add);
        emit_text(out, &REMOVE_ATTRIBUTES, &self.attributes_remove);
        emit_flag(out, &CREATE_TREE, self.create_directory_and_file_tree);
        emit_flag(out, &FAT_FILES, self.fat_files);
        emit_flag(out, &LONG_PATH_OFF, self.long_path_off);
        emit_number(out, &MONITOR_CHANGES, self.monitor_changes);
        emit_number(out, &MONITOR_MINUTES, self.monitor_minutes);
        emit_text(out, &RUN_HOURS, &self.run_hours);
        emit_flag(out, &CHECK_PER_FILE, self.check_per_file);
        emit_number(out, &INTER_PACKET_GAP, self.inter_packet_gap);
        emit_flag(out, &COPY_SYMBOLIC_LINK, self.copy_symbolic_link);
        if caps.multithreading {
            emit_number(out, &THREADS, self.threads);
        }
        emit_text(out, &DIRECTORY_COPY_FLAGS, &self.directory_copy_flags);
        emit_flag(out, &NO_DIRECTORY_INFO, self.no_directory_info);
        emit_flag(out, &NO_OFFLOAD, self.no_offload);
        emit_flag(out, &NETWORK_COMPRESSION, self.network_compression && caps.network_compression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CommandText;

    fn read(text: &str, caps: &Capabilities) -> (CopyOptions, String) {
        let mut options = CopyOptions::default();
        let mut flags = CommandText::new(text);
        options.read_flags(&mut flags, caps);
        (options, flags.into_remainder())
    }

    #[test]
    fn thread_count_bounds() {
        let mut options = CopyOptions::default();
        assert!(options.set_threads(0).is_ok());
        assert!(options.set_threads(128).is_ok());
        assert_eq!(options.threads(), 128);
        assert_eq!(options.set_threads(129), Err(OptionError::ThreadCountOutOfRange(129)));
        assert_eq!(options.threads(), 128);
    }

    #[test]
    fn run_hours_validation() {
        let mut options = CopyOptions::default();
        assert!(options.set_run_hours("0900-1730").is_ok());
        assert!(options.set_run_hours("2400-0100").is_err());
        assert!(options.set_run_hours("9-17").is_err());
        assert!(options.set_run_hours("0960-1000").is_err());
        assert_eq!(options.run_hours(), "0900-1730");
        assert!(options.set_run_hours("").is_ok());
        assert_eq!(options.run_hours(), "");
    }

    #[test]
    fn malformed_run_hours_keep_previous_value_but_are_consumed() {
        let (options, rest) = read("/RH:25:00 /S", &Capabilities::default());
        assert_eq!(options.run_hours(), "");
        assert!(options.copy_subdirectories);
        assert_eq!(rest, "");
    }

    #[test]
    fn bare_mt_means_eight_threads() {
        let (options, _) = read("/MT", &Capabilities::default());
        assert_eq!(options.threads(), DEFAULT_THREADS);

        let (options, rest) = read("/MT:200 /MIR", &Capabilities::default());
        assert_eq!(options.threads(), 0);
        assert!(options.mirror);
        assert_eq!(rest, "");
    }

    #[test]
    fn unparseable_numbers_leave_defaults() {
        let (options, rest) = read("/LEV:deep /IPG:10", &Capabilities::default());
        assert_eq!(options.depth, 0);
        assert_eq!(options.inter_packet_gap, 10);
        assert_eq!(rest, "");
    }

    #[test]
    fn gated_switches_are_consumed_without_capability() {
        let (options, rest) = read("/J /MT:4 /COMPRESS", &Capabilities::legacy());
        assert!(!options.unbuffered_io);
        assert_eq!(options.threads(), 0);
        assert!(!options.network_compression);
        assert_eq!(rest, "");
    }

    #[test]
    fn mirror_and_move_stay_independent() {
        let (options, _) = read("/MOVE /MOV /MIR", &Capabilities::default());
        assert!(options.move_files && options.move_files_and_directories && options.mirror);
        assert!(!options.purge && !options.copy_subdirectories_including_empty);
    }

    #[test]
    fn action_flags_expand_into_fields() {
        let mut options = CopyOptions::default();
        options.apply_action_flags(CopyActionFlags::MIRROR | CopyActionFlags::MOVE_FILES);
        assert!(options.mirror && options.move_files);
        assert!(!options.purge);
        assert_eq!(options.action_flags(), CopyActionFlags::MIRROR | CopyActionFlags::MOVE_FILES);
    }

    #[test]
    fn copy_letters_are_kept_as_written() {
        let (options, _) = read("/COPY:dat /DCOPY:Da", &Capabilities::default());
        assert_eq!(options.copy_flags, "dat");
        assert_eq!(options.directory_copy_flags, "Da");
    }

    #[test]
    fn attributes_are_filtered() {
        let (options, _) = read("/A+:rz /A-:SHX", &Capabilities::default());
        assert_eq!(options.attributes_add(), "R");
        assert_eq!(options.attributes_remove(), "SH");
    }
}
