use serde::{Deserialize, Serialize};

use super::{emit_flag, emit_list, emit_number, emit_text, filter_attributes, take_number, take_text, SelectionFlags};
use crate::extract::FlagSource;
use crate::grammar::*;
use crate::serialize::Emitted;

/// Which files and directories take part in the copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    pub only_copy_archive_files: bool,
    pub only_copy_archive_files_and_reset_archive_flag: bool,
    include_attributes: String,
    exclude_attributes: String,
    pub excluded_files: Vec<String>,
    pub excluded_directories: Vec<String>,
    pub exclude_changed: bool,
    pub exclude_newer: bool,
    pub exclude_older: bool,
    pub exclude_extra: bool,
    pub exclude_lonely: bool,
    pub include_same: bool,
    pub include_tweaked: bool,
    pub include_modified: bool,
    /// Bytes, 0 when unbounded.
    pub max_file_size: u64,
    /// Bytes, 0 when unbounded.
    pub min_file_size: u64,
    /// Either a day count or a `YYYYMMDD` date; kept as written.
    pub max_file_age: String,
    pub min_file_age: String,
    pub max_last_access_date: String,
    pub min_last_access_date: String,
    pub exclude_junction_points: bool,
    pub use_fat_file_times: bool,
    pub compensate_for_dst_difference: bool,
    pub exclude_directory_junction_points: bool,
    pub exclude_file_junction_points: bool,
}

impl SelectionOptions {
    pub fn include_attributes(&self) -> &str {
        &self.include_attributes
    }

    pub fn set_include_attributes(&mut self, value: &str) {
        self.include_attributes = filter_attributes(value);
    }

    pub fn exclude_attributes(&self) -> &str {
        &self.exclude_attributes
    }

    pub fn set_exclude_attributes(&mut self, value: &str) {
        self.exclude_attributes = filter_attributes(value);
    }

    pub fn selection_flags(&self) -> SelectionFlags {
        let mut flags = SelectionFlags::NONE;
        for (on, flag) in self.flag_pairs() {
            if on {
                flags |= flag;
            }
        }
        flags
    }

    pub fn apply_selection_flags(&mut self, flags: SelectionFlags) {
        self.exclude_changed |= flags.contains(SelectionFlags::EXCLUDE_CHANGED);
        self.exclude_extra |= flags.contains(SelectionFlags::EXCLUDE_EXTRA);
        self.exclude_lonely |= flags.contains(SelectionFlags::EXCLUDE_LONELY);
        self.exclude_newer |= flags.contains(SelectionFlags::EXCLUDE_NEWER);
        self.exclude_older |= flags.contains(SelectionFlags::EXCLUDE_OLDER);
        self.include_same |= flags.contains(SelectionFlags::INCLUDE_SAME);
        self.include_tweaked |= flags.contains(SelectionFlags::INCLUDE_TWEAKED);
        self.exclude_junction_points |= flags.contains(SelectionFlags::EXCLUDE_JUNCTION_POINTS);
        self.exclude_directory_junction_points |= flags.contains(SelectionFlags::EXCLUDE_DIRECTORY_JUNCTION_POINTS);
        self.exclude_file_junction_points |= flags.contains(SelectionFlags::EXCLUDE_FILE_JUNCTION_POINTS);
    }

    fn flag_pairs(&self) -> [(bool, SelectionFlags); 10] {
        [
            (self.exclude_changed, SelectionFlags::EXCLUDE_CHANGED),
            (self.exclude_extra, SelectionFlags::EXCLUDE_EXTRA),
            (self.exclude_lonely, SelectionFlags::EXCLUDE_LONELY),
            (self.exclude_newer, SelectionFlags::EXCLUDE_NEWER),
            (self.exclude_older, SelectionFlags::EXCLUDE_OLDER),
            (self.include_same, SelectionFlags::INCLUDE_SAME),
            (self.include_tweaked, SelectionFlags::INCLUDE_TWEAKED),
            (self.exclude_junction_points, SelectionFlags::EXCLUDE_JUNCTION_POINTS),
            (self.exclude_directory_junction_points, SelectionFlags::EXCLUDE_DIRECTORY_JUNCTION_POINTS),
            (self.exclude_file_junction_points, SelectionFlags::EXCLUDE_FILE_JUNCTION_POINTS),
        ]
    }

    pub(crate) fn read_flags(&mut self, flags: &mut dyn FlagSource) {
        self.only_copy_archive_files |= flags.take_flag(&ONLY_ARCHIVE);
        self.only_copy_archive_files_and_reset_archive_flag |= flags.take_flag(&ONLY_ARCHIVE_AND_RESET);
        if let Some(value) = take_text(flags, &INCLUDE_ATTRIBUTES) {
            self.set_include_attributes(&value);
        }
        if let Some(value) = take_text(flags, &EXCLUDE_ATTRIBUTES) {
            self.set_exclude_attributes(&value);
        }
        self.excluded_files.extend(flags.take_list(&EXCLUDED_FILES));
        self.excluded_directories.extend(flags.take_list(&EXCLUDED_DIRECTORIES));
        self.exclude_changed |= flags.take_flag(&EXCLUDE_CHANGED);
        self.exclude_newer |= flags.take_flag(&EXCLUDE_NEWER);
        self.exclude_older |= flags.take_flag(&EXCLUDE_OLDER);
        self.exclude_extra |= flags.take_flag(&EXCLUDE_EXTRA);
        self.exclude_lonely |= flags.take_flag(&EXCLUDE_LONELY);
        self.include_same |= flags.take_flag(&INCLUDE_SAME);
        self.include_tweaked |= flags.take_flag(&INCLUDE_TWEAKED);
        self.include_modified |= flags.take_flag(&INCLUDE_MODIFIED);
        if let Some(n) = take_number(flags, &MAX_FILE_SIZE) {
            self.max_file_size = n;
        }
        if let Some(n) = take_number(flags, &MIN_FILE_SIZE) {
            self.min_file_size = n;
        }
        if let Some(value) = take_text(flags, &MAX_FILE_AGE) {
            self.max_file_age = value;
        }
        if let Some(value) = take_text(flags, &MIN_FILE_AGE) {
            self.min_file_age = value;
        }
        if let Some(value) = take_text(flags, &MAX_LAST_ACCESS_DATE) {
            self.max_last_access_date = value;
        }
        if let Some(value) = take_text(flags, &MIN_LAST_ACCESS_DATE) {
            self.min_last_access_date = value;
        }
        self.exclude_junction_points |= flags.take_flag(&EXCLUDE_JUNCTION_POINTS);
        self.use_fat_file_times |= flags.take_flag(&USE_FAT_FILE_TIMES);
        self.compensate_for_dst_difference |= flags.take_flag(&COMPENSATE_FOR_DST);
        self.exclude_directory_junction_points |= flags.take_flag(&EXCLUDE_DIRECTORY_JUNCTION_POINTS);
        self.exclude_file_junction_points |= flags.take_flag(&EXCLUDE_FILE_JUNCTION_POINTS);
    }

    pub(crate) fn emit<'a>(&'a self, out: &mut Vec<Emitted<'a>>) {
        emit_flag(out, &ONLY_ARCHIVE, self.only_copy_archive_files);
        emit_flag(out, &ONLY_ARCHIVE_AND_RESET, self.only_copy_archive_files_and_reset_archive_flag);
        emit_text(out, &INCLUDE_ATTRIBUTES, &self.include_attributes);
        emit_text(out, &EXCLUDE_ATTRIBUTES, &self.exclude_attributes);
        emit_list(out, &EXCLUDED_FILES, &self.excluded_files);
        emit_list(out, &EXCLUDED_DIRECTORIES, &self.excluded_directories);
        emit_flag(out, &EXCLUDE_CHANGED, self.exclude_changed);
        emit_flag(out, &EXCLUDE_NEWER, self.exclude_newer);
        emit_flag(out, &EXCLUDE_OLDER, self.exclude_older);
        emit_flag(out, &EXCLUDE_EXTRA, self.exclude_extra);
        emit_flag(out, &EXCLUDE_LONELY, self.exclude_lonely);
        emit_flag(out, &INCLUDE_SAME, self.include_same);
        emit_flag(out, &INCLUDE_TWEAKED, self.include_tweaked);
        emit_flag(out, &INCLUDE_MODIFIED, self.include_modified);
        emit_number(out, &MAX_FILE_SIZE, self.max_file_size);
        emit_number(out, &MIN_FILE_SIZE, self.min_file_size);
        emit_text(out, &MAX_FILE_AGE, &self.max_file_age);
        emit_text(out, &MIN_FILE_AGE, &self.min_file_age);
        emit_text(out, &MAX_LAST_ACCESS_DATE, &self.max_last_access_date);
        emit_text(out, &MIN_LAST_ACCESS_DATE, &self.min_last_access_date);
        emit_flag(out, &EXCLUDE_JUNCTION_POINTS, self.exclude_junction_points);
        emit_flag(out, &USE_FAT_FILE_TIMES, self.use_fat_file_times);
        emit_flag(out, &COMPENSATE_FOR_DST, self.compensate_for_dst_difference);
        emit_flag(out, &EXCLUDE_DIRECTORY_JUNCTION_POINTS, self.exclude_directory_junction_points);
        emit_flag(out, &EXCLUDE_FILE_JUNCTION_POINTS, self.exclude_file_junction_points);
    }
}
