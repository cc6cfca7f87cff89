use serde::{Deserialize, Serialize};

use super::{emit_flag, emit_text, take_text};
use crate::extract::FlagSource;
use crate::grammar::*;
use crate::serialize::Emitted;

/// Switches that load, save or trim saved jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    /// `/JOB:` job to take parameters from.
    pub load_job: String,
    /// `/SAVE:` job to write parameters to.
    pub save_job: String,
    pub quit_after_processing: bool,
    pub no_source_directory: bool,
    pub no_destination_directory: bool,
}

impl JobOptions {
    pub(crate) fn read_flags(&mut self, flags: &mut dyn FlagSource) {
        if let Some(name) = take_text(flags, &JOB_NAME) {
            self.load_job = name;
        }
        if let Some(name) = take_text(flags, &SAVE_JOB) {
            self.save_job = name;
        }
        self.quit_after_processing |= flags.take_flag(&QUIT_AFTER_PROCESSING);
        self.no_source_directory |= flags.take_flag(&NO_SOURCE_DIRECTORY);
        self.no_destination_directory |= flags.take_flag(&NO_DESTINATION_DIRECTORY);
    }

    pub(crate) fn emit<'a>(&'a self, out: &mut Vec<Emitted<'a>>) {
        emit_text(out, &JOB_NAME, &self.load_job);
        emit_text(out, &SAVE_JOB, &self.save_job);
        emit_flag(out, &QUIT_AFTER_PROCESSING, self.quit_after_processing);
        emit_flag(out, &NO_SOURCE_DIRECTORY, self.no_source_directory);
        emit_flag(out, &NO_DESTINATION_DIRECTORY, self.no_destination_directory);
    }
}
