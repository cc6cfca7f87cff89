use serde::{Deserialize, Serialize};

use super::{emit_flag, take_number};
use crate::extract::FlagSource;
use crate::grammar::*;
use crate::serialize::Emitted;

/// Retries on failed copies. Count and wait are always printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryOptions {
    pub retry_count: u32,
    /// Seconds between retries.
    pub retry_wait_time: u32,
    pub save_to_registry: bool,
    pub wait_for_share_names: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        RetryOptions {
            retry_count: 1_000_000,
            retry_wait_time: 30,
            save_to_registry: false,
            wait_for_share_names: false,
        }
    }
}

impl RetryOptions {
    pub(crate) fn read_flags(&mut self, flags: &mut dyn FlagSource) {
        if let Some(n) = take_number(flags, &RETRY_COUNT) {
            self.retry_count = n;
        }
        if let Some(n) = take_number(flags, &RETRY_WAIT_TIME) {
            self.retry_wait_time = n;
        }
        self.save_to_registry |= flags.take_flag(&SAVE_TO_REGISTRY);
        self.wait_for_share_names |= flags.take_flag(&WAIT_FOR_SHARE_NAMES);
    }

    pub(crate) fn emit<'a>(&'a self, out: &mut Vec<Emitted<'a>>) {
        out.push(Emitted::Value(&RETRY_COUNT, self.retry_count.to_string()));
        out.push(Emitted::Value(&RETRY_WAIT_TIME, self.retry_wait_time.to_string()));
        emit_flag(out, &SAVE_TO_REGISTRY, self.save_to_registry);
        emit_flag(out, &WAIT_FOR_SHARE_NAMES, self.wait_for_share_names);
    }
}
