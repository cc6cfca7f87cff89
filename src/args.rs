//! Structured copy-job model.
//!
//! A [`CopyJob`] is five flat option groups. Each group knows how to read
//! itself from a [`FlagSource`] and how to print itself back in canonical
//! order; the grammar table in [`crate::grammar`] is the single list of
//! switches both directions agree on.

mod copy;
mod job;
mod logging;
mod retry;
mod selection;

use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extract::FlagSource;
use crate::grammar::Switch;
use crate::serialize::Emitted;

pub use copy::CopyOptions;
pub use job::JobOptions;
pub use logging::LoggingOptions;
pub use retry::RetryOptions;
pub use selection::SelectionOptions;

/// A complete copy job: paths plus every option group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyJob {
    pub copy: CopyOptions,
    pub selection: SelectionOptions,
    pub logging: LoggingOptions,
    pub retry: RetryOptions,
    pub job: JobOptions,
}

impl CopyJob {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        let mut job = CopyJob::default();
        job.copy.source = source.into();
        job.copy.destination = destination.into();
        job
    }

    /// Runs every group builder against `flags` in canonical order.
    pub(crate) fn read_flags(&mut self, flags: &mut dyn FlagSource, caps: &Capabilities) {
        self.copy.read_flags(flags, caps);
        self.selection.read_flags(flags);
        self.logging.read_flags(flags);
        self.retry.read_flags(flags);
        self.job.read_flags(flags);
    }

    /// Every switch of the job in canonical order, positionals excluded.
    pub(crate) fn emit<'a>(&'a self, caps: &Capabilities) -> Vec<Emitted<'a>> {
        let mut out = Vec::new();
        self.copy.emit(&mut out, caps);
        self.selection.emit(&mut out);
        self.logging.emit(&mut out);
        self.retry.emit(&mut out);
        self.job.emit(&mut out);
        out
    }
}

/// Version-gated switches the target copy tool understands.
///
/// Builders still consume an unsupported switch but leave its field unset;
/// the serializer never prints one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// `/COMPRESS`
    pub network_compression: bool,
    /// `/J`
    pub unbuffered_io: bool,
    /// `/MT`
    pub multithreading: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            network_compression: true,
            unbuffered_io: true,
            multithreading: true,
        }
    }
}

impl Capabilities {
    /// A tool that predates every gated switch.
    pub fn legacy() -> Self {
        Capabilities {
            network_compression: false,
            unbuffered_io: false,
            multithreading: false,
        }
    }
}

macro_rules! bit_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $flag:ident = $bit:expr,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            pub const NONE: $name = $name(0);
            $($(#[$fmeta])* pub const $flag: $name = $name(1 << $bit);)*

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }
    };
}

bit_set! {
    /// Shortcut for the copy actions that usually travel together.
    CopyActionFlags {
        COPY_SUBDIRECTORIES = 0,
        COPY_SUBDIRECTORIES_INCLUDING_EMPTY = 1,
        CREATE_DIRECTORY_AND_FILE_TREE = 2,
        PURGE = 3,
        MIRROR = 4,
        MOVE_FILES = 5,
        MOVE_FILES_AND_DIRECTORIES = 6,
    }
}

bit_set! {
    /// Shortcut for the file classes a selection includes or excludes.
    SelectionFlags {
        EXCLUDE_CHANGED = 0,
        EXCLUDE_EXTRA = 1,
        EXCLUDE_LONELY = 2,
        EXCLUDE_NEWER = 3,
        EXCLUDE_OLDER = 4,
        INCLUDE_SAME = 5,
        INCLUDE_TWEAKED = 6,
        EXCLUDE_JUNCTION_POINTS = 7,
        EXCLUDE_DIRECTORY_JUNCTION_POINTS = 8,
        EXCLUDE_FILE_JUNCTION_POINTS = 9,
    }
}

/// Letters accepted by the attribute switches (`/A+`, `/A-`, `/IA`, `/XA`).
pub const FILE_ATTRIBUTES: &str = "RASHCNETO";

/// Upper-cases `value` and keeps each accepted attribute letter once.
pub(crate) fn filter_attributes(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars().map(|c| c.to_ascii_uppercase()) {
        if FILE_ATTRIBUTES.contains(ch) && !out.contains(ch) {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn parse_number<T: FromStr>(switch: &Switch, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(switch = switch.token, value = raw, "ignoring unparseable number");
            None
        }
    }
}

pub(crate) fn take_number<T: FromStr>(flags: &mut dyn FlagSource, switch: &Switch) -> Option<T> {
    flags.take_value(switch).and_then(|raw| parse_number(switch, &raw))
}

/// Non-empty value of a delimited switch.
pub(crate) fn take_text(flags: &mut dyn FlagSource, switch: &Switch) -> Option<String> {
    flags.take_value(switch).filter(|v| !v.is_empty())
}

pub(crate) fn emit_flag<'a>(out: &mut Vec<Emitted<'a>>, switch: &'static Switch, on: bool) {
    if on {
        out.push(Emitted::Flag(switch));
    }
}

pub(crate) fn emit_text<'a>(out: &mut Vec<Emitted<'a>>, switch: &'static Switch, value: &str) {
    if !value.is_empty() {
        out.push(Emitted::Value(switch, value.to_string()));
    }
}

/// Zero means "not set" for every number except the retry pair.
pub(crate) fn emit_number<'a, T>(out: &mut Vec<Emitted<'a>>, switch: &'static Switch, value: T)
where
    T: Copy + Default + PartialEq + ToString,
{
    if value != T::default() {
        out.push(Emitted::Value(switch, value.to_string()));
    }
}

pub(crate) fn emit_list<'a>(out: &mut Vec<Emitted<'a>>, switch: &'static Switch, values: &'a [String]) {
    if !values.is_empty() {
        out.push(Emitted::List(switch, values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_filter_drops_unknown_letters() {
        assert_eq!(filter_attributes("rshq"), "RSH");
        assert_eq!(filter_attributes("RRAX1"), "RA");
        assert_eq!(filter_attributes(""), "");
    }

    #[test]
    fn bit_sets_combine() {
        let flags = CopyActionFlags::MIRROR | CopyActionFlags::COPY_SUBDIRECTORIES;
        assert!(flags.contains(CopyActionFlags::MIRROR));
        assert!(!flags.contains(CopyActionFlags::PURGE));
        assert!(CopyActionFlags::NONE.is_empty());

        let mut selection = SelectionFlags::NONE;
        selection |= SelectionFlags::EXCLUDE_OLDER;
        assert_eq!(selection.bits(), 1 << 4);
    }

    #[test]
    fn legacy_capabilities_support_nothing_gated() {
        let caps = Capabilities::legacy();
        assert!(!caps.network_compression && !caps.unbuffered_io && !caps.multithreading);
        assert!(Capabilities::default().multithreading);
    }
}
