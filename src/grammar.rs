//! Flag grammar table.
//!
//! Every switch the parser recognizes is declared here exactly once, together
//! with the shape of its value and the option group it belongs to. The order
//! of [`TABLE`] is the canonical print order: the serializer walks the option
//! groups in the same order and a unit test keeps both in sync.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// How a switch carries its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Present or absent, e.g. `/MIR`.
    Boolean,
    /// Switch followed by `:` and a free-form value, e.g. `/COPY:DAT`.
    Delimited,
    /// Switch followed by `:` and an integer, e.g. `/R:3`.
    Numeric,
    /// Switch followed by one or more values, may repeat, e.g. `/XF a b`.
    MultiInstance,
}

/// Option group a switch is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Copy,
    Selection,
    Logging,
    Retry,
    Job,
    /// Only meaningful inside job files (`/SD`, `/DD`, `/IF`).
    JobFile,
}

/// One grammar entry.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Switch {
    pub token: &'static str,
    pub shape: Shape,
    pub group: Group,
}

impl Switch {
    const fn new(token: &'static str, shape: Shape, group: Group) -> Self {
        Self { token, shape, group }
    }

    /// Canonical text for this switch carrying `value`.
    ///
    /// Values are written verbatim; quoting is the caller's concern because
    /// the command line and job file forms quote differently.
    pub fn render(&self, value: &str) -> String {
        match self.shape {
            Shape::Boolean => self.token.to_string(),
            Shape::Delimited | Shape::Numeric => format!("{}:{}", self.token, value),
            Shape::MultiInstance => format!("{} {}", self.token, value),
        }
    }

    /// Case-insensitive comparison against a bare switch token such as `/xf`.
    pub fn is(&self, token: &str) -> bool {
        if self.token.eq_ignore_ascii_case(token) {
            return true;
        }
        self.shape == Shape::Boolean
            && token
                .strip_suffix('-')
                .is_some_and(|t| self.token.eq_ignore_ascii_case(t))
    }

    pub(crate) fn patterns(&self) -> &'static SwitchPatterns {
        &PATTERNS[self.token]
    }
}

macro_rules! switches {
    ($($name:ident = $token:literal, $shape:ident, $group:ident;)*) => {
        $(pub static $name: Switch = Switch::new($token, Shape::$shape, Group::$group);)*
    };
}

switches! {
    // copy
    COPY_SUBDIRECTORIES = "/S", Boolean, Copy;
    COPY_SUBDIRECTORIES_INCLUDING_EMPTY = "/E", Boolean, Copy;
    DEPTH = "/LEV", Numeric, Copy;
    RESTARTABLE = "/Z", Boolean, Copy;
    BACKUP_MODE = "/B", Boolean, Copy;
    RESTARTABLE_WITH_BACKUP_FALLBACK = "/ZB", Boolean, Copy;
    UNBUFFERED_IO = "/J", Boolean, Copy;
    EFS_RAW_MODE = "/EFSRAW", Boolean, Copy;
    COPY_FLAGS = "/COPY", Delimited, Copy;
    COPY_WITH_SECURITY = "/SEC", Boolean, Copy;
    COPY_ALL = "/COPYALL", Boolean, Copy;
    REMOVE_FILE_INFORMATION = "/NOCOPY", Boolean, Copy;
    FIX_FILE_SECURITY = "/SECFIX", Boolean, Copy;
    FIX_FILE_TIMES = "/TIMFIX", Boolean, Copy;
    PURGE = "/PURGE", Boolean, Copy;
    MIRROR = "/MIR", Boolean, Copy;
    MOVE_FILES = "/MOV", Boolean, Copy;
    MOVE_FILES_AND_DIRECTORIES = "/MOVE", Boolean, Copy;
    ADD_ATTRIBUTES = "/A+", Delimited, Copy;
    REMOVE_ATTRIBUTES = "/A-", Delimited, Copy;
    CREATE_TREE = "/CREATE", Boolean, Copy;
    FAT_FILES = "/FAT", Boolean, Copy;
    LONG_PATH_OFF = "/256", Boolean, Copy;
    MONITOR_CHANGES = "/MON", Numeric, Copy;
    MONITOR_MINUTES = "/MOT", Numeric, Copy;
    RUN_HOURS = "/RH", Delimited, Copy;
    CHECK_PER_FILE = "/PF", Boolean, Copy;
    INTER_PACKET_GAP = "/IPG", Numeric, Copy;
    COPY_SYMBOLIC_LINK = "/SL", Boolean, Copy;
    THREADS = "/MT", Numeric, Copy;
    DIRECTORY_COPY_FLAGS = "/DCOPY", Delimited, Copy;
    NO_DIRECTORY_INFO = "/NODCOPY", Boolean, Copy;
    NO_OFFLOAD = "/NOOFFLOAD", Boolean, Copy;
    NETWORK_COMPRESSION = "/COMPRESS", Boolean, Copy;

    // selection
    ONLY_ARCHIVE = "/A", Boolean, Selection;
    ONLY_ARCHIVE_AND_RESET = "/M", Boolean, Selection;
    INCLUDE_ATTRIBUTES = "/IA", Delimited, Selection;
    EXCLUDE_ATTRIBUTES = "/XA", Delimited, Selection;
    EXCLUDED_FILES = "/XF", MultiInstance, Selection;
    EXCLUDED_DIRECTORIES = "/XD", MultiInstance, Selection;
    EXCLUDE_CHANGED = "/XC", Boolean, Selection;
    EXCLUDE_NEWER = "/XN", Boolean, Selection;
    EXCLUDE_OLDER = "/XO", Boolean, Selection;
    EXCLUDE_EXTRA = "/XX", Boolean, Selection;
    EXCLUDE_LONELY = "/XL", Boolean, Selection;
    INCLUDE_SAME = "/IS", Boolean, Selection;
    INCLUDE_TWEAKED = "/IT", Boolean, Selection;
    INCLUDE_MODIFIED = "/IM", Boolean, Selection;
    MAX_FILE_SIZE = "/MAX", Numeric, Selection;
    MIN_FILE_SIZE = "/MIN", Numeric, Selection;
    MAX_FILE_AGE = "/MAXAGE", Delimited, Selection;
    MIN_FILE_AGE = "/MINAGE", Delimited, Selection;
    MAX_LAST_ACCESS_DATE = "/MAXLAD", Delimited, Selection;
    MIN_LAST_ACCESS_DATE = "/MINLAD", Delimited, Selection;
    EXCLUDE_JUNCTION_POINTS = "/XJ", Boolean, Selection;
    USE_FAT_FILE_TIMES = "/FFT", Boolean, Selection;
    COMPENSATE_FOR_DST = "/DST", Boolean, Selection;
    EXCLUDE_DIRECTORY_JUNCTION_POINTS = "/XJD", Boolean, Selection;
    EXCLUDE_FILE_JUNCTION_POINTS = "/XJF", Boolean, Selection;

    // logging
    LIST_ONLY = "/L", Boolean, Logging;
    REPORT_EXTRA_FILES = "/X", Boolean, Logging;
    VERBOSE_OUTPUT = "/V", Boolean, Logging;
    INCLUDE_SOURCE_TIMESTAMPS = "/TS", Boolean, Logging;
    INCLUDE_FULL_PATH_NAMES = "/FP", Boolean, Logging;
    PRINT_SIZES_AS_BYTES = "/BYTES", Boolean, Logging;
    NO_FILE_SIZES = "/NS", Boolean, Logging;
    NO_FILE_CLASSES = "/NC", Boolean, Logging;
    NO_FILE_LIST = "/NFL", Boolean, Logging;
    NO_DIRECTORY_LIST = "/NDL", Boolean, Logging;
    NO_PROGRESS = "/NP", Boolean, Logging;
    SHOW_ETA = "/ETA", Boolean, Logging;
    LOG_PATH = "/LOG", Delimited, Logging;
    APPEND_LOG_PATH = "/LOG+", Delimited, Logging;
    UNICODE_LOG_PATH = "/UNILOG", Delimited, Logging;
    APPEND_UNICODE_LOG_PATH = "/UNILOG+", Delimited, Logging;
    OUTPUT_TO_CONSOLE_AND_LOG = "/TEE", Boolean, Logging;
    NO_JOB_HEADER = "/NJH", Boolean, Logging;
    NO_JOB_SUMMARY = "/NJS", Boolean, Logging;
    OUTPUT_AS_UNICODE = "/UNICODE", Boolean, Logging;

    // retry
    RETRY_COUNT = "/R", Numeric, Retry;
    RETRY_WAIT_TIME = "/W", Numeric, Retry;
    SAVE_TO_REGISTRY = "/REG", Boolean, Retry;
    WAIT_FOR_SHARE_NAMES = "/TBD", Boolean, Retry;

    // job
    JOB_NAME = "/JOB", Delimited, Job;
    SAVE_JOB = "/SAVE", Delimited, Job;
    QUIT_AFTER_PROCESSING = "/QUIT", Boolean, Job;
    NO_SOURCE_DIRECTORY = "/NOSD", Boolean, Job;
    NO_DESTINATION_DIRECTORY = "/NODD", Boolean, Job;

    // job file only
    SOURCE_DIRECTORY = "/SD", Delimited, JobFile;
    DESTINATION_DIRECTORY = "/DD", Delimited, JobFile;
    INCLUDE_FILES = "/IF", MultiInstance, JobFile;
}

/// Command line switches in canonical print order.
pub static TABLE: &[&Switch] = &[
    &COPY_SUBDIRECTORIES,
    &COPY_SUBDIRECTORIES_INCLUDING_EMPTY,
    &DEPTH,
    &RESTARTABLE,
    &BACKUP_MODE,
    &RESTARTABLE_WITH_BACKUP_FALLBACK,
    &UNBUFFERED_IO,
    &EFS_RAW_MODE,
    &COPY_FLAGS,
    &COPY_WITH_SECURITY,
    &COPY_ALL,
    &REMOVE_FILE_INFORMATION,
    &FIX_FILE_SECURITY,
    &FIX_FILE_TIMES,
    &PURGE,
    &MIRROR,
    &MOVE_FILES,
    &MOVE_FILES_AND_DIRECTORIES,
    &ADD_ATTRIBUTES,
    &REMOVE_ATTRIBUTES,
    &CREATE_TREE,
    &FAT_FILES,
    &LONG_PATH_OFF,
    &MONITOR_CHANGES,
    &MONITOR_MINUTES,
    &RUN_HOURS,
    &CHECK_PER_FILE,
    &INTER_PACKET_GAP,
    &COPY_SYMBOLIC_LINK,
    &THREADS,
    &DIRECTORY_COPY_FLAGS,
    &NO_DIRECTORY_INFO,
    &NO_OFFLOAD,
    &NETWORK_COMPRESSION,
    &ONLY_ARCHIVE,
    &ONLY_ARCHIVE_AND_RESET,
    &INCLUDE_ATTRIBUTES,
    &EXCLUDE_ATTRIBUTES,
    &EXCLUDED_FILES,
    &EXCLUDED_DIRECTORIES,
    &EXCLUDE_CHANGED,
    &EXCLUDE_NEWER,
    &EXCLUDE_OLDER,
    &EXCLUDE_EXTRA,
    &EXCLUDE_LONELY,
    &INCLUDE_SAME,
    &INCLUDE_TWEAKED,
    &INCLUDE_MODIFIED,
    &MAX_FILE_SIZE,
    &MIN_FILE_SIZE,
    &MAX_FILE_AGE,
    &MIN_FILE_AGE,
    &MAX_LAST_ACCESS_DATE,
    &MIN_LAST_ACCESS_DATE,
    &EXCLUDE_JUNCTION_POINTS,
    &USE_FAT_FILE_TIMES,
    &COMPENSATE_FOR_DST,
    &EXCLUDE_DIRECTORY_JUNCTION_POINTS,
    &EXCLUDE_FILE_JUNCTION_POINTS,
    &LIST_ONLY,
    &REPORT_EXTRA_FILES,
    &VERBOSE_OUTPUT,
    &INCLUDE_SOURCE_TIMESTAMPS,
    &INCLUDE_FULL_PATH_NAMES,
    &PRINT_SIZES_AS_BYTES,
    &NO_FILE_SIZES,
    &NO_FILE_CLASSES,
    &NO_FILE_LIST,
    &NO_DIRECTORY_LIST,
    &NO_PROGRESS,
    &SHOW_ETA,
    &LOG_PATH,
    &APPEND_LOG_PATH,
    &UNICODE_LOG_PATH,
    &APPEND_UNICODE_LOG_PATH,
    &OUTPUT_TO_CONSOLE_AND_LOG,
    &NO_JOB_HEADER,
    &NO_JOB_SUMMARY,
    &OUTPUT_AS_UNICODE,
    &RETRY_COUNT,
    &RETRY_WAIT_TIME,
    &SAVE_TO_REGISTRY,
    &WAIT_FOR_SHARE_NAMES,
    &JOB_NAME,
    &SAVE_JOB,
    &QUIT_AFTER_PROCESSING,
    &NO_SOURCE_DIRECTORY,
    &NO_DESTINATION_DIRECTORY,
];

/// Switches that only appear in job files.
pub static JOB_FILE_SWITCHES: &[&Switch] = &[&SOURCE_DIRECTORY, &DESTINATION_DIRECTORY, &INCLUDE_FILES];

fn all_switches() -> impl Iterator<Item = &'static Switch> {
    TABLE.iter().chain(JOB_FILE_SWITCHES).copied()
}

/// Resolves a raw token (`/lev:3`, `/MIR`, `/E-`) to its grammar entry.
pub fn lookup(raw: &str) -> Option<&'static Switch> {
    if !raw.starts_with('/') {
        return None;
    }
    let token = match raw.find(':') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    all_switches()
        .find(|s| s.token.eq_ignore_ascii_case(token))
        .or_else(|| all_switches().find(|s| s.is(token)))
}

/// Compiled search patterns for one switch.
pub(crate) struct SwitchPatterns {
    /// The switch on its own, captured as `sw`. A valued switch may keep
    /// its `:` with nothing after it.
    pub bare: Regex,
    /// The switch with a delimiter and value, captured as `sw` and `val`.
    pub valued: Option<Regex>,
}

static PATTERNS: Lazy<HashMap<&'static str, SwitchPatterns>> = Lazy::new(|| {
    all_switches()
        .map(|switch| (switch.token, compile(switch)))
        .collect()
});

fn compile(switch: &Switch) -> SwitchPatterns {
    let token = regex::escape(switch.token);
    let bare = match switch.shape {
        Shape::Boolean => format!(r"(?i)(?:^|\s)(?P<sw>{token}-?)(?:\s|$)"),
        Shape::MultiInstance => format!(r"(?i)(?:^|\s)(?P<sw>{token})(?::|\s|$)"),
        Shape::Delimited | Shape::Numeric => format!(r"(?i)(?:^|\s)(?P<sw>{token}:?)(?:\s|$)"),
    };
    let valued = match switch.shape {
        Shape::Delimited | Shape::Numeric => Some(format!(
            r#"(?i)(?:^|\s)(?P<sw>{token})(?:\s*:\s*|\s+)(?P<val>"[^"]*"|[^\s"/][^\s"]*)"#
        )),
        Shape::Boolean | Shape::MultiInstance => None,
    };
    SwitchPatterns {
        bare: Regex::new(&bare).expect("switch pattern is built from an escaped literal"),
        valued: valued.map(|p| Regex::new(&p).expect("switch pattern is built from an escaped literal")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_token_is_declared_once() {
        let mut seen = HashSet::new();
        for switch in all_switches() {
            assert!(seen.insert(switch.token.to_ascii_uppercase()), "{} declared twice", switch.token);
        }
    }

    #[test]
    fn table_is_grouped_in_print_order() {
        let order = [Group::Copy, Group::Selection, Group::Logging, Group::Retry, Group::Job];
        let ranks: Vec<usize> = TABLE
            .iter()
            .map(|s| order.iter().position(|g| *g == s.group).unwrap())
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        assert!(TABLE.iter().all(|s| s.group != Group::JobFile));
    }

    #[test]
    fn lookup_ignores_case_and_values() {
        assert!(std::ptr::eq(lookup("/lev:3").unwrap(), &DEPTH));
        assert!(std::ptr::eq(lookup("/A+:RS").unwrap(), &ADD_ATTRIBUTES));
        assert!(std::ptr::eq(lookup("/a").unwrap(), &ONLY_ARCHIVE));
        assert!(std::ptr::eq(lookup("/E-").unwrap(), &COPY_SUBDIRECTORIES_INCLUDING_EMPTY));
        assert!(std::ptr::eq(lookup("/MOVE").unwrap(), &MOVE_FILES_AND_DIRECTORIES));
        assert!(lookup("/NOPE").is_none());
        assert!(lookup("C:\\dir").is_none());
    }

    #[test]
    fn render_uses_shape() {
        assert_eq!(MIRROR.render(""), "/MIR");
        assert_eq!(DEPTH.render("2"), "/LEV:2");
        assert_eq!(EXCLUDED_FILES.render("a.txt"), "/XF a.txt");
    }

    #[test]
    fn boolean_pattern_does_not_match_longer_switch() {
        let re = &COPY_SUBDIRECTORIES_INCLUDING_EMPTY.patterns().bare;
        assert!(!re.is_match("/EFSRAW /ETA"));
        assert!(re.is_match("/EFSRAW /E"));
        assert!(re.is_match("/E- /S"));
    }
}
