//! Job files: the line-oriented, persisted form of a [`CopyJob`].
//!
//! ```text
//! :: JOB_NAME : nightly
//! :: STOP_IF_DISPOSING : false
//! ::
//! :: Source Directory :
//!     /SD:C:\source\
//! :: Destination Directory :
//!     /DD:D:\backup\
//! :: Exclude These Directories :
//!     /XD
//!         bin
//!         obj
//! :: Copy Options :
//!     /MIR        :: mirror the tree
//! ```
//!
//! Lines starting with `::` are comments, except the job name and
//! dispose-stop lines. A switch line with no value for `/IF`, `/XD` or `/XF`
//! opens a section; every bare line after it belongs to that section until
//! the next switch line. A section that has been closed never reopens.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::args::{parse_number, Capabilities, CopyJob};
use crate::error::ParseError;
use crate::extract::{next_token, FlagSource};
use crate::grammar::{self, Group, Switch};
use crate::parser::ParseSettings;
use crate::serialize::Emitted;
use crate::utils::unquote;

static JOB_NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^::\s*JOB_NAME\s*:\s?(?P<value>.*)$").expect("job name pattern is a literal"));

static STOP_IF_DISPOSING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^::\s*STOP_IF_DISPOSING\s*:\s*(?P<value>\S*)\s*$").expect("stop pattern is a literal")
});

/// A copy job plus the two fields only job files carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFile {
    pub name: String,
    /// Whether a running copy should be stopped when its owner goes away.
    pub stop_if_disposing: bool,
    pub job: CopyJob,
}

impl JobFile {
    pub fn new(name: impl Into<String>, job: CopyJob) -> Self {
        JobFile {
            name: name.into(),
            stop_if_disposing: false,
            job,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Section {
    IncludeFiles,
    ExcludeDirectories,
    ExcludeFiles,
}

impl Section {
    fn of(switch: &Switch) -> Option<Section> {
        if switch == &grammar::INCLUDE_FILES {
            Some(Section::IncludeFiles)
        } else if switch == &grammar::EXCLUDED_DIRECTORIES {
            Some(Section::ExcludeDirectories)
        } else if switch == &grammar::EXCLUDED_FILES {
            Some(Section::ExcludeFiles)
        } else {
            None
        }
    }

    fn switch(self) -> &'static Switch {
        match self {
            Section::IncludeFiles => &grammar::INCLUDE_FILES,
            Section::ExcludeDirectories => &grammar::EXCLUDED_DIRECTORIES,
            Section::ExcludeFiles => &grammar::EXCLUDED_FILES,
        }
    }
}

/// Switch/value pairs collected from a job file.
#[derive(Debug, Default)]
struct JobFlags {
    entries: Vec<(&'static Switch, String)>,
}

impl JobFlags {
    fn push(&mut self, switch: &'static Switch, value: String) {
        self.entries.push((switch, value));
    }
}

impl FlagSource for JobFlags {
    fn take_flag(&mut self, switch: &Switch) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(s, _)| *s != switch);
        self.entries.len() != before
    }

    fn take_value(&mut self, switch: &Switch) -> Option<String> {
        let idx = self.entries.iter().position(|(s, _)| *s == switch)?;
        let (_, value) = self.entries.remove(idx);
        self.entries.retain(|(s, _)| *s != switch);
        Some(value)
    }

    fn take_list(&mut self, switch: &Switch) -> Vec<String> {
        let mut values = Vec::new();
        self.entries.retain(|(s, value)| {
            if *s == switch {
                if !value.is_empty() {
                    values.push(value.clone());
                }
                false
            } else {
                true
            }
        });
        values
    }
}

/// Removes a trailing `:: comment` from a switch or entry line. A `::`
/// inside quotes is part of the value.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut after_space = true;
    for (idx, ch) in line.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == ':' && !in_quotes && after_space && line[idx..].starts_with("::") {
            return line[..idx].trim_end();
        }
        after_space = ch.is_whitespace();
    }
    line.trim_end()
}

/// Quotes a value the reader would otherwise take for a switch, a comment
/// or padding.
fn quote_line_value(value: &str) -> String {
    let ambiguous = value.starts_with('/')
        || value.starts_with('"')
        || value.contains("::")
        || value.trim() != value;
    if ambiguous {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

fn unquote_line(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Parses job file lines with default settings.
pub fn parse_job_file<I, S>(lines: I) -> JobFile
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_job_file_with(lines, &ParseSettings::default())
}

pub fn parse_job_file_with<I, S>(lines: I, settings: &ParseSettings) -> JobFile
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut file = JobFile::default();
    let mut flags = JobFlags::default();
    let mut open: Option<Section> = None;
    let mut closed: HashSet<Section> = HashSet::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("::") {
            if let Some(caps) = JOB_NAME_LINE.captures(line) {
                file.name = caps["value"].trim().to_string();
            } else if let Some(caps) = STOP_IF_DISPOSING_LINE.captures(line) {
                file.stop_if_disposing = parse_bool(&caps["value"]);
            }
            continue;
        }

        let content = strip_comment(line);
        if !content.starts_with('/') {
            match open {
                Some(section) => {
                    trace!(?section, entry = content, "section entry");
                    flags.push(section.switch(), unquote_line(content));
                }
                None => debug!(line = content, "ignoring line outside of a section"),
            }
            continue;
        }

        let token_end = content
            .find(|c: char| c == ':' || c.is_whitespace())
            .unwrap_or(content.len());
        let (token, rest) = content.split_at(token_end);
        let value = rest.trim_start().strip_prefix(':').unwrap_or(rest).trim();

        let Some(switch) = grammar::lookup(token) else {
            debug!(switch = token, "ignoring unknown switch");
            continue;
        };

        if let Some(section) = open.take() {
            closed.insert(section);
        }

        if let Some(section) = Section::of(switch) {
            if closed.contains(&section) {
                debug!(?section, "section already closed, ignoring");
                continue;
            }
            if value.is_empty() {
                open = Some(section);
                continue;
            }
            let mut cursor = 0;
            while let Some(token) = next_token(value, cursor) {
                flags.push(switch, unquote(token.raw));
                cursor = token.end;
            }
            closed.insert(section);
            continue;
        }

        let retry = &mut file.job.retry;
        if switch == &grammar::RETRY_COUNT {
            if let Some(n) = parse_number(switch, value) {
                retry.retry_count = n;
            }
        } else if switch == &grammar::RETRY_WAIT_TIME {
            if let Some(n) = parse_number(switch, value) {
                retry.retry_wait_time = n;
            }
        } else if switch == &grammar::SAVE_TO_REGISTRY {
            retry.save_to_registry = true;
        } else if switch == &grammar::WAIT_FOR_SHARE_NAMES {
            retry.wait_for_share_names = true;
        } else if switch == &grammar::SOURCE_DIRECTORY {
            file.job.copy.source = unquote_line(value);
        } else if switch == &grammar::DESTINATION_DIRECTORY {
            file.job.copy.destination = unquote_line(value);
        } else {
            flags.push(switch, unquote_line(value));
        }
    }

    let job = &mut file.job;
    job.copy.file_filter = flags.take_list(&grammar::INCLUDE_FILES);
    job.copy.apply_action_flags(settings.copy_action_flags);
    job.selection.apply_selection_flags(settings.selection_flags);
    job.read_flags(&mut flags, &settings.capabilities);
    for (switch, _) in &flags.entries {
        debug!(switch = switch.token, "switch left unused");
    }
    file
}

/// Reads and parses a job file from disk.
pub fn read_job_file(path: impl AsRef<Path>) -> Result<JobFile, ParseError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_job_file(text.lines()))
}

fn group_heading(group: Group) -> &'static str {
    match group {
        Group::Copy => "Copy Options",
        Group::Selection => "Selection Options",
        Group::Logging => "Logging Options",
        Group::Retry => "Retry Options",
        Group::Job => "Job Options",
        Group::JobFile => "Job File",
    }
}

fn write_section(out: &mut Vec<String>, heading: &str, switch: &Switch, entries: &[String]) {
    if entries.is_empty() {
        return;
    }
    out.push(format!(":: {} :", heading));
    out.push(format!("\t{}", switch.token));
    out.extend(entries.iter().map(|e| format!("\t\t{}", quote_line_value(e))));
}

/// Prints `file` in job file form with every switch on its own line.
pub fn write_job_file(file: &JobFile) -> String {
    write_job_file_with(file, &Capabilities::default())
}

pub fn write_job_file_with(file: &JobFile, caps: &Capabilities) -> String {
    let job = &file.job;
    let mut out = vec![
        format!(":: JOB_NAME : {}", file.name),
        format!(":: STOP_IF_DISPOSING : {}", file.stop_if_disposing),
        "::".to_string(),
    ];
    if !job.copy.source.is_empty() {
        out.push(":: Source Directory :".to_string());
        out.push(format!("\t{}", grammar::SOURCE_DIRECTORY.render(&quote_line_value(&job.copy.source))));
    }
    if !job.copy.destination.is_empty() {
        out.push(":: Destination Directory :".to_string());
        out.push(format!("\t{}", grammar::DESTINATION_DIRECTORY.render(&quote_line_value(&job.copy.destination))));
    }
    write_section(&mut out, "Include These Files", &grammar::INCLUDE_FILES, &job.copy.file_filter);
    write_section(
        &mut out,
        "Exclude These Directories",
        &grammar::EXCLUDED_DIRECTORIES,
        &job.selection.excluded_directories,
    );
    write_section(&mut out, "Exclude These Files", &grammar::EXCLUDED_FILES, &job.selection.excluded_files);

    let mut group = None;
    for emitted in job.emit(caps) {
        let line = match &emitted {
            Emitted::List(..) => continue,
            Emitted::Flag(switch) => switch.render(""),
            Emitted::Value(switch, value) => switch.render(&quote_line_value(value)),
        };
        let switch = emitted.switch();
        if group != Some(switch.group) {
            group = Some(switch.group);
            out.push("::".to_string());
            out.push(format!(":: {} :", group_heading(switch.group)));
            out.push("::".to_string());
        }
        out.push(format!("\t{}", line));
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}
