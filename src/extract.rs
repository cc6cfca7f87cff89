//! Text extraction stages.
//!
//! Each stage is a pure function returning what it found together with the
//! text that is left over. The caller threads the remainder into the next
//! stage. [`CommandText`] wraps that threading behind the [`FlagSource`]
//! trait so the option-group builders do not care whether their flags come
//! from a command line or a job file.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::ParseError;
use crate::grammar::{self, Switch};
use crate::utils::unquote;

static EXECUTABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*(?:"(?:[^"]*[\\/])?(?:robocopy|rbcp)(?:\.exe)?"|(?:[^\s"]*[\\/])?(?:robocopy|rbcp)(?:\.exe)?)(?:\s|$)"#,
    )
    .expect("executable pattern is a literal")
});

const EVERYTHING: &str = "*.*";

/// Source and destination pulled off the front of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPositionals {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub remainder: String,
}

/// One whitespace-separated token; quoted spans may contain whitespace.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'a> {
    pub raw: &'a str,
    pub end: usize,
}

pub(crate) fn next_token(text: &str, from: usize) -> Option<Token<'_>> {
    let rest = &text[from..];
    let start = from + (rest.len() - rest.trim_start().len());
    if start >= text.len() {
        return None;
    }
    let mut in_quotes = false;
    let mut end = text.len();
    for (idx, ch) in text[start..].char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch.is_whitespace() && !in_quotes {
            end = start + idx;
            break;
        }
    }
    Some(Token {
        raw: &text[start..end],
        end,
    })
}

fn inside_quotes(text: &str, pos: usize) -> bool {
    text[..pos].matches('"').count() % 2 == 1
}

/// Removes `range` and collapses the whitespace around it.
fn splice(text: &str, range: Range<usize>) -> String {
    let before = text[..range.start].trim_end();
    let after = text[range.end..].trim_start();
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ => format!("{} {}", before, after),
    }
}

struct Hit {
    switch: Range<usize>,
    value: Option<Range<usize>>,
}

fn first_unquoted(re: &Regex, text: &str) -> Option<Hit> {
    let mut from = 0;
    while from < text.len() {
        let caps = re.captures_at(text, from)?;
        let switch = caps.name("sw")?;
        if !inside_quotes(text, switch.start()) {
            return Some(Hit {
                switch: switch.range(),
                value: caps.name("val").map(|m| m.range()),
            });
        }
        from = switch.end();
    }
    None
}

/// Strips a leading `robocopy` token, with or without a directory or quotes.
pub fn strip_executable(text: &str) -> &str {
    match EXECUTABLE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Pulls the source and destination off the front of `text`.
///
/// With `options_only` no positional argument may appear before the first
/// switch. Otherwise exactly two are required; `""` stands for "not given".
pub fn extract_source_destination(text: &str, options_only: bool) -> Result<ParsedPositionals, ParseError> {
    let text = strip_executable(text);
    let mut positionals = Vec::new();
    let mut cursor = 0;
    while positionals.len() < 2 {
        let Some(token) = next_token(text, cursor) else {
            break;
        };
        if token.raw.starts_with('/') {
            break;
        }
        positionals.push(token.raw);
        cursor = token.end;
    }

    if options_only {
        if let Some(first) = positionals.first() {
            return Err(ParseError::InvalidArgument {
                parameter: "command",
                reason: format!("unexpected positional argument `{}` in options-only text", first),
            });
        }
        return Ok(ParsedPositionals {
            source: None,
            destination: None,
            remainder: text.trim().to_string(),
        });
    }

    if positionals.len() < 2 {
        return Err(ParseError::SourceDestinationUndecipherable);
    }
    let present = |raw: &str| Some(unquote(raw)).filter(|v| !v.is_empty());
    Ok(ParsedPositionals {
        source: present(positionals[0]),
        destination: present(positionals[1]),
        remainder: text[cursor..].trim().to_string(),
    })
}

/// Collects the include filters that precede the first switch.
///
/// An unquoted `*.*` in first position is the "everything" marker and is
/// dropped. Quoted, it is an ordinary filter; the printer always quotes
/// filters.
pub fn extract_file_filters(text: &str) -> (Vec<String>, String) {
    let mut filters = Vec::new();
    let mut cursor = 0;
    while let Some(token) = next_token(text, cursor) {
        if token.raw.starts_with('/') {
            break;
        }
        if cursor == 0 && token.raw == EVERYTHING {
            cursor = token.end;
            continue;
        }
        filters.push(unquote(token.raw));
        cursor = token.end;
    }
    (filters, text[cursor..].trim().to_string())
}

/// Removes every occurrence of a boolean switch.
pub fn extract_flag(text: &str, switch: &Switch) -> (bool, String) {
    let mut found = false;
    let mut text = text.to_string();
    while let Some(hit) = first_unquoted(&switch.patterns().bare, &text) {
        found = true;
        text = splice(&text, hit.switch);
    }
    (found, text)
}

/// Removes a valued switch and returns the first value seen.
///
/// A switch without a value yields `Some("")`; interpreting that is up to
/// the caller.
pub fn extract_value(text: &str, switch: &Switch) -> (Option<String>, String) {
    let patterns = switch.patterns();
    let mut value = None;
    let mut text = text.to_string();
    loop {
        let hit = patterns
            .valued
            .as_ref()
            .and_then(|re| first_unquoted(re, &text))
            .or_else(|| first_unquoted(&patterns.bare, &text));
        let Some(hit) = hit else {
            break;
        };
        let (found, end) = match hit.value {
            Some(range) => (unquote(&text[range.clone()]), range.end),
            None => (String::new(), hit.switch.end),
        };
        value.get_or_insert(found);
        text = splice(&text, hit.switch.start..end);
    }
    (value, text)
}

/// Removes every occurrence of a multi-instance switch and all of the values
/// following each one, up to the next recognized switch.
pub fn extract_list(text: &str, switch: &Switch) -> (Vec<String>, String) {
    let mut values = Vec::new();
    let mut text = text.to_string();
    while let Some(hit) = first_unquoted(&switch.patterns().bare, &text) {
        let mut cursor = hit.switch.end;
        if text[cursor..].starts_with(':') {
            cursor += 1;
        }
        let mut end = cursor;
        while let Some(token) = next_token(&text, cursor) {
            if grammar::lookup(token.raw).is_some() {
                break;
            }
            values.push(unquote(token.raw));
            end = token.end;
            cursor = token.end;
        }
        text = splice(&text, hit.switch.start..end);
    }
    (values, text)
}

/// Where the option-group builders read their switches from.
pub trait FlagSource {
    /// Consumes a boolean switch, reporting whether it was present.
    fn take_flag(&mut self, switch: &Switch) -> bool;
    /// Consumes a valued switch. `Some("")` means present without a value.
    fn take_value(&mut self, switch: &Switch) -> Option<String>;
    /// Consumes every occurrence of a multi-instance switch.
    fn take_list(&mut self, switch: &Switch) -> Vec<String>;
}

/// Command line text that shrinks as switches are taken from it.
#[derive(Debug, Clone, Default)]
pub struct CommandText {
    text: String,
}

impl CommandText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn remainder(&self) -> &str {
        &self.text
    }

    pub fn into_remainder(self) -> String {
        self.text
    }
}

impl FlagSource for CommandText {
    fn take_flag(&mut self, switch: &Switch) -> bool {
        let (found, rest) = extract_flag(&self.text, switch);
        if found {
            trace!(switch = switch.token, "flag");
        }
        self.text = rest;
        found
    }

    fn take_value(&mut self, switch: &Switch) -> Option<String> {
        let (value, rest) = extract_value(&self.text, switch);
        if let Some(value) = &value {
            trace!(switch = switch.token, value = %value, "value");
        }
        self.text = rest;
        value
    }

    fn take_list(&mut self, switch: &Switch) -> Vec<String> {
        let (values, rest) = extract_list(&self.text, switch);
        if !values.is_empty() {
            trace!(switch = switch.token, count = values.len(), "list");
        }
        self.text = rest;
        values
    }
}
