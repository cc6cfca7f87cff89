use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Writes user-facing output to stdout and, optionally, a file.
#[derive(Clone)]
pub struct Logger {
    file: Arc<Mutex<Option<File>>>,
}

impl Logger {
    pub fn new(file: Option<File>) -> Self {
        Logger {
            file: Arc::new(Mutex::new(file)),
        }
    }

    pub fn log(&self, message: &str) {
        println!("{}", message);

        if let Ok(mut file_guard) = self.file.lock() {
            if let Some(file) = file_guard.as_mut() {
                let _ = writeln!(file, "{}", message);
            }
        }
    }
}

/// Whether `value` must be quoted to survive as one command line token.
pub fn needs_quotes(value: &str) -> bool {
    value.chars().any(char::is_whitespace)
}

/// Quotes a path only when it contains whitespace.
///
/// A quoted path ending in a directory separator gets a trailing `.` so the
/// separator does not escape the closing quote. An empty path becomes `""`.
pub fn quote_path(path: &str) -> String {
    if path.is_empty() {
        return "\"\"".to_string();
    }
    if !needs_quotes(path) {
        return path.to_string();
    }
    if path.ends_with('\\') || path.ends_with('/') {
        format!("\"{}.\"", path)
    } else {
        format!("\"{}\"", path)
    }
}

/// File filters are always quoted.
pub fn quote_filter(filter: &str) -> String {
    format!("\"{}\"", filter)
}

/// Turns a raw token back into its value.
///
/// Surrounding quotes are removed; a quoted `dir\.` becomes `dir\`.
pub fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"') else {
        return raw.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let is_this_directory = inner.len() > 1
        && inner.ends_with('.')
        && matches!(inner[..inner.len() - 1].chars().last(), Some('\\' | '/'));
    if is_this_directory {
        inner[..inner.len() - 1].to_string()
    } else {
        inner.to_string()
    }
}
