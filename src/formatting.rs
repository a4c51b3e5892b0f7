// src/formatting.rs

//! ANSI coloring and rendering of messages with key/value annotations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::Write;

/// Containers nested deeper than this are elided when inspecting a value.
pub const INSPECT_DEPTH: usize = 10;

/// The environment variable whose presence turns coloring off.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

static ANSI_SGR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid regex"));

/// The ANSI SGR sequences used by the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Reset,
    Bold,
    Red,
    Green,
    Yellow,
    Cyan,
    White,
    BrightMagenta,
    BrightCyan,
}

impl Color {
    pub fn code(self) -> &'static str {
        match self {
            Color::Reset => "\x1b[0m",
            Color::Bold => "\x1b[1m",
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::White => "\x1b[37m",
            Color::BrightMagenta => "\x1b[95m",
            Color::BrightCyan => "\x1b[96m",
        }
    }
}

/// Returns `false` when the `NO_COLOR` environment variable is present.
pub fn colors_enabled() -> bool {
    std::env::var_os(NO_COLOR_ENV).is_none()
}

/// Wraps `text` in `color` unless `NO_COLOR` is set.
pub fn colorize(color: Color, text: &str) -> String {
    TextFormatter::from_env().colorize(color, text)
}

/// Removes every ANSI SGR escape sequence from `text`.
pub fn strip_color(text: &str) -> String {
    ANSI_SGR.replace_all(text, "").into_owned()
}

/// Renders a message and its annotations, coloring according to `NO_COLOR`.
pub fn format_message(message: &str, annotations: Option<&Value>) -> String {
    TextFormatter::from_env().format_message(message, annotations)
}

/// Renders text with or without ANSI colors.
///
/// The color decision is taken once, when the formatter is created, so a
/// single log line is never half colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormatter {
    colors: bool,
}

impl TextFormatter {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// Creates a formatter honoring the `NO_COLOR` environment variable.
    pub fn from_env() -> Self {
        Self::new(colors_enabled())
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    pub fn colorize(&self, color: Color, text: &str) -> String {
        if self.colors {
            format!("{}{}{}", color.code(), text, Color::Reset.code())
        } else {
            text.to_string()
        }
    }

    /// Builds a single line (without a trailing newline) from `message` and
    /// the optional annotations.
    ///
    /// For an object, each non-null entry is rendered as `key=value` in
    /// insertion order, the value of an `error` key in red. An array is
    /// rendered the same way with the element indices as keys. Any other
    /// value is inspected and appended as a whole.
    pub fn format_message(&self, message: &str, annotations: Option<&Value>) -> String {
        let head = self.colorize(Color::White, message);
        match annotations {
            Some(annotations) => format!("{} {}", head, self.format_annotations(annotations)),
            None => head,
        }
    }

    fn format_annotations(&self, annotations: &Value) -> String {
        let entries: Vec<(String, &Value)> = match annotations {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
            other => return self.colorize(Color::White, &inspect(other)),
        };

        entries
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let value_color = if key == "error" { Color::Red } else { Color::White };
                format!(
                    "{}{}",
                    self.colorize(Color::Cyan, &format!("{}=", key)),
                    self.colorize(value_color, &inspect(value))
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Renders a value on one line, eliding containers nested deeper than
/// [`INSPECT_DEPTH`]. A top-level string is rendered bare.
pub fn inspect(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => {
            let mut out = String::new();
            inspect_into(other, 0, &mut out);
            out
        }
    }
}

fn inspect_into(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => quote_into(s, out),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(_) if depth > INSPECT_DEPTH => out.push_str("[Array]"),
        Value::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                inspect_into(item, depth + 1, out);
            }
            out.push_str(" ]");
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(_) if depth > INSPECT_DEPTH => out.push_str("[Object]"),
        Value::Object(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if IDENTIFIER.is_match(key) {
                    out.push_str(key);
                } else {
                    quote_into(key, out);
                }
                out.push_str(": ");
                inspect_into(item, depth + 1, out);
            }
            out.push_str(" }");
        }
    }
}

/// Quotes like Node's `util.inspect`: single quotes unless the text holds
/// one, then double quotes, then backticks, escaping only as a last resort.
fn quote_into(s: &str, out: &mut String) {
    let quote = if !s.contains('\'') {
        '\''
    } else if !s.contains('"') {
        '"'
    } else if !s.contains('`') {
        '`'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push(quote);
}
