//! Line lexer and block splitter
//!
//! Splits a Unity text document into classified lines. The lexer never
//! fails: a line it cannot classify becomes `Ignored(Unparseable)` and is
//! counted in [`LexedDocument::skipped`].

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use unity_graph_core::FileId;

static DOCUMENT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"--- !u!(\d+) &(-?\d+)(\s+stripped)?").expect("document header pattern is valid")
});

/// Why a line carried nothing for the record builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// `%YAML` / `%TAG` directives
    Directive,
    /// `# ...`
    Comment,
    /// A bare `---` without a Unity class tag
    Separator,
    /// Anything else the lexer could not split
    Unparseable,
}

/// One classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    DocumentStart {
        class_id: u32,
        file_id: FileId,
        stripped: bool,
    },
    KeyValue {
        indent: usize,
        key: String,
        raw_value: String,
    },
    /// A block sequence entry; `raw` is the text after `- `
    SequenceItem {
        indent: usize,
        raw: String,
    },
    Blank,
    Ignored(IgnoreReason),
}

/// Lexer output for a whole document
#[derive(Debug, Clone, Default)]
pub struct LexedDocument {
    pub lines: Vec<Line>,
    /// Number of `Ignored(Unparseable)` lines
    pub skipped: usize,
}

/// Lex a whole document
pub fn tokenize(text: &str) -> LexedDocument {
    let mut lexed = LexedDocument::default();

    for (line_no, raw) in text.lines().enumerate() {
        let line = lex_line(raw);
        if line == Line::Ignored(IgnoreReason::Unparseable) {
            debug!(line = line_no + 1, "skipping unparseable line");
            lexed.skipped += 1;
        }
        lexed.lines.push(line);
    }

    lexed
}

/// Classify a single line
pub fn lex_line(line: &str) -> Line {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if trimmed.starts_with('%') {
        return Line::Ignored(IgnoreReason::Directive);
    }
    if trimmed.starts_with('#') {
        return Line::Ignored(IgnoreReason::Comment);
    }
    if trimmed.starts_with("---") {
        return parse_document_header(trimmed)
            .unwrap_or(Line::Ignored(IgnoreReason::Separator));
    }

    let indent = indentation(line);

    if trimmed == "-" {
        return Line::SequenceItem {
            indent,
            raw: String::new(),
        };
    }
    if let Some(rest) = trimmed.strip_prefix("- ") {
        return Line::SequenceItem {
            indent,
            raw: rest.trim().to_string(),
        };
    }

    match split_key_value(trimmed) {
        Some((key, raw_value)) => Line::KeyValue {
            indent,
            key: key.to_string(),
            raw_value: raw_value.to_string(),
        },
        None => Line::Ignored(IgnoreReason::Unparseable),
    }
}

/// Parse `--- !u!<classID> &<fileID> [stripped]`
fn parse_document_header(line: &str) -> Option<Line> {
    let captures = DOCUMENT_HEADER.captures(line)?;
    let class_id = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let file_id = captures.get(2)?.as_str().parse::<FileId>().ok()?;

    Some(Line::DocumentStart {
        class_id,
        file_id,
        stripped: captures.get(3).is_some(),
    })
}

/// Index of the first non-whitespace character
pub fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Split `key: value` at the first colon that ends a key.
///
/// A key colon is followed by whitespace or the end of the line, so
/// `url: http://host` splits after `url`. Lines opening a flow collection or
/// a quoted scalar have no key.
pub fn split_key_value(text: &str) -> Option<(&str, &str)> {
    if text.starts_with(['{', '[', '"', '\'']) {
        return None;
    }

    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b':' {
            continue;
        }
        let at_end = i + 1 == bytes.len();
        if at_end || bytes[i + 1].is_ascii_whitespace() {
            let key = text[..i].trim();
            if key.is_empty() {
                return None;
            }
            return Some((key, text[i + 1..].trim()));
        }
    }

    None
}
