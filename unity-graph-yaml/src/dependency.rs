//! Cross-asset dependency extraction
//!
//! Works on raw text rather than parsed records, so it still reports
//! dependencies for documents the record builder only partly understood.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

static GUID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)guid:\s*([a-f0-9]+)").expect("guid pattern is valid"));

/// Every `guid:` value in the text, in order of appearance, duplicates kept
pub fn extract_guids(text: &str) -> Vec<String> {
    GUID_PATTERN
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// De-duplicate GUIDs, keeping first-seen order
pub fn unique_guids<I, S>(guids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    guids
        .into_iter()
        .map(Into::into)
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}
