//! Scalar and flow-collection decoding
//!
//! Turns the raw text after `key:` into a [`DecodedValue`]. Decoding is
//! total: anything that does not fit a more specific shape stays a string.

use indexmap::IndexMap;
use unity_graph_core::{DecodedValue, Reference};

/// Keys whose values are kept verbatim. Hex GUIDs such as
/// `0000000000000000e000000000000000` would otherwise read as numbers.
const VERBATIM_KEYS: &[&str] = &["guid"];

/// Hash128 fields (`m_Hash`, `Hash`, `m_PropertiesHash`, ...) are hex text too
fn is_verbatim_key(key: &str) -> bool {
    VERBATIM_KEYS.contains(&key) || key.ends_with("Hash") || key.ends_with("hash")
}

/// Keys a flow map may carry and still be a reference
const REFERENCE_KEYS: &[&str] = &["fileID", "guid", "type"];

/// Decode the value of a named field
pub fn decode_field(key: &str, raw: &str) -> DecodedValue {
    let trimmed = raw.trim();
    if is_verbatim_key(key) && !trimmed.starts_with(['{', '[']) {
        let text = strip_quotes(trimmed);
        if text.is_empty() {
            return DecodedValue::Null;
        }
        return DecodedValue::String(text.to_string());
    }
    decode_value(raw)
}

/// Decode a raw scalar
pub fn decode_value(raw: &str) -> DecodedValue {
    let value = raw.trim();

    match value {
        "true" => return DecodedValue::Bool(true),
        "false" => return DecodedValue::Bool(false),
        "" | "null" | "~" => return DecodedValue::Null,
        _ => {}
    }

    if let Some(number) = parse_number(value) {
        return number;
    }

    if let Some(content) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
        return decode_flow_map(content);
    }

    if let Some(content) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        return decode_flow_seq(content);
    }

    DecodedValue::String(strip_quotes(value).to_string())
}

fn parse_number(value: &str) -> Option<DecodedValue> {
    let first = value.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }

    if let Ok(i) = value.parse::<i64>() {
        return Some(DecodedValue::Integer(i));
    }

    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(DecodedValue::Float(f)),
        _ => None,
    }
}

fn decode_flow_map(content: &str) -> DecodedValue {
    let mut map = IndexMap::new();

    for pair in split_top_level(content, ',') {
        let Some(colon) = find_top_level(pair, ':') else {
            continue;
        };
        let key = strip_quotes(pair[..colon].trim());
        if key.is_empty() {
            continue;
        }
        let value = decode_field(key, &pair[colon + 1..]);
        map.insert(key.to_string(), value);
    }

    match as_reference(&map) {
        Some(reference) => DecodedValue::Reference(reference),
        None => DecodedValue::FlowMap(map),
    }
}

fn decode_flow_seq(content: &str) -> DecodedValue {
    if content.trim().is_empty() {
        return DecodedValue::FlowSeq(Vec::new());
    }
    DecodedValue::FlowSeq(split_top_level(content, ',').into_iter().map(decode_value).collect())
}

/// A map is a reference when it has an integer `fileID` and only reference keys
fn as_reference(map: &IndexMap<String, DecodedValue>) -> Option<Reference> {
    let file_id = map.get("fileID")?.as_i64()?;
    if !map.keys().all(|k| REFERENCE_KEYS.contains(&k.as_str())) {
        return None;
    }

    Some(Reference {
        file_id,
        guid: map
            .get("guid")
            .and_then(DecodedValue::as_str)
            .map(str::to_string),
        asset_type: map.get("type").and_then(DecodedValue::as_i64),
    })
}

/// Strip one layer of matching surrounding quotes
pub fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Split on `separator` where it is not nested inside braces, brackets or quotes
pub fn split_top_level(content: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut scanner = DepthScanner::default();

    for (i, c) in content.char_indices() {
        if scanner.at_top_level(c) && c == separator {
            parts.push(content[start..i].trim());
            start = i + c.len_utf8();
        }
    }
    parts.push(content[start..].trim());

    parts
}

fn find_top_level(content: &str, needle: char) -> Option<usize> {
    let mut scanner = DepthScanner::default();
    content
        .char_indices()
        .find(|&(_, c)| scanner.at_top_level(c) && c == needle)
        .map(|(i, _)| i)
}

/// Tracks brace/bracket depth and quoting while scanning flow text.
///
/// A quote only opens a quoted scalar when it is the first significant
/// character of a key or value, so `Hero's Sword` stays a plain scalar.
struct DepthScanner {
    depth: usize,
    quote: Option<char>,
    at_scalar_start: bool,
}

impl Default for DepthScanner {
    fn default() -> Self {
        Self {
            depth: 0,
            quote: None,
            at_scalar_start: true,
        }
    }
}

impl DepthScanner {
    /// Feed one character; true when it sits at depth zero outside quotes
    fn at_top_level(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if c == q {
                self.quote = None;
            }
            return false;
        }
        if c.is_whitespace() {
            return self.depth == 0;
        }

        let opens_quote = self.at_scalar_start && matches!(c, '"' | '\'');
        self.at_scalar_start = matches!(c, '{' | '[' | ',' | ':');

        match c {
            _ if opens_quote => {
                self.quote = Some(c);
                false
            }
            '{' | '[' => {
                self.depth += 1;
                false
            }
            '}' | ']' => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            _ => self.depth == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(decode_value("true"), DecodedValue::Bool(true));
        assert_eq!(decode_value("false"), DecodedValue::Bool(false));
        assert_eq!(decode_value("~"), DecodedValue::Null);
        assert_eq!(decode_value("null"), DecodedValue::Null);
        assert_eq!(decode_value(""), DecodedValue::Null);
        assert_eq!(decode_value("42"), DecodedValue::Integer(42));
        assert_eq!(decode_value("-7"), DecodedValue::Integer(-7));
        assert_eq!(decode_value("0.5"), DecodedValue::Float(0.5));
        assert_eq!(decode_value("1e3"), DecodedValue::Float(1000.0));
        assert_eq!(decode_value("Player"), DecodedValue::from("Player"));
        assert_eq!(decode_value("'quoted'"), DecodedValue::from("quoted"));
        assert_eq!(decode_value("\"double\""), DecodedValue::from("double"));
    }

    #[test]
    fn test_non_numbers_stay_strings() {
        assert_eq!(decode_value("inf"), DecodedValue::from("inf"));
        assert_eq!(decode_value("-inf"), DecodedValue::from("-inf"));
        assert_eq!(decode_value("NaN"), DecodedValue::from("NaN"));
        assert_eq!(decode_value("12abc"), DecodedValue::from("12abc"));
    }

    #[test]
    fn test_large_file_ids_are_exact() {
        assert_eq!(
            decode_value("8926484042661614321"),
            DecodedValue::Integer(8926484042661614321)
        );
    }

    #[test]
    fn test_flow_map() {
        let value = decode_value("{x: 0, y: 1.5, z: -2}");
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["x"], DecodedValue::Integer(0));
        assert_eq!(map["y"], DecodedValue::Float(1.5));
        assert_eq!(map["z"], DecodedValue::Integer(-2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_references() {
        assert_eq!(
            decode_value("{fileID: 4}"),
            DecodedValue::Reference(Reference::local(4))
        );

        let value =
            decode_value("{fileID: 2800000, guid: 0000000000000000e000000000000000, type: 0}");
        let reference = value.as_reference().unwrap();
        assert_eq!(reference.file_id, 2800000);
        assert_eq!(
            reference.guid.as_deref(),
            Some("0000000000000000e000000000000000")
        );
        assert_eq!(reference.asset_type, Some(0));
    }

    #[test]
    fn test_map_with_extra_keys_is_not_a_reference() {
        let value = decode_value("{fileID: 4, m_Name: x}");
        assert!(value.as_map().is_some());
        assert_eq!(value.file_id(), Some(4));
    }

    #[test]
    fn test_nested_separators() {
        let value = decode_value("{a: {b: 1, c: 2}, d: [1, 2, 3]}");
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"].get("c"), Some(&DecodedValue::Integer(2)));
        assert_eq!(map["d"].as_seq().unwrap().len(), 3);
    }

    #[test]
    fn test_flow_seq() {
        assert_eq!(decode_value("[]"), DecodedValue::FlowSeq(vec![]));
        let value = decode_value("[{fileID: 1}, {fileID: 2}]");
        let items = value.as_seq().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].file_id(), Some(2));
    }

    #[test]
    fn test_quoted_separators() {
        let value = decode_value("{label: 'a, b: c', n: 1}");
        let map = value.as_map().unwrap();
        assert_eq!(map["label"], DecodedValue::from("a, b: c"));
        assert_eq!(map["n"], DecodedValue::Integer(1));
    }

    #[test]
    fn test_apostrophes_inside_plain_scalars() {
        let value = decode_value("{m_Text: Hero's Sword, m_Layer: 5}");
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["m_Text"], DecodedValue::from("Hero's Sword"));
        assert_eq!(map["m_Layer"], DecodedValue::Integer(5));

        let value = decode_value("[it's, {fileID: 4}]");
        let items = value.as_seq().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], DecodedValue::from("it's"));
        assert_eq!(items[1].file_id(), Some(4));

        let value = decode_value("{a: {say: don't, n: 1}, b: \"x, y\"}");
        let map = value.as_map().unwrap();
        assert_eq!(map["a"].get("n"), Some(&DecodedValue::Integer(1)));
        assert_eq!(map["b"], DecodedValue::from("x, y"));
    }

    #[test]
    fn test_guid_field_is_verbatim() {
        assert_eq!(
            decode_field("guid", "00000000000000001000000000000000"),
            DecodedValue::from("00000000000000001000000000000000")
        );
        assert_eq!(decode_field("m_Layer", "5"), DecodedValue::Integer(5));
    }

    #[test]
    fn test_hash_fields_are_verbatim() {
        assert_eq!(
            decode_field("m_Hash", "00000000000000000000000000000000"),
            DecodedValue::from("00000000000000000000000000000000")
        );
        assert_eq!(
            decode_field("Hash", "1234e5aa00000000000000000000000f"),
            DecodedValue::from("1234e5aa00000000000000000000000f")
        );
        let value = decode_value("{serializedVersion: 2, Hash: 00000000000000000000000000000000}");
        assert_eq!(
            value.get("Hash"),
            Some(&DecodedValue::from("00000000000000000000000000000000"))
        );
        assert_eq!(value.get("serializedVersion"), Some(&DecodedValue::Integer(2)));

        let nested = decode_field("m_BakedHash", "{fileID: 0}");
        assert_eq!(nested.file_id(), Some(0));
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            "{a: 1, b: true, c: ~, d: hello, e: 0.25}",
            "[1, 2.0, false, text]",
            "{outer: {inner: [1, 2]}, f: 3.0}",
        ] {
            let decoded = decode_value(text);
            let reparsed = decode_value(&decoded.to_string());
            assert_eq!(decoded, reparsed, "round trip of {text}");
        }
    }
}
