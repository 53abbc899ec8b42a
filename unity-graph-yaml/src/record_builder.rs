//! Record builder
//!
//! Groups lexed lines into one [`RawRecord`] per document header and builds
//! each record's field map. Indentation decides nesting: a key with an empty
//! value owns the more-indented lines after it, or a block sequence that
//! starts at its own indent (Unity writes `m_Component:` and its `- ` entries
//! in the same column).

use crate::lexer::{Line, LexedDocument, split_key_value, tokenize};
use crate::value_decoder::{decode_field, decode_value};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use unity_graph_core::{DecodedValue, FileId, RawRecord, class_ids};

/// What the builder noticed while degrading gracefully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Unparseable lines plus lines stranded at an indent nothing owned
    pub skipped_lines: usize,
    /// File IDs that appeared more than once; the last occurrence wins
    pub shadowed_file_ids: Vec<FileId>,
}

/// All records of one document
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Records in document order, shadowed duplicates included
    pub records: Vec<RawRecord>,
    /// `fileID` to position in `records` of the live (last) occurrence
    pub index: HashMap<FileId, usize>,
    pub diagnostics: ParseDiagnostics,
}

impl RecordSet {
    /// Look up the live record for a file ID
    pub fn get(&self, file_id: FileId) -> Option<&RawRecord> {
        self.index.get(&file_id).map(|&i| &self.records[i])
    }

    /// Whether a file ID names a record in this document
    pub fn contains(&self, file_id: FileId) -> bool {
        self.index.contains_key(&file_id)
    }

    /// Live records in document order (shadowed duplicates skipped)
    pub fn iter(&self) -> impl Iterator<Item = &RawRecord> {
        self.records
            .iter()
            .enumerate()
            .filter(|(i, r)| self.index.get(&r.file_id) == Some(i))
            .map(|(_, r)| r)
    }

    /// Live records of one class ID, in document order
    pub fn of_class(&self, class_id: u32) -> impl Iterator<Item = &RawRecord> {
        self.iter().filter(move |r| r.class_id == class_id)
    }

    /// First live record whose top-level key matches `class_name`
    pub fn find_by_class_name(&self, class_name: &str) -> Option<&RawRecord> {
        self.iter()
            .find(|r| r.class_name.as_deref() == Some(class_name))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Lex and build a document in one step
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_document(text: &str) -> RecordSet {
    let lexed = tokenize(text);
    let set = build_records(&lexed);
    debug!(
        records = set.len(),
        skipped = set.diagnostics.skipped_lines,
        "parsed unity document"
    );
    set
}

/// Build records from lexed lines
pub fn build_records(lexed: &LexedDocument) -> RecordSet {
    let mut set = RecordSet::default();
    set.diagnostics.skipped_lines = lexed.skipped;

    let mut current = Accumulator::implicit();

    for line in &lexed.lines {
        match line {
            Line::DocumentStart {
                class_id,
                file_id,
                stripped,
            } => {
                let next = Accumulator::new(*class_id, *file_id, *stripped);
                let finished = std::mem::replace(&mut current, next);
                finished.flush_into(&mut set);
            }
            Line::KeyValue {
                indent,
                key,
                raw_value,
            } => current.body.push(BodyLine::Key {
                indent: *indent,
                key,
                raw: raw_value,
            }),
            Line::SequenceItem { indent, raw } => current.body.push(BodyLine::Item {
                indent: *indent,
                raw,
            }),
            Line::Blank | Line::Ignored(_) => {}
        }
    }
    current.flush_into(&mut set);

    set
}

/// The record being collected
struct Accumulator<'a> {
    record: RawRecord,
    /// Lines before the first header; kept only when they carry content
    implicit: bool,
    body: Vec<BodyLine<'a>>,
}

impl<'a> Accumulator<'a> {
    fn new(class_id: u32, file_id: FileId, stripped: bool) -> Self {
        let mut record = RawRecord::new(class_id, file_id);
        record.stripped = stripped;
        Self {
            record,
            implicit: false,
            body: Vec::new(),
        }
    }

    fn implicit() -> Self {
        Self {
            implicit: true,
            ..Self::new(class_ids::OBJECT, 0, false)
        }
    }

    fn flush_into(self, set: &mut RecordSet) {
        if self.implicit && self.body.is_empty() {
            return;
        }

        let mut record = self.record;
        let mut tree = BlockParser::new(&self.body);
        let mut fields = tree.parse_all();
        set.diagnostics.skipped_lines += tree.stranded;

        // `GameObject:` followed by its indented body
        let opens_block = self.body.first().is_some_and(BodyLine::opens_block);
        let class_key = match fields.first() {
            Some((name, DecodedValue::FlowMap(_) | DecodedValue::Null))
                if fields.len() == 1 && opens_block =>
            {
                Some(name.clone())
            }
            _ => None,
        };
        if let Some(name) = class_key {
            fields = match fields.shift_remove(&name) {
                Some(DecodedValue::FlowMap(map)) => map,
                _ => IndexMap::new(),
            };
            record.class_name = Some(name);
        }
        record.fields = fields;

        let position = set.records.len();
        if set.index.insert(record.file_id, position).is_some() {
            warn!(file_id = record.file_id, "duplicate fileID, later record shadows earlier");
            set.diagnostics.shadowed_file_ids.push(record.file_id);
        }
        set.records.push(record);
    }
}

/// Body line of one block
#[derive(Debug, Clone, Copy)]
enum BodyLine<'a> {
    Key {
        indent: usize,
        key: &'a str,
        raw: &'a str,
    },
    Item {
        indent: usize,
        raw: &'a str,
    },
}

impl BodyLine<'_> {
    fn indent(&self) -> usize {
        match self {
            BodyLine::Key { indent, .. } | BodyLine::Item { indent, .. } => *indent,
        }
    }

    fn opens_block(&self) -> bool {
        matches!(self, BodyLine::Key { raw, .. } if raw.is_empty())
    }
}

/// Indentation-driven tree builder over one block's lines
struct BlockParser<'a, 'b> {
    lines: &'b [BodyLine<'a>],
    pos: usize,
    stranded: usize,
}

impl<'a, 'b> BlockParser<'a, 'b> {
    fn new(lines: &'b [BodyLine<'a>]) -> Self {
        Self {
            lines,
            pos: 0,
            stranded: 0,
        }
    }

    fn peek(&self) -> Option<BodyLine<'a>> {
        self.lines.get(self.pos).copied()
    }

    /// Parse every line; top-level mappings merge with last write winning
    fn parse_all(&mut self) -> IndexMap<String, DecodedValue> {
        let mut fields = IndexMap::new();

        while let Some(line) = self.peek() {
            let before = self.pos;
            for (key, value) in self.parse_mapping(line.indent()) {
                fields.insert(key, value);
            }
            if self.pos == before {
                self.strand();
            }
        }

        fields
    }

    fn strand(&mut self) {
        debug!(line = ?self.lines.get(self.pos), "line has no owner at its indent");
        self.stranded += 1;
        self.pos += 1;
    }

    fn parse_mapping(&mut self, indent: usize) -> IndexMap<String, DecodedValue> {
        let mut map = IndexMap::new();
        self.extend_mapping(&mut map, indent);
        map
    }

    fn extend_mapping(&mut self, map: &mut IndexMap<String, DecodedValue>, indent: usize) {
        while let Some(line) = self.peek() {
            match line {
                BodyLine::Key {
                    indent: i,
                    key,
                    raw,
                } if i == indent => {
                    self.pos += 1;
                    let value = if raw.is_empty() {
                        self.parse_child(indent, true)
                    } else {
                        decode_field(key, raw)
                    };
                    map.insert(key.to_string(), value);
                }
                other if other.indent() > indent => self.strand(),
                _ => break,
            }
        }
    }

    /// Value owned by a key (or empty item) at `owner_indent`
    fn parse_child(&mut self, owner_indent: usize, same_indent_seq: bool) -> DecodedValue {
        match self.peek() {
            Some(BodyLine::Item { indent, .. })
                if indent > owner_indent || (same_indent_seq && indent == owner_indent) =>
            {
                DecodedValue::FlowSeq(self.parse_sequence(indent))
            }
            Some(BodyLine::Key { indent, .. }) if indent > owner_indent => {
                DecodedValue::FlowMap(self.parse_mapping(indent))
            }
            _ => DecodedValue::Null,
        }
    }

    fn parse_sequence(&mut self, indent: usize) -> Vec<DecodedValue> {
        let mut items = Vec::new();

        while let Some(BodyLine::Item { indent: i, raw }) = self.peek() {
            if i != indent {
                break;
            }
            self.pos += 1;

            let item = if raw.is_empty() {
                self.parse_child(indent, false)
            } else if let Some((key, value)) = split_key_value(raw) {
                // `- key: value` opens a mapping whose keys sit after the dash
                let key_indent = indent + 2;
                let mut map = IndexMap::new();
                let first = if value.is_empty() {
                    self.parse_child(key_indent, true)
                } else {
                    decode_field(key, value)
                };
                map.insert(key.to_string(), first);
                self.extend_mapping(&mut map, key_indent);
                DecodedValue::FlowMap(map)
            } else {
                decode_value(raw)
            };
            items.push(item);
        }

        items
    }
}
