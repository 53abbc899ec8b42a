//! Unity Graph YAML
//!
//! Reads Unity's text serialization format: the quasi-YAML multi-document
//! stream used by scenes, prefabs and materials. The pipeline is
//! lexer → value decoder → record builder, with a text-level dependency
//! scanner alongside it.
//!
//! # Examples
//!
//! ```rust
//! use unity_graph_yaml::parse_document;
//!
//! let text = "--- !u!1 &100\nGameObject:\n  m_Name: Player\n  m_IsActive: 1\n";
//! let records = parse_document(text);
//!
//! let player = records.get(100).unwrap();
//! assert_eq!(player.name(), Some("Player"));
//! ```

// Re-export core types
pub use unity_graph_core::{DecodedValue, FileId, RawRecord, Reference, Result, UnityGraphError};

pub mod dependency;
pub mod lexer;
pub mod record_builder;
pub mod value_decoder;

// Re-export main entry points
pub use dependency::{extract_guids, unique_guids};
pub use lexer::{IgnoreReason, LexedDocument, Line, tokenize};
pub use record_builder::{ParseDiagnostics, RecordSet, build_records, parse_document};
pub use value_decoder::{decode_field, decode_value};
