//! Grouped-Turtle ingestion for loggraph (boundary adapter).
//!
//! This crate sits at the **untrusted input boundary**:
//!
//! - It parses the grouped subject/relation/object serialization emitted by
//!   the upstream graph producer.
//! - It merges per-source fragments into one logical graph.
//! - It does *not* assign IDs or write datasets (`loggraph-encode` does that).
//!
//! The expected shape is line-oriented:
//!
//! ```text
//! @prefix ex: <http://example.org/> .
//!
//! <subject>
//!     <relation>    <object> [, <object> ...] [label] ;
//!     <relation>    <object> .
//! ```
//!
//! A standalone line opens a subject group; each following line holds one
//! statement. Header lines carry namespace declarations and are parsed only
//! to be stripped, never interpreted.

pub mod merge;
pub mod parser;
pub mod tokenize;

pub use merge::{merge_fragments, MergeError};
pub use parser::{parse_fragment, ParseError, Statement, SubjectGroup, TokenLines};
pub use tokenize::{split_tokens, TokenizeError};

/// Marker opening a header/prefix-declaration line. Lines starting with it
/// are skipped by the parser and deduplicated by the merger.
pub const PREFIX_MARKER: &str = "@prefix";
