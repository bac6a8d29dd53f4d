//! ID assignment and dataset encoding for loggraph.
//!
//! Turns parsed subject groups into the flat integer-triple dataset consumed
//! by KG-embedding tooling:
//!
//! - [`registry`] keeps the string ↔ dense-ID mappings (separate spaces for
//!   entities and relations) and their `.del` snapshot files.
//! - [`encoder`] expands groups into `subject<TAB>relation<TAB>object` rows,
//!   optionally paired with per-triple labels.
//! - [`pipeline`] drives both across a corpus of fragment files, one fragment
//!   at a time.
//!
//! ID assignment is strictly insertion-ordered, so a fixed corpus encoded
//! from an empty registry always produces the same IDs. Whether a run assigns
//! fresh IDs or only looks up a loaded snapshot is an explicit
//! [`RegistryMode`] resolved once by the orchestrator, never inferred here.

pub mod encoder;
pub mod pipeline;
pub mod registry;

pub use encoder::{
    encode_groups, EncodeError, EncodeOptions, EncodeSummary, LabelLayout, RegistryMode,
};
pub use pipeline::encode_corpus;
pub use registry::{is_valid_entity, IdRegistry, RegistryError, TokenKind};
