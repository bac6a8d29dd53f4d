//! Triple expansion and dataset emission.
//!
//! Walks parsed subject groups and writes one `subject<TAB>relation<TAB>object`
//! row per expanded triple, in group, statement, object order. Labeled data
//! additionally carries one label per triple, either in a parallel stream or
//! inline as a fourth column.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use loggraph_ingest_ttl::{ParseError, SubjectGroup};

use crate::registry::{is_valid_entity, IdRegistry, TokenKind};

/// How tokens are resolved against the registry during encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryMode {
    /// Assign fresh IDs on first use. Encoding and ID generation run as one
    /// interleaved pass (no prior snapshot).
    Assign,
    /// Pure lookups against a loaded snapshot. A miss means the snapshot is
    /// stale for this corpus and is a fatal error, never a silent skip.
    LookupOnly,
}

/// Where labels go in labeled mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelLayout {
    /// Parallel label stream, one label per triple row, same order.
    SplitFile,
    /// Fourth tab-separated column on the triple row itself.
    InlineColumn,
}

#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Treat each statement's final token as a label rather than an object.
    pub labeled: bool,
    pub layout: LabelLayout,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            labeled: false,
            layout: LabelLayout::SplitFile,
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{kind} token not in loaded id snapshot (stale snapshot?): {token}")]
    UnknownToken { kind: TokenKind, token: String },
    #[error("missing source fragment {path}: {source}")]
    MissingSource { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Counters for one encoding pass.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EncodeSummary {
    pub fragments_processed: usize,
    pub triples_written: usize,
    /// Object slots skipped by the entity-validity filter.
    pub objects_skipped: usize,
    /// Whole groups dropped because their subject failed the validity filter.
    pub groups_dropped: usize,
}

impl EncodeSummary {
    pub fn merge(&mut self, other: &EncodeSummary) {
        self.fragments_processed += other.fragments_processed;
        self.triples_written += other.triples_written;
        self.objects_skipped += other.objects_skipped;
        self.groups_dropped += other.groups_dropped;
    }
}

fn resolve(
    registry: &mut IdRegistry,
    mode: RegistryMode,
    kind: TokenKind,
    token: &str,
) -> Result<u64, EncodeError> {
    match mode {
        RegistryMode::Assign => Ok(registry.get_or_create(kind, token)),
        RegistryMode::LookupOnly => {
            registry
                .get(kind, token)
                .ok_or_else(|| EncodeError::UnknownToken {
                    kind,
                    token: token.to_string(),
                })
        }
    }
}

/// Expand `groups` into integer triples on `data_out`.
///
/// Object slots whose token fails the validity filter are skipped (a
/// statement can expand into fewer triples than it has objects); a group
/// whose subject fails it is dropped whole rather than attaching its
/// statements to the previous subject. In labeled mode every emitted triple
/// carries its statement's label per `options.layout`; in split layout the
/// labels go to `label_out`.
pub fn encode_groups(
    groups: &[SubjectGroup],
    registry: &mut IdRegistry,
    mode: RegistryMode,
    options: EncodeOptions,
    data_out: &mut dyn Write,
    mut label_out: Option<&mut dyn Write>,
) -> Result<EncodeSummary, EncodeError> {
    let mut summary = EncodeSummary::default();

    for group in groups {
        if !is_valid_entity(&group.subject) {
            warn!(subject = %group.subject, "dropping group with invalid subject token");
            summary.groups_dropped += 1;
            continue;
        }
        let subject_id = resolve(registry, mode, TokenKind::Entity, &group.subject)?;

        for statement in &group.statements {
            let relation_id = resolve(registry, mode, TokenKind::Relation, &statement.relation)?;

            for object in &statement.objects {
                if !is_valid_entity(object) {
                    warn!(object = %object, "skipping invalid object token");
                    summary.objects_skipped += 1;
                    continue;
                }
                let object_id = resolve(registry, mode, TokenKind::Entity, object)?;

                if options.labeled {
                    let label = statement.label.as_deref().unwrap_or("");
                    match options.layout {
                        LabelLayout::InlineColumn => {
                            writeln!(data_out, "{subject_id}\t{relation_id}\t{object_id}\t{label}")?;
                        }
                        LabelLayout::SplitFile => {
                            writeln!(data_out, "{subject_id}\t{relation_id}\t{object_id}")?;
                            if let Some(out) = label_out.as_mut() {
                                writeln!(out, "{label}")?;
                            }
                        }
                    }
                } else {
                    writeln!(data_out, "{subject_id}\t{relation_id}\t{object_id}")?;
                }
                summary.triples_written += 1;
            }
        }
    }

    Ok(summary)
}
