//! Corpus-level encoding pipeline.
//!
//! Strictly sequential: each fragment is read, parsed, and encoded to
//! completion before the next is opened, and every handle is released on all
//! exit paths. The registry is the only state shared across fragments.
//! Whether it assigns or only looks up is decided once by the orchestrator
//! (snapshot presence is an orchestration concern, not checked here).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use loggraph_ingest_ttl::parse_fragment;

use crate::encoder::{encode_groups, EncodeError, EncodeOptions, EncodeSummary, RegistryMode};
use crate::registry::IdRegistry;

/// Encode every fragment in `fragments` (caller-supplied discovery order)
/// into `data_out`, resolving tokens through `registry` under `mode`.
///
/// A fragment that cannot be read fails with
/// [`EncodeError::MissingSource`]; output already produced for earlier
/// fragments stands.
pub fn encode_corpus(
    fragments: &[PathBuf],
    registry: &mut IdRegistry,
    mode: RegistryMode,
    options: EncodeOptions,
    data_out: &mut dyn Write,
    mut label_out: Option<&mut dyn Write>,
) -> Result<EncodeSummary, EncodeError> {
    let mut summary = EncodeSummary::default();

    for path in fragments {
        let text = fs::read_to_string(path).map_err(|source| EncodeError::MissingSource {
            path: path.clone(),
            source,
        })?;
        let name = path.display().to_string();
        let groups = parse_fragment(&name, &text, options.labeled)?;
        debug!(fragment = %name, groups = groups.len(), "parsed fragment");

        let fragment_summary = encode_groups(
            &groups,
            registry,
            mode,
            options,
            data_out,
            label_out.as_mut().map(|w| &mut **w as &mut dyn Write),
        )?;
        summary.merge(&fragment_summary);
        summary.fragments_processed += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TokenKind;
    use std::path::Path;

    fn write_fragment(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).expect("write fragment");
        path
    }

    #[test]
    fn registry_is_shared_across_fragments_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_fragment(dir.path(), "a.ttl", "<s1>\n    <rel1> <o1> .\n");
        let b = write_fragment(dir.path(), "b.ttl", "<s2>\n    <rel1> <o1> .\n");

        let mut registry = IdRegistry::new();
        let mut data = Vec::new();
        let summary = encode_corpus(
            &[a, b],
            &mut registry,
            RegistryMode::Assign,
            EncodeOptions::default(),
            &mut data,
            None,
        )
        .expect("encode");

        assert_eq!(summary.fragments_processed, 2);
        assert_eq!(summary.triples_written, 2);
        // <o1> keeps the ID it got in the first fragment.
        assert_eq!(String::from_utf8(data).expect("utf8"), "0\t0\t1\n2\t0\t1\n");
        assert_eq!(registry.get(TokenKind::Entity, "<s2>"), Some(2));
    }

    #[test]
    fn missing_fragment_keeps_earlier_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_fragment(dir.path(), "a.ttl", "<s1>\n    <rel1> <o1> .\n");
        let ghost = dir.path().join("ghost.ttl");

        let mut registry = IdRegistry::new();
        let mut data = Vec::new();
        let err = encode_corpus(
            &[a, ghost.clone()],
            &mut registry,
            RegistryMode::Assign,
            EncodeOptions::default(),
            &mut data,
            None,
        )
        .unwrap_err();

        match err {
            EncodeError::MissingSource { path, .. } => assert_eq!(path, ghost),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(String::from_utf8(data).expect("utf8"), "0\t0\t1\n");
    }

    #[test]
    fn parse_errors_name_the_fragment_and_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = write_fragment(dir.path(), "bad.ttl", "    <rel1> <o1> .\n");

        let mut registry = IdRegistry::new();
        let mut data = Vec::new();
        let err = encode_corpus(
            &[bad.clone()],
            &mut registry,
            RegistryMode::Assign,
            EncodeOptions::default(),
            &mut data,
            None,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("bad.ttl"));
        assert!(message.contains(":1:"));
    }
}
