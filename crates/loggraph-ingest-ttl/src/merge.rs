//! Fragment merging.
//!
//! The upstream producer writes one fragment per input source, each opening
//! with an identical `@prefix` header block. A merged graph keeps the header
//! of the first fragment only; repeating it would be redundant and invalid in
//! a single document.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::PREFIX_MARKER;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("missing source fragment {path}: {source}")]
    MissingSource { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Concatenate `fragments` into `out` in the order given (caller-supplied
/// discovery order; duplicates are copied again, not deduplicated). The first
/// fragment is copied verbatim; later fragments contribute everything except
/// their header lines.
///
/// A fragment that cannot be opened fails the merge, but whatever earlier
/// fragments already wrote to `out` stands.
pub fn merge_fragments<W: Write>(fragments: &[PathBuf], mut out: W) -> Result<(), MergeError> {
    for (index, path) in fragments.iter().enumerate() {
        let file = File::open(path).map_err(|source| MergeError::MissingSource {
            path: path.clone(),
            source,
        })?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if index > 0 && line.starts_with(PREFIX_MARKER) {
                continue;
            }
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "@prefix ex: <http://example.org/> .";

    fn write_fragment(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("{HEADER}\n{body}")).expect("write fragment");
        path
    }

    #[test]
    fn keeps_the_header_from_the_first_fragment_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_fragment(dir.path(), "a.ttl", "<s1>\n    <rel1> <o1> .\n");
        let b = write_fragment(dir.path(), "b.ttl", "<s2>\n    <rel1> <o2> .\n");

        let mut out = Vec::new();
        merge_fragments(&[a, b], &mut out).expect("merge");
        let merged = String::from_utf8(out).expect("utf8");

        assert_eq!(merged.matches(HEADER).count(), 1);
        let s1 = merged.find("<s1>").expect("s1");
        let s2 = merged.find("<s2>").expect("s2");
        assert!(s1 < s2, "fragment order must be preserved");
    }

    #[test]
    fn missing_fragment_surfaces_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_fragment(dir.path(), "a.ttl", "<s1>\n");
        let ghost = dir.path().join("ghost.ttl");

        let mut out = Vec::new();
        let err = merge_fragments(&[a, ghost.clone()], &mut out).unwrap_err();
        match err {
            MergeError::MissingSource { path, .. } => assert_eq!(path, ghost),
            other => panic!("unexpected error: {other}"),
        }
        // The first fragment's lines were already written.
        assert!(String::from_utf8(out).expect("utf8").contains("<s1>"));
    }
}
