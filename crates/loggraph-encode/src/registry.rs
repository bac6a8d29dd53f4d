//! Entity/relation ID registry.
//!
//! IDs are dense and insertion-ordered: the Nth distinct token of a kind gets
//! ID N-1. Entities and relations live in fully independent spaces, so the
//! same text can carry an unrelated ID in each.
//!
//! Snapshots are one `id<TAB>token` line per mapping, ascending by id
//! (`entity_ids.del` / `relation_ids.del`). Loading a snapshot restores both
//! the mapping and the next-id counters, so later [`IdRegistry::get_or_create`]
//! calls extend it without renumbering.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the persisted entity mapping.
pub const ENTITY_IDS_FILE: &str = "entity_ids.del";
/// File name of the persisted relation mapping.
pub const RELATION_IDS_FILE: &str = "relation_ids.del";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Entity,
    Relation,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Entity => f.write_str("entity"),
            TokenKind::Relation => f.write_str("relation"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{path}:{line}: malformed id mapping line")]
    MalformedLine { path: PathBuf, line: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Entity-validity filter: a token that is nothing but punctuation is an
/// artifact of the serialization (a stray separator), not a graph node, and
/// never receives an ID. Applies to entity positions (subjects/objects) only;
/// relations are always registered.
pub fn is_valid_entity(token: &str) -> bool {
    !token.is_empty() && !token.chars().all(|c| c.is_ascii_punctuation())
}

/// One kind's string → dense-ID mapping, remembering insertion order for
/// persistence.
#[derive(Debug, Default, Clone)]
struct IdSpace {
    ids: HashMap<String, u64>,
    tokens: Vec<String>, // index == id
}

impl IdSpace {
    fn get_or_create(&mut self, token: &str) -> u64 {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = self.tokens.len() as u64;
        self.ids.insert(token.to_string(), id);
        self.tokens.push(token.to_string());
        id
    }

    fn get(&self, token: &str) -> Option<u64> {
        self.ids.get(token).copied()
    }
}

#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    entities: IdSpace,
    relations: IdSpace,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn space(&self, kind: TokenKind) -> &IdSpace {
        match kind {
            TokenKind::Entity => &self.entities,
            TokenKind::Relation => &self.relations,
        }
    }

    fn space_mut(&mut self, kind: TokenKind) -> &mut IdSpace {
        match kind {
            TokenKind::Entity => &mut self.entities,
            TokenKind::Relation => &mut self.relations,
        }
    }

    /// Existing ID for `token` under `kind`, or the next unused ID of that
    /// kind (its current count), allocated now.
    pub fn get_or_create(&mut self, kind: TokenKind, token: &str) -> u64 {
        self.space_mut(kind).get_or_create(token)
    }

    pub fn get(&self, kind: TokenKind, token: &str) -> Option<u64> {
        self.space(kind).get(token)
    }

    /// Number of distinct tokens registered under `kind`.
    pub fn len(&self, kind: TokenKind) -> usize {
        self.space(kind).tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.tokens.is_empty() && self.relations.tokens.is_empty()
    }

    /// Tokens of `kind` in ascending ID order.
    pub fn tokens(&self, kind: TokenKind) -> &[String] {
        &self.space(kind).tokens
    }

    /// True when both snapshot files are present directly under `dir`.
    /// Presence is the orchestrator's trigger for reuse mode.
    pub fn snapshot_exists(dir: &Path) -> bool {
        dir.join(ENTITY_IDS_FILE).is_file() && dir.join(RELATION_IDS_FILE).is_file()
    }

    pub fn load(dir: &Path) -> Result<Self, RegistryError> {
        Ok(Self {
            entities: load_space(&dir.join(ENTITY_IDS_FILE))?,
            relations: load_space(&dir.join(RELATION_IDS_FILE))?,
        })
    }

    pub fn save(&self, dir: &Path) -> Result<(), RegistryError> {
        save_space(&self.entities, &dir.join(ENTITY_IDS_FILE))?;
        save_space(&self.relations, &dir.join(RELATION_IDS_FILE))?;
        Ok(())
    }
}

fn malformed(path: &Path, line: usize) -> RegistryError {
    RegistryError::MalformedLine {
        path: path.to_path_buf(),
        line,
    }
}

fn load_space(path: &Path) -> Result<IdSpace, RegistryError> {
    let file = File::open(path)?;
    let mut space = IdSpace::default();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (id_text, token) = line.split_once('\t').ok_or_else(|| malformed(path, index + 1))?;
        let id: u64 = id_text.parse().map_err(|_| malformed(path, index + 1))?;
        // Snapshots are written in ascending id order; anything else would
        // silently renumber on the next save.
        if id != space.tokens.len() as u64 {
            return Err(malformed(path, index + 1));
        }
        space.ids.insert(token.to_string(), id);
        space.tokens.push(token.to_string());
    }
    Ok(space)
}

fn save_space(space: &IdSpace, path: &Path) -> Result<(), RegistryError> {
    let mut out = BufWriter::new(File::create(path)?);
    for (id, token) in space.tokens.iter().enumerate() {
        writeln!(out, "{id}\t{token}")?;
    }
    out.flush()?;
    Ok(())
}
