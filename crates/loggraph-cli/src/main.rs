//! loggraph CLI
//!
//! Post-processing front end for knowledge graphs serialized as grouped
//! subject/relation/object fragments:
//!
//! - `merge`: combine per-source fragments into one graph, keeping the shared
//!   `@prefix` header block from the first fragment only.
//! - `encode`: assign dense integer IDs to entities and relations and re-emit
//!   the graph as a `subject<TAB>relation<TAB>object` dataset, optionally with
//!   per-triple labels.
//!
//! The CLI owns the orchestration decisions the core deliberately does not
//! make: fragment discovery order and the id-snapshot presence check that
//! selects reuse mode.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use walkdir::WalkDir;

use loggraph_encode::registry::IdRegistry;
use loggraph_encode::{encode_corpus, EncodeOptions, EncodeSummary, LabelLayout, RegistryMode};
use loggraph_ingest_ttl::merge_fragments;

#[derive(Parser)]
#[command(name = "loggraph")]
#[command(
    author,
    version,
    about = "Knowledge-graph fragment merging and integer-triple encoding"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge serialized-graph fragments into one graph.
    Merge {
        /// Fragment files, or directories scanned recursively for `.ttl` files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Merged graph output path.
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Encode a fragment corpus into an integer-triple dataset.
    ///
    /// When an id snapshot (`entity_ids.del` + `relation_ids.del`) already
    /// exists under the output directory, it is reused as-is and the
    /// generation pass is skipped; IDs then match the run that wrote it.
    Encode {
        /// Fragment file, or directory scanned recursively for `.ttl` files.
        input: PathBuf,
        /// Treat each statement's final token as an evaluation label.
        #[arg(long)]
        labels: bool,
        /// Write labels as a fourth column instead of a parallel `_labels.txt`.
        #[arg(long, requires = "labels")]
        inline_labels: bool,
        /// Directory for the dataset and id snapshot (default: the input's directory).
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Print the encode summary as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Merge { inputs, out } => cmd_merge(&inputs, &out),
        Commands::Encode {
            input,
            labels,
            inline_labels,
            out_dir,
            json,
        } => cmd_encode(&input, labels, inline_labels, out_dir.as_deref(), json),
    }
}

/// Expand files and directories into an ordered fragment list. Directories
/// are walked in sorted order so two runs over the same tree discover the
/// same sequence (ID assignment depends on it).
fn discover_fragments(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut fragments = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("scanning {}", input.display()))?;
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|e| e == "ttl") {
                    fragments.push(path.to_path_buf());
                }
            }
        } else {
            fragments.push(input.clone());
        }
    }
    if fragments.is_empty() {
        return Err(anyhow!("no fragment files found"));
    }
    Ok(fragments)
}

fn cmd_merge(inputs: &[PathBuf], out: &Path) -> Result<()> {
    let start = Instant::now();
    let fragments = discover_fragments(inputs)?;

    let file =
        File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    merge_fragments(&fragments, &mut writer)?;
    writer.flush()?;

    eprintln!(
        "{} {} ({} fragments, {:.2}s)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        fragments.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Locate an existing id snapshot below `root`, the original producer's
/// layout being one snapshot directory somewhere under the dataset tree.
fn find_snapshot_dir(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .find(|entry| entry.file_type().is_dir() && IdRegistry::snapshot_exists(entry.path()))
        .map(|entry| entry.path().to_path_buf())
}

fn cmd_encode(
    input: &Path,
    labels: bool,
    inline_labels: bool,
    out_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let fragments = discover_fragments(&[input.to_path_buf()])?;

    let base_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None if input.is_dir() => input.to_path_buf(),
        None => match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("creating {}", base_dir.display()))?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");

    // Snapshot presence decides the mode once, up front; the core never
    // rescans the filesystem mid-run.
    let (mut registry, mode) = match find_snapshot_dir(&base_dir) {
        Some(dir) => {
            eprintln!(
                "{} reusing id snapshot in {}",
                "info:".yellow().bold(),
                dir.display()
            );
            let registry = IdRegistry::load(&dir)
                .with_context(|| format!("loading id snapshot from {}", dir.display()))?;
            (registry, RegistryMode::LookupOnly)
        }
        None => (IdRegistry::new(), RegistryMode::Assign),
    };

    let options = EncodeOptions {
        labeled: labels,
        layout: if inline_labels {
            LabelLayout::InlineColumn
        } else {
            LabelLayout::SplitFile
        },
    };

    let data_path = base_dir.join(format!("{stem}.del"));
    let data_file = File::create(&data_path)
        .with_context(|| format!("creating {}", data_path.display()))?;
    let mut data_out = BufWriter::new(data_file);

    let mut label_out = if labels && !inline_labels {
        let label_path = base_dir.join(format!("{stem}_labels.txt"));
        let file = File::create(&label_path)
            .with_context(|| format!("creating {}", label_path.display()))?;
        Some(BufWriter::new(file))
    } else {
        None
    };

    let summary = encode_corpus(
        &fragments,
        &mut registry,
        mode,
        options,
        &mut data_out,
        label_out.as_mut().map(|w| w as &mut dyn Write),
    )?;
    data_out.flush()?;
    if let Some(out) = label_out.as_mut() {
        out.flush()?;
    }

    if mode == RegistryMode::Assign {
        registry
            .save(&base_dir)
            .with_context(|| format!("saving id snapshot to {}", base_dir.display()))?;
    }

    report_encode(&data_path, &summary, json, start)?;
    Ok(())
}

fn report_encode(
    data_path: &Path,
    summary: &EncodeSummary,
    json: bool,
    start: Instant,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    eprintln!(
        "{} {} ({} triples from {} fragments, {:.2}s)",
        "wrote".green().bold(),
        data_path.display().to_string().bold(),
        summary.triples_written,
        summary.fragments_processed,
        start.elapsed().as_secs_f64()
    );
    if summary.objects_skipped > 0 || summary.groups_dropped > 0 {
        eprintln!(
            "{} skipped {} invalid object slots, dropped {} groups",
            "info:".yellow().bold(),
            summary.objects_skipped,
            summary.groups_dropped
        );
    }
    Ok(())
}
