//! `seqdex`: build and query a suffix-array index over stored sequences.
//!
//! # Usage
//!
//! ```text
//! seqdex ingest --name lacZ --kind dna --residues ATGACCATG --translation MTM
//! seqdex rebuild
//! seqdex search GACC
//! seqdex --db other.db resolve 42
//! ```
//!
//! The database path comes from `--db`, else `SEQDEX_STORE_PATH`, else
//! `store_path` in the config file, else `seqdex.db`.

mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use seqdex_core::{reference::NewReference, sequence::SequenceKind, store::SequenceIndex};
use seqdex_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{SeqdexConfig, expand_tilde};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "seqdex", author, version, about = "Suffix-array index over biological sequences")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "seqdex.toml")]
  config: PathBuf,

  /// Database path; overrides the config file and environment.
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the database schema (idempotent).
  Init,

  /// Store a sequence and a reference to it.
  Ingest {
    #[arg(long)]
    name:          String,
    #[arg(long)]
    residues:      String,
    /// dna, rna, or protein.
    #[arg(long)]
    kind:          SequenceKind,
    #[arg(long)]
    circular:      bool,
    /// Protein translation of the residues.
    #[arg(long)]
    translation:   Option<String>,
    /// Annotations as a JSON document.
    #[arg(long)]
    annotations:   Option<String>,
    #[arg(long)]
    unique_id:     Option<String>,
    #[arg(long)]
    organization:  Option<String>,
    /// Source database the sequence came from (e.g. genbank).
    #[arg(long = "database")]
    source_database: Option<String>,
  },

  /// Rebuild the corpus, sequence ranges, and suffix/LCP arrays.
  Rebuild,

  /// Print the content hash of the sequence owning a corpus offset.
  Resolve { offset: u64 },

  /// Print every occurrence of a pattern.
  Search { pattern: String },

  /// Print row counts of the store and the current index.
  Stats,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = SeqdexConfig::load(&cli.config)?;
  if let Some(db) = &cli.db {
    cfg.store_path = expand_tilde(db);
  }

  // Schema failure is fatal: nothing below can run without it.
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Init => {
      tracing::info!("Schema ready at {}", cfg.store_path.display());
    }
    Command::Ingest {
      name,
      residues,
      kind,
      circular,
      translation,
      annotations,
      unique_id,
      organization,
      source_database,
    } => {
      let mut input = NewReference::new(name, residues, kind).circular(circular);
      input.translation = translation;
      input.unique_identifier = unique_id;
      input.organization = organization;
      input.source_database = source_database;
      if let Some(raw) = annotations {
        input.annotations = serde_json::from_str(&raw).context("--annotations is not valid JSON")?;
      }

      let ingested = store.ingest(input).await.context("ingest failed")?;
      print_json(&ingested)?;
    }
    Command::Rebuild => {
      let stats = store.rebuild_index().await.context("index rebuild failed")?;
      print_json(&stats)?;
    }
    Command::Resolve { offset } => {
      let hash = store.resolve(offset).await.context("resolve failed")?;
      print_json(&hash)?;
    }
    Command::Search { pattern } => {
      let hits = store.search(&pattern).await.context("search failed")?;
      print_json(&hits)?;
    }
    Command::Stats => {
      let stats = store.stats().await.context("reading stats failed")?;
      print_json(&stats)?;
    }
  }

  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
