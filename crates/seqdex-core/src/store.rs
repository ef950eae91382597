//! The `SequenceIndex` trait and the records its read side returns.
//!
//! The trait is implemented by storage backends (e.g. `seqdex-store-sqlite`).
//! The driver binary depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  corpus::SequenceRange,
  reference::{Ingested, NewReference, Reference, ReferenceLink},
  sequence::Sequence,
  suffix::{CorpusOffset, SuffixArrayEntry},
};

// ─── Read models ─────────────────────────────────────────────────────────────

/// Row counts of the store and of the current index snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
  pub sequences: u64,
  pub symbols:   u64,
  pub suffixes:  u64,
}

/// One occurrence of a search pattern in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
  /// Rank of the matching suffix in the suffix array.
  pub rank:               CorpusOffset,
  pub corpus_offset:      CorpusOffset,
  /// The sequence the match starts in.
  pub sequence_hash:      String,
  pub offset_in_sequence: CorpusOffset,
  /// The match runs past the end of its starting sequence into the next one.
  /// Such a match does not occur in any single stored sequence.
  pub crosses_boundary:   bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a seqdex store backend.
///
/// Sequences are content-addressed and immutable; references are append-only
/// apart from annotation edits. The suffix array, LCP values, corpus symbols
/// and sequence ranges are derived state, replaced wholesale by
/// [`rebuild_index`](Self::rebuild_index).
///
/// Rebuilds must not run concurrently against the same database.
pub trait SequenceIndex: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sequences & references ────────────────────────────────────────────

  /// Insert a sequence unless its hash is already stored.
  fn put_sequence(
    &self,
    sequence: Sequence,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert a reference to already-stored sequences. Returns the new row id.
  ///
  /// Fails with a constraint violation when a linked hash is missing or the
  /// unique identifier is taken.
  fn put_reference(
    &self,
    link: ReferenceLink,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Hash, store, and reference one sequence (plus its translation) in a
  /// single transaction.
  fn ingest(
    &self,
    input: NewReference,
  ) -> impl Future<Output = Result<Ingested, Self::Error>> + Send + '_;

  /// [`ingest`](Self::ingest) several inputs in one transaction. Either all
  /// are written or none are.
  fn ingest_batch(
    &self,
    inputs: Vec<NewReference>,
  ) -> impl Future<Output = Result<Vec<Ingested>, Self::Error>> + Send + '_;

  fn get_sequence(
    &self,
    content_hash: String,
  ) -> impl Future<Output = Result<Option<Sequence>, Self::Error>> + Send + '_;

  fn get_reference(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Reference>, Self::Error>> + Send + '_;

  /// All references in id order.
  fn list_references(
    &self,
  ) -> impl Future<Output = Result<Vec<Reference>, Self::Error>> + Send + '_;

  /// Replace a reference's annotations; `updated_at` is restamped.
  fn update_annotations(
    &self,
    id: i64,
    annotations: serde_json::Value,
  ) -> impl Future<Output = Result<Reference, Self::Error>> + Send + '_;

  // ── Index ─────────────────────────────────────────────────────────────

  /// Rebuild the corpus, ranges, and suffix/LCP arrays from every stored
  /// sequence. The previous snapshot survives any failure untouched.
  fn rebuild_index(&self) -> impl Future<Output = Result<IndexStats, Self::Error>> + Send + '_;

  /// Content hash of the sequence owning `corpus_offset` in the current
  /// snapshot.
  fn resolve(
    &self,
    corpus_offset: CorpusOffset,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Every occurrence of `pattern` in the current snapshot, in corpus order.
  fn search<'a>(
    &'a self,
    pattern: &'a str,
  ) -> impl Future<Output = Result<Vec<Hit>, Self::Error>> + Send + 'a;

  fn sequence_ranges(
    &self,
  ) -> impl Future<Output = Result<Vec<SequenceRange>, Self::Error>> + Send + '_;

  fn suffix_array(
    &self,
  ) -> impl Future<Output = Result<Vec<SuffixArrayEntry>, Self::Error>> + Send + '_;

  /// The current snapshot's corpus, reassembled from its symbols.
  fn corpus(&self) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<IndexStats, Self::Error>> + Send + '_;
}
