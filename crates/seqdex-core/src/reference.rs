//! References: named, timestamped pointers into the sequence store.
//!
//! References are never deduplicated; only the sequences they point at are.
//! The only mutation a reference ever sees is an annotation edit, which
//! restamps `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sequence::SequenceKind;

// ─── Reference ───────────────────────────────────────────────────────────────

/// A persisted reference row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
  pub id:                i64,
  pub display_name:      String,
  /// Caller-supplied accession or other external identifier; unique when set.
  pub unique_identifier: Option<String>,
  pub created_at:        DateTime<Utc>,
  /// Stamped by the store on every mutation of the row.
  pub updated_at:        DateTime<Utc>,
  pub sequence_hash:     String,
  /// Content hash of the translated protein, if one was ingested.
  pub translation_hash:  Option<String>,
  pub organization:      Option<String>,
  pub source_database:   Option<String>,
  pub annotations:       serde_json::Value,
}

// ─── NewReference ────────────────────────────────────────────────────────────

/// Input to [`crate::store::SequenceIndex::ingest`].
///
/// The store hashes `residues` (and `translation`, when present), inserts the
/// sequences if absent, then inserts a new reference row.
#[derive(Debug, Clone)]
pub struct NewReference {
  pub display_name:      String,
  pub residues:          String,
  pub is_circular:       bool,
  pub kind:              SequenceKind,
  pub annotations:       serde_json::Value,
  /// Protein translation of `residues`. Stored as its own `protein` sequence.
  pub translation:       Option<String>,
  pub unique_identifier: Option<String>,
  pub organization:      Option<String>,
  pub source_database:   Option<String>,
}

impl NewReference {
  /// Convenience constructor: linear, no translation, empty annotations.
  pub fn new(
    display_name: impl Into<String>,
    residues: impl Into<String>,
    kind: SequenceKind,
  ) -> Self {
    Self {
      display_name: display_name.into(),
      residues: residues.into(),
      is_circular: false,
      kind,
      annotations: serde_json::Value::Null,
      translation: None,
      unique_identifier: None,
      organization: None,
      source_database: None,
    }
  }

  pub fn circular(mut self, is_circular: bool) -> Self {
    self.is_circular = is_circular;
    self
  }

  pub fn with_translation(mut self, protein: impl Into<String>) -> Self {
    self.translation = Some(protein.into());
    self
  }

  pub fn with_annotations(mut self, annotations: serde_json::Value) -> Self {
    self.annotations = annotations;
    self
  }

  /// The translation, treating an empty string the same as none.
  pub fn translation(&self) -> Option<&str> {
    self.translation.as_deref().filter(|t| !t.is_empty())
  }
}

// ─── ReferenceLink ───────────────────────────────────────────────────────────

/// Input to [`crate::store::SequenceIndex::put_reference`]: a reference to
/// sequences that must already be stored.
///
/// A link without a translation and a link with one are written by two
/// distinct statements; `translation_hash: None` never touches the column.
#[derive(Debug, Clone)]
pub struct ReferenceLink {
  pub display_name:      String,
  pub sequence_hash:     String,
  pub translation_hash:  Option<String>,
  pub annotations:       serde_json::Value,
  pub unique_identifier: Option<String>,
  pub organization:      Option<String>,
  pub source_database:   Option<String>,
}

impl ReferenceLink {
  pub fn new(display_name: impl Into<String>, sequence_hash: impl Into<String>) -> Self {
    Self {
      display_name: display_name.into(),
      sequence_hash: sequence_hash.into(),
      translation_hash: None,
      annotations: serde_json::Value::Null,
      unique_identifier: None,
      organization: None,
      source_database: None,
    }
  }
}

/// What [`crate::store::SequenceIndex::ingest`] wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingested {
  pub reference_id:     i64,
  pub sequence_hash:    String,
  pub translation_hash: Option<String>,
}
