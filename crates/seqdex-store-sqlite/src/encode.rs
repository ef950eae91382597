//! Encoding and decoding helpers between Rust domain types and the plain-text
//! and integer representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, annotations as compact JSON,
//! and corpus offsets as SQLite's signed 64-bit `INTEGER`.

use chrono::{DateTime, Utc};
use seqdex_core::{
  reference::{Reference, ReferenceLink},
  sequence::Sequence,
  suffix::CorpusOffset,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CorpusOffset ────────────────────────────────────────────────────────────

pub fn encode_offset(offset: CorpusOffset) -> rusqlite::Result<i64> {
  i64::try_from(offset).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub fn decode_offset(column: usize, value: i64) -> rusqlite::Result<CorpusOffset> {
  CorpusOffset::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, value))
}

/// Read an offset column straight out of a row.
pub fn offset_column(row: &rusqlite::Row<'_>, column: usize) -> rusqlite::Result<CorpusOffset> {
  decode_offset(column, row.get(column)?)
}

// ─── Annotations ─────────────────────────────────────────────────────────────

pub fn encode_annotations(value: &serde_json::Value) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_annotations(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A [`ReferenceLink`] with its annotations already serialised, ready to
/// move onto the connection thread.
pub struct LinkRow {
  pub display_name:      String,
  pub sequence_hash:     String,
  pub translation_hash:  Option<String>,
  pub annotations:       String,
  pub unique_identifier: Option<String>,
  pub organization:      Option<String>,
  pub source_database:   Option<String>,
}

impl LinkRow {
  pub fn encode(link: ReferenceLink) -> Result<Self> {
    Ok(Self {
      annotations:       encode_annotations(&link.annotations)?,
      display_name:      link.display_name,
      sequence_hash:     link.sequence_hash,
      translation_hash:  link.translation_hash,
      unique_identifier: link.unique_identifier,
      organization:      link.organization,
      source_database:   link.source_database,
    })
  }
}

/// Raw values read directly from a `sequences` row.
pub struct RawSequence {
  pub content_hash: String,
  pub residues:     String,
  pub is_circular:  bool,
  pub kind:         String,
}

impl RawSequence {
  pub const COLUMNS: &'static str = "content_hash, residues, is_circular, kind";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      content_hash: row.get(0)?,
      residues:     row.get(1)?,
      is_circular:  row.get(2)?,
      kind:         row.get(3)?,
    })
  }

  pub fn into_sequence(self) -> Result<Sequence> {
    Ok(Sequence {
      content_hash: self.content_hash,
      residues:     self.residues,
      is_circular:  self.is_circular,
      kind:         self.kind.parse()?,
    })
  }
}

/// Raw strings read directly from a `sequence_references` row.
pub struct RawReference {
  pub id:                i64,
  pub display_name:      String,
  pub unique_identifier: Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
  pub sequence_hash:     String,
  pub translation_hash:  Option<String>,
  pub organization:      Option<String>,
  pub source_database:   Option<String>,
  pub annotations:       String,
}

impl RawReference {
  pub const COLUMNS: &'static str = "id, display_name, unique_identifier, created_at, updated_at,
     sequence_hash, translation_hash, organization, source_database, annotations";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      display_name:      row.get(1)?,
      unique_identifier: row.get(2)?,
      created_at:        row.get(3)?,
      updated_at:        row.get(4)?,
      sequence_hash:     row.get(5)?,
      translation_hash:  row.get(6)?,
      organization:      row.get(7)?,
      source_database:   row.get(8)?,
      annotations:       row.get(9)?,
    })
  }

  pub fn into_reference(self) -> Result<Reference> {
    Ok(Reference {
      id:                self.id,
      display_name:      self.display_name,
      unique_identifier: self.unique_identifier,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
      sequence_hash:     self.sequence_hash,
      translation_hash:  self.translation_hash,
      organization:      self.organization,
      source_database:   self.source_database,
      annotations:       decode_annotations(&self.annotations)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn trigger_timestamps_decode() {
    // Format written by the `updated_at` trigger.
    let dt = decode_dt("2024-03-01T12:30:45.123Z").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap() + chrono::Duration::milliseconds(123));
  }

  #[test]
  fn offsets_beyond_i64_are_rejected() {
    assert_eq!(encode_offset(42).unwrap(), 42);
    assert!(encode_offset(u64::MAX).is_err());
    assert!(decode_offset(0, -1).is_err());
  }
}
