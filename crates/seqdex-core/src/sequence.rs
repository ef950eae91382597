//! Sequence, the content-addressed unit of the store.
//!
//! A sequence row is immutable. Its identity is the content hash; inserting
//! the same hash twice is a no-op.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The molecule type of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceKind {
  Dna,
  Rna,
  Protein,
}

impl SequenceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      SequenceKind::Dna => "dna",
      SequenceKind::Rna => "rna",
      SequenceKind::Protein => "protein",
    }
  }
}

impl fmt::Display for SequenceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for SequenceKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "dna" => Ok(SequenceKind::Dna),
      "rna" => Ok(SequenceKind::Rna),
      "protein" => Ok(SequenceKind::Protein),
      other => Err(Error::UnknownSequenceKind(other.to_owned())),
    }
  }
}

/// A stored, deduplicated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
  pub content_hash: String,
  pub residues:     String,
  pub is_circular:  bool,
  pub kind:         SequenceKind,
}

/// Check that `residues` can be laid into the corpus one byte per symbol.
///
/// `name` is only used to make the error message useful.
pub fn validate_residues(name: &str, residues: &str) -> Result<()> {
  if residues.is_empty() {
    return Err(Error::InvalidResidues {
      name:   name.to_owned(),
      reason: "sequence is empty".into(),
    });
  }
  if let Some(pos) = residues.bytes().position(|b| !b.is_ascii_graphic()) {
    return Err(Error::InvalidResidues {
      name:   name.to_owned(),
      reason: format!("non-printable or non-ASCII symbol at offset {pos}"),
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_roundtrips_through_str() {
    for kind in [SequenceKind::Dna, SequenceKind::Rna, SequenceKind::Protein] {
      assert_eq!(kind.as_str().parse::<SequenceKind>().unwrap(), kind);
    }
    assert!(matches!(
      "peptide".parse::<SequenceKind>(),
      Err(Error::UnknownSequenceKind(s)) if s == "peptide"
    ));
  }

  #[test]
  fn kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&SequenceKind::Protein).unwrap(), "\"protein\"");
  }

  #[test]
  fn residues_must_be_printable_ascii() {
    assert!(validate_residues("ok", "ACGTN-*").is_ok());
    assert!(validate_residues("empty", "").is_err());
    assert!(validate_residues("space", "AC GT").is_err());
    assert!(validate_residues("utf8", "ACGTé").is_err());
  }
}
