//! Content hashing for sequences.
//!
//! The store treats the hasher as an opaque collaborator; any stable,
//! collision-resistant function of a sequence works. [`Sha256Hasher`] is the
//! default.

use sha2::{Digest, Sha256};

use crate::sequence::SequenceKind;

/// Computes the content hash used as a sequence's primary key.
pub trait ContentHasher: Send + Sync {
  fn hash(&self, kind: SequenceKind, is_circular: bool, residues: &str) -> String;
}

/// Lowercase hex SHA-256 over a kind/topology prefix and the raw residues.
///
/// The prefix keeps a DNA sequence and a protein with identical letters (or a
/// linear and a circular copy) from sharing an identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
  fn hash(&self, kind: SequenceKind, is_circular: bool, residues: &str) -> String {
    let topology = if is_circular { "circular" } else { "linear" };

    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(topology.as_bytes());
    hasher.update(b":");
    hasher.update(residues.as_bytes());
    hex::encode(hasher.finalize())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_input_same_hash() {
    let a = Sha256Hasher.hash(SequenceKind::Dna, false, "ACGT");
    let b = Sha256Hasher.hash(SequenceKind::Dna, false, "ACGT");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert!(a.bytes().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn kind_and_topology_are_part_of_identity() {
    let dna = Sha256Hasher.hash(SequenceKind::Dna, false, "ACGT");
    let protein = Sha256Hasher.hash(SequenceKind::Protein, false, "ACGT");
    let circular = Sha256Hasher.hash(SequenceKind::Dna, true, "ACGT");
    assert_ne!(dna, protein);
    assert_ne!(dna, circular);
  }
}
