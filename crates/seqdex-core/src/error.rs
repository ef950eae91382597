//! Error types for `seqdex-core`.

use thiserror::Error;

use crate::suffix::CorpusOffset;

#[derive(Debug, Error)]
pub enum Error {
  /// Residues must be non-empty ASCII so one byte maps to one corpus symbol.
  #[error("invalid residues for {name:?}: {reason}")]
  InvalidResidues { name: String, reason: String },

  #[error("unknown sequence kind: {0:?}")]
  UnknownSequenceKind(String),

  #[error("suffix engine error: {0}")]
  Engine(#[from] EngineError),

  #[error("search pattern must not be empty")]
  EmptyPattern,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// Failures raised by (or about) a [`SuffixArrayBuilder`] result.
///
/// [`SuffixArrayBuilder`]: crate::suffix::SuffixArrayBuilder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
  #[error("engine returned {array} of length {actual}, corpus has {expected} symbols")]
  LengthMismatch {
    array:    &'static str,
    expected: usize,
    actual:   usize,
  },

  #[error("suffix array is not a permutation: offset {offset} at rank {rank}")]
  NotAPermutation { rank: usize, offset: CorpusOffset },

  #[error("invalid lcp value {lcp} at rank {rank}")]
  InvalidLcp { rank: usize, lcp: CorpusOffset },

  #[error("corpus of {0} symbols exceeds the supported offset width")]
  CorpusTooLarge(usize),

  #[error("engine failed: {0}")]
  Failed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
