//! The corpus: every stored sequence concatenated in storage order.
//!
//! No separator is placed between sequences, so a suffix starting near the
//! end of one sequence runs on into the next. Callers that care can detect
//! such matches with [`SequenceRange::contains_span`].

use serde::{Deserialize, Serialize};

use crate::suffix::CorpusOffset;

// ─── Ranges ──────────────────────────────────────────────────────────────────

/// The half-open slice `[start, end)` of the corpus occupied by one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRange {
  pub sequence_hash: String,
  pub start:         CorpusOffset,
  pub end:           CorpusOffset,
}

impl SequenceRange {
  pub fn len(&self) -> CorpusOffset { self.end - self.start }

  pub fn is_empty(&self) -> bool { self.start == self.end }

  pub fn contains(&self, offset: CorpusOffset) -> bool {
    self.start <= offset && offset < self.end
  }

  /// Whether `[offset, offset + len)` lies entirely inside this range.
  pub fn contains_span(&self, offset: CorpusOffset, len: CorpusOffset) -> bool {
    self.contains(offset) && offset + len <= self.end
  }
}

/// Lay out each `(hash, residues)` pair back to back, starting at offset 0.
pub fn compute_ranges<H, R>(ordered: &[(H, R)]) -> Vec<SequenceRange>
where
  H: AsRef<str>,
  R: AsRef<str>,
{
  let mut running: CorpusOffset = 0;
  ordered
    .iter()
    .map(|(hash, residues)| {
      let start = running;
      running += residues.as_ref().len() as CorpusOffset;
      SequenceRange {
        sequence_hash: hash.as_ref().to_owned(),
        start,
        end: running,
      }
    })
    .collect()
}

/// Concatenate residues with no separator and no transformation.
pub fn concatenate<R: AsRef<str>>(ordered_residues: &[R]) -> Vec<u8> {
  let total = ordered_residues.iter().map(|r| r.as_ref().len()).sum();
  let mut bytes = Vec::with_capacity(total);
  for residues in ordered_residues {
    bytes.extend_from_slice(residues.as_ref().as_bytes());
  }
  bytes
}

/// Find the range owning `offset` in a sorted, contiguous range list.
pub fn resolve_in(ranges: &[SequenceRange], offset: CorpusOffset) -> Option<&SequenceRange> {
  let idx = ranges.partition_point(|r| r.end <= offset);
  ranges.get(idx).filter(|r| r.contains(offset))
}

// ─── Corpus ──────────────────────────────────────────────────────────────────

/// A corpus snapshot: the concatenated bytes plus where each sequence sits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
  pub bytes:  Vec<u8>,
  pub ranges: Vec<SequenceRange>,
}

impl Corpus {
  /// Build from `(hash, residues)` pairs already in storage order.
  pub fn from_ordered<H, R>(ordered: &[(H, R)]) -> Self
  where
    H: AsRef<str>,
    R: AsRef<str>,
  {
    let residues: Vec<&str> = ordered.iter().map(|(_, r)| r.as_ref()).collect();
    Self {
      bytes:  concatenate(&residues),
      ranges: compute_ranges(ordered),
    }
  }

  pub fn len(&self) -> usize { self.bytes.len() }

  pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

  /// Content hash of the sequence containing `offset`.
  pub fn resolve(&self, offset: CorpusOffset) -> Option<&str> {
    resolve_in(&self.ranges, offset).map(|r| r.sequence_hash.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn corpus(seqs: &[(&str, &str)]) -> Corpus { Corpus::from_ordered(seqs) }

  #[test]
  fn two_sequences_concatenate_without_separator() {
    let c = corpus(&[("H1", "ACGT"), ("H2", "GTAC")]);
    assert_eq!(c.bytes, b"ACGTGTAC");
    assert_eq!(
      c.ranges,
      vec![
        SequenceRange { sequence_hash: "H1".into(), start: 0, end: 4 },
        SequenceRange { sequence_hash: "H2".into(), start: 4, end: 8 },
      ]
    );
  }

  #[test]
  fn ranges_partition_the_corpus() {
    let lengths = [1usize, 7, 3, 12, 1, 5];
    let seqs: Vec<(String, String)> =
      lengths.iter().enumerate().map(|(i, &l)| (format!("H{i}"), "A".repeat(l))).collect();
    let ranges = compute_ranges(&seqs);

    assert_eq!(ranges[0].start, 0);
    for (range, &len) in ranges.iter().zip(&lengths) {
      assert_eq!(range.len(), len as CorpusOffset);
    }
    for pair in ranges.windows(2) {
      assert_eq!(pair[0].end, pair[1].start);
    }
    let total: usize = lengths.iter().sum();
    assert_eq!(ranges.last().unwrap().end, total as CorpusOffset);
  }

  #[test]
  fn resolve_every_offset() {
    let c = corpus(&[("H1", "ACGT"), ("H2", "G"), ("H3", "TTAC")]);
    for range in &c.ranges {
      for offset in range.start..range.end {
        assert_eq!(c.resolve(offset), Some(range.sequence_hash.as_str()));
      }
    }
    assert_eq!(c.resolve(5), Some("H3"));
    assert_eq!(c.resolve(c.len() as CorpusOffset), None);
  }

  #[test]
  fn empty_corpus_resolves_nothing() {
    let c = Corpus::default();
    assert!(c.is_empty());
    assert_eq!(c.resolve(0), None);
  }

  #[test]
  fn span_containment() {
    let r = SequenceRange { sequence_hash: "H".into(), start: 4, end: 8 };
    assert!(r.contains_span(4, 4));
    assert!(r.contains_span(6, 2));
    assert!(!r.contains_span(6, 3));
    assert!(!r.contains_span(3, 1));
  }
}
