//! Suffix array and LCP construction over the concatenated corpus.
//!
//! The store consumes the engine through [`SuffixArrayBuilder`] and only
//! relies on its output contract; [`SuffixLcp::validate`] enforces that
//! contract before anything is persisted.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// The single integer width used for corpus offsets, suffix-array values and
/// LCP values.
///
/// SQLite stores integers as signed 64-bit, so corpora longer than
/// `i64::MAX` symbols are rejected rather than truncated.
pub type CorpusOffset = u64;

/// Largest corpus the persisted index can address.
pub const MAX_CORPUS_LEN: usize = i64::MAX as usize;

// ─── Engine output ───────────────────────────────────────────────────────────

/// A suffix array and its LCP array, both of corpus length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixLcp {
  /// `sa[i]` is the corpus offset of the `i`-th smallest suffix.
  pub sa:  Vec<CorpusOffset>,
  /// `lcp[i]` is the shared-prefix length of the suffixes at `sa[i - 1]` and
  /// `sa[i]`; `lcp[0]` is always 0.
  pub lcp: Vec<CorpusOffset>,
}

impl SuffixLcp {
  /// Check the engine contract against `text`.
  ///
  /// Verifies lengths, that `sa` is a permutation, and that `lcp[0] == 0`.
  /// For each adjacent pair the reported common prefix must really be shared
  /// and the suffixes must differ, in order, right after it. Together these
  /// prove both the sort order and the exact LCP values.
  pub fn validate(&self, text: &[u8]) -> Result<(), EngineError> {
    let n = text.len();
    if n > MAX_CORPUS_LEN {
      return Err(EngineError::CorpusTooLarge(n));
    }
    for (array, len) in [("suffix array", self.sa.len()), ("lcp array", self.lcp.len())] {
      if len != n {
        return Err(EngineError::LengthMismatch { array, expected: n, actual: len });
      }
    }

    let mut seen = vec![false; n];
    for (rank, &offset) in self.sa.iter().enumerate() {
      match usize::try_from(offset).ok().filter(|&o| o < n) {
        Some(o) if !seen[o] => seen[o] = true,
        _ => return Err(EngineError::NotAPermutation { rank, offset }),
      }
    }

    if let Some(&first) = self.lcp.first()
      && first != 0
    {
      return Err(EngineError::InvalidLcp { rank: 0, lcp: first });
    }

    for rank in 1..n {
      let lcp = self.lcp[rank];
      // Both offsets are below `n` after the permutation check.
      let prev = self.sa[rank - 1] as usize;
      let curr = self.sa[rank] as usize;
      let Some(l) = usize::try_from(lcp).ok().filter(|&l| l <= n - prev.max(curr)) else {
        return Err(EngineError::InvalidLcp { rank, lcp });
      };
      if text[prev..prev + l] != text[curr..curr + l] {
        return Err(EngineError::InvalidLcp { rank, lcp });
      }
      // The suffix at `curr` must not run out first, and where both continue
      // the earlier suffix must hold the smaller symbol.
      let ordered = match (text.get(prev + l), text.get(curr + l)) {
        (None, Some(_)) => true,
        (Some(a), Some(b)) => a < b,
        _ => false,
      };
      if !ordered {
        return Err(EngineError::InvalidLcp { rank, lcp });
      }
    }

    Ok(())
  }

  /// Rows for the persisted `suffix_array` table, in rank order.
  pub fn entries(&self) -> impl Iterator<Item = SuffixArrayEntry> + '_ {
    self
      .sa
      .iter()
      .zip(&self.lcp)
      .enumerate()
      .map(|(rank, (&corpus_offset, &lcp))| SuffixArrayEntry {
        position: rank as CorpusOffset,
        corpus_offset,
        lcp,
      })
  }
}

/// One persisted suffix-array row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixArrayEntry {
  /// Rank in sorted suffix order.
  pub position:      CorpusOffset,
  pub corpus_offset: CorpusOffset,
  pub lcp:           CorpusOffset,
}

// ─── Engine trait ────────────────────────────────────────────────────────────

/// Builds the suffix and LCP arrays of a byte string.
///
/// Implementations must return arrays satisfying [`SuffixLcp::validate`].
/// Any algorithm works; the store calls `build` exactly once per rebuild.
pub trait SuffixArrayBuilder: Send + Sync {
  fn build(&self, text: &[u8]) -> Result<SuffixLcp, EngineError>;
}

/// Prefix-doubling suffix sort followed by Kasai's linear-time LCP pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixDoubling;

impl SuffixArrayBuilder for PrefixDoubling {
  fn build(&self, text: &[u8]) -> Result<SuffixLcp, EngineError> {
    if text.len() > MAX_CORPUS_LEN {
      return Err(EngineError::CorpusTooLarge(text.len()));
    }
    let sa = suffix_array(text);
    let lcp = lcp_array(text, &sa);
    Ok(SuffixLcp {
      sa:  sa.into_iter().map(|o| o as CorpusOffset).collect(),
      lcp: lcp.into_iter().map(|l| l as CorpusOffset).collect(),
    })
  }
}

/// Sort suffixes by doubling the compared prefix length each round.
fn suffix_array(text: &[u8]) -> Vec<usize> {
  let n = text.len();
  let mut sa: Vec<usize> = (0..n).collect();
  if n < 2 {
    return sa;
  }

  let mut rank: Vec<usize> = text.iter().map(|&b| b as usize).collect();
  let mut next = vec![0usize; n];
  let mut k = 1;

  loop {
    // Suffixes that end inside the window sort before any that continue.
    let key = |i: usize| (rank[i], if i + k < n { rank[i + k] + 1 } else { 0 });

    sa.sort_unstable_by_key(|&i| key(i));

    next[sa[0]] = 0;
    for w in 1..n {
      next[sa[w]] = next[sa[w - 1]] + usize::from(key(sa[w - 1]) != key(sa[w]));
    }

    std::mem::swap(&mut rank, &mut next);

    if rank[sa[n - 1]] == n - 1 || k >= n {
      break;
    }
    k *= 2;
  }

  sa
}

/// Kasai et al.: LCP of each suffix with its predecessor in `sa`.
fn lcp_array(text: &[u8], sa: &[usize]) -> Vec<usize> {
  let n = text.len();
  let mut lcp = vec![0usize; n];
  if n == 0 {
    return lcp;
  }

  let mut isa = vec![0usize; n];
  for (rank, &offset) in sa.iter().enumerate() {
    isa[offset] = rank;
  }

  let mut k = 0usize;
  for i in 0..n {
    if isa[i] == 0 {
      k = 0;
      continue;
    }
    let j = sa[isa[i] - 1];
    while i + k < n && j + k < n && text[i + k] == text[j + k] {
      k += 1;
    }
    lcp[isa[i]] = k;
    k = k.saturating_sub(1);
  }

  lcp
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Reference construction by direct suffix comparison.
  fn naive(text: &[u8]) -> SuffixLcp {
    let mut sa: Vec<usize> = (0..text.len()).collect();
    sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
    let mut lcp = vec![0; text.len()];
    for i in 1..sa.len() {
      lcp[i] = text[sa[i - 1]..]
        .iter()
        .zip(&text[sa[i]..])
        .take_while(|(a, b)| a == b)
        .count();
    }
    SuffixLcp {
      sa:  sa.into_iter().map(|o| o as CorpusOffset).collect(),
      lcp: lcp.into_iter().map(|l| l as CorpusOffset).collect(),
    }
  }

  #[test]
  fn two_sequence_corpus() {
    let out = PrefixDoubling.build(b"ACGTGTAC").unwrap();
    assert_eq!(out.sa, vec![6, 0, 7, 1, 4, 2, 5, 3]);
    assert_eq!(out.lcp, vec![0, 2, 0, 1, 0, 2, 0, 1]);
    out.validate(b"ACGTGTAC").unwrap();
  }

  #[test]
  fn matches_naive_on_repetitive_inputs() {
    let inputs: [&[u8]; 9] = [
      b"A",
      b"AAAAAAAAAA",
      b"ACACACACAC",
      b"GATTACA",
      b"mississippi",
      b"ACGTACGTACGTNACGT",
      b"TTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTA",
      b"MTMITPSLHACRSTLEDPRVPSSNSLAVVLQRRDWENPGVTQLNRLAAHPPFASWRNSEEARTDRPSQQLRSLNGEWRLMRYFLLTHLCGISHRIWCTLSTICSDAA",
      b"gagatacctacagcgtgagctatgagaaagcgccacgcttcccgaagggagaaaggcggacaggtatccggtaagcggcagggtcgg",
    ];
    for text in inputs {
      let got = PrefixDoubling.build(text).unwrap();
      assert_eq!(got, naive(text), "mismatch for {:?}", String::from_utf8_lossy(text));
      got.validate(text).unwrap();
    }
  }

  #[test]
  fn empty_corpus() {
    let out = PrefixDoubling.build(b"").unwrap();
    assert!(out.sa.is_empty() && out.lcp.is_empty());
    out.validate(b"").unwrap();
  }

  #[test]
  fn validate_rejects_wrong_length() {
    let out = SuffixLcp { sa: vec![0], lcp: vec![0] };
    assert_eq!(
      out.validate(b"AC"),
      Err(EngineError::LengthMismatch { array: "suffix array", expected: 2, actual: 1 })
    );
  }

  #[test]
  fn validate_rejects_duplicate_offsets() {
    let out = SuffixLcp { sa: vec![0, 0], lcp: vec![0, 0] };
    assert_eq!(out.validate(b"AC"), Err(EngineError::NotAPermutation { rank: 1, offset: 0 }));
  }

  #[test]
  fn validate_rejects_unsorted_and_bad_lcp() {
    // "CA": sorted order is [1, 0].
    let unsorted = SuffixLcp { sa: vec![0, 1], lcp: vec![0, 0] };
    assert!(matches!(unsorted.validate(b"CA"), Err(EngineError::InvalidLcp { rank: 1, .. })));

    let nonzero_first = SuffixLcp { sa: vec![1, 0], lcp: vec![1, 0] };
    assert_eq!(nonzero_first.validate(b"CA"), Err(EngineError::InvalidLcp { rank: 0, lcp: 1 }));
  }

  #[test]
  fn validate_rejects_overstated_lcp_hiding_bad_order() {
    // "BAC" sorts as [1, 0, 2]; an inflated lcp would mask [2, 0, 1].
    let bogus = SuffixLcp { sa: vec![2, 0, 1], lcp: vec![0, 1, 1] };
    assert_eq!(bogus.validate(b"BAC"), Err(EngineError::InvalidLcp { rank: 1, lcp: 1 }));

    let good = naive(b"BAC");
    let mut inflated = good.clone();
    inflated.lcp[2] += 1;
    assert!(good.validate(b"BAC").is_ok());
    assert!(matches!(inflated.validate(b"BAC"), Err(EngineError::InvalidLcp { rank: 2, .. })));
  }

  #[test]
  fn validate_rejects_huge_lcp_without_overflow() {
    let out = SuffixLcp { sa: vec![1, 0], lcp: vec![0, u64::MAX] };
    assert_eq!(out.validate(b"CA"), Err(EngineError::InvalidLcp { rank: 1, lcp: u64::MAX }));
  }

  #[test]
  fn entries_carry_rank() {
    let out = PrefixDoubling.build(b"GTAC").unwrap();
    let entries: Vec<_> = out.entries().collect();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().enumerate().all(|(i, e)| e.position == i as CorpusOffset));
    assert_eq!(entries[0].lcp, 0);
  }
}
