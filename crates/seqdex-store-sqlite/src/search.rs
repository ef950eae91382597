//! Reads against the persisted index: offset resolution and substring search.
//!
//! Search binary-searches the `suffix_array` table by rank. Each probe reads
//! one `corpus_offset` and at most `pattern.len()` symbols, so nothing
//! proportional to the corpus is loaded.

use std::cmp::Ordering;

use rusqlite::{Connection, OptionalExtension as _};
use seqdex_core::{corpus::SequenceRange, store::Hit, suffix::CorpusOffset};

use crate::encode::{encode_offset, offset_column};

/// The range containing `offset`, if any.
pub fn range_at(conn: &Connection, offset: CorpusOffset) -> rusqlite::Result<Option<SequenceRange>> {
  let mut stmt = conn.prepare_cached(
    "SELECT sequence_hash, range_start, range_end
     FROM sequence_ranges
     WHERE range_start <= ?1
     ORDER BY range_start DESC
     LIMIT 1",
  )?;
  let range = stmt
    .query_row([encode_offset(offset)?], |row| {
      Ok(SequenceRange {
        sequence_hash: row.get(0)?,
        start:         offset_column(row, 1)?,
        end:           offset_column(row, 2)?,
      })
    })
    .optional()?;
  Ok(range.filter(|r| r.contains(offset)))
}

pub fn suffix_count(conn: &Connection) -> rusqlite::Result<CorpusOffset> {
  let n: i64 = conn.query_row("SELECT COUNT(*) FROM suffix_array", [], |row| row.get(0))?;
  crate::encode::decode_offset(0, n)
}

/// Compare the suffix at `rank`, truncated to the pattern length, with the
/// pattern.
fn compare_at(conn: &Connection, rank: CorpusOffset, pattern: &[u8]) -> rusqlite::Result<Ordering> {
  let offset: CorpusOffset = conn
    .prepare_cached("SELECT corpus_offset FROM suffix_array WHERE position = ?1")?
    .query_row([encode_offset(rank)?], |row| offset_column(row, 0))?;

  let end = offset + pattern.len() as CorpusOffset;
  let mut stmt = conn.prepare_cached(
    "SELECT symbol FROM corpus_symbols
     WHERE position >= ?1 AND position < ?2
     ORDER BY position",
  )?;
  let mut prefix = Vec::with_capacity(pattern.len());
  let mut rows = stmt.query([encode_offset(offset)?, encode_offset(end)?])?;
  while let Some(row) = rows.next()? {
    let symbol: String = row.get(0)?;
    prefix.extend_from_slice(symbol.as_bytes());
  }

  Ok(prefix.as_slice().cmp(pattern))
}

/// First rank in `[0, n)` whose truncated suffix is not `before` the pattern.
fn partition(
  conn: &Connection,
  n: CorpusOffset,
  pattern: &[u8],
  before: impl Fn(Ordering) -> bool,
) -> rusqlite::Result<CorpusOffset> {
  let (mut lo, mut hi) = (0, n);
  while lo < hi {
    let mid = lo + (hi - lo) / 2;
    if before(compare_at(conn, mid, pattern)?) {
      lo = mid + 1;
    } else {
      hi = mid;
    }
  }
  Ok(lo)
}

/// All occurrences of a non-empty `pattern`, sorted by corpus offset.
pub fn search(conn: &Connection, pattern: &[u8]) -> rusqlite::Result<Vec<Hit>> {
  let n = suffix_count(conn)?;
  let lower = partition(conn, n, pattern, |ord| ord == Ordering::Less)?;
  let upper = partition(conn, n, pattern, |ord| ord != Ordering::Greater)?;
  if lower == upper {
    return Ok(Vec::new());
  }

  let matches: Vec<(CorpusOffset, CorpusOffset)> = conn
    .prepare_cached(
      "SELECT position, corpus_offset FROM suffix_array
       WHERE position >= ?1 AND position < ?2",
    )?
    .query_map([encode_offset(lower)?, encode_offset(upper)?], |row| {
      Ok((offset_column(row, 0)?, offset_column(row, 1)?))
    })?
    .collect::<rusqlite::Result<_>>()?;

  let len = pattern.len() as CorpusOffset;
  let mut hits = Vec::with_capacity(matches.len());
  for (rank, corpus_offset) in matches {
    // Every symbol position is covered by a range written in the same
    // rebuild, so a miss means the tables were edited out of band.
    let Some(range) = range_at(conn, corpus_offset)? else {
      return Err(rusqlite::Error::QueryReturnedNoRows);
    };
    hits.push(Hit {
      rank,
      corpus_offset,
      offset_in_sequence: corpus_offset - range.start,
      crosses_boundary: !range.contains_span(corpus_offset, len),
      sequence_hash: range.sequence_hash,
    });
  }
  hits.sort_by_key(|h| h.corpus_offset);
  Ok(hits)
}
