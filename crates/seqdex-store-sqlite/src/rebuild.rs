//! Full rebuild of the derived index tables.
//!
//! Runs on the connection thread. The corpus read, the suffix engine, and the
//! delete-then-insert all happen inside one `EXCLUSIVE` transaction; any
//! error drops the transaction, which rolls it back and leaves the previous
//! snapshot in place.

use rusqlite::{Connection, TransactionBehavior};
use seqdex_core::{
  corpus::Corpus,
  store::IndexStats,
  suffix::{SuffixArrayBuilder, SuffixLcp},
};
use tracing::{debug, info};

use crate::{encode::encode_offset, error::RebuildFailure, schema::DERIVED_TABLES};

/// Attach the stage (and row, when known) to a failed write.
fn at(stage: &'static str, row: Option<u64>) -> impl FnOnce(rusqlite::Error) -> tokio_rusqlite::Error {
  move |source| tokio_rusqlite::Error::Other(Box::new(RebuildFailure { stage, row, source }))
}

/// Every stored sequence's `(hash, residues)` in storage order.
pub fn read_ordered(conn: &Connection) -> rusqlite::Result<Vec<(String, String)>> {
  let mut stmt = conn.prepare("SELECT content_hash, residues FROM sequences ORDER BY rowid")?;
  let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
  rows.collect()
}

pub fn rebuild(
  conn: &mut Connection,
  engine: &dyn SuffixArrayBuilder,
) -> tokio_rusqlite::Result<IndexStats> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

  let ordered = read_ordered(&tx)?;
  let corpus = Corpus::from_ordered(&ordered);
  debug!(sequences = ordered.len(), symbols = corpus.len(), "corpus assembled");

  // Nothing has been deleted yet, so an engine failure only needs the
  // transaction dropped.
  let arrays: SuffixLcp = engine
    .build(&corpus.bytes)
    .and_then(|arrays| arrays.validate(&corpus.bytes).map(|()| arrays))
    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
  debug!(suffixes = arrays.sa.len(), "suffix and lcp arrays built");

  for table in DERIVED_TABLES {
    tx.execute(&format!("DELETE FROM {table}"), []).map_err(at(table, None))?;
  }

  {
    let mut insert = tx
      .prepare_cached("INSERT INTO corpus_symbols (position, symbol) VALUES (?1, ?2)")
      .map_err(at("corpus_symbols", None))?;
    let mut buf = [0u8; 4];
    for (position, &byte) in corpus.bytes.iter().enumerate() {
      let row = position as u64;
      let position = encode_offset(row).map_err(at("corpus_symbols", Some(row)))?;
      let symbol: &str = char::from(byte).encode_utf8(&mut buf);
      insert
        .execute(rusqlite::params![position, symbol])
        .map_err(at("corpus_symbols", Some(row)))?;
    }
  }

  {
    let mut insert = tx
      .prepare_cached(
        "INSERT INTO sequence_ranges (sequence_hash, range_start, range_end) VALUES (?1, ?2, ?3)",
      )
      .map_err(at("sequence_ranges", None))?;
    for (row, range) in corpus.ranges.iter().enumerate() {
      let row = row as u64;
      let start = encode_offset(range.start).map_err(at("sequence_ranges", Some(row)))?;
      let end = encode_offset(range.end).map_err(at("sequence_ranges", Some(row)))?;
      insert
        .execute(rusqlite::params![range.sequence_hash, start, end])
        .map_err(at("sequence_ranges", Some(row)))?;
    }
  }

  {
    let mut insert = tx
      .prepare_cached("INSERT INTO suffix_array (position, corpus_offset, lcp) VALUES (?1, ?2, ?3)")
      .map_err(at("suffix_array", None))?;
    for entry in arrays.entries() {
      let row = Some(entry.position);
      let position = encode_offset(entry.position).map_err(at("suffix_array", row))?;
      let offset = encode_offset(entry.corpus_offset).map_err(at("suffix_array", row))?;
      let lcp = encode_offset(entry.lcp).map_err(at("suffix_array", row))?;
      insert
        .execute(rusqlite::params![position, offset, lcp])
        .map_err(at("suffix_array", row))?;
    }
  }

  tx.commit().map_err(at("commit", None))?;

  let stats = IndexStats {
    sequences: ordered.len() as u64,
    symbols:   corpus.len() as u64,
    suffixes:  arrays.sa.len() as u64,
  };
  info!(
    sequences = stats.sequences,
    symbols = stats.symbols,
    suffixes = stats.suffixes,
    "index rebuilt"
  );
  Ok(stats)
}
