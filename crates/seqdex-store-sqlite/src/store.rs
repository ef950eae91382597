//! [`SqliteStore`], the SQLite implementation of [`SequenceIndex`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;

use seqdex_core::{
  corpus::SequenceRange,
  hash::{ContentHasher, Sha256Hasher},
  reference::{Ingested, NewReference, Reference, ReferenceLink},
  sequence::{Sequence, SequenceKind, validate_residues},
  store::{Hit, IndexStats, SequenceIndex},
  suffix::{CorpusOffset, PrefixDoubling, SuffixArrayBuilder, SuffixArrayEntry},
};

use crate::{
  Error, Result,
  encode::{LinkRow, RawReference, RawSequence, encode_annotations, encode_dt, offset_column},
  rebuild, schema::SCHEMA, search,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A seqdex store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted, and every
/// clone funnels its calls through the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  hasher: Arc<dyn ContentHasher>,
  engine: Arc<dyn SuffixArrayBuilder>,
}

/// One ingest input after validation and hashing, ready for the connection
/// thread.
struct PreparedIngest {
  sequence:    Sequence,
  translation: Option<Sequence>,
  link:        LinkRow,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await.map_err(Error::Schema)?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await.map_err(Error::Schema)?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::Schema)?;

    Ok(Self {
      conn,
      hasher: Arc::new(Sha256Hasher),
      engine: Arc::new(PrefixDoubling),
    })
  }

  /// Replace the content hasher used by [`SequenceIndex::ingest`].
  pub fn with_hasher(mut self, hasher: impl ContentHasher + 'static) -> Self {
    self.hasher = Arc::new(hasher);
    self
  }

  /// Replace the suffix/LCP engine used by [`SequenceIndex::rebuild_index`].
  pub fn with_engine(mut self, engine: impl SuffixArrayBuilder + 'static) -> Self {
    self.engine = Arc::new(engine);
    self
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Validate and hash an ingest input.
  fn prepare_ingest(&self, input: NewReference) -> Result<PreparedIngest> {
    validate_residues(&input.display_name, &input.residues)?;

    let translation = match input.translation() {
      Some(protein) => {
        validate_residues(&input.display_name, protein)?;
        Some(Sequence {
          content_hash: self.hasher.hash(SequenceKind::Protein, false, protein),
          residues:     protein.to_owned(),
          is_circular:  false,
          kind:         SequenceKind::Protein,
        })
      }
      None => None,
    };

    let sequence = Sequence {
      content_hash: self.hasher.hash(input.kind, input.is_circular, &input.residues),
      residues:     input.residues,
      is_circular:  input.is_circular,
      kind:         input.kind,
    };

    let link = LinkRow::encode(ReferenceLink {
      display_name:      input.display_name,
      sequence_hash:     sequence.content_hash.clone(),
      translation_hash:  translation.as_ref().map(|t| t.content_hash.clone()),
      annotations:       input.annotations,
      unique_identifier: input.unique_identifier,
      organization:      input.organization,
      source_database:   input.source_database,
    })?;

    Ok(PreparedIngest { sequence, translation, link })
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

fn insert_sequence(conn: &Connection, sequence: &Sequence) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT INTO sequences (content_hash, residues, is_circular, kind)
       VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT (content_hash) DO NOTHING",
    )?
    .execute(rusqlite::params![
      sequence.content_hash,
      sequence.residues,
      sequence.is_circular,
      sequence.kind.as_str(),
    ])?;
  Ok(())
}

/// Insert a reference row and return its id.
///
/// With and without a translation are two distinct statements; the
/// translation column is never written as an explicit NULL.
fn insert_reference(conn: &Connection, link: &LinkRow, now: &str) -> rusqlite::Result<i64> {
  match &link.translation_hash {
    Some(translation_hash) => {
      conn
        .prepare_cached(
          "INSERT INTO sequence_references (
             display_name, unique_identifier, created_at, updated_at,
             sequence_hash, translation_hash, organization, source_database, annotations
           ) VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?
        .execute(rusqlite::params![
          link.display_name,
          link.unique_identifier,
          now,
          link.sequence_hash,
          translation_hash,
          link.organization,
          link.source_database,
          link.annotations,
        ])?;
    }
    None => {
      conn
        .prepare_cached(
          "INSERT INTO sequence_references (
             display_name, unique_identifier, created_at, updated_at,
             sequence_hash, organization, source_database, annotations
           ) VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7)",
        )?
        .execute(rusqlite::params![
          link.display_name,
          link.unique_identifier,
          now,
          link.sequence_hash,
          link.organization,
          link.source_database,
          link.annotations,
        ])?;
    }
  }
  Ok(conn.last_insert_rowid())
}

/// Store the sequence, its translation, and the reference row.
fn write_ingest(conn: &Connection, item: &PreparedIngest, now: &str) -> rusqlite::Result<Ingested> {
  insert_sequence(conn, &item.sequence)?;
  if let Some(translation) = &item.translation {
    insert_sequence(conn, translation)?;
  }
  let reference_id = insert_reference(conn, &item.link, now)?;
  Ok(Ingested {
    reference_id,
    sequence_hash: item.sequence.content_hash.clone(),
    translation_hash: item.link.translation_hash.clone(),
  })
}

fn count(conn: &Connection, table: &str) -> rusqlite::Result<u64> {
  let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
  Ok(n as u64)
}

// ─── SequenceIndex impl ──────────────────────────────────────────────────────

impl SequenceIndex for SqliteStore {
  type Error = Error;

  // ── Sequences & references ────────────────────────────────────────────────

  async fn put_sequence(&self, sequence: Sequence) -> Result<()> {
    validate_residues(&sequence.content_hash, &sequence.residues)?;

    self
      .conn
      .call(move |conn| {
        insert_sequence(conn, &sequence)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn put_reference(&self, link: ReferenceLink) -> Result<i64> {
    let row = LinkRow::encode(link)?;
    let now = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| Ok(insert_reference(conn, &row, &now)?))
      .await?;
    Ok(id)
  }

  async fn ingest(&self, input: NewReference) -> Result<Ingested> {
    let prepared = self.prepare_ingest(input)?;
    let now = encode_dt(Utc::now());

    let ingested = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let ingested = write_ingest(&tx, &prepared, &now)?;
        tx.commit()?;
        Ok(ingested)
      })
      .await?;

    debug!(reference_id = ingested.reference_id, sequence_hash = %ingested.sequence_hash, "ingested");
    Ok(ingested)
  }

  async fn ingest_batch(&self, inputs: Vec<NewReference>) -> Result<Vec<Ingested>> {
    let prepared: Vec<PreparedIngest> = inputs
      .into_iter()
      .map(|input| self.prepare_ingest(input))
      .collect::<Result<_>>()?;
    let now = encode_dt(Utc::now());

    let ingested = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = prepared
          .iter()
          .map(|item| write_ingest(&tx, item, &now))
          .collect::<rusqlite::Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(out)
      })
      .await?;

    debug!(references = ingested.len(), "ingested batch");
    Ok(ingested)
  }

  async fn get_sequence(&self, content_hash: String) -> Result<Option<Sequence>> {
    let raw: Option<RawSequence> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM sequences WHERE content_hash = ?1", RawSequence::COLUMNS);
        Ok(conn.query_row(&sql, [content_hash], RawSequence::from_row).optional()?)
      })
      .await?;

    raw.map(RawSequence::into_sequence).transpose()
  }

  async fn get_reference(&self, id: i64) -> Result<Option<Reference>> {
    let raw: Option<RawReference> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM sequence_references WHERE id = ?1", RawReference::COLUMNS);
        Ok(conn.query_row(&sql, [id], RawReference::from_row).optional()?)
      })
      .await?;

    raw.map(RawReference::into_reference).transpose()
  }

  async fn list_references(&self) -> Result<Vec<Reference>> {
    let raws: Vec<RawReference> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM sequence_references ORDER BY id", RawReference::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawReference::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReference::into_reference).collect()
  }

  async fn update_annotations(&self, id: i64, annotations: serde_json::Value) -> Result<Reference> {
    let json = encode_annotations(&annotations)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sequence_references SET annotations = ?2 WHERE id = ?1",
          rusqlite::params![id, json],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ReferenceNotFound(id));
    }
    self.get_reference(id).await?.ok_or(Error::ReferenceNotFound(id))
  }

  // ── Index ─────────────────────────────────────────────────────────────────

  async fn rebuild_index(&self) -> Result<IndexStats> {
    let engine = Arc::clone(&self.engine);
    let stats = self
      .conn
      .call(move |conn| rebuild::rebuild(conn, engine.as_ref()))
      .await?;
    Ok(stats)
  }

  async fn resolve(&self, corpus_offset: CorpusOffset) -> Result<Option<String>> {
    let range = self
      .conn
      .call(move |conn| Ok(search::range_at(conn, corpus_offset)?))
      .await?;
    Ok(range.map(|r| r.sequence_hash))
  }

  async fn search<'a>(&'a self, pattern: &'a str) -> Result<Vec<Hit>> {
    if pattern.is_empty() {
      return Err(seqdex_core::Error::EmptyPattern.into());
    }
    let pattern = pattern.as_bytes().to_vec();

    let hits = self
      .conn
      .call(move |conn| Ok(search::search(conn, &pattern)?))
      .await?;
    Ok(hits)
  }

  async fn sequence_ranges(&self) -> Result<Vec<SequenceRange>> {
    let ranges = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT sequence_hash, range_start, range_end FROM sequence_ranges ORDER BY range_start",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SequenceRange {
              sequence_hash: row.get(0)?,
              start:         offset_column(row, 1)?,
              end:           offset_column(row, 2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ranges)
  }

  async fn suffix_array(&self) -> Result<Vec<SuffixArrayEntry>> {
    let entries = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT position, corpus_offset, lcp FROM suffix_array ORDER BY position")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SuffixArrayEntry {
              position:      offset_column(row, 0)?,
              corpus_offset: offset_column(row, 1)?,
              lcp:           offset_column(row, 2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(entries)
  }

  async fn corpus(&self) -> Result<String> {
    let corpus = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT symbol FROM corpus_symbols ORDER BY position")?;
        let mut corpus = String::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
          corpus.push_str(&row.get::<_, String>(0)?);
        }
        Ok(corpus)
      })
      .await?;
    Ok(corpus)
  }

  async fn stats(&self) -> Result<IndexStats> {
    let stats = self
      .conn
      .call(|conn| {
        Ok(IndexStats {
          sequences: count(conn, "sequences")?,
          symbols:   count(conn, "corpus_symbols")?,
          suffixes:  count(conn, "suffix_array")?,
        })
      })
      .await?;
    Ok(stats)
  }
}
