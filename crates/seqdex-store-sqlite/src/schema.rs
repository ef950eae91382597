//! SQL schema for the seqdex SQLite store.
//!
//! Executed once at connection startup. Every statement is idempotent, so
//! reopening an existing database is safe. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Content-addressed, immutable. Insertion order (rowid) is corpus order.
CREATE TABLE IF NOT EXISTS sequences (
    content_hash TEXT PRIMARY KEY,
    residues     TEXT NOT NULL,
    is_circular  INTEGER NOT NULL CHECK (is_circular IN (0, 1)),
    kind         TEXT NOT NULL CHECK (kind IN ('dna', 'rna', 'protein'))
);

CREATE INDEX IF NOT EXISTS sequences_kind_idx ON sequences(content_hash, kind);

CREATE TABLE IF NOT EXISTS sequence_references (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name      TEXT NOT NULL,
    unique_identifier TEXT UNIQUE,
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at        TEXT NOT NULL,   -- RFC 3339 UTC; stamped by trigger
    sequence_hash     TEXT NOT NULL REFERENCES sequences(content_hash),
    translation_hash  TEXT REFERENCES sequences(content_hash),
    organization      TEXT,
    source_database   TEXT,
    annotations       TEXT NOT NULL DEFAULT 'null'   -- JSON
);

CREATE INDEX IF NOT EXISTS sequence_references_sequence_idx
    ON sequence_references(sequence_hash);
CREATE INDEX IF NOT EXISTS sequence_references_translation_idx
    ON sequence_references(translation_hash);
CREATE INDEX IF NOT EXISTS sequence_references_provenance_idx
    ON sequence_references(organization, source_database);

-- Recursive triggers are off, so the inner UPDATE does not re-fire this.
CREATE TRIGGER IF NOT EXISTS sequence_references_touch
AFTER UPDATE ON sequence_references
BEGIN
    UPDATE sequence_references
       SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
     WHERE id = NEW.id;
END;

-- A translation link must point at a stored protein.
CREATE TRIGGER IF NOT EXISTS sequence_references_translation_kind
BEFORE INSERT ON sequence_references
WHEN NEW.translation_hash IS NOT NULL
 AND (SELECT kind FROM sequences WHERE content_hash = NEW.translation_hash)
     IS NOT 'protein'
BEGIN
    SELECT RAISE(ABORT, 'translation_hash must reference a protein sequence');
END;

-- Derived index state. Wiped and rewritten by every rebuild.
CREATE TABLE IF NOT EXISTS corpus_symbols (
    position INTEGER PRIMARY KEY,
    symbol   TEXT NOT NULL CHECK (length(symbol) = 1)
);

CREATE TABLE IF NOT EXISTS sequence_ranges (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    sequence_hash TEXT NOT NULL REFERENCES sequences(content_hash),
    range_start   INTEGER NOT NULL REFERENCES corpus_symbols(position),
    range_end     INTEGER NOT NULL,   -- exclusive
    CHECK (range_start < range_end)
);

CREATE INDEX IF NOT EXISTS sequence_ranges_span_idx
    ON sequence_ranges(range_start, range_end);
CREATE INDEX IF NOT EXISTS sequence_ranges_hash_idx
    ON sequence_ranges(sequence_hash);

CREATE TABLE IF NOT EXISTS suffix_array (
    position      INTEGER PRIMARY KEY,   -- rank in sorted suffix order
    corpus_offset INTEGER NOT NULL REFERENCES corpus_symbols(position),
    lcp           INTEGER NOT NULL CHECK (lcp >= 0)
);

PRAGMA user_version = 1;
";

/// Derived tables in the order they must be cleared (referrers first).
pub const DERIVED_TABLES: [&str; 3] = ["suffix_array", "sequence_ranges", "corpus_symbols"];
