//! Error type for `seqdex-store-sqlite`.

use seqdex_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Schema creation failed. The store cannot be used.
  #[error("schema initialisation failed: {0}")]
  Schema(#[source] tokio_rusqlite::Error),

  /// A unique identifier is taken, or a linked sequence hash does not exist.
  /// The enclosing transaction was rolled back.
  #[error("constraint violation: {0}")]
  Constraint(String),

  /// The suffix engine failed or returned arrays that break its contract.
  /// Raised before the previous index is touched.
  #[error("suffix engine error: {0}")]
  Engine(#[from] EngineError),

  /// A write inside the rebuild transaction failed; the previous index
  /// snapshot is intact.
  #[error(
    "rebuild aborted at {stage}{}: {source}",
    .row.map(|r| format!(" row {r}")).unwrap_or_default()
  )]
  Transaction {
    stage:  &'static str,
    row:    Option<u64>,
    #[source]
    source: rusqlite::Error,
  },

  #[error("reference not found: {0}")]
  ReferenceNotFound(i64),

  #[error("core error: {0}")]
  Core(#[from] seqdex_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rebuild write failure, carried out of the connection thread inside
/// [`tokio_rusqlite::Error::Other`] and unpacked into [`Error::Transaction`].
#[derive(Debug, Error)]
#[error("rebuild write failed at {stage}")]
pub(crate) struct RebuildFailure {
  pub stage:  &'static str,
  pub row:    Option<u64>,
  #[source]
  pub source: rusqlite::Error,
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(e) => classify(e),
      tokio_rusqlite::Error::Other(boxed) => {
        let boxed = match boxed.downcast::<RebuildFailure>() {
          Ok(f) => {
            let RebuildFailure { stage, row, source } = *f;
            return Error::Transaction { stage, row, source };
          }
          Err(other) => other,
        };
        match boxed.downcast::<EngineError>() {
          Ok(e) => Error::Engine(*e),
          Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
        }
      }
      other => Error::Database(other),
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self { classify(err) }
}

/// Surface SQLite constraint failures (UNIQUE, FOREIGN KEY, CHECK, RAISE) as
/// [`Error::Constraint`].
fn classify(err: rusqlite::Error) -> Error {
  match err {
    rusqlite::Error::SqliteFailure(code, ref message)
      if code.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Error::Constraint(message.clone().unwrap_or_else(|| code.to_string()))
    }
    other => Error::Database(tokio_rusqlite::Error::Rusqlite(other)),
  }
}
