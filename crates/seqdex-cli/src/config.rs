//! Layered configuration: defaults, then an optional TOML file, then
//! `SEQDEX_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime configuration, deserialised from `seqdex.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct SeqdexConfig {
  /// SQLite database holding sequences, references, and the index.
  pub store_path: PathBuf,
}

impl SeqdexConfig {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "seqdex.db")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("SEQDEX"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut cfg: SeqdexConfig = settings
      .try_deserialize()
      .context("failed to deserialise SeqdexConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_default_path() {
    let cfg = SeqdexConfig::load(Path::new("does-not-exist.toml")).unwrap();
    assert!(cfg.store_path.ends_with("seqdex.db") || std::env::var("SEQDEX_STORE_PATH").is_ok());
  }

  #[test]
  fn plain_paths_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
    assert_eq!(expand_tilde(Path::new("rel/x.db")), PathBuf::from("rel/x.db"));
  }
}
