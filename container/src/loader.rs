//! JSON file persistence for the config stores and the metadata cache, plus
//! the on-disk layout they share.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

const JSON_EXTENSION: &str = "json";

/// Load/save seam for persisted mappings.
pub trait FileLoader: Send + Sync {
  fn load(&self, path: &Path) -> Result<Value>;
  fn save(&self, path: &Path, data: &Value) -> Result<()>;
}

/// The shipped [`FileLoader`]: strict JSON files.
///
/// Loading fails on an unreadable file, a non-`.json` extension, an empty
/// file and invalid JSON, each with its own message. Saving creates missing
/// parent directories and writes pretty output for config files or compact
/// output for cache files.
#[derive(Clone, Copy, Debug)]
pub struct JsonFile {
  pretty: bool,
}

impl JsonFile {
  pub fn pretty() -> Self {
    Self { pretty: true }
  }

  pub fn compact() -> Self {
    Self { pretty: false }
  }

  fn check_extension(path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    if extension != Some(JSON_EXTENSION) {
      return Err(Error::Json {
        path: path.to_owned(),
        reason: "not a JSON file".into(),
      });
    }
    Ok(())
  }
}

impl FileLoader for JsonFile {
  fn load(&self, path: &Path) -> Result<Value> {
    Self::check_extension(path)?;

    let contents = fs::read_to_string(path).map_err(|e| Error::Json {
      path: path.to_owned(),
      reason: format!("not readable: {e}"),
    })?;

    if contents.trim().is_empty() {
      return Err(Error::Json {
        path: path.to_owned(),
        reason: "file is empty".into(),
      });
    }

    serde_json::from_str(&contents).map_err(|e| Error::Json {
      path: path.to_owned(),
      reason: format!("does not contain valid JSON: {e}"),
    })
  }

  fn save(&self, path: &Path, data: &Value) -> Result<()> {
    Self::check_extension(path)?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }

    let contents = if self.pretty {
      serde_json::to_string_pretty(data).map_err(|e| Error::Json {
        path: path.to_owned(),
        reason: format!("cannot be encoded: {e}"),
      })?
    } else {
      serde_json::to_string(data).map_err(|e| Error::Json {
        path: path.to_owned(),
        reason: format!("cannot be encoded: {e}"),
      })?
    };

    fs::write(path, contents)?;
    Ok(())
  }
}

/// The directory scheme shared by every store: config files under
/// `<root>/etc`, cache files under `<root>/var/cache`.
#[derive(Clone, Debug)]
pub struct Layout {
  root: PathBuf,
}

impl Layout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn etc(&self) -> PathBuf {
    self.root.join("etc")
  }

  pub fn cache_dir(&self) -> PathBuf {
    self.root.join("var").join("cache")
  }

  pub fn config_file(&self, file_name: &str) -> PathBuf {
    self.etc().join(file_name)
  }

  pub fn cache_file(&self, file_name: &str) -> PathBuf {
    self.cache_dir().join(file_name)
  }

  /// Creates the etc and cache directories if they do not exist yet.
  pub fn ensure(&self) -> Result<()> {
    fs::create_dir_all(self.etc())?;
    fs::create_dir_all(self.cache_dir())?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::io::Write;

  #[test]
  fn rejects_non_json_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.yaml");
    fs::write(&path, "{}").unwrap();

    let err = JsonFile::pretty().load(&path).unwrap_err();
    assert!(err.to_string().contains("not a JSON file"));
  }

  #[test]
  fn rejects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::File::create(&path).unwrap().write_all(b"  \n").unwrap();

    let err = JsonFile::pretty().load(&path).unwrap_err();
    assert!(err.to_string().contains("file is empty"));
  }

  #[test]
  fn rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(&path, "{not json").unwrap();

    let err = JsonFile::pretty().load(&path).unwrap_err();
    assert!(err.to_string().contains("does not contain valid JSON"));
  }

  #[test]
  fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data.json");
    let data = json!({"app::TestA": "app::TestB"});

    JsonFile::compact().save(&path, &data).unwrap();
    assert_eq!(JsonFile::compact().load(&path).unwrap(), data);
  }

  #[test]
  fn layout_paths() {
    let layout = Layout::new("/srv/app");
    assert_eq!(layout.config_file("rewrites.json"), PathBuf::from("/srv/app/etc/rewrites.json"));
    assert_eq!(
      layout.cache_file("classes.json"),
      PathBuf::from("/srv/app/var/cache/classes.json")
    );
  }
}
