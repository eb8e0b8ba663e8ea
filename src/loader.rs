use crate::constants::CACHE_TTL;
use crate::error::{ConfigError, Result};
use crate::types::ConfigReadResult;
use crate::utils::FileSystem;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

struct CachedRead {
    loaded_at: Instant,
    result: Arc<ConfigReadResult>,
}

/// Reads one config file and caches the parse for a fixed TTL.
///
/// A failed read or parse clears the cache, so an error is never followed
/// by a stale success from an older read.
pub struct ConfigSource {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    ttl: Duration,
    cache: Mutex<Option<CachedRead>>,
}

impl ConfigSource {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self::with_ttl(path, fs, CACHE_TTL)
    }

    pub fn with_ttl(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            fs,
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached parse if still fresh, otherwise read the file again
    pub async fn read(&self) -> Result<Arc<ConfigReadResult>> {
        if let Some(cached) = self.cached() {
            debug!(path = %self.path.display(), "Config cache hit");
            return Ok(cached);
        }

        let fs = Arc::clone(&self.fs);
        let path = self.path.clone();
        let outcome = task::spawn_blocking(move || read_config(fs.as_ref(), &path))
            .await
            .map_err(ConfigError::from)
            .and_then(|result| result);

        let mut cache = self.lock_cache();
        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                *cache = Some(CachedRead {
                    loaded_at: Instant::now(),
                    result: Arc::clone(&result),
                });
                Ok(result)
            }
            Err(err) => {
                *cache = None;
                debug!(path = %self.path.display(), code = err.code(), "Config read failed");
                Err(err)
            }
        }
    }

    /// Drop the cache and read the file again
    pub async fn refresh(&self) -> Result<Arc<ConfigReadResult>> {
        self.clear_cache();
        self.read().await
    }

    pub fn clear_cache(&self) {
        *self.lock_cache() = None;
    }

    fn cached(&self) -> Option<Arc<ConfigReadResult>> {
        let cache = self.lock_cache();
        cache
            .as_ref()
            .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.result))
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<CachedRead>> {
        // The guarded value is a plain Option, a poisoned lock is still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSource")
            .field("path", &self.path)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Read and parse a config file without caching.
///
/// An empty (or whitespace-only) file is an empty config, not an error.
pub fn read_config(fs: &dyn FileSystem, path: &Path) -> Result<ConfigReadResult> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidPath {
            path: path.to_path_buf(),
        });
    }

    let content = fs
        .read_to_string(path)
        .map_err(|source| ConfigError::from_io(path.to_path_buf(), source))?;

    parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse config text; the top level must be a JSON object
pub fn parse_config(content: &str) -> std::result::Result<ConfigReadResult, serde_json::Error> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Ok(ConfigReadResult::from_config(Map::new()));
    }

    let config: Map<String, Value> = serde_json::from_str(content)?;
    Ok(ConfigReadResult::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::OsFileSystem;
    use crate::utils::fs::MockFileSystem;
    use serde_json::json;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(".claude.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_zero_byte_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let source = ConfigSource::new(path, Arc::new(OsFileSystem));

        let result = source.read().await.unwrap();
        assert!(result.config.is_empty());
        assert_eq!(result.projects, json!([]));
    }

    #[tokio::test]
    async fn test_read_exposes_raw_projects() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"projects": {"/p": {}}, "settings": {"a": 1}}"#);
        let source = ConfigSource::new(path, Arc::new(OsFileSystem));

        let result = source.read().await.unwrap();
        assert_eq!(result.projects, json!({"/p": {}}));
        assert_eq!(result.config["settings"], json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_cached_within_ttl_until_cleared() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"projects": [{"path": "/old"}]}"#);
        let source = ConfigSource::new(path.clone(), Arc::new(OsFileSystem));

        let first = source.read().await.unwrap();
        fs::write(&path, r#"{"projects": [{"path": "/new"}]}"#).unwrap();

        let second = source.read().await.unwrap();
        assert_eq!(first, second);

        let third = source.refresh().await.unwrap();
        assert_eq!(third.projects, json!([{"path": "/new"}]));
    }

    #[tokio::test]
    async fn test_expired_entry_is_reloaded() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"v": 1}"#);
        let source = ConfigSource::with_ttl(path.clone(), Arc::new(OsFileSystem), Duration::ZERO);

        source.read().await.unwrap();
        fs::write(&path, r#"{"v": 2}"#).unwrap();

        assert_eq!(source.read().await.unwrap().config["v"], json!(2));
    }

    #[tokio::test]
    async fn test_error_taxonomy() {
        let dir = TempDir::new().unwrap();

        let missing = ConfigSource::new(dir.path().join("absent.json"), Arc::new(OsFileSystem));
        assert_eq!(missing.read().await.unwrap_err().code(), "FILE_NOT_FOUND");

        let path = write_config(&dir, "{not json");
        let corrupt = ConfigSource::new(path, Arc::new(OsFileSystem));
        assert_eq!(corrupt.read().await.unwrap_err().code(), "PARSE_ERROR");

        let top_level_array = write_config(&dir, "[1, 2]");
        let source = ConfigSource::new(top_level_array, Arc::new(OsFileSystem));
        assert_eq!(source.read().await.unwrap_err().code(), "PARSE_ERROR");

        let empty = ConfigSource::new(PathBuf::new(), Arc::new(OsFileSystem));
        assert_eq!(empty.read().await.unwrap_err().code(), "INVALID_PATH");
    }

    #[tokio::test]
    async fn test_failure_clears_cache() {
        let mut mock = MockFileSystem::new();
        let mut calls = 0;
        mock.expect_read_to_string().times(3).returning(move |_| {
            calls += 1;
            match calls {
                1 => Ok(r#"{"v": 1}"#.to_string()),
                2 => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
                _ => Ok(r#"{"v": 3}"#.to_string()),
            }
        });
        let source = ConfigSource::new("/home/u/.claude.json", Arc::new(mock));

        assert_eq!(source.read().await.unwrap().config["v"], json!(1));

        source.clear_cache();
        assert_eq!(source.read().await.unwrap_err().code(), "ACCESS_DENIED");

        // Nothing stale left behind: the next read goes to the file again
        assert_eq!(source.read().await.unwrap().config["v"], json!(3));
    }
}
