use std::fs;
use std::io;
use std::path::Path;

/// Blocking filesystem access used for config reads and UNC/mount probes.
///
/// Kept synchronous so implementations stay trivial; async callers run it
/// under `spawn_blocking`.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the directories directly below `path`
    fn list_dir_names(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let names = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }
}
