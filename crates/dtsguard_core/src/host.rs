//! Access to source text.
//!
//! The front end never touches the file system directly, so tests can feed it
//! virtual files through [`MemoryHost`].

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use path_clean::clean;

pub trait SourceHost {
    fn read(&self, path: &Path) -> io::Result<String>;

    fn exists(&self, path: &Path) -> bool;
}

/// Reads files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsHost;

impl SourceHost for FsHost {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory files keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    files: HashMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(clean(path.as_ref()), source.into());
    }
}

impl SourceHost for MemoryHost {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&clean(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&clean(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_host_normalizes_paths() {
        let host = MemoryHost::new().with_file("/lib/./a/../index.d.ts", "export {};");
        assert!(host.exists(Path::new("/lib/index.d.ts")));
        assert_eq!(host.read(Path::new("/lib/index.d.ts")).unwrap(), "export {};");
        assert!(!host.exists(Path::new("/lib/other.d.ts")));
        assert_eq!(host.read(Path::new("/lib/other.d.ts")).unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fs_host() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("index.d.ts");
        fs::write(&file, "export declare const a: number;").unwrap();

        assert!(FsHost.exists(&file));
        assert!(!FsHost.exists(temp_dir.path()));
        assert_eq!(FsHost.read(&file).unwrap(), "export declare const a: number;");
    }
}
