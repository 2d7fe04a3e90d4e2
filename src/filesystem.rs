use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Disk access used by all exporters.
///
/// Everything the crate writes goes through this trait so exports can run
/// against [`MemoryFileSystem`] in tests.
pub trait FileSystem: Sync {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// Whether an existing file at `path` refuses writes.
    /// Missing files are never read-only.
    fn is_read_only(&self, path: &Path) -> bool;
}

pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        std::fs::write(path, data)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_read_only(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|metadata| metadata.is_file() && metadata.permissions().readonly())
            .unwrap_or(false)
    }
}

#[derive(Default)]
struct MemoryFileSystemState {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
    read_only: HashSet<String>,
}

/// In-memory file system.
///
/// Unlike a plain map of files this keeps track of directories: writing a file
/// whose parent directory was never created fails with `NotFound`, the same
/// way the real file system does.
#[derive(Default, Clone)]
pub struct MemoryFileSystem {
    state: Arc<RwLock<MemoryFileSystemState>>,
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn lock_poisoned() -> io::Error {
    io::Error::other("memory file system lock poisoned")
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.read().ok()?;
        state.files.get(path).cloned()
    }

    /// All file paths, sorted.
    pub fn list_files(&self) -> Vec<String> {
        let Ok(state) = self.state.read() else {
            return vec![];
        };
        let mut files: Vec<String> = state.files.keys().cloned().collect();
        files.sort();
        files
    }

    /// Marks an existing or future file as read-only.
    pub fn set_read_only(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        state.read_only.insert(key(path));
        Ok(())
    }

    pub fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let data = self.read_file(path)?;
        String::from_utf8(data).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 data in file {}: {}", path.display(), e),
            )
        })
    }
}

fn parent_exists(state: &MemoryFileSystemState, path: &Path) -> bool {
    match path.parent() {
        None => true,
        Some(parent) if parent.as_os_str().is_empty() => true,
        Some(parent) if parent.components().all(|c| matches!(c, Component::RootDir)) => true,
        Some(parent) => state.dirs.contains(&key(parent)),
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        state.files.get(&key(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let path_str = key(path);
        if state.read_only.contains(&path_str) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("File is read-only: {}", path.display()),
            ));
        }
        if !parent_exists(&state, path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory not found: {}", path.display()),
            ));
        }
        state.files.insert(path_str, data.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            let current_str = key(&current);
            if state.files.contains_key(&current_str) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Not a directory: {}", current.display()),
                ));
            }
            state.dirs.insert(current_str);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path_str = key(path);
        self.state
            .read()
            .map(|state| state.files.contains_key(&path_str) || state.dirs.contains(&path_str))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path_str = key(path);
        self.state
            .read()
            .map(|state| state.dirs.contains(&path_str))
            .unwrap_or(false)
    }

    fn is_read_only(&self, path: &Path) -> bool {
        let path_str = key(path);
        self.state
            .read()
            .map(|state| state.files.contains_key(&path_str) && state.read_only.contains(&path_str))
            .unwrap_or(false)
    }
}
