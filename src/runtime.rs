//! File-system and clock access behind a single trait.
//!
//! Core modules never touch `std::fs` directly; they receive a `&dyn Runtime`
//! so the whole pipeline can run against an in-memory tree in tests.
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

pub trait Runtime {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Names of the entries directly below `path`, sorted.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>>;
    fn current_dir(&self) -> io::Result<PathBuf>;
    fn now(&self) -> DateTime<Utc>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRuntime;

impl Runtime for OsRuntime {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `path` made absolute against `base` with `.` and `..` folded away, without
/// touching the file system.
pub fn lexical_absolute(base: &Path, path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
pub use memory::MemoryRuntime;
