//! Output sinks for rendered pages.

use std::{fs, io, path::Path};
#[cfg(test)]
use std::{collections::BTreeMap, path::PathBuf};

/// Where rendered pages go.
pub trait OutputWriter {
    /// Write `contents` to `path`, creating parent directories and replacing
    /// any existing file.
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Writes to the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl OutputWriter for FsWriter {
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }
}

/// Keeps pages in memory, keyed by path.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

#[cfg(test)]
impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files
            .get(path.as_ref())
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
impl OutputWriter for MemoryWriter {
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
