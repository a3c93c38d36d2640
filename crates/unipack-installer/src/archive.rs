use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use zip::result::ZipError;
use zip::ZipArchive;

/// Sequential access to a `.upk` package archive: named-entry lookup plus
/// in-order iteration over entries and their decompressed bytes.
#[derive(Debug)]
pub struct PackageArchive {
    archive: ZipArchive<File>,
    path: PathBuf,
}

/// Metadata of one archive entry. A trailing `/` or `\` in the stored name
/// denotes a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
    pub uncompressed_size: u64,
}

impl PackageArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open package archive: {}", path.display()))?;
        let archive = ZipArchive::new(file)
            .with_context(|| format!("failed to read package archive: {}", path.display()))?;
        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_count(&self) -> usize {
        self.archive.len()
    }

    pub fn entry_info(&mut self, index: usize) -> Result<ArchiveEntry> {
        let entry = self.archive.by_index(index).with_context(|| {
            format!(
                "failed to read entry {index} of archive {}",
                self.path.display()
            )
        })?;
        Ok(ArchiveEntry {
            name: entry.name().to_string(),
            is_dir: entry_denotes_dir(entry.name()),
            uncompressed_size: entry.size(),
        })
    }

    /// Reads the full decompressed content of the entry at `index`. A short
    /// read against the declared uncompressed size is a failure.
    pub fn read_entry_at(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut entry = self.archive.by_index(index).with_context(|| {
            format!(
                "failed to read entry {index} of archive {}",
                self.path.display()
            )
        })?;

        let declared = entry.size();
        let mut bytes = Vec::with_capacity(declared as usize);
        entry.read_to_end(&mut bytes).with_context(|| {
            format!(
                "failed to inflate entry '{}' of archive {}",
                entry.name(),
                self.path.display()
            )
        })?;
        if bytes.len() as u64 != declared {
            return Err(anyhow!(
                "short read of entry '{}' ({} of {} bytes) in archive {}",
                entry.name(),
                bytes.len(),
                declared,
                self.path.display()
            ));
        }
        Ok(bytes)
    }

    /// Exact-name lookup. A missing entry is reported as such, distinct from
    /// a decompression failure.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let path = self.path.clone();
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(anyhow!(
                    "entry '{name}' not found in archive {}",
                    path.display()
                ));
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read entry '{name}' of archive {}", path.display())
                });
            }
        };

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).with_context(|| {
            format!("failed to inflate entry '{name}' of archive {}", path.display())
        })?;
        Ok(bytes)
    }
}

pub fn entry_denotes_dir(name: &str) -> bool {
    name.ends_with('/') || name.ends_with('\\')
}

/// Turns a stored entry name into a relative path safe to join under the
/// target directory. Backslash separators are normalized; absolute paths
/// and `..` components are rejected.
pub fn sanitized_entry_path(name: &str) -> Result<PathBuf> {
    let normalized = name.replace('\\', "/");
    let relative = Path::new(normalized.trim_end_matches('/'));

    if relative.as_os_str().is_empty() {
        return Err(anyhow!("archive entry name is empty"));
    }

    let mut out = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(anyhow!("archive entry name must not include '..': {name}"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow!("archive entry name must be relative: {name}"));
            }
        }
    }

    if out.as_os_str().is_empty() {
        return Err(anyhow!("archive entry name is empty: {name}"));
    }
    Ok(out)
}
