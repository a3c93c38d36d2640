use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Creates every missing component of `path`. Already-existing components
/// are success, so calling this twice on the same path is fine.
pub fn create_dir_recursive(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Depth-first removal of a directory tree. Any stat or delete failure
/// aborts the whole removal; there is no partial-then-continue mode.
pub fn remove_dir_recursive(path: &Path) -> Result<()> {
    for entry in fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read directory entry in {}", path.display()))?;
        let entry_path = entry.path();
        let metadata = fs::symlink_metadata(&entry_path)
            .with_context(|| format!("failed to stat {}", entry_path.display()))?;

        if metadata.is_dir() {
            remove_dir_recursive(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)
                .with_context(|| format!("failed to remove file: {}", entry_path.display()))?;
        }
    }

    fs::remove_dir(path).with_context(|| format!("failed to remove directory: {}", path.display()))
}

/// Whole-buffer read; a short read surfaces as an error, never a partial
/// result.
pub fn read_whole_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Whole-buffer truncate-create write.
pub fn write_whole_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write file: {}", path.display()))
}
