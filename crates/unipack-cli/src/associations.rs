use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use unipack_installer::{AssociationRegistry, InstallLayout};

/// File-backed association registry: one `extension=program` line per
/// association in the prefix's state directory. Registering the same
/// extension again overwrites its program, so re-running an install is
/// harmless.
pub struct FileAssociationStore {
    path: PathBuf,
}

impl FileAssociationStore {
    pub fn for_layout(layout: &InstallLayout) -> Self {
        Self {
            path: layout.associations_path(),
        }
    }

    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read association state: {}", self.path.display())
                });
            }
        };

        let mut entries = Vec::new();
        for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let Some((extension, program)) = line.split_once('=') else {
                continue;
            };
            entries.push((extension.to_string(), program.to_string()));
        }
        Ok(entries)
    }

    fn write_entries(&self, entries: &[(String, String)]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create state directory: {}", parent.display())
            })?;
        }

        let mut payload = String::new();
        for (extension, program) in entries {
            payload.push_str(&format!("{extension}={program}\n"));
        }
        fs::write(&self.path, payload.as_bytes()).with_context(|| {
            format!("failed to write association state: {}", self.path.display())
        })
    }
}

impl AssociationRegistry for FileAssociationStore {
    fn register(&mut self, extension: &str, program: &str) -> Result<()> {
        let mut entries = self.entries()?;
        match entries.iter_mut().find(|(known, _)| known == extension) {
            Some(entry) => entry.1 = program.to_string(),
            None => entries.push((extension.to_string(), program.to_string())),
        }
        self.write_entries(&entries)
    }
}
