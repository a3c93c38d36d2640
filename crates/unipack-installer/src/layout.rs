use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use unipack_core::MANIFEST_FILE_NAME;

use crate::fs_ops::create_dir_recursive;

/// On-disk layout of one install prefix. The prefix is explicit
/// configuration; nothing in this crate assumes a process-wide root, so
/// tests (and multi-root setups) can point at any directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    prefix: PathBuf,
}

impl InstallLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// The install root: one subdirectory per installed package.
    pub fn packages_dir(&self) -> PathBuf {
        self.prefix.join("pkgs")
    }

    pub fn shortcuts_dir(&self) -> PathBuf {
        self.prefix.join("shortcuts")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.prefix.join("state")
    }

    pub fn associations_path(&self) -> PathBuf {
        self.state_dir().join("associations.cfg")
    }

    /// Target directory of a package: the sole on-disk representation of an
    /// installed package.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.packages_dir().join(name)
    }

    pub fn installed_manifest_path(&self, name: &str) -> PathBuf {
        self.package_dir(name).join(MANIFEST_FILE_NAME)
    }

    pub fn shortcut_path(&self, link_name: &str) -> PathBuf {
        self.shortcuts_dir().join(format!("{link_name}.lnk"))
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [
            self.packages_dir(),
            self.shortcuts_dir(),
            self.state_dir(),
        ] {
            create_dir_recursive(&dir)?;
        }
        Ok(())
    }
}

pub fn default_user_prefix() -> Result<PathBuf> {
    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows user prefix")?;
        return Ok(PathBuf::from(app_data).join("Unipack"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve user prefix")?;
    Ok(PathBuf::from(home).join(".unipack"))
}
