use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use unipack_core::PackageManifest;
use unipack_installer::{
    default_user_prefix, install_package, read_whole_file, AssociationRegistry, DowngradePolicy,
    InstallLayout, InstallStatus, PackageArchive,
};

use crate::associations::FileAssociationStore;
use crate::confirm::{AssumeYes, StdinConfirm};
use crate::render::{current_output_style, print_status};

pub fn resolve_layout(prefix: Option<PathBuf>) -> Result<InstallLayout> {
    let prefix = match prefix {
        Some(prefix) => prefix,
        None => default_user_prefix()?,
    };
    Ok(InstallLayout::new(prefix))
}

pub fn run_install(
    layout: &InstallLayout,
    archive_path: &Path,
    allow_downgrade: bool,
    yes: bool,
) -> Result<()> {
    let style = current_output_style();
    layout.ensure_base_dirs()?;

    let mut archive = PackageArchive::open(archive_path)?;
    let mut store = FileAssociationStore::for_layout(layout);
    let policy = if allow_downgrade {
        DowngradePolicy::WarnAndContinue
    } else {
        DowngradePolicy::RefuseByDefault
    };

    let result = if yes {
        install_package(layout, &mut archive, &mut AssumeYes, &mut store, policy)?
    } else {
        install_package(layout, &mut archive, &mut StdinConfirm, &mut store, policy)?
    };

    match result.status {
        InstallStatus::FreshInstalled => print_status(
            style,
            "ok",
            &format!("installed {} {}", result.name, result.version),
        ),
        InstallStatus::Upgraded => print_status(
            style,
            "ok",
            &format!("updated {} to {}", result.name, result.version),
        ),
        InstallStatus::Reinstalled => print_status(
            style,
            "ok",
            &format!("reinstalled {} {}", result.name, result.version),
        ),
        InstallStatus::Aborted => print_status(style, "warn", "installation aborted"),
    }
    Ok(())
}

pub fn run_launch(shortcut: &Path) -> Result<i32> {
    let style = current_output_style();
    let target = read_shortcut_target(shortcut)?;

    print_status(style, "step", &format!("passing control to {}", target.display()));
    match Command::new(&target).status() {
        Ok(status) => {
            let code = status.code().unwrap_or(1);
            print_status(
                style,
                if status.success() { "ok" } else { "warn" },
                &format!("{} returned with status code {code}", target.display()),
            );
            Ok(code)
        }
        Err(err) => {
            print_status(
                style,
                "fail",
                &format!("failed to launch {}: {err}", target.display()),
            );
            Ok(127)
        }
    }
}

/// A shortcut file holds the absolute target program path as raw bytes.
pub fn read_shortcut_target(path: &Path) -> Result<PathBuf> {
    let bytes = read_whole_file(path)?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("shortcut content is not valid UTF-8: {}", path.display()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("shortcut file is empty: {}", path.display()));
    }
    Ok(PathBuf::from(trimmed))
}

/// One-time setup: create the prefix and bind the installer's own archive
/// and shortcut extensions to it.
pub fn run_init(layout: &InstallLayout) -> Result<()> {
    let style = current_output_style();
    layout.ensure_base_dirs()?;

    let mut store = FileAssociationStore::for_layout(layout);
    store.register("upk", "unipack")?;
    store.register("lnk", "unipack")?;

    print_status(
        style,
        "ok",
        &format!("initialized prefix {}", layout.prefix().display()),
    );
    Ok(())
}

pub fn run_list(layout: &InstallLayout) -> Result<()> {
    let lines = list_lines(layout)?;
    if lines.is_empty() {
        println!("No installed packages");
    } else {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn list_lines(layout: &InstallLayout) -> Result<Vec<String>> {
    let dir = layout.packages_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut lines = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read install root: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let manifest = read_whole_file(&layout.installed_manifest_path(&name))
            .ok()
            .and_then(|bytes| PackageManifest::parse_bytes(&bytes).ok());
        match manifest {
            Some(manifest) => lines.push(format!(
                "{} {} {}",
                manifest.name, manifest.version, manifest.timestamp
            )),
            None => lines.push(format!("{name} (unreadable manifest)")),
        }
    }

    lines.sort();
    Ok(lines)
}
