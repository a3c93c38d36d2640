use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use unipack_core::{PackageManifest, MANIFEST_FILE_NAME};

use crate::archive::{sanitized_entry_path, PackageArchive};
use crate::fs_ops::{create_dir_recursive, read_whole_file, remove_dir_recursive, write_whole_file};
use crate::layout::InstallLayout;

pub const PROMPT_TITLE: &str = "unipack";

/// Answer to a two-button confirmation prompt. The first label always means
/// proceed, the second always means decline; prompt polarity lives in the
/// labels, not in the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Proceed,
    Decline,
}

/// Blocking confirmation surface. The orchestrator halts until the answer
/// arrives; these prompts are its only suspension points.
pub trait ConfirmInstall {
    fn ask(
        &mut self,
        title: &str,
        message: &str,
        proceed_label: &str,
        decline_label: &str,
    ) -> Choice;
}

/// Post-install association registration. Registrations are assumed
/// idempotent and re-runnable; an individual failure is fatal to the
/// install.
pub trait AssociationRegistry {
    fn register(&mut self, extension: &str, program: &str) -> Result<()>;
}

/// What to do when the archive's timestamp is not newer than the installed
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DowngradePolicy {
    /// Expect the user to cancel; proceeding is framed as forcing.
    #[default]
    RefuseByDefault,
    /// Warn that the installed version is newer or the same and offer to
    /// continue.
    WarnAndContinue,
}

/// How the archive relates to what is currently on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallDecision {
    Fresh,
    Upgrade { installed_version: String },
    SameOrOlder { installed_version: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    FreshInstalled,
    Upgraded,
    Reinstalled,
    /// The user declined a prompt. Not a failure, and the filesystem is
    /// left exactly as it was.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    pub name: String,
    pub version: String,
    pub status: InstallStatus,
    pub package_dir: Option<PathBuf>,
}

/// Drives one install to completion: decode the archive manifest, decide
/// fresh/upgrade/same-or-older against the on-disk manifest, confirm,
/// replace the target directory, extract the payload in archive order,
/// register associations and write shortcut files.
///
/// User refusal returns `Ok` with [`InstallStatus::Aborted`]; every other
/// deviation is an `Err` naming the failing step. Nothing is removed or
/// created before the user has committed to proceeding. There is no
/// rollback: a failure mid-extraction leaves the target partially
/// populated.
pub fn install_package(
    layout: &InstallLayout,
    archive: &mut PackageArchive,
    confirm: &mut dyn ConfirmInstall,
    registry: &mut dyn AssociationRegistry,
    policy: DowngradePolicy,
) -> Result<InstallResult> {
    let manifest_bytes = archive
        .read_entry(MANIFEST_FILE_NAME)
        .context("package archive has no readable manifest")?;
    let manifest = PackageManifest::parse_bytes(&manifest_bytes)
        .with_context(|| format!("invalid manifest in archive {}", archive.path().display()))?;

    let target = layout.package_dir(&manifest.name);
    let decision = classify_install(layout, &manifest)?;

    if !confirm_decision(confirm, &manifest, &decision, policy) {
        return Ok(InstallResult {
            name: manifest.name,
            version: manifest.version,
            status: InstallStatus::Aborted,
            package_dir: None,
        });
    }

    if !matches!(decision, InstallDecision::Fresh) {
        remove_dir_recursive(&target).with_context(|| {
            format!(
                "failed to remove previous installation of '{}'",
                manifest.name
            )
        })?;
    }
    create_dir_recursive(&target)?;

    extract_payload(archive, &target)?;

    for rule in &manifest.extensions {
        registry
            .register(&rule.extension, &rule.program)
            .with_context(|| {
                format!(
                    "failed to register extension '{}' for '{}'",
                    rule.extension, rule.program
                )
            })?;
    }

    if !manifest.links.is_empty() {
        write_shortcuts(layout, &manifest, &target)?;
    }

    let status = match decision {
        InstallDecision::Fresh => InstallStatus::FreshInstalled,
        InstallDecision::Upgrade { .. } => InstallStatus::Upgraded,
        InstallDecision::SameOrOlder { .. } => InstallStatus::Reinstalled,
    };
    Ok(InstallResult {
        name: manifest.name,
        version: manifest.version,
        status,
        package_dir: Some(target),
    })
}

/// Existing-install check: the installed manifest is the source of truth
/// for what is currently present; there is no separate install database.
fn classify_install(layout: &InstallLayout, manifest: &PackageManifest) -> Result<InstallDecision> {
    let target = layout.package_dir(&manifest.name);
    if !target.exists() {
        return Ok(InstallDecision::Fresh);
    }

    let manifest_path = layout.installed_manifest_path(&manifest.name);
    let installed_bytes = read_whole_file(&manifest_path).with_context(|| {
        format!(
            "cannot read the manifest of the installed '{}' package",
            manifest.name
        )
    })?;
    let installed = PackageManifest::parse_bytes(&installed_bytes)
        .with_context(|| format!("invalid installed manifest: {}", manifest_path.display()))?;

    if manifest.timestamp > installed.timestamp {
        Ok(InstallDecision::Upgrade {
            installed_version: installed.version,
        })
    } else {
        Ok(InstallDecision::SameOrOlder {
            installed_version: installed.version,
        })
    }
}

fn confirm_decision(
    confirm: &mut dyn ConfirmInstall,
    manifest: &PackageManifest,
    decision: &InstallDecision,
    policy: DowngradePolicy,
) -> bool {
    let choice = match decision {
        InstallDecision::Fresh => confirm.ask(
            PROMPT_TITLE,
            &format!("Do you want to install {}?", manifest.name),
            "Install",
            "Cancel",
        ),
        InstallDecision::Upgrade { installed_version } => confirm.ask(
            PROMPT_TITLE,
            &format!(
                "Do you want to update {} ({} -> {})?",
                manifest.name, installed_version, manifest.version
            ),
            "Yes",
            "No",
        ),
        InstallDecision::SameOrOlder { .. } => match policy {
            DowngradePolicy::RefuseByDefault => confirm.ask(
                PROMPT_TITLE,
                &format!(
                    "You already have a newer or the same version of {} installed.",
                    manifest.name
                ),
                "Force installation",
                "Cancel",
            ),
            DowngradePolicy::WarnAndContinue => confirm.ask(
                PROMPT_TITLE,
                &format!(
                    "The installed version of {} is newer or the same. Continue?",
                    manifest.name
                ),
                "Continue",
                "Cancel",
            ),
        },
    };
    choice == Choice::Proceed
}

/// Extraction pass, in archive order. Directory entries become directories;
/// file entries are read whole and written whole, with each buffer dropped
/// before the next entry is touched. The first failure aborts the pass.
fn extract_payload(archive: &mut PackageArchive, target: &Path) -> Result<()> {
    for index in 0..archive.entry_count() {
        let info = archive.entry_info(index)?;
        let relative = sanitized_entry_path(&info.name)
            .with_context(|| format!("refusing to extract archive entry '{}'", info.name))?;
        let destination = target.join(relative);

        if info.is_dir {
            create_dir_recursive(&destination)?;
            continue;
        }

        if let Some(parent) = destination.parent() {
            create_dir_recursive(parent)?;
        }
        let bytes = archive.read_entry_at(index)?;
        write_whole_file(&destination, &bytes)?;
    }
    Ok(())
}

/// Writes one pointer file per link: the absolute path of the target
/// program as raw bytes, named `<link>.lnk` in the shortcuts directory,
/// for a separate launcher to read and dispatch.
fn write_shortcuts(
    layout: &InstallLayout,
    manifest: &PackageManifest,
    target: &Path,
) -> Result<()> {
    create_dir_recursive(&layout.shortcuts_dir())?;
    let absolute_target = std::path::absolute(target)
        .with_context(|| format!("failed to resolve absolute path of {}", target.display()))?;

    for link in &manifest.links {
        let shortcut = layout.shortcut_path(&link.name);
        let program = absolute_target.join(&link.program);
        write_whole_file(&shortcut, program.display().to_string().as_bytes())
            .with_context(|| format!("failed to create shortcut '{}'", link.name))?;
    }
    Ok(())
}
