mod archive;
mod fs_ops;
mod install;
mod layout;

pub use archive::PackageArchive;
pub use fs_ops::{create_dir_recursive, read_whole_file, remove_dir_recursive, write_whole_file};
pub use install::{
    install_package, AssociationRegistry, Choice, ConfirmInstall, DowngradePolicy, InstallDecision,
    InstallResult, InstallStatus,
};
pub use layout::{default_user_prefix, InstallLayout};
