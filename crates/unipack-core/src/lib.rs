mod manifest;

pub use manifest::{
    ExtensionRule, LinkRule, PackageManifest, ParseError, MANIFEST_FILE_NAME, NAME_CAPACITY,
    VERSION_CAPACITY,
};
