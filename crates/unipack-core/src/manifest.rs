use anyhow::Context;
use thiserror::Error;

/// File name of the package descriptor, both inside an archive and in an
/// installed package directory. Standardized on the shortened historical
/// name; the legacy `pkginfo.txt.tns` spelling is not recognized.
pub const MANIFEST_FILE_NAME: &str = "pkginfo.txt";

/// Capacities of the legacy fixed-size record. Values are stored as growable
/// strings; truncation is applied explicitly at the codec boundary.
pub const NAME_CAPACITY: usize = 20;
pub const VERSION_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed manifest line (no '='): {line}")]
    MalformedLine { line: String },
    #[error("unknown manifest key: {key}")]
    UnknownKey { key: String },
    #[error("invalid manifest timestamp (must be a non-zero unsigned integer): {value}")]
    InvalidTimestamp { value: String },
    #[error("manifest '{key}' line has no preceding name line")]
    ProgramWithoutName { key: String },
    #[error("incomplete manifest: missing {missing}")]
    IncompleteManifest { missing: &'static str },
}

/// Association rule registered after install: files with `extension` are
/// handled by `program` inside the installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRule {
    pub extension: String,
    pub program: String,
}

/// Launcher shortcut created after install: a pointer file named `name`
/// resolving to `program` inside the installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRule {
    pub name: String,
    pub program: String,
}

/// The parsed package descriptor. `timestamp` is a version ordinal used only
/// for ordering installs, not a calendar time; zero means "unset" and never
/// survives parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub timestamp: u64,
    pub extensions: Vec<ExtensionRule>,
    pub links: Vec<LinkRule>,
}

impl PackageManifest {
    /// Decodes the key=value manifest grammar. Lines are split on any mix of
    /// `\r` and `\n`; empty lines are skipped. Arrays are built from repeated
    /// `ext_name`/`link_name` keys, with `ext_prog`/`link_prog` mutating the
    /// most recently appended element.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut name = None;
        let mut version = None;
        let mut timestamp = 0_u64;
        let mut extensions: Vec<ExtensionRule> = Vec::new();
        let mut links: Vec<LinkRule> = Vec::new();

        for line in text
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
        {
            let Some((key, value)) = line.split_once('=') else {
                return Err(ParseError::MalformedLine {
                    line: line.to_string(),
                });
            };

            match key {
                "name" => name = Some(truncate_to_capacity(value, NAME_CAPACITY)),
                "version" => version = Some(truncate_to_capacity(value, VERSION_CAPACITY)),
                "timestamp" => {
                    timestamp = value.parse().unwrap_or(0);
                    if timestamp == 0 {
                        return Err(ParseError::InvalidTimestamp {
                            value: value.to_string(),
                        });
                    }
                }
                "ext_name" => extensions.push(ExtensionRule {
                    extension: value.to_string(),
                    program: String::new(),
                }),
                "ext_prog" => {
                    let Some(last) = extensions.last_mut() else {
                        return Err(ParseError::ProgramWithoutName {
                            key: key.to_string(),
                        });
                    };
                    last.program = value.to_string();
                }
                "link_name" => links.push(LinkRule {
                    name: value.to_string(),
                    program: String::new(),
                }),
                "link_prog" => {
                    let Some(last) = links.last_mut() else {
                        return Err(ParseError::ProgramWithoutName {
                            key: key.to_string(),
                        });
                    };
                    last.program = value.to_string();
                }
                _ => {
                    return Err(ParseError::UnknownKey {
                        key: key.to_string(),
                    });
                }
            }
        }

        let Some(name) = name else {
            return Err(ParseError::IncompleteManifest { missing: "name" });
        };
        let Some(version) = version else {
            return Err(ParseError::IncompleteManifest { missing: "version" });
        };
        if name.is_empty() {
            return Err(ParseError::IncompleteManifest { missing: "name" });
        }
        if version.is_empty() {
            return Err(ParseError::IncompleteManifest { missing: "version" });
        }
        if timestamp == 0 {
            return Err(ParseError::IncompleteManifest {
                missing: "timestamp",
            });
        }

        Ok(Self {
            name,
            version,
            timestamp,
            extensions,
            links,
        })
    }

    /// Decodes raw manifest bytes (archive entry or on-disk file content).
    pub fn parse_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes).context("manifest is not valid UTF-8")?;
        Self::parse(text).context("failed to parse package manifest")
    }

    /// Encodes back to the key=value grammar. Field order is fixed, arrays
    /// keep element order, and every `_prog` line follows its `_name` line.
    pub fn to_key_value_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "name={}\n",
            truncate_to_capacity(&self.name, NAME_CAPACITY)
        ));
        out.push_str(&format!(
            "version={}\n",
            truncate_to_capacity(&self.version, VERSION_CAPACITY)
        ));
        out.push_str(&format!("timestamp={}\n", self.timestamp));
        for rule in &self.extensions {
            out.push_str(&format!("ext_name={}\n", rule.extension));
            out.push_str(&format!("ext_prog={}\n", rule.program));
        }
        for link in &self.links {
            out.push_str(&format!("link_name={}\n", link.name));
            out.push_str(&format!("link_prog={}\n", link.program));
        }
        out
    }
}

/// Caps `value` at `capacity` bytes without splitting a UTF-8 character.
/// Silent by contract: the legacy record stored these fields in fixed-size
/// buffers and dropped the excess.
fn truncate_to_capacity(value: &str, capacity: usize) -> String {
    if value.len() <= capacity {
        return value.to_string();
    }
    let mut end = capacity;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
