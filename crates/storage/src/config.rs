//! Driver configuration via `slotdb.toml`
//!
//! The file driver reads its settings from a config file in the data
//! directory. A missing file means defaults. To change settings, edit the
//! file and reopen the database.

use crate::codec::{get_codec, StorageCodec};
use serde::{Deserialize, Serialize};
use slotdb_core::{Error, Result};
use std::path::Path;

/// Config file name placed in the database data directory.
pub const CONFIG_FILE_NAME: &str = "slotdb.toml";

/// How hard a key table write works to survive a crash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Write to a temp file and rename into place, no fsync.
    /// A crash can lose the last write but never exposes a partial table.
    Standard,
    /// Additionally fsync the table file and its directory on every write.
    Always,
}

impl Durability {
    /// Whether writes must fsync
    pub fn syncs(self) -> bool {
        matches!(self, Durability::Always)
    }
}

/// Driver configuration loaded from `slotdb.toml`.
///
/// # Example
///
/// ```toml
/// durability = "always"
/// codec = "identity"
/// keys_dir = "keys"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Durability mode: `"always"` or `"standard"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Codec applied to key table payloads: `"identity"`, `"zstd"` or `"zstd:<level>"`.
    #[serde(default = "default_codec")]
    pub codec: String,
    /// Directory, relative to the data directory, holding key table files.
    #[serde(default = "default_keys_dir")]
    pub keys_dir: String,
}

fn default_durability_str() -> String {
    "always".to_string()
}

fn default_codec() -> String {
    "identity".to_string()
}

fn default_keys_dir() -> String {
    "keys".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            codec: default_codec(),
            keys_dir: default_keys_dir(),
        }
    }
}

impl DriverConfig {
    /// Parse the durability string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"always"` or `"standard"`.
    pub fn durability_mode(&self) -> Result<Durability> {
        match self.durability.as_str() {
            "always" => Ok(Durability::Always),
            "standard" => Ok(Durability::Standard),
            other => Err(Error::Config(format!(
                "Invalid durability mode '{}' in {}. Expected \"always\" or \"standard\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Resolve the configured codec.
    pub fn codec(&self) -> Result<Box<dyn StorageCodec>> {
        get_codec(&self.codec).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check every field eagerly.
    pub fn validate(&self) -> Result<()> {
        self.durability_mode()?;
        self.codec()?;
        let keys_dir = Path::new(&self.keys_dir);
        if self.keys_dir.is_empty() || keys_dir.is_absolute() {
            return Err(Error::Config(format!(
                "keys_dir must be a non-empty relative path, got '{}'",
                self.keys_dir
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# slotdb key table configuration
#
# Durability mode: "always" (default) or "standard"
#   "always"   = fsync table file and directory on every flush
#   "standard" = atomic rename only, a crash may lose the last flush
durability = "always"

# Codec applied to key table payloads (default: "identity")
#   "identity" = stored as is
#   "zstd"     = zstd-compressed at level 3, "zstd:<1-22>" picks the level
codec = "identity"

# Directory holding key table files, relative to the data directory
keys_dir = "keys"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: DriverConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `slotdb.toml` from `data_dir`, or defaults if it does not exist.
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
