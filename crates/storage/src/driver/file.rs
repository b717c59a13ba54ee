//! Crash-safe file driver
//!
//! One file per key table under `<data_dir>/<keys_dir>/`.
//!
//! # Crash Safety
//!
//! A flush follows the write-fsync-rename pattern:
//! 1. Write the full table to a temporary file (`.<name>.tmp`)
//! 2. fsync the temporary file (durability = "always")
//! 3. Atomic rename over the table file
//! 4. fsync the keys directory (durability = "always")
//!
//! A reader therefore sees either the complete previous table or the
//! complete new one, never a partial write.
//!
//! File I/O is blocking and runs on tokio's blocking pool.

use super::{KeyTableDriver, RawKeyTable};
use crate::codec::{CodecError, StorageCodec};
use crate::config::{DriverConfig, Durability};
use crate::format::{key_table_file_name, KeyTableFile};
use async_trait::async_trait;
use slotdb_core::{DriverError, Result, TableId};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Key table driver backed by one file per table
#[derive(Clone)]
pub struct FileDriver {
    keys_dir: PathBuf,
    durability: Durability,
    codec: Arc<dyn StorageCodec>,
}

impl FileDriver {
    /// Open the driver for `data_dir`, reading `slotdb.toml` if present
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let config = DriverConfig::load_or_default(data_dir)?;
        Self::with_config(data_dir, &config)
    }

    /// Open the driver for `data_dir` with an explicit configuration
    ///
    /// Creates the keys directory if it doesn't exist.
    pub fn with_config(data_dir: impl AsRef<Path>, config: &DriverConfig) -> Result<Self> {
        config.validate()?;
        let keys_dir = data_dir.as_ref().join(&config.keys_dir);
        fs::create_dir_all(&keys_dir)?;

        let driver = FileDriver {
            keys_dir,
            durability: config.durability_mode()?,
            codec: Arc::from(config.codec()?),
        };
        info!(
            target: "slotdb::driver",
            keys_dir = %driver.keys_dir.display(),
            durability = ?driver.durability,
            codec = driver.codec.codec_id(),
            "File driver opened"
        );
        Ok(driver)
    }

    /// Directory holding the key table files
    pub fn keys_dir(&self) -> &Path {
        &self.keys_dir
    }

    /// Path of the file backing `table`
    pub fn table_path(&self, table: &TableId) -> PathBuf {
        self.keys_dir.join(key_table_file_name(table))
    }

    /// Delete the file backing `table` (external bulk clear)
    ///
    /// Returns true if a file was removed. Indices over the table must be
    /// truncated afterwards to drop their in-memory view.
    pub async fn delete_table(&self, table: &TableId) -> std::result::Result<bool, DriverError> {
        let path = self.table_path(table);
        let dir = self.keys_dir.clone();
        let durability = self.durability;
        blocking(move || match fs::remove_file(&path) {
            Ok(()) => {
                if durability.syncs() {
                    File::open(&dir)?.sync_all()?;
                }
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        })
        .await
    }
}

impl std::fmt::Debug for FileDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDriver")
            .field("keys_dir", &self.keys_dir)
            .field("durability", &self.durability)
            .field("codec", &self.codec.codec_id())
            .finish()
    }
}

#[async_trait]
impl KeyTableDriver for FileDriver {
    async fn read_key_table(
        &self,
        table: &TableId,
    ) -> std::result::Result<RawKeyTable, DriverError> {
        let path = self.table_path(table);
        let codec = Arc::clone(&self.codec);
        blocking(move || read_table_file(&path, codec.as_ref())).await
    }

    async fn write_key_table(
        &self,
        table: &TableId,
        keys: RawKeyTable,
    ) -> std::result::Result<(), DriverError> {
        let path = self.table_path(table);
        let temp_path = temp_path_for(&path);
        let dir = self.keys_dir.clone();
        let codec = Arc::clone(&self.codec);
        let durability = self.durability;
        let count = keys.len();

        let bytes = blocking(move || {
            let payload = codec.encode(&rmp_serde::to_vec(&keys)?)?;
            let bytes = KeyTableFile::new(codec.codec_id(), payload).to_bytes();
            write_atomic(&temp_path, &path, &dir, &bytes, durability)?;
            Ok(bytes.len())
        })
        .await?;

        debug!(target: "slotdb::driver", table = %table, keys = count, bytes, "Key table written");
        Ok(())
    }
}

fn read_table_file(
    path: &Path,
    codec: &dyn StorageCodec,
) -> std::result::Result<RawKeyTable, DriverError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RawKeyTable::new()),
        Err(e) => return Err(e.into()),
    };

    let file = KeyTableFile::from_bytes(&bytes)?;
    if file.codec_id != codec.codec_id() {
        return Err(CodecError::CodecMismatch {
            expected: codec.codec_id().to_string(),
            actual: file.codec_id,
        }
        .into());
    }

    let payload = codec.decode(&file.payload)?;
    Ok(rmp_serde::from_slice(&payload)?)
}

fn write_atomic(
    temp_path: &Path,
    final_path: &Path,
    dir: &Path,
    bytes: &[u8],
    durability: Durability,
) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)?;
    file.write_all(bytes)?;
    if durability.syncs() {
        file.sync_all()?;
    }
    drop(file);

    fs::rename(temp_path, final_path)?;

    if durability.syncs() {
        File::open(dir)?.sync_all()?;
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

async fn blocking<T, F>(f: F) -> std::result::Result<T, DriverError>
where
    F: FnOnce() -> std::result::Result<T, DriverError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DriverError::Unavailable(format!("blocking I/O task failed: {}", e)))?
}
