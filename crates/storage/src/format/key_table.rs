//! Key table file format
//!
//! One file holds the full key→slot snapshot of one table.
//!
//! # Format
//!
//! ```text
//! +--------------------+
//! | Magic: "SKEY"      | 4 bytes
//! | Format Version     | 4 bytes (u32 LE)
//! | Codec ID Length    | 4 bytes (u32 LE)
//! | Codec ID           | variable
//! | Payload Length     | 8 bytes (u64 LE)
//! | Payload            | variable (codec-encoded MessagePack table)
//! | CRC32              | 4 bytes
//! +--------------------+
//! ```

use slotdb_core::{DriverError, TableId};

/// Key table magic bytes: "SKEY"
pub const KEY_TABLE_MAGIC: [u8; 4] = *b"SKEY";

/// Current key table format version
pub const KEY_TABLE_FORMAT_VERSION: u32 = 1;

/// Extension of key table files
pub const KEY_TABLE_EXTENSION: &str = "keys";

// magic(4) + version(4) + codec_len(4) + payload_len(8) + crc(4)
const MIN_FILE_SIZE: usize = 24;

/// Key table format errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyTableFormatError {
    /// File shorter than its declared contents
    #[error("Key table file too short")]
    TooShort,

    /// Magic bytes do not match
    #[error("Invalid key table magic")]
    InvalidMagic,

    /// Written by an unknown format version
    #[error("Unsupported key table format version {0}")]
    UnsupportedVersion(u32),

    /// CRC over the file contents does not match the stored CRC
    #[error("Checksum mismatch: stored {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// CRC stored in the file
        expected: u32,
        /// CRC computed over the file contents
        computed: u32,
    },

    /// Codec identifier is not valid UTF-8
    #[error("Invalid codec identifier")]
    InvalidCodecId,

    /// Bytes remain after the payload
    #[error("Trailing bytes after payload")]
    TrailingBytes,
}

impl From<KeyTableFormatError> for DriverError {
    fn from(e: KeyTableFormatError) -> Self {
        DriverError::Format(e.to_string())
    }
}

/// Decoded key table file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTableFile {
    /// Format version the file was written with
    pub format_version: u32,
    /// Codec the payload was encoded with
    pub codec_id: String,
    /// Codec-encoded payload
    pub payload: Vec<u8>,
}

impl KeyTableFile {
    /// Create a file for the current format version
    pub fn new(codec_id: impl Into<String>, payload: Vec<u8>) -> Self {
        KeyTableFile {
            format_version: KEY_TABLE_FORMAT_VERSION,
            codec_id: codec_id.into(),
            payload,
        }
    }

    /// Serialize to bytes, CRC included
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(MIN_FILE_SIZE + self.codec_id.len() + self.payload.len());

        bytes.extend_from_slice(&KEY_TABLE_MAGIC);
        bytes.extend_from_slice(&self.format_version.to_le_bytes());

        bytes.extend_from_slice(&(self.codec_id.len() as u32).to_le_bytes());
        bytes.extend_from_slice(self.codec_id.as_bytes());

        bytes.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&self.payload);

        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());

        bytes
    }

    /// Deserialize from bytes, verifying magic, version and CRC
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyTableFormatError> {
        if bytes.len() < MIN_FILE_SIZE {
            return Err(KeyTableFormatError::TooShort);
        }

        if bytes[0..4] != KEY_TABLE_MAGIC {
            return Err(KeyTableFormatError::InvalidMagic);
        }

        let (data, crc_bytes) = bytes.split_at(bytes.len() - 4);
        let stored_crc = u32::from_le_bytes(fixed(crc_bytes)?);
        let computed_crc = crc32fast::hash(data);
        if stored_crc != computed_crc {
            return Err(KeyTableFormatError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let mut cursor = 4;

        let format_version = u32::from_le_bytes(fixed(take(data, &mut cursor, 4)?)?);
        if format_version != KEY_TABLE_FORMAT_VERSION {
            return Err(KeyTableFormatError::UnsupportedVersion(format_version));
        }

        let codec_len = u32::from_le_bytes(fixed(take(data, &mut cursor, 4)?)?) as usize;
        let codec_id = String::from_utf8(take(data, &mut cursor, codec_len)?.to_vec())
            .map_err(|_| KeyTableFormatError::InvalidCodecId)?;

        let payload_len = u64::from_le_bytes(fixed(take(data, &mut cursor, 8)?)?);
        let payload_len =
            usize::try_from(payload_len).map_err(|_| KeyTableFormatError::TooShort)?;
        let payload = take(data, &mut cursor, payload_len)?.to_vec();

        if cursor != data.len() {
            return Err(KeyTableFormatError::TrailingBytes);
        }

        Ok(KeyTableFile {
            format_version,
            codec_id,
            payload,
        })
    }
}

fn take<'a>(
    data: &'a [u8],
    cursor: &mut usize,
    len: usize,
) -> Result<&'a [u8], KeyTableFormatError> {
    let end = cursor
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(KeyTableFormatError::TooShort)?;
    let slice = &data[*cursor..end];
    *cursor = end;
    Ok(slice)
}

fn fixed<const N: usize>(slice: &[u8]) -> Result<[u8; N], KeyTableFormatError> {
    slice.try_into().map_err(|_| KeyTableFormatError::TooShort)
}

/// File name of the key table for `table`
///
/// Type names contain characters that are not portable in file names, so
/// they are flattened to `[A-Za-z0-9_-]`. A CRC of the unflattened name is
/// appended to keep distinct tables apart after flattening.
pub fn key_table_file_name(table: &TableId) -> String {
    let full = table.to_string();
    let flat: String = full
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}-{:08x}.{}",
        flat,
        crc32fast::hash(full.as_bytes()),
        KEY_TABLE_EXTENSION
    )
}
