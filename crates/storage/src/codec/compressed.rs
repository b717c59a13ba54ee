//! Compressed payloads (zstd)

use super::traits::{CodecError, StorageCodec};

/// Compression level used when none is configured
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Compresses the serialized table with zstd
///
/// Key tables of string keys compress well; the level only affects
/// writing, any level decodes.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Codec compressing at `level`
    pub fn new(level: i32) -> Self {
        ZstdCodec { level }
    }

    /// Configured compression level
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        ZstdCodec::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl StorageCodec for ZstdCodec {
    fn codec_id(&self) -> &str {
        super::ZSTD
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        zstd::stream::encode_all(data, self.level).map_err(|e| CodecError::Encode {
            codec: super::ZSTD.to_string(),
            reason: e.to_string(),
        })
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        zstd::stream::decode_all(data).map_err(|e| CodecError::Decode {
            codec: super::ZSTD.to_string(),
            reason: e.to_string(),
        })
    }
}
