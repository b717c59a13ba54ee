//! Payload codec seam

use slotdb_core::DriverError;

/// Transformation applied to a key table payload before it reaches disk
///
/// The codec id is recorded in every key table file header; a table is only
/// ever decoded by the codec that wrote it.
pub trait StorageCodec: Send + Sync {
    /// Identifier written to the file header
    fn codec_id(&self) -> &str;

    /// Transform a serialized table for storage
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Undo [`encode`](StorageCodec::encode)
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Codec failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Payload could not be encoded
    #[error("{codec} encode failed: {reason}")]
    Encode {
        /// Codec that failed
        codec: String,
        /// Underlying failure
        reason: String,
    },

    /// Payload could not be decoded
    #[error("{codec} decode failed: {reason}")]
    Decode {
        /// Codec that failed
        codec: String,
        /// Underlying failure
        reason: String,
    },

    /// No codec registered under this id
    #[error("Unknown codec '{0}'")]
    UnknownCodec(String),

    /// The table was written with a different codec
    #[error("Table written with codec '{actual}', driver configured for '{expected}'")]
    CodecMismatch {
        /// Codec the driver is configured with
        expected: String,
        /// Codec recorded in the table header
        actual: String,
    },
}

impl From<CodecError> for DriverError {
    fn from(e: CodecError) -> Self {
        DriverError::Codec(e.to_string())
    }
}
