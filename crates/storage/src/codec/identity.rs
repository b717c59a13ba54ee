//! Pass-through codec

use super::traits::{CodecError, StorageCodec};

/// Stores the serialized table as is; the default
///
/// ```
/// use slotdb_storage::codec::{IdentityCodec, StorageCodec};
///
/// let encoded = IdentityCodec.encode(b"keys").unwrap();
/// assert_eq!(encoded, b"keys".to_vec());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl StorageCodec for IdentityCodec {
    fn codec_id(&self) -> &str {
        super::IDENTITY
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}
