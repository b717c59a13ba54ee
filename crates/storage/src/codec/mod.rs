//! Payload codecs for key table files
//!
//! | id         | codec           |
//! |------------|-----------------|
//! | `identity` | [`IdentityCodec`] |
//! | `zstd`     | [`ZstdCodec`] at [`DEFAULT_ZSTD_LEVEL`] |
//! | `zstd:<n>` | [`ZstdCodec`] at level `n` (written to files as `zstd`) |

mod compressed;
mod identity;
mod traits;

pub use self::compressed::{ZstdCodec, DEFAULT_ZSTD_LEVEL};
pub use self::identity::IdentityCodec;
pub use self::traits::{CodecError, StorageCodec};

const IDENTITY: &str = "identity";
const ZSTD: &str = "zstd";

/// Resolve a configured codec name
pub fn get_codec(name: &str) -> Result<Box<dyn StorageCodec>, CodecError> {
    let unknown = || CodecError::UnknownCodec(name.to_string());
    match name.split_once(':') {
        None if name == IDENTITY => Ok(Box::new(IdentityCodec)),
        None if name == ZSTD => Ok(Box::new(ZstdCodec::default())),
        Some((ZSTD, level)) => {
            let level: i32 = level.parse().map_err(|_| unknown())?;
            if !(1..=22).contains(&level) {
                return Err(unknown());
            }
            Ok(Box::new(ZstdCodec::new(level)))
        }
        _ => Err(unknown()),
    }
}
