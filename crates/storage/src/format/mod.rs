//! On-disk formats
//!
//! - `key_table`: single-file snapshot of one table's key→slot bindings

pub mod key_table;

pub use key_table::{
    key_table_file_name, KeyTableFile, KeyTableFormatError, KEY_TABLE_EXTENSION,
    KEY_TABLE_FORMAT_VERSION, KEY_TABLE_MAGIC,
};
