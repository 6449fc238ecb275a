//! The string id pool.
//!
//! Each `string_id_item` is a single u32 offset into the data section, where
//! a ULEB128 UTF-16 length prefix and MUTF-8 bytes hold the actual value.
//! Strings are decoded eagerly into owned [`String`]s, so the pool remains
//! valid after the backing buffer is released.

use std::sync::Arc;

use crate::{
    file::parser::Parser,
    metadata::header::DexHeader,
    Result,
};

/// A reference-counted [`StringId`] shared by the pools that reference it.
pub type StringIdRc = Arc<StringId>;

/// One entry of the string pool. `id` equals the entry's index; the pool is
/// dense and in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringId {
    /// Position in the string pool.
    pub id: u32,
    /// The decoded string value.
    pub value: String,
}

impl PartialOrd for StringId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StringId {
    // Pool order is numeric id order; cmp instead of subtraction keeps this
    // correct for the full u32 range.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Decode the whole string pool.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a data offset lies outside the
/// file or the string data is not valid MUTF-8.
pub(crate) fn build(data: &[u8], header: &DexHeader) -> Result<Vec<StringIdRc>> {
    let mut ids = Vec::with_capacity(header.string_ids.size as usize);

    let mut parser = Parser::new(data);
    if header.string_ids.size > 0 {
        parser.seek(header.string_ids.offset as usize)?;
    }

    for id in 0..header.string_ids.size {
        let data_off = parser.read_le::<u32>()?;
        if data_off >= header.file_size {
            return Err(malformed_error!(
                "string_id {} data offset {:#x} outside the file",
                id,
                data_off
            ));
        }

        let mut string_parser = Parser::new(data);
        string_parser.seek(data_off as usize)?;

        ids.push(Arc::new(StringId {
            id,
            value: string_parser.read_mutf8()?,
        }));
    }

    Ok(ids)
}
