//! The `map_list` section directory.
//!
//! The header's `map_off` points at a directory enumerating every section of
//! the container: `u32 size` followed by `size` twelve-byte entries of
//! `{type: u16, unused: u16, size: u32, offset: u32}`. The items of a mapped
//! section are laid out contiguously starting at its offset, which is what
//! lets the annotation and encoded-array pools be decoded without walking
//! per-class annotation directories.

use crate::{file::parser::Parser, metadata::header::DexHeader, Result};

/// Map item type code for `annotation_item` runs.
pub(crate) const TYPE_ANNOTATION_ITEM: u16 = 0x2004;
/// Map item type code for `encoded_array_item` runs.
pub(crate) const TYPE_ENCODED_ARRAY_ITEM: u16 = 0x2005;

/// One entry of the map list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MapItem {
    /// Section type code.
    pub item_type: u16,
    /// Number of items in the section.
    pub size: u32,
    /// File offset of the first item.
    pub offset: u32,
}

/// Decode the map list, validating that every entry lies inside the file.
///
/// A `map_off` of zero (technically malformed, but produced by some
/// repackaging tools) yields an empty map rather than failing the open,
/// since the id pools are fully described by the header alone.
pub(crate) fn read_map_list(data: &[u8], header: &DexHeader) -> Result<Vec<MapItem>> {
    if header.map_off == 0 {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new(data);
    parser.seek(header.map_off as usize)?;

    let count = parser.read_le::<u32>()?;

    // Entries are twelve bytes each; allocation follows the check.
    let remaining = parser.len() - parser.pos();
    if u64::from(count) * 12 > remaining as u64 {
        return Err(malformed_error!(
            "map list declares {} entries with {} bytes left",
            count,
            remaining
        ));
    }

    let mut items = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let item_type = parser.read_le::<u16>()?;
        let _unused = parser.read_le::<u16>()?;
        let size = parser.read_le::<u32>()?;
        let offset = parser.read_le::<u32>()?;

        if size > 0 && offset >= header.file_size {
            return Err(malformed_error!(
                "map entry {:#06x} offset {:#x} outside the file",
                item_type,
                offset
            ));
        }

        items.push(MapItem {
            item_type,
            size,
            offset,
        });
    }

    Ok(items)
}
