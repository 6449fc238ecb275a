//! The method prototype pool.
//!
//! Each `proto_id_item` is a fixed 12-byte record: a shorty string index, a
//! return type index, and an offset to an optional `type_list` holding the
//! parameter types. A zero offset or an empty list both decode to an empty
//! parameter vector — "no parameters" is an empty sequence, not an absent
//! one.

use std::sync::Arc;

use crate::{
    file::parser::Parser,
    metadata::header::DexHeader,
    metadata::pools::{resolve, StringIdRc, TypeIdRc},
    Result,
};

/// A reference-counted [`ProtoId`].
pub type ProtoIdRc = Arc<ProtoId>;

/// One entry of the prototype pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoId {
    /// Position in the proto pool.
    pub id: u32,
    /// Compact single-character-per-type signature, e.g. `VL` for
    /// `void f(Object)`.
    pub shorty: StringIdRc,
    /// The return type.
    pub return_type: TypeIdRc,
    /// Parameter types in declaration order; empty when the method takes none.
    pub parameters: Vec<TypeIdRc>,
}

impl PartialOrd for ProtoId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProtoId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Decode and resolve the proto pool against the string and type pools.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on a dangling shorty, return-type or
/// parameter index, or a `type_list` lying outside the file.
pub(crate) fn build(
    data: &[u8],
    header: &DexHeader,
    strings: &[StringIdRc],
    types: &[TypeIdRc],
) -> Result<Vec<ProtoIdRc>> {
    let mut ids = Vec::with_capacity(header.proto_ids.size as usize);

    let mut parser = Parser::new(data);
    if header.proto_ids.size > 0 {
        parser.seek(header.proto_ids.offset as usize)?;
    }

    for id in 0..header.proto_ids.size {
        let shorty_idx = parser.read_le::<u32>()?;
        let return_type_idx = parser.read_le::<u32>()?;
        let parameters_off = parser.read_le::<u32>()?;

        let parameters = if parameters_off == 0 {
            Vec::new()
        } else {
            read_type_list(data, header, parameters_off, types)?
        };

        ids.push(Arc::new(ProtoId {
            id,
            shorty: resolve(strings, shorty_idx, "proto shorty string")?,
            return_type: resolve(types, return_type_idx, "proto return type")?,
            parameters,
        }));
    }

    Ok(ids)
}

/// Decode a `type_list`: u32 count followed by that many u16 type indices.
pub(crate) fn read_type_list(
    data: &[u8],
    header: &DexHeader,
    offset: u32,
    types: &[TypeIdRc],
) -> Result<Vec<TypeIdRc>> {
    if offset >= header.file_size {
        return Err(malformed_error!(
            "type_list offset {:#x} outside the file",
            offset
        ));
    }

    let mut parser = Parser::new(data);
    parser.seek(offset as usize)?;

    let count = parser.read_le::<u32>()?;

    // Entries are two bytes each; allocation follows the check.
    let remaining = parser.len() - parser.pos();
    if u64::from(count) * 2 > remaining as u64 {
        return Err(malformed_error!(
            "type_list declares {} entries with {} bytes left",
            count,
            remaining
        ));
    }

    let mut list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let type_idx = u32::from(parser.read_le::<u16>()?);
        list.push(resolve(types, type_idx, "type_list entry")?);
    }

    Ok(list)
}
