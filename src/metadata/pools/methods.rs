//! The method id pool.
//!
//! Each `method_id_item` is a fixed-width triple: declaring class (u16 type
//! index), prototype (u16 proto index), and name (u32 string index).

use std::sync::Arc;

use crate::{
    file::parser::Parser,
    metadata::header::DexHeader,
    metadata::pools::{resolve, ProtoIdRc, StringIdRc, TypeIdRc},
    Result,
};

/// A reference-counted [`MethodId`].
pub type MethodIdRc = Arc<MethodId>;

/// One entry of the method pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodId {
    /// Position in the method pool.
    pub id: u32,
    /// The class declaring this method.
    pub class: TypeIdRc,
    /// The method's prototype (shorty, return type, parameters).
    pub proto: ProtoIdRc,
    /// The method's name.
    pub name: StringIdRc,
}

impl PartialOrd for MethodId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MethodId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Decode and resolve the method pool against the type, proto and string pools.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on any dangling index.
pub(crate) fn build(
    data: &[u8],
    header: &DexHeader,
    strings: &[StringIdRc],
    types: &[TypeIdRc],
    protos: &[ProtoIdRc],
) -> Result<Vec<MethodIdRc>> {
    let mut ids = Vec::with_capacity(header.method_ids.size as usize);

    let mut parser = Parser::new(data);
    if header.method_ids.size > 0 {
        parser.seek(header.method_ids.offset as usize)?;
    }

    for id in 0..header.method_ids.size {
        let class_idx = u32::from(parser.read_le::<u16>()?);
        let proto_idx = u32::from(parser.read_le::<u16>()?);
        let name_idx = parser.read_le::<u32>()?;

        ids.push(Arc::new(MethodId {
            id,
            class: resolve(types, class_idx, "method declaring class")?,
            proto: resolve(protos, proto_idx, "method prototype")?,
            name: resolve(strings, name_idx, "method name string")?,
        }));
    }

    Ok(ids)
}
