//! The field id pool.
//!
//! Each `field_id_item` is a fixed-width triple: declaring class (u16 type
//! index), field type (u16 type index), and name (u32 string index).

use std::sync::Arc;

use crate::{
    file::parser::Parser,
    metadata::header::DexHeader,
    metadata::pools::{resolve, StringIdRc, TypeIdRc},
    Result,
};

/// A reference-counted [`FieldId`].
pub type FieldIdRc = Arc<FieldId>;

/// One entry of the field pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldId {
    /// Position in the field pool.
    pub id: u32,
    /// The class declaring this field.
    pub class: TypeIdRc,
    /// The field's type.
    pub field_type: TypeIdRc,
    /// The field's name.
    pub name: StringIdRc,
}

impl PartialOrd for FieldId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Decode and resolve the field pool against the type and string pools.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on any dangling index.
pub(crate) fn build(
    data: &[u8],
    header: &DexHeader,
    strings: &[StringIdRc],
    types: &[TypeIdRc],
) -> Result<Vec<FieldIdRc>> {
    let mut ids = Vec::with_capacity(header.field_ids.size as usize);

    let mut parser = Parser::new(data);
    if header.field_ids.size > 0 {
        parser.seek(header.field_ids.offset as usize)?;
    }

    for id in 0..header.field_ids.size {
        let class_idx = u32::from(parser.read_le::<u16>()?);
        let type_idx = u32::from(parser.read_le::<u16>()?);
        let name_idx = parser.read_le::<u32>()?;

        ids.push(Arc::new(FieldId {
            id,
            class: resolve(types, class_idx, "field declaring class")?,
            field_type: resolve(types, type_idx, "field type")?,
            name: resolve(strings, name_idx, "field name string")?,
        }));
    }

    Ok(ids)
}
