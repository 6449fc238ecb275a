//! The type id pool.
//!
//! Each `type_id_item` is a single u32 index into the string pool naming the
//! type descriptor (`Lfoo/Bar;`, `I`, `[J`, ...). Resolution happens at
//! construction; a descriptor index past the end of the string pool fails
//! the open.

use std::sync::Arc;

use crate::{
    file::parser::Parser,
    metadata::header::DexHeader,
    metadata::pools::{resolve, StringIdRc},
    Result,
};

/// A reference-counted [`TypeId`].
pub type TypeIdRc = Arc<TypeId>;

/// One entry of the type pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeId {
    /// Position in the type pool.
    pub id: u32,
    /// The type descriptor string this type names.
    pub descriptor: StringIdRc,
}

impl PartialOrd for TypeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.descriptor.value)
    }
}

/// Decode and resolve the type pool against the string pool.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on a dangling descriptor index.
pub(crate) fn build(
    data: &[u8],
    header: &DexHeader,
    strings: &[StringIdRc],
) -> Result<Vec<TypeIdRc>> {
    let mut ids = Vec::with_capacity(header.type_ids.size as usize);

    let mut parser = Parser::new(data);
    if header.type_ids.size > 0 {
        parser.seek(header.type_ids.offset as usize)?;
    }

    for id in 0..header.type_ids.size {
        let descriptor_idx = parser.read_le::<u32>()?;

        ids.push(Arc::new(TypeId {
            id,
            descriptor: resolve(strings, descriptor_idx, "type descriptor string")?,
        }));
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::header::Section;
    use crate::metadata::pools::StringId;

    fn string_pool(values: &[&str]) -> Vec<StringIdRc> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Arc::new(StringId {
                    id: i as u32,
                    value: (*v).to_string(),
                })
            })
            .collect()
    }

    fn header_with(types: Section, file_size: u32) -> DexHeader {
        DexHeader {
            version: 35,
            checksum: 0,
            signature: [0; 20],
            file_size,
            string_ids: Section::default(),
            type_ids: types,
            proto_ids: Section::default(),
            field_ids: Section::default(),
            method_ids: Section::default(),
            class_defs: Section::default(),
            data: Section::default(),
            map_off: 0,
        }
    }

    #[test]
    fn crafted() {
        let data: [u8; 8] = [
            0x01, 0x00, 0x00, 0x00, // -> string 1
            0x00, 0x00, 0x00, 0x00, // -> string 0
        ];
        let strings = string_pool(&["I", "Lfoo/Bar;"]);
        let header = header_with(Section { size: 2, offset: 0 }, data.len() as u32);

        let pool = build(&data, &header, &strings).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].descriptor.value, "Lfoo/Bar;");
        assert_eq!(pool[1].descriptor.value, "I");
    }

    #[test]
    fn dangling_descriptor_index() {
        let data: [u8; 4] = [0x05, 0x00, 0x00, 0x00];
        let strings = string_pool(&["I"]);
        let header = header_with(Section { size: 1, offset: 0 }, data.len() as u32);

        assert!(build(&data, &header, &strings).is_err());
    }
}
