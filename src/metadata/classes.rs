//! Class definitions and lazily-decoded class data.
//!
//! The `class_defs` section lists the classes *defined* in this container —
//! classes reachable only as type references in signatures or annotations
//! never appear here and are never visited. Each record is a fixed 32-byte
//! row; the heavyweight parts (field/method lists, code) live behind offsets
//! into the data section and are decoded on demand during traversal, not at
//! open time.

use bitflags::bitflags;

use crate::{
    file::parser::Parser,
    metadata::{
        header::{DexHeader, NO_INDEX},
        pools::{read_type_list, resolve, FieldIdRc, MethodIdRc, StringIdRc, TypeIdRc},
    },
    Result,
};

bitflags! {
    /// Java/Dalvik access flags as they appear on classes, fields and
    /// methods. Unknown bits are retained so flag words round-trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u32 {
        /// `public`
        const PUBLIC = 0x0001;
        /// `private`
        const PRIVATE = 0x0002;
        /// `protected`
        const PROTECTED = 0x0004;
        /// `static`
        const STATIC = 0x0008;
        /// `final`
        const FINAL = 0x0010;
        /// `synchronized` (methods only)
        const SYNCHRONIZED = 0x0020;
        /// `volatile` on fields, bridge on methods
        const VOLATILE = 0x0040;
        /// `transient` on fields, varargs on methods
        const TRANSIENT = 0x0080;
        /// `native` (methods only)
        const NATIVE = 0x0100;
        /// interface class
        const INTERFACE = 0x0200;
        /// `abstract`
        const ABSTRACT = 0x0400;
        /// `strictfp` (methods only)
        const STRICT = 0x0800;
        /// compiler-generated, not in source
        const SYNTHETIC = 0x1000;
        /// annotation class
        const ANNOTATION = 0x2000;
        /// enum class or enum constant field
        const ENUM = 0x4000;
        /// constructor method
        const CONSTRUCTOR = 0x10000;
        /// `synchronized` declared in source (methods only)
        const DECLARED_SYNCHRONIZED = 0x20000;

        const _ = !0;
    }
}

/// One defined class, in class-definition file order.
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Position in the class-definition table.
    pub id: u32,
    /// The type being defined.
    pub class_type: TypeIdRc,
    /// The class's access flags.
    pub access_flags: AccessFlags,
    /// The superclass, absent only for `Ljava/lang/Object;`.
    pub superclass: Option<TypeIdRc>,
    /// Implemented interfaces in declaration order.
    pub interfaces: Vec<TypeIdRc>,
    /// The source file name, when the compiler recorded one.
    pub source_file: Option<StringIdRc>,
    /// Offset of the class's annotations directory, 0 if none.
    pub(crate) annotations_off: u32,
    /// Offset of the `class_data_item`, 0 for marker classes with no members.
    pub(crate) class_data_off: u32,
    /// Offset of the static-field initial values array, 0 if none.
    pub(crate) static_values_off: u32,
}

impl ClassDef {
    /// The descriptor string of the type being defined.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.class_type.descriptor.value
    }
}

/// Decode and resolve the class-definition table.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on a dangling class, superclass,
/// interface or source-file index.
pub(crate) fn build(
    data: &[u8],
    header: &DexHeader,
    strings: &[StringIdRc],
    types: &[TypeIdRc],
) -> Result<Vec<ClassDef>> {
    let mut defs = Vec::with_capacity(header.class_defs.size as usize);

    let mut parser = Parser::new(data);
    if header.class_defs.size > 0 {
        parser.seek(header.class_defs.offset as usize)?;
    }

    for id in 0..header.class_defs.size {
        let class_idx = parser.read_le::<u32>()?;
        let access_flags = parser.read_le::<u32>()?;
        let superclass_idx = parser.read_le::<u32>()?;
        let interfaces_off = parser.read_le::<u32>()?;
        let source_file_idx = parser.read_le::<u32>()?;
        let annotations_off = parser.read_le::<u32>()?;
        let class_data_off = parser.read_le::<u32>()?;
        let static_values_off = parser.read_le::<u32>()?;

        let superclass = if superclass_idx == NO_INDEX {
            None
        } else {
            Some(resolve(types, superclass_idx, "superclass")?)
        };

        let source_file = if source_file_idx == NO_INDEX {
            None
        } else {
            Some(resolve(strings, source_file_idx, "source file string")?)
        };

        let interfaces = if interfaces_off == 0 {
            Vec::new()
        } else {
            read_type_list(data, header, interfaces_off, types)?
        };

        defs.push(ClassDef {
            id,
            class_type: resolve(types, class_idx, "defined class type")?,
            access_flags: AccessFlags::from_bits_retain(access_flags),
            superclass,
            interfaces,
            source_file,
            annotations_off,
            class_data_off,
            static_values_off,
        });
    }

    Ok(defs)
}

/// A field declaration inside a `class_data_item`.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// The field's signature from the field pool.
    pub field: FieldIdRc,
    /// The declaration's access flags.
    pub access_flags: AccessFlags,
}

/// A method declaration inside a `class_data_item`.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// The method's signature from the method pool.
    pub method: MethodIdRc,
    /// The declaration's access flags.
    pub access_flags: AccessFlags,
    /// Offset of the method's `code_item`, 0 for abstract/native methods.
    pub(crate) code_off: u32,
}

impl MethodInfo {
    /// Whether this method carries a body in this container.
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.code_off != 0
    }
}

/// The decoded member lists of one class.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClassData {
    pub static_fields: Vec<FieldInfo>,
    pub instance_fields: Vec<FieldInfo>,
    pub direct_methods: Vec<MethodInfo>,
    pub virtual_methods: Vec<MethodInfo>,
}

/// A method's decoded instruction stream.
///
/// Instruction-level semantics are out of scope here; the code units are
/// handed to the body visitor as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// Number of registers the method uses.
    pub registers_size: u16,
    /// Number of words of incoming arguments.
    pub ins_size: u16,
    /// Number of words of outgoing argument space.
    pub outs_size: u16,
    /// Number of try/catch regions.
    pub tries_size: u16,
    /// The raw 16-bit instruction stream.
    pub insns: Vec<u16>,
}

/// Decode the `class_data_item` at `offset`.
///
/// Member lists use delta-encoded pool indices: the first entry's index is
/// absolute, each following entry stores the difference to its predecessor.
/// All resulting indices are bounds-checked against the pools.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on truncated data, index overflow or
/// a dangling pool index.
pub(crate) fn read_class_data(
    data: &[u8],
    header: &DexHeader,
    offset: u32,
    fields: &[FieldIdRc],
    methods: &[MethodIdRc],
) -> Result<ClassData> {
    if offset >= header.file_size {
        return Err(malformed_error!(
            "class_data offset {:#x} outside the file",
            offset
        ));
    }

    let mut parser = Parser::new(data);
    parser.seek(offset as usize)?;

    let static_fields_size = parser.read_uleb128()?;
    let instance_fields_size = parser.read_uleb128()?;
    let direct_methods_size = parser.read_uleb128()?;
    let virtual_methods_size = parser.read_uleb128()?;

    Ok(ClassData {
        static_fields: read_encoded_fields(&mut parser, static_fields_size, fields)?,
        instance_fields: read_encoded_fields(&mut parser, instance_fields_size, fields)?,
        direct_methods: read_encoded_methods(&mut parser, direct_methods_size, methods)?,
        virtual_methods: read_encoded_methods(&mut parser, virtual_methods_size, methods)?,
    })
}

fn read_encoded_fields(
    parser: &mut Parser,
    count: u32,
    fields: &[FieldIdRc],
) -> Result<Vec<FieldInfo>> {
    // Each encoded_field takes at least two ULEB128 bytes.
    let remaining = parser.len() - parser.pos();
    if u64::from(count) * 2 > remaining as u64 {
        return Err(malformed_error!(
            "class_data declares {} fields with {} bytes left",
            count,
            remaining
        ));
    }

    let mut list = Vec::with_capacity(count as usize);
    let mut index: u32 = 0;

    for i in 0..count {
        let diff = parser.read_uleb128()?;
        let access_flags = parser.read_uleb128()?;

        index = if i == 0 {
            diff
        } else {
            index
                .checked_add(diff)
                .ok_or_else(|| malformed_error!("field index delta overflows"))?
        };

        list.push(FieldInfo {
            field: resolve(fields, index, "class data field")?,
            access_flags: AccessFlags::from_bits_retain(access_flags),
        });
    }

    Ok(list)
}

fn read_encoded_methods(
    parser: &mut Parser,
    count: u32,
    methods: &[MethodIdRc],
) -> Result<Vec<MethodInfo>> {
    // Each encoded_method takes at least three ULEB128 bytes.
    let remaining = parser.len() - parser.pos();
    if u64::from(count) * 3 > remaining as u64 {
        return Err(malformed_error!(
            "class_data declares {} methods with {} bytes left",
            count,
            remaining
        ));
    }

    let mut list = Vec::with_capacity(count as usize);
    let mut index: u32 = 0;

    for i in 0..count {
        let diff = parser.read_uleb128()?;
        let access_flags = parser.read_uleb128()?;
        let code_off = parser.read_uleb128()?;

        index = if i == 0 {
            diff
        } else {
            index
                .checked_add(diff)
                .ok_or_else(|| malformed_error!("method index delta overflows"))?
        };

        list.push(MethodInfo {
            method: resolve(methods, index, "class data method")?,
            access_flags: AccessFlags::from_bits_retain(access_flags),
            code_off,
        });
    }

    Ok(list)
}

/// Decode the `code_item` at `offset` into a [`MethodBody`].
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the item lies outside the file or
/// its instruction stream is truncated.
pub(crate) fn read_code_item(data: &[u8], header: &DexHeader, offset: u32) -> Result<MethodBody> {
    if offset >= header.file_size {
        return Err(malformed_error!(
            "code_item offset {:#x} outside the file",
            offset
        ));
    }

    let mut parser = Parser::new(data);
    parser.seek(offset as usize)?;

    let registers_size = parser.read_le::<u16>()?;
    let ins_size = parser.read_le::<u16>()?;
    let outs_size = parser.read_le::<u16>()?;
    let tries_size = parser.read_le::<u16>()?;
    let _debug_info_off = parser.read_le::<u32>()?;
    let insns_size = parser.read_le::<u32>()?;

    // Code units are two bytes each; allocation follows the check.
    let remaining = parser.len() - parser.pos();
    if u64::from(insns_size) * 2 > remaining as u64 {
        return Err(malformed_error!(
            "code_item declares {} code units with {} bytes left",
            insns_size,
            remaining
        ));
    }

    let mut insns = Vec::with_capacity(insns_size as usize);
    for _ in 0..insns_size {
        insns.push(parser.read_le::<u16>()?);
    }

    Ok(MethodBody {
        registers_size,
        ins_size,
        outs_size,
        tries_size,
        insns,
    })
}
