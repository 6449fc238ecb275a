//! Shared functionality for building crafted DEX containers in tests.
//!
//! [`DexBuilder`] assembles a structurally valid container from high-level
//! specs: it lays out the id sections back to back after the header, places
//! string data, type lists, code items, class data and the map list in the
//! data section, and patches the file size and Adler-32 checksum last. The
//! SHA-1 signature is left zeroed, so strict verification is expected to
//! reject builder output.

#![allow(dead_code)]

pub const NO_INDEX: u32 = 0xFFFF_FFFF;

const HEADER_SIZE: u32 = 0x70;

pub fn uleb128(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// MUTF-8 encoding of an ASCII string: utf16-length prefix, bytes, NUL.
pub fn mutf8(s: &str) -> Vec<u8> {
    assert!(s.is_ascii(), "builder only encodes ASCII strings");
    let mut out = uleb128(s.len() as u32);
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    out
}

pub fn adler32(data: &[u8]) -> u32 {
    const MOD: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + u32::from(byte)) % MOD;
        b = (b + a) % MOD;
    }
    (b << 16) | a
}

/// A method declaration inside a class spec, optionally with a body.
pub struct MethodSpec {
    pub method_idx: u32,
    pub access_flags: u32,
    pub code: Option<Vec<u16>>,
}

impl MethodSpec {
    pub fn abstract_method(method_idx: u32, access_flags: u32) -> Self {
        MethodSpec {
            method_idx,
            access_flags,
            code: None,
        }
    }

    pub fn with_code(method_idx: u32, access_flags: u32, insns: Vec<u16>) -> Self {
        MethodSpec {
            method_idx,
            access_flags,
            code: Some(insns),
        }
    }
}

/// The member lists of a class, using absolute pool indices.
#[derive(Default)]
pub struct ClassDataSpec {
    pub static_fields: Vec<(u32, u32)>,
    pub instance_fields: Vec<(u32, u32)>,
    pub direct_methods: Vec<MethodSpec>,
    pub virtual_methods: Vec<MethodSpec>,
}

pub struct ClassSpec {
    pub class_idx: u32,
    pub access_flags: u32,
    pub superclass_idx: u32,
    pub interfaces: Vec<u16>,
    pub source_file_idx: u32,
    pub data: Option<ClassDataSpec>,
}

impl ClassSpec {
    /// A class definition with no members.
    pub fn marker(class_idx: u32, superclass_idx: u32) -> Self {
        ClassSpec {
            class_idx,
            access_flags: 0x1, // public
            superclass_idx,
            interfaces: Vec::new(),
            source_file_idx: NO_INDEX,
            data: None,
        }
    }

    pub fn with_data(class_idx: u32, superclass_idx: u32, data: ClassDataSpec) -> Self {
        ClassSpec {
            data: Some(data),
            ..ClassSpec::marker(class_idx, superclass_idx)
        }
    }
}

/// Assembles crafted DEX containers for integration tests.
#[derive(Default)]
pub struct DexBuilder {
    strings: Vec<String>,
    types: Vec<u32>,
    protos: Vec<(u32, u32, Vec<u16>)>,
    fields: Vec<(u16, u16, u32)>,
    methods: Vec<(u16, u16, u32)>,
    classes: Vec<ClassSpec>,
    annotations: Vec<Vec<u8>>,
    arrays: Vec<Vec<u8>>,
    extra_map_entries: Vec<(u16, u32, u32)>,
    omit_map: bool,
}

impl DexBuilder {
    pub fn new() -> Self {
        DexBuilder::default()
    }

    /// The string pool; entries must already be in sorted file order.
    pub fn strings(mut self, strings: &[&str]) -> Self {
        self.strings = strings.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// The type pool as string-pool indices.
    pub fn types(mut self, types: &[u32]) -> Self {
        self.types = types.to_vec();
        self
    }

    /// A prototype: shorty string index, return type index, parameter type indices.
    pub fn proto(mut self, shorty_idx: u32, return_type_idx: u32, params: &[u16]) -> Self {
        self.protos.push((shorty_idx, return_type_idx, params.to_vec()));
        self
    }

    /// A field: declaring class type index, field type index, name string index.
    pub fn field(mut self, class_idx: u16, type_idx: u16, name_idx: u32) -> Self {
        self.fields.push((class_idx, type_idx, name_idx));
        self
    }

    /// A method: declaring class type index, proto index, name string index.
    pub fn method(mut self, class_idx: u16, proto_idx: u16, name_idx: u32) -> Self {
        self.methods.push((class_idx, proto_idx, name_idx));
        self
    }

    pub fn class(mut self, class: ClassSpec) -> Self {
        self.classes.push(class);
        self
    }

    /// Raw `annotation_item` bytes, emitted as one map-listed run.
    pub fn annotation_item(mut self, bytes: Vec<u8>) -> Self {
        self.annotations.push(bytes);
        self
    }

    /// Raw `encoded_array_item` bytes, emitted as one map-listed run.
    pub fn encoded_array_item(mut self, bytes: Vec<u8>) -> Self {
        self.arrays.push(bytes);
        self
    }

    /// A verbatim map-list entry appended after the generated ones, for
    /// crafting maps the builder would not normally produce.
    pub fn map_entry(mut self, item_type: u16, size: u32, offset: u32) -> Self {
        self.extra_map_entries.push((item_type, size, offset));
        self
    }

    /// Emit a zero `map_off`, as some repackaging tools do.
    pub fn omit_map(mut self) -> Self {
        self.omit_map = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut cursor = HEADER_SIZE;
        let string_ids = section(&mut cursor, self.strings.len() as u32, 4);
        let type_ids = section(&mut cursor, self.types.len() as u32, 4);
        let proto_ids = section(&mut cursor, self.protos.len() as u32, 12);
        let field_ids = section(&mut cursor, self.fields.len() as u32, 8);
        let method_ids = section(&mut cursor, self.methods.len() as u32, 8);
        let class_defs = section(&mut cursor, self.classes.len() as u32, 32);
        let data_off = cursor;

        // Data section, laid out so every referencing item is emitted after
        // its referents: string data, type lists, code items, class data,
        // annotation and array runs, map list.
        let mut data = Vec::new();
        let abs = |data: &Vec<u8>| data_off + data.len() as u32;

        let string_offs: Vec<u32> = self
            .strings
            .iter()
            .map(|s| {
                let off = abs(&data);
                data.extend_from_slice(&mutf8(s));
                off
            })
            .collect();

        let proto_param_offs: Vec<u32> = self
            .protos
            .iter()
            .map(|(_, _, params)| {
                if params.is_empty() {
                    0
                } else {
                    align4(&mut data, data_off);
                    let off = abs(&data);
                    push_type_list(&mut data, params);
                    off
                }
            })
            .collect();

        let interface_offs: Vec<u32> = self
            .classes
            .iter()
            .map(|class| {
                if class.interfaces.is_empty() {
                    0
                } else {
                    align4(&mut data, data_off);
                    let off = abs(&data);
                    push_type_list(&mut data, &class.interfaces);
                    off
                }
            })
            .collect();

        // Code items first, so class data can reference real offsets. Each
        // class's list covers its direct methods, then its virtual methods.
        let mut code_offs: Vec<Vec<Option<u32>>> = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            let mut offs = Vec::new();
            if let Some(spec) = &class.data {
                for method in spec.direct_methods.iter().chain(&spec.virtual_methods) {
                    offs.push(method.code.as_ref().map(|insns| {
                        align4(&mut data, data_off);
                        let off = abs(&data);
                        push_code_item(&mut data, insns);
                        off
                    }));
                }
            }
            code_offs.push(offs);
        }

        let class_data_offs: Vec<u32> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, class)| match &class.data {
                None => 0,
                Some(spec) => {
                    let off = abs(&data);
                    push_class_data(&mut data, spec, &code_offs[i]);
                    off
                }
            })
            .collect();

        let mut map_entries: Vec<(u16, u32, u32)> = Vec::new();
        if !self.annotations.is_empty() {
            let off = abs(&data);
            for item in &self.annotations {
                data.extend_from_slice(item);
            }
            map_entries.push((0x2004, self.annotations.len() as u32, off));
        }
        if !self.arrays.is_empty() {
            let off = abs(&data);
            for item in &self.arrays {
                data.extend_from_slice(item);
            }
            map_entries.push((0x2005, self.arrays.len() as u32, off));
        }
        map_entries.extend_from_slice(&self.extra_map_entries);

        let map_off = if self.omit_map {
            0
        } else {
            align4(&mut data, data_off);
            let off = abs(&data);
            push_u32(&mut data, map_entries.len() as u32);
            for (item_type, size, offset) in &map_entries {
                push_u16(&mut data, *item_type);
                push_u16(&mut data, 0);
                push_u32(&mut data, *size);
                push_u32(&mut data, *offset);
            }
            off
        };

        let data_size = data.len() as u32;
        let file_size = data_off + data_size;

        // Assemble the file.
        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(b"dex\n035\0");
        push_u32(&mut out, 0); // checksum, patched below
        out.extend_from_slice(&[0u8; 20]); // signature, left zeroed
        push_u32(&mut out, file_size);
        push_u32(&mut out, HEADER_SIZE);
        push_u32(&mut out, 0x1234_5678);
        push_u32(&mut out, 0); // link_size
        push_u32(&mut out, 0); // link_off
        push_u32(&mut out, map_off);
        for (size, off) in [string_ids, type_ids, proto_ids, field_ids, method_ids, class_defs] {
            push_u32(&mut out, size);
            push_u32(&mut out, off);
        }
        push_u32(&mut out, data_size);
        push_u32(&mut out, data_off);
        assert_eq!(out.len(), HEADER_SIZE as usize);

        for off in &string_offs {
            push_u32(&mut out, *off);
        }
        for string_idx in &self.types {
            push_u32(&mut out, *string_idx);
        }
        for (i, (shorty, return_type, _)) in self.protos.iter().enumerate() {
            push_u32(&mut out, *shorty);
            push_u32(&mut out, *return_type);
            push_u32(&mut out, proto_param_offs[i]);
        }
        for (class, type_idx, name) in &self.fields {
            push_u16(&mut out, *class);
            push_u16(&mut out, *type_idx);
            push_u32(&mut out, *name);
        }
        for (class, proto, name) in &self.methods {
            push_u16(&mut out, *class);
            push_u16(&mut out, *proto);
            push_u32(&mut out, *name);
        }
        for (i, class) in self.classes.iter().enumerate() {
            push_u32(&mut out, class.class_idx);
            push_u32(&mut out, class.access_flags);
            push_u32(&mut out, class.superclass_idx);
            push_u32(&mut out, interface_offs[i]);
            push_u32(&mut out, class.source_file_idx);
            push_u32(&mut out, 0); // annotations_off
            push_u32(&mut out, class_data_offs[i]);
            push_u32(&mut out, 0); // static_values_off
        }
        out.extend_from_slice(&data);
        assert_eq!(out.len(), file_size as usize);

        let checksum = adler32(&out[12..]);
        out[8..12].copy_from_slice(&checksum.to_le_bytes());
        out
    }
}

fn section(cursor: &mut u32, count: u32, width: u32) -> (u32, u32) {
    if count == 0 {
        (0, 0)
    } else {
        let off = *cursor;
        *cursor += count * width;
        (count, off)
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn align4(data: &mut Vec<u8>, data_off: u32) {
    while (data_off as usize + data.len()) % 4 != 0 {
        data.push(0);
    }
}

fn push_type_list(data: &mut Vec<u8>, type_idxs: &[u16]) {
    push_u32(data, type_idxs.len() as u32);
    for idx in type_idxs {
        push_u16(data, *idx);
    }
}

fn push_code_item(data: &mut Vec<u8>, insns: &[u16]) {
    push_u16(data, 1); // registers_size
    push_u16(data, 1); // ins_size
    push_u16(data, 0); // outs_size
    push_u16(data, 0); // tries_size
    push_u32(data, 0); // debug_info_off
    push_u32(data, insns.len() as u32);
    for unit in insns {
        push_u16(data, *unit);
    }
}

fn push_class_data(data: &mut Vec<u8>, spec: &ClassDataSpec, code_offs: &[Option<u32>]) {
    data.extend_from_slice(&uleb128(spec.static_fields.len() as u32));
    data.extend_from_slice(&uleb128(spec.instance_fields.len() as u32));
    data.extend_from_slice(&uleb128(spec.direct_methods.len() as u32));
    data.extend_from_slice(&uleb128(spec.virtual_methods.len() as u32));

    for fields in [&spec.static_fields, &spec.instance_fields] {
        let mut previous = 0;
        for (i, (idx, flags)) in fields.iter().enumerate() {
            let diff = if i == 0 { *idx } else { idx - previous };
            previous = *idx;
            data.extend_from_slice(&uleb128(diff));
            data.extend_from_slice(&uleb128(*flags));
        }
    }

    let mut code_iter = code_offs.iter();
    for methods in [&spec.direct_methods, &spec.virtual_methods] {
        let mut previous = 0;
        for (i, method) in methods.iter().enumerate() {
            let diff = if i == 0 {
                method.method_idx
            } else {
                method.method_idx - previous
            };
            previous = method.method_idx;
            let code_off = code_iter.next().copied().flatten().unwrap_or(0);
            data.extend_from_slice(&uleb128(diff));
            data.extend_from_slice(&uleb128(method.access_flags));
            data.extend_from_slice(&uleb128(code_off));
        }
    }
}
