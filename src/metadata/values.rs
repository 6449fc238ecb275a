//! Decoding of DEX encoded values, annotations and constant arrays.
//!
//! The data section stores constants in a compact tagged format: a single
//! header byte carries the value type in its low five bits and a
//! type-dependent argument in its high three bits. For most types the
//! argument is `size - 1` of the little-endian payload that follows; for
//! booleans it is the value itself, and null carries no payload at all.
//! Array and annotation values recurse: an encoded array is a
//! length-prefixed sequence of encoded values, an encoded annotation is a
//! type index plus a size-prefixed sequence of (name, value) pairs.
//!
//! Everything here is a pure function of bytes plus the already-built id
//! pools; no I/O happens and no handle state is touched. Values are decoded
//! in a single pass directly into their tagged structures.
//!
//! # Key Components
//!
//! - [`ValueType`] - the tag alphabet of the encoded-value format
//! - [`EncodedValue`] - one tagged constant (payload kept as raw bytes)
//! - [`EncodedArray`] - a decoded `encoded_array_item`
//! - [`Annotation`] / [`AnnotationElement`] / [`Visibility`] - decoded
//!   annotation items

use strum::FromRepr;

use crate::{
    file::parser::Parser,
    metadata::pools::{resolve, StringIdRc, TypeIdRc},
    Error, Result,
};

/// Maximum nesting depth of array and annotation values.
///
/// The format places no bound on how deeply encoded values may nest, so a
/// crafted container could otherwise overflow the stack during recursive
/// descent. Real annotations nest a handful of levels at most.
const MAX_NESTING_DEPTH: usize = 100;

/// The value-type tag of an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ValueType {
    /// Signed one-byte integer.
    Byte = 0x00,
    /// Signed two-byte integer, sign-extended.
    Short = 0x02,
    /// Unsigned two-byte integer, zero-extended.
    Char = 0x03,
    /// Signed four-byte integer, sign-extended.
    Int = 0x04,
    /// Signed eight-byte integer, sign-extended.
    Long = 0x06,
    /// Four-byte bit pattern, zero-extended to the right.
    Float = 0x10,
    /// Eight-byte bit pattern, zero-extended to the right.
    Double = 0x11,
    /// Unsigned index into the proto pool.
    MethodType = 0x15,
    /// Unsigned index into the method handles section.
    MethodHandle = 0x16,
    /// Unsigned index into the string pool.
    String = 0x17,
    /// Unsigned index into the type pool.
    Type = 0x18,
    /// Unsigned index into the field pool.
    Field = 0x19,
    /// Unsigned index into the method pool.
    Method = 0x1a,
    /// Unsigned index into the field pool, naming an enum constant.
    Enum = 0x1b,
    /// A nested `encoded_array`.
    Array = 0x1c,
    /// A nested `encoded_annotation`.
    Annotation = 0x1d,
    /// The null reference; no payload.
    Null = 0x1e,
    /// Boolean literal; the value lives in the argument bits, no payload.
    Boolean = 0x1f,
}

impl ValueType {
    /// Maximum payload width in bytes, or 0 for tag-only and nested values.
    fn max_payload(self) -> u8 {
        match self {
            ValueType::Byte => 1,
            ValueType::Short | ValueType::Char => 2,
            ValueType::Int
            | ValueType::Float
            | ValueType::MethodType
            | ValueType::MethodHandle
            | ValueType::String
            | ValueType::Type
            | ValueType::Field
            | ValueType::Method
            | ValueType::Enum => 4,
            ValueType::Long | ValueType::Double => 8,
            ValueType::Array | ValueType::Annotation | ValueType::Null | ValueType::Boolean => 0,
        }
    }
}

/// Retention of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum Visibility {
    /// Visible to build tools only.
    Build = 0x00,
    /// Visible at runtime through reflection.
    Runtime = 0x01,
    /// Visible to the runtime system, hidden from reflection.
    System = 0x02,
}

/// One tagged constant value.
///
/// The payload is kept as the raw little-endian bytes from the file; `None`
/// exactly when the tag alone describes the value ([`ValueType::Null`] and
/// [`ValueType::Boolean`], whose literal sits in [`EncodedValue::arg`]). For
/// [`ValueType::Array`] and [`ValueType::Annotation`] the payload is the raw
/// byte span of the nested structure, delimited by recursive descent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    /// The value-type tag.
    pub value_type: ValueType,
    /// The three argument bits from the header byte.
    pub arg: u8,
    /// Raw payload bytes, absent for tag-only values.
    pub payload: Option<Vec<u8>>,
}

impl EncodedValue {
    /// The boolean literal, when this is a [`ValueType::Boolean`] value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value_type {
            ValueType::Boolean => Some(self.arg != 0),
            _ => None,
        }
    }
}

/// A decoded `encoded_array_item`: an ordered sequence of values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedArray {
    /// The array elements in file order.
    pub values: Vec<EncodedValue>,
}

/// One (name, value) pair of an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationElement {
    /// The element name.
    pub name: StringIdRc,
    /// The element value.
    pub value: EncodedValue,
}

/// A decoded `annotation_item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// When this annotation is retained.
    pub visibility: Visibility,
    /// The annotation type.
    pub annotation_type: TypeIdRc,
    /// The annotation's elements in file order.
    pub elements: Vec<AnnotationElement>,
}

/// Decode a single encoded value at the parser's position.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on an unknown tag, an argument
/// exceeding the tag's payload width, or a truncated nested structure, and
/// [`crate::Error::RecursionLimit`] when nested values go past the
/// supported depth.
pub fn read_encoded_value(parser: &mut Parser) -> Result<EncodedValue> {
    read_encoded_value_at(parser, 0)
}

fn read_encoded_value_at(parser: &mut Parser, depth: usize) -> Result<EncodedValue> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(Error::RecursionLimit(MAX_NESTING_DEPTH));
    }

    let header = parser.read_le::<u8>()?;
    let arg = header >> 5;

    let Some(value_type) = ValueType::from_repr(header & 0x1F) else {
        return Err(malformed_error!(
            "Unknown encoded value type {:#04x}",
            header & 0x1F
        ));
    };

    match value_type {
        ValueType::Null => {
            if arg != 0 {
                return Err(malformed_error!("Null value with non-zero argument"));
            }
            Ok(EncodedValue {
                value_type,
                arg,
                payload: None,
            })
        }
        ValueType::Boolean => {
            if arg > 1 {
                return Err(malformed_error!("Boolean value argument {} not 0 or 1", arg));
            }
            Ok(EncodedValue {
                value_type,
                arg,
                payload: None,
            })
        }
        ValueType::Array | ValueType::Annotation => {
            if arg != 0 {
                return Err(malformed_error!("Nested value with non-zero argument"));
            }

            let start = parser.pos();
            if value_type == ValueType::Array {
                skip_encoded_array(parser, depth + 1)?;
            } else {
                skip_encoded_annotation(parser, depth + 1)?;
            }

            Ok(EncodedValue {
                value_type,
                arg,
                payload: Some(parser.data()[start..parser.pos()].to_vec()),
            })
        }
        _ => {
            let size = arg + 1;
            if size > value_type.max_payload() {
                return Err(malformed_error!(
                    "{:?} value of {} bytes exceeds its maximum width",
                    value_type,
                    size
                ));
            }

            Ok(EncodedValue {
                value_type,
                arg,
                payload: Some(parser.bytes(size as usize)?.to_vec()),
            })
        }
    }
}

/// Decode an `encoded_array` at the parser's position.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if any element is invalid or the
/// declared element count cannot fit in the remaining buffer.
pub fn read_encoded_array(parser: &mut Parser) -> Result<EncodedArray> {
    let count = parser.read_uleb128()?;

    // Every element takes at least one byte; allocation follows the check.
    let remaining = parser.len() - parser.pos();
    if count as usize > remaining {
        return Err(malformed_error!(
            "Encoded array declares {} elements with {} bytes left",
            count,
            remaining
        ));
    }

    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        values.push(read_encoded_value_at(parser, 0)?);
    }

    Ok(EncodedArray { values })
}

/// Decode an `encoded_annotation` at the parser's position, resolving its
/// type and element-name indices against the pools.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on a dangling index or invalid value.
pub fn read_encoded_annotation(
    parser: &mut Parser,
    strings: &[StringIdRc],
    types: &[TypeIdRc],
) -> Result<(TypeIdRc, Vec<AnnotationElement>)> {
    let type_idx = parser.read_uleb128()?;
    let annotation_type = resolve(types, type_idx, "annotation type")?;

    let count = parser.read_uleb128()?;

    // A (name, value) pair takes at least two bytes.
    let remaining = parser.len() - parser.pos();
    if u64::from(count) * 2 > remaining as u64 {
        return Err(malformed_error!(
            "Encoded annotation declares {} elements with {} bytes left",
            count,
            remaining
        ));
    }

    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_idx = parser.read_uleb128()?;
        elements.push(AnnotationElement {
            name: resolve(strings, name_idx, "annotation element name")?,
            value: read_encoded_value_at(parser, 0)?,
        });
    }

    Ok((annotation_type, elements))
}

/// Decode an `annotation_item` (visibility byte plus encoded annotation).
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on an unknown visibility or an
/// invalid encoded annotation.
pub(crate) fn read_annotation_item(
    parser: &mut Parser,
    strings: &[StringIdRc],
    types: &[TypeIdRc],
) -> Result<Annotation> {
    let visibility_byte = parser.read_le::<u8>()?;
    let Some(visibility) = Visibility::from_repr(visibility_byte) else {
        return Err(malformed_error!(
            "Unknown annotation visibility {:#04x}",
            visibility_byte
        ));
    };

    let (annotation_type, elements) = read_encoded_annotation(parser, strings, types)?;

    Ok(Annotation {
        visibility,
        annotation_type,
        elements,
    })
}

// Walkers used to delimit the raw byte span of nested values. Each carries
// the current nesting depth so recursion stays bounded.

fn skip_encoded_value(parser: &mut Parser, depth: usize) -> Result<()> {
    read_encoded_value_at(parser, depth).map(|_| ())
}

fn skip_encoded_array(parser: &mut Parser, depth: usize) -> Result<()> {
    let count = parser.read_uleb128()?;
    for _ in 0..count {
        skip_encoded_value(parser, depth)?;
    }
    Ok(())
}

fn skip_encoded_annotation(parser: &mut Parser, depth: usize) -> Result<()> {
    let _type_idx = parser.read_uleb128()?;
    let count = parser.read_uleb128()?;
    for _ in 0..count {
        let _name_idx = parser.read_uleb128()?;
        skip_encoded_value(parser, depth)?;
    }
    Ok(())
}
