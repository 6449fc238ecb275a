//! Low-level byte order and safe reading utilities for DEX parsing.
//!
//! This module provides endian-aware binary data reading for the fixed-width
//! portions of a DEX container (header fields, id-table records, code items).
//! All operations are bounds-checked to prevent buffer overruns when decoding
//! malformed or truncated input.
//!
//! The DEX format is little-endian throughout; the [`crate::file::io::DexIO`]
//! trait abstracts the primitive conversions so that [`read_le_at`] can read
//! any supported width with a single generic implementation.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use dexscope::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;  // offset: 0 -> 2
//! let second: u16 = read_le_at(&data, &mut offset)?; // offset: 2 -> 4
//! let third: u32 = read_le_at(&data, &mut offset)?;  // offset: 4 -> 8
//!
//! assert_eq!((first, second, third), (1, 2, 3));
//! # Ok::<(), dexscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait defining endian-aware reading capabilities for primitive types.
///
/// Implemented for the integer widths that appear in DEX structures. The
/// associated `Bytes` type ties each primitive to its fixed-size byte array
/// so reads stay fully type-checked.
pub trait DexIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

impl DexIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }
}

impl DexIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }
}

impl DexIO for i32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i32::from_le_bytes(bytes)
    }
}

impl DexIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }
}

impl DexIO for i16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i16::from_le_bytes(bytes)
    }
}

impl DexIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        bytes[0]
    }
}

/// Reads a value of type `T` at the given offset in little-endian byte order,
/// advancing the offset past the bytes consumed.
///
/// # Arguments
/// * `data` - The buffer to read from
/// * `offset` - Position to read at; advanced by `size_of::<T>()` on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would exceed the buffer.
pub fn read_le_at<T: DexIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}
