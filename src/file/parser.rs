//! Low-level byte stream parser for DEX metadata decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary
//! data parser for reading the structures of a DEX container. It offers bounds-checked
//! access to binary data with support for the little-endian fixed-width fields of the
//! id tables as well as the variable-length encodings used in the data section:
//! ULEB128, ULEB128p1, SLEB128, and MUTF-8 string data.
//!
//! # Architecture
//!
//! The parser is built around a simple cursor model that maintains a position within
//! a byte slice:
//!
//! - **Position tracking** - Maintains current offset for sequential parsing
//! - **Bounds checking** - All operations validate data availability before reading
//! - **Type-safe reading** - Strongly typed methods for common data types
//! - **DEX encodings** - Specialized readers for LEB128 variants and MUTF-8
//!
//! # Usage Examples
//!
//! ## Basic Value Reading
//!
//! ```rust
//! use dexscope::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04];
//! let mut parser = Parser::new(&data);
//!
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! # Ok::<(), dexscope::Error>(())
//! ```
//!
//! ## Variable-Length Encodings
//!
//! ```rust
//! use dexscope::Parser;
//!
//! // 0x80 0x01 is ULEB128 for 128
//! let data = [0x80, 0x01];
//! let mut parser = Parser::new(&data);
//! assert_eq!(parser.read_uleb128()?, 128);
//! # Ok::<(), dexscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, DexIO},
    Error::OutOfBounds,
    Result,
};

/// Maximum number of bytes a single LEB128 value may occupy in a DEX file.
const LEB128_MAX_BYTES: usize = 5;

/// A cursor-based binary data parser for DEX structures.
///
/// `Parser` provides bounds-checked sequential and random access over a byte
/// slice. It understands the primitive widths of the DEX id tables and the
/// variable-length encodings of the data section (LEB128 families, MUTF-8),
/// preventing buffer overruns when reading malformed or truncated input.
///
/// # Examples
///
/// ```rust
/// use dexscope::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// parser.seek(6)?;
/// let last = parser.read_le::<u16>()?;
/// assert_eq!(last, 0x0807);
/// # Ok::<(), dexscope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Arguments
    /// * `step` - Amount of bytes to advance
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(OutOfBounds);
        }
        Ok(self.data[self.position])
    }

    /// Read a type `T` from the current position in little-endian format and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dexscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// let value: u16 = parser.read_le()?;
    /// assert_eq!(value, 0x0201);
    /// assert_eq!(parser.pos(), 2);
    /// # Ok::<(), dexscope::Error>(())
    /// ```
    pub fn read_le<T: DexIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read `count` raw bytes from the current position and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` bytes remain.
    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.position + count > self.data.len() {
            return Err(OutOfBounds);
        }

        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Read an unsigned LEB128 value and advance past it.
    ///
    /// DEX encodes most variable-length counts and indices as ULEB128: 7 bits
    /// per byte, least-significant group first, high bit as continuation flag.
    /// A value occupies at most five bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer ends mid-value, or
    /// [`crate::Error::Malformed`] if the encoding exceeds five bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dexscope::Parser;
    /// let data = [0xE5, 0x8E, 0x26];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_uleb128()?, 624485);
    /// # Ok::<(), dexscope::Error>(())
    /// ```
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let mut result: u32 = 0;
        let mut shift = 0;

        for i in 0..LEB128_MAX_BYTES {
            let byte = self.read_le::<u8>()?;
            result |= u32::from(byte & 0x7F) << shift;

            if byte & 0x80 == 0 {
                if i == LEB128_MAX_BYTES - 1 && byte > 0x0F {
                    return Err(malformed_error!("ULEB128 value exceeds 32 bits"));
                }
                return Ok(result);
            }
            shift += 7;
        }

        Err(malformed_error!("ULEB128 encoding longer than 5 bytes"))
    }

    /// Read a ULEB128p1 value and advance past it.
    ///
    /// ULEB128p1 stores `value + 1` as ULEB128 so that `-1` (the DEX
    /// `NO_INDEX` sentinel in some contexts) has a one-byte encoding.
    ///
    /// # Errors
    /// Same failure modes as [`Parser::read_uleb128`].
    pub fn read_uleb128p1(&mut self) -> Result<i64> {
        Ok(i64::from(self.read_uleb128()?) - 1)
    }

    /// Read a signed LEB128 value and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer ends mid-value, or
    /// [`crate::Error::Malformed`] if the encoding exceeds five bytes.
    pub fn read_sleb128(&mut self) -> Result<i32> {
        let mut result: i32 = 0;
        let mut shift = 0;

        for _ in 0..LEB128_MAX_BYTES {
            let byte = self.read_le::<u8>()?;
            result |= i32::from(byte & 0x7F) << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                if shift < 32 && (byte & 0x40) != 0 {
                    // Sign extend
                    result |= -1i32 << shift;
                }
                return Ok(result);
            }
        }

        Err(malformed_error!("SLEB128 encoding longer than 5 bytes"))
    }

    /// Read a DEX `string_data_item` at the current position: a ULEB128
    /// UTF-16 code-unit count followed by MUTF-8 bytes and a trailing NUL.
    ///
    /// MUTF-8 differs from UTF-8 in two ways: `U+0000` is encoded as the
    /// two-byte sequence `C0 80` (so the NUL byte always terminates), and
    /// supplementary characters are stored as CESU-8 surrogate pairs, each
    /// surrogate a three-byte sequence. Both are decoded here.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the byte sequence is not valid
    /// MUTF-8, the decoded length disagrees with the prefix, or the resulting
    /// code units are not valid UTF-16. Returns [`crate::Error::OutOfBounds`]
    /// if the data ends before the terminating NUL.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dexscope::Parser;
    /// // utf16 length 3, "abc", NUL
    /// let data = [0x03, b'a', b'b', b'c', 0x00];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_mutf8()?, "abc");
    /// # Ok::<(), dexscope::Error>(())
    /// ```
    pub fn read_mutf8(&mut self) -> Result<String> {
        let expected_units = self.read_uleb128()? as usize;

        let mut units: Vec<u16> = Vec::with_capacity(expected_units);
        loop {
            let first = self.read_le::<u8>()?;
            match first {
                0x00 => break,
                0x01..=0x7F => units.push(u16::from(first)),
                0xC0..=0xDF => {
                    let second = self.read_le::<u8>()?;
                    if second & 0xC0 != 0x80 {
                        return Err(malformed_error!(
                            "Invalid MUTF-8 continuation byte {:#04x}",
                            second
                        ));
                    }
                    units.push((u16::from(first & 0x1F) << 6) | u16::from(second & 0x3F));
                }
                0xE0..=0xEF => {
                    let second = self.read_le::<u8>()?;
                    let third = self.read_le::<u8>()?;
                    if second & 0xC0 != 0x80 || third & 0xC0 != 0x80 {
                        return Err(malformed_error!("Invalid MUTF-8 continuation byte"));
                    }
                    units.push(
                        (u16::from(first & 0x0F) << 12)
                            | (u16::from(second & 0x3F) << 6)
                            | u16::from(third & 0x3F),
                    );
                }
                _ => {
                    return Err(malformed_error!("Invalid MUTF-8 lead byte {:#04x}", first));
                }
            }
        }

        if units.len() != expected_units {
            return Err(malformed_error!(
                "String data length {} does not match its prefix {}",
                units.len(),
                expected_units
            ));
        }

        match String::from_utf16(&units) {
            Ok(value) => Ok(value),
            Err(_) => Err(malformed_error!("String data is not valid UTF-16")),
        }
    }
}
