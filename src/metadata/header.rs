//! DEX container header parsing and validation.
//!
//! The 0x70-byte header at the front of every DEX file declares the container
//! version, integrity fields (Adler-32 checksum, SHA-1 signature) and the
//! location of every id table and the data section. [`DexHeader::read`]
//! decodes and validates all of it in one all-or-nothing pass: any
//! inconsistency fails the whole open, no partially validated header is ever
//! returned.
//!
//! # Layout
//!
//! | offset | field | size |
//! |-------:|-------|-----:|
//! | 0x00 | magic `dex\n0NN\0` | 8 |
//! | 0x08 | checksum (Adler-32 of bytes 12..file_size) | 4 |
//! | 0x0C | signature (SHA-1 of bytes 32..file_size) | 20 |
//! | 0x20 | `file_size` | 4 |
//! | 0x24 | `header_size` (0x70) | 4 |
//! | 0x28 | `endian_tag` (0x12345678) | 4 |
//! | 0x2C | `link_size` / `link_off` | 8 |
//! | 0x34 | `map_off` | 4 |
//! | 0x38.. | `(size, off)` pairs: strings, types, protos, fields, methods, class defs | 48 |
//! | 0x68 | `data_size` / `data_off` | 8 |

use sha1::{Digest, Sha1};

use crate::{file::parser::Parser, metadata::ParseOptions, Result};

/// Size of the fixed DEX header in bytes.
pub const HEADER_SIZE: u32 = 0x70;

/// The required value of `endian_tag` for little-endian files.
pub const ENDIAN_CONSTANT: u32 = 0x1234_5678;

/// `endian_tag` of a byte-swapped file. Structurally valid per the format
/// but never produced by any toolchain; rejected as unsupported.
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x7856_3412;

/// Sentinel for absent optional indices (superclass, source file).
pub const NO_INDEX: u32 = 0xFFFF_FFFF;

/// Location and element count of one id section within the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Section {
    /// Number of records in the section.
    pub size: u32,
    /// File offset of the first record.
    pub offset: u32,
}

impl Section {
    /// Validate that `size` records of `width` bytes starting at `offset`
    /// fit inside `file_size`, with overflow-safe arithmetic.
    fn check(&self, what: &str, width: u32, file_size: u32) -> Result<()> {
        if self.size == 0 {
            return Ok(());
        }

        let Some(bytes) = self.size.checked_mul(width) else {
            return Err(malformed_error!("{} section size overflows", what));
        };

        match self.offset.checked_add(bytes) {
            Some(end) if end <= file_size => Ok(()),
            _ => Err(malformed_error!(
                "{} section [{:#x}; {} * {}] lies outside the file",
                what,
                self.offset,
                self.size,
                width
            )),
        }
    }
}

/// The decoded and validated DEX file header.
///
/// All offsets and counts have been checked against the physical buffer at
/// construction time, so downstream decoders can slice sections without
/// re-validating the arithmetic (individual variable-length items in the
/// data section are still bounds-checked as they are read).
#[derive(Debug, Clone)]
pub struct DexHeader {
    /// Format version from the magic, e.g. 35 for `dex\n035\0`.
    pub version: u32,
    /// Adler-32 checksum of bytes `[12..file_size)`.
    pub checksum: u32,
    /// SHA-1 digest of bytes `[32..file_size)`.
    pub signature: [u8; 20],
    /// Declared size of the container; trailing buffer bytes are ignored.
    pub file_size: u32,
    /// `string_ids` section (4-byte records).
    pub string_ids: Section,
    /// `type_ids` section (4-byte records).
    pub type_ids: Section,
    /// `proto_ids` section (12-byte records).
    pub proto_ids: Section,
    /// `field_ids` section (8-byte records).
    pub field_ids: Section,
    /// `method_ids` section (8-byte records).
    pub method_ids: Section,
    /// `class_defs` section (32-byte records).
    pub class_defs: Section,
    /// The variable-length data section.
    pub data: Section,
    /// Offset of the `map_list` inside the data section.
    pub map_off: u32,
}

impl DexHeader {
    /// Decode and validate the header of `data` under the given options.
    ///
    /// Checks, in order: minimum length, magic and version, endianness,
    /// declared header and file size against the physical buffer, every
    /// section's bounds, and (per `options`) the Adler-32 checksum and SHA-1
    /// signature of the file contents.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on any structural violation,
    /// [`crate::Error::NotSupported`] for unknown versions or byte-swapped
    /// containers. No partial header is returned on failure.
    pub fn read(data: &[u8], options: &ParseOptions) -> Result<DexHeader> {
        if data.len() < HEADER_SIZE as usize {
            return Err(malformed_error!(
                "Buffer of {} bytes is shorter than a dex header",
                data.len()
            ));
        }

        let mut parser = Parser::new(data);

        let magic = parser.bytes(8)?;
        if &magic[0..4] != b"dex\n" || magic[7] != 0 {
            return Err(malformed_error!("Invalid dex magic {:02x?}", &magic[0..4]));
        }

        let version = parse_version(&magic[4..7])?;

        let checksum = parser.read_le::<u32>()?;
        let mut signature = [0u8; 20];
        signature.copy_from_slice(parser.bytes(20)?);

        let file_size = parser.read_le::<u32>()?;
        let header_size = parser.read_le::<u32>()?;
        let endian_tag = parser.read_le::<u32>()?;

        match endian_tag {
            ENDIAN_CONSTANT => {}
            REVERSE_ENDIAN_CONSTANT => return Err(crate::Error::NotSupported),
            _ => return Err(malformed_error!("Invalid endian tag {:#x}", endian_tag)),
        }

        if header_size != HEADER_SIZE {
            return Err(malformed_error!("Invalid header size {:#x}", header_size));
        }

        if (file_size as usize) > data.len() || file_size < HEADER_SIZE {
            return Err(malformed_error!(
                "Declared file size {} does not fit the {} byte buffer",
                file_size,
                data.len()
            ));
        }

        let link_size = parser.read_le::<u32>()?;
        let link_off = parser.read_le::<u32>()?;
        let map_off = parser.read_le::<u32>()?;

        let string_ids = read_section(&mut parser)?;
        let type_ids = read_section(&mut parser)?;
        let proto_ids = read_section(&mut parser)?;
        let field_ids = read_section(&mut parser)?;
        let method_ids = read_section(&mut parser)?;
        let class_defs = read_section(&mut parser)?;

        let data_size = parser.read_le::<u32>()?;
        let data_off = parser.read_le::<u32>()?;

        string_ids.check("string_ids", 4, file_size)?;
        type_ids.check("type_ids", 4, file_size)?;
        proto_ids.check("proto_ids", 12, file_size)?;
        field_ids.check("field_ids", 8, file_size)?;
        method_ids.check("method_ids", 8, file_size)?;
        class_defs.check("class_defs", 32, file_size)?;

        Section {
            size: data_size,
            offset: data_off,
        }
        .check("data", 1, file_size)?;
        Section {
            size: link_size,
            offset: link_off,
        }
        .check("link", 1, file_size)?;

        if map_off != 0 && (map_off < data_off || map_off >= data_off + data_size) {
            return Err(malformed_error!(
                "map_off {:#x} lies outside the data section",
                map_off
            ));
        }

        if options.verify_checksum {
            let computed = adler32(&data[12..file_size as usize]);
            if computed != checksum {
                return Err(malformed_error!(
                    "Checksum mismatch: header {:#010x}, computed {:#010x}",
                    checksum,
                    computed
                ));
            }
        }

        if options.verify_signature {
            let digest = Sha1::digest(&data[32..file_size as usize]);
            if digest.as_slice() != signature {
                return Err(malformed_error!("SHA-1 signature mismatch"));
            }
        }

        Ok(DexHeader {
            version,
            checksum,
            signature,
            file_size,
            string_ids,
            type_ids,
            proto_ids,
            field_ids,
            method_ids,
            class_defs,
            data: Section {
                size: data_size,
                offset: data_off,
            },
            map_off,
        })
    }
}

fn read_section(parser: &mut Parser) -> Result<Section> {
    Ok(Section {
        size: parser.read_le::<u32>()?,
        offset: parser.read_le::<u32>()?,
    })
}

fn parse_version(digits: &[u8]) -> Result<u32> {
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(malformed_error!("Invalid dex version {:02x?}", digits));
    }

    let version = digits
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));

    // 035..041 covers every release toolchain up to API 35
    if !(35..=41).contains(&version) {
        return Err(crate::Error::NotSupported);
    }

    Ok(version)
}

/// Adler-32 over `data`, as used by the `checksum` header field.
pub(crate) fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65_521;

    let mut a: u32 = 1;
    let mut b: u32 = 0;

    // Process in chunks small enough that the sums cannot overflow u32
    for chunk in data.chunks(5552) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }

    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_header_bytes() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE as usize];
        data[0..8].copy_from_slice(b"dex\n035\0");
        data[32..36].copy_from_slice(&HEADER_SIZE.to_le_bytes()); // file_size
        data[36..40].copy_from_slice(&HEADER_SIZE.to_le_bytes()); // header_size
        data[40..44].copy_from_slice(&ENDIAN_CONSTANT.to_le_bytes());
        let checksum = adler32(&data[12..]);
        data[8..12].copy_from_slice(&checksum.to_le_bytes());
        data
    }

    #[test]
    fn minimal_valid_header() {
        let data = minimal_header_bytes();
        let header = DexHeader::read(&data, &ParseOptions::production()).unwrap();

        assert_eq!(header.version, 35);
        assert_eq!(header.file_size, HEADER_SIZE);
        assert_eq!(header.string_ids.size, 0);
        assert_eq!(header.class_defs.size, 0);
    }

    #[test]
    fn truncated_mid_header() {
        let data = minimal_header_bytes();
        let result = DexHeader::read(&data[..40], &ParseOptions::minimal());
        assert!(matches!(result, Err(crate::Error::Malformed { .. })));
    }

    #[test]
    fn bad_magic() {
        let mut data = minimal_header_bytes();
        data[0] = b'x';
        assert!(DexHeader::read(&data, &ParseOptions::minimal()).is_err());
    }

    #[test]
    fn unsupported_version() {
        let mut data = minimal_header_bytes();
        data[4..7].copy_from_slice(b"099");
        assert!(matches!(
            DexHeader::read(&data, &ParseOptions::minimal()),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn byte_swapped_endian_tag() {
        let mut data = minimal_header_bytes();
        data[40..44].copy_from_slice(&REVERSE_ENDIAN_CONSTANT.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data, &ParseOptions::minimal()),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn checksum_mismatch_detected() {
        let mut data = minimal_header_bytes();
        data[8] ^= 0xFF;
        assert!(DexHeader::read(&data, &ParseOptions::production()).is_err());
        // structural-only parse still accepts it
        assert!(DexHeader::read(&data, &ParseOptions::minimal()).is_ok());
    }

    #[test]
    fn section_outside_file() {
        let mut data = minimal_header_bytes();
        // string_ids: size 2, offset at end of header
        data[56..60].copy_from_slice(&2u32.to_le_bytes());
        data[60..64].copy_from_slice(&HEADER_SIZE.to_le_bytes());
        let checksum = adler32(&data[12..]);
        data[8..12].copy_from_slice(&checksum.to_le_bytes());

        assert!(DexHeader::read(&data, &ParseOptions::production()).is_err());
    }

    #[test]
    fn declared_size_larger_than_buffer() {
        let mut data = minimal_header_bytes();
        data[32..36].copy_from_slice(&0x1000u32.to_le_bytes());
        assert!(DexHeader::read(&data, &ParseOptions::minimal()).is_err());
    }

    #[test]
    fn adler32_known_values() {
        assert_eq!(adler32(b""), 1);
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }
}
