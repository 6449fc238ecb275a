//! Parse-time configuration for DEX decoding.
//!
//! Mirrors the trade-off the original parser exposed through its
//! `includeAnnotations` flag, extended with the container-integrity checks
//! the header carries. Presets follow the same minimal / production / strict
//! ladder used for validation elsewhere in this codebase family.

/// Configuration for a single `open` of a DEX container.
///
/// # Examples
///
/// ```rust
/// use dexscope::ParseOptions;
///
/// let fast = ParseOptions::minimal();
/// assert!(!fast.include_annotations);
///
/// let default = ParseOptions::default();
/// assert!(default.verify_checksum);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Decode the annotation and encoded-array sections. When `false` those
    /// sections are skipped entirely (not decoded), trading completeness for
    /// speed; [`crate::DexObject::annotations`] and
    /// [`crate::DexObject::arrays`] then return empty pools.
    pub include_annotations: bool,
    /// Verify the header's Adler-32 checksum over the file contents.
    pub verify_checksum: bool,
    /// Verify the header's SHA-1 signature over the file contents. Costly on
    /// large containers; off in every preset except [`ParseOptions::strict`].
    pub verify_signature: bool,
}

impl ParseOptions {
    /// Fastest settings: structural validation only, no annotation decoding.
    #[must_use]
    pub fn minimal() -> Self {
        ParseOptions {
            include_annotations: false,
            verify_checksum: false,
            verify_signature: false,
        }
    }

    /// Balanced settings: checksum verification and full pool decoding.
    #[must_use]
    pub fn production() -> Self {
        ParseOptions {
            include_annotations: true,
            verify_checksum: true,
            verify_signature: false,
        }
    }

    /// Maximum verification, including the SHA-1 signature.
    #[must_use]
    pub fn strict() -> Self {
        ParseOptions {
            include_annotations: true,
            verify_checksum: true,
            verify_signature: true,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::production()
    }
}
