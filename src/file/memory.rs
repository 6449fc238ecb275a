//! In-memory backend for DEX data.
//!
//! Wraps an owned byte buffer so that containers received over IPC, extracted
//! from an APK, or crafted in tests can be parsed with the same machinery as
//! on-disk files.

use crate::file::Backend;

/// An owned, heap-allocated DEX buffer.
pub(crate) struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create a new in-memory backend from an owned buffer.
    pub(crate) fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }
}

impl Backend for Memory {
    fn data(&self) -> &[u8] {
        &self.data
    }
}
