//! Memory-mapped file backend for DEX data.
//!
//! Maps a DEX file from disk into the process address space so large
//! containers can be decoded without reading them fully into the heap.

use std::{fs::OpenOptions, path::Path};

use memmap2::Mmap;

use crate::{file::Backend, Result};

/// A read-only memory mapping of a DEX file on disk.
pub(crate) struct Physical {
    data: Mmap,
}

impl Physical {
    /// Map the file at `path` into memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub(crate) fn new(path: &Path) -> Result<Physical> {
        let file = OpenOptions::new().read(true).open(path)?;

        // Safety: the mapping is read-only and the file handle is kept alive by Mmap
        let data = unsafe { Mmap::map(&file) }?;

        Ok(Physical { data })
    }
}

impl Backend for Physical {
    fn data(&self) -> &[u8] {
        &self.data
    }
}
