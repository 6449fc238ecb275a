//! File loading and raw data access for DEX containers.
//!
//! This module owns the bytes of a DEX container for the lifetime of a
//! [`crate::DexObject`]. Two backends are supported: an owned in-memory
//! buffer ([`File::from_mem`]) and a read-only memory mapping of a file on
//! disk ([`File::from_file`]). Both present the same flat `&[u8]` view to the
//! decoding layers; buffers that are not directly addressable by the caller
//! (e.g. sub-slices of an APK) must be copied into a `Vec<u8>` first, which
//! is a caller-transparent step.
//!
//! # Key Components
//!
//! - [`File`] - Backend-agnostic owner of the container bytes
//! - [`crate::file::parser::Parser`] - Cursor-based decoder over those bytes
//! - [`crate::file::io`] - Bounds-checked primitive reads
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use dexscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("classes.dex"))?;
//! println!("Loaded {} bytes", file.len());
//! # Ok::<(), dexscope::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Data source abstraction over in-memory buffers and memory-mapped files.
trait Backend: Send + Sync {
    /// The full container bytes.
    fn data(&self) -> &[u8];
}

/// Owner of the raw bytes of a DEX container.
///
/// `File` is the bottom layer of the decoding pipeline: it keeps the buffer
/// alive and hands out slices to the header decoder, the pool builders, and
/// the traversal engine. Dropping it releases the backing memory or mapping,
/// which is how [`crate::DexObject::close`] frees the container resources.
///
/// # Examples
///
/// ```rust
/// use dexscope::File;
///
/// let file = File::from_mem(vec![0x64, 0x65, 0x78, 0x0A])?;
/// assert_eq!(file.len(), 4);
/// # Ok::<(), dexscope::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or mapped file).
    data: Box<dyn Backend>,
}

impl File {
    /// Loads a DEX file from the given path via a read-only memory mapping.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the DEX file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// mapped, or [`crate::Error::Empty`] if it has no content.
    pub fn from_file(path: &Path) -> Result<File> {
        Self::load(Physical::new(path)?)
    }

    /// Wraps an in-memory DEX buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the DEX container.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] if the buffer is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Memory::new(data))
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.data().is_empty() {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
        })
    }

    /// The full container bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns the total size of the loaded container in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the container has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}
