use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all error conditions that can occur while decoding a DEX container,
/// resolving its metadata pools, or driving a class traversal. Each variant provides specific
/// context about the failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Decode Errors (fatal to the `open` that raised them)
/// - [`Error::Malformed`] - Corrupted or invalid container structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond buffer boundaries
/// - [`Error::NotSupported`] - Unsupported DEX version or byte order
/// - [`Error::RecursionLimit`] - Maximum nesting depth exceeded
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Lifecycle and Traversal Errors
/// - [`Error::Closed`] - Traversal requested on a closed [`crate::DexObject`]
/// - [`Error::Visitor`] - A visitor callback failed; propagated unchanged
///
/// # Examples
///
/// ```rust
/// use dexscope::{DexObject, Error};
///
/// match DexObject::from_mem(vec![0u8; 4]) {
///     Ok(_) => println!("Loaded"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed dex: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The container is damaged and could not be parsed.
    ///
    /// This error indicates that the buffer doesn't conform to the DEX file format:
    /// a bad magic or header field, a section lying outside the file, an id record
    /// referencing a pool index that does not exist, or a checksum mismatch. The
    /// error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    ///
    /// This error occurs when trying to read data beyond the end of the buffer.
    /// It's a safety check to prevent buffer overruns on truncated or lying input.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This file type is not supported.
    ///
    /// Indicates a DEX version this library does not understand, or a
    /// byte-swapped (big-endian) container, which no known toolchain produces.
    #[error("This file type is not supported")]
    NotSupported,

    /// Recursion limit reached.
    ///
    /// Encoded values may nest arrays and annotations inside each other
    /// without bound in the file format, so a maximum nesting depth is
    /// enforced while decoding them.
    ///
    /// The associated value shows the nesting limit that was reached.
    #[error("Reached the maximum nesting depth allowed - {0}")]
    RecursionLimit(usize),

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or mapping a
    /// DEX file from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The handle has been closed.
    ///
    /// Raised when [`crate::DexObject::visit_defined_classes`] is invoked after
    /// [`crate::DexObject::close`]. Pool accessors are unaffected, since the
    /// pools are owned copies; only operations that need the live buffer fail.
    #[error("closed")]
    Closed,

    /// A visitor callback raised an error during traversal.
    ///
    /// The engine does not interpret the inner error; it unwinds the traversal
    /// and hands it to the caller. The handle remains open and reusable.
    #[error("{0}")]
    Visitor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary caller error for propagation out of a visitor callback.
    pub fn visitor<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Visitor(Box::new(error))
    }
}
