// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dexscope
//!
//! A cross-platform decoder for Android DEX bytecode containers. Built in
//! pure Rust, `dexscope` parses the binary container format directly — no
//! Android runtime, no `dexlib`, no JNI — and exposes the decoded metadata
//! through owned, thread-safe data structures.
//!
//! ## Features
//!
//! - **Memory-mapped or in-memory input** - open a `.dex` file from disk or
//!   hand over a buffer extracted from an APK
//! - **Full id-pool decoding** - strings (MUTF-8), types, prototypes, fields
//!   and methods, cross-referenced and bounds-checked at open time
//! - **Class traversal** - walk defined classes, their fields, methods and
//!   instruction streams through visitor callbacks
//! - **Annotations and encoded values** - optional decoding of the
//!   annotation and encoded-array pools
//! - **Strict validation** - adler32 checksum and SHA-1 signature
//!   verification, configurable per open
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dexscope::{ClassVisitors, DexObject, VisitOutcome};
//! use std::path::Path;
//!
//! let dex = DexObject::from_file(Path::new("classes.dex"))?;
//! println!("{} strings, {} classes", dex.strings().len(), dex.classes().len());
//!
//! let mut on_class = |class: &dexscope::ClassDef| -> dexscope::Result<VisitOutcome> {
//!     println!("{}", class.descriptor());
//!     Ok(VisitOutcome::Continue)
//! };
//! dex.visit_defined_classes(&mut ClassVisitors::new(&mut on_class))?;
//! # Ok::<(), dexscope::Error>(())
//! ```
//!
//! ## Lifecycle
//!
//! Opening decodes everything up front except class member lists and code,
//! which are read from the backing buffer during traversal. The buffer can
//! be released early with [`DexObject::close`]; decoded pools remain usable,
//! only traversal then reports [`Error::Closed`].
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result):
//!
//! ```rust,no_run
//! use dexscope::{DexObject, Error};
//!
//! match DexObject::from_file(std::path::Path::new("classes.dex")) {
//!     Ok(dex) => println!("{} classes", dex.classes().len()),
//!     Err(Error::NotSupported) => println!("Unsupported container version"),
//!     Err(Error::Malformed { message, .. }) => println!("Malformed file: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Standards Compliance
//!
//! `dexscope` implements the Dalvik Executable format as specified by the
//! Android Open Source Project, container versions 035 through 041.
//!
//! ### References
//!
//! - [DEX format](https://source.android.com/docs/core/runtime/dex-format) - Official format specification

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Decoded DEX metadata: header, id pools, classes, values and traversal.
///
/// # Key Components
///
/// - [`DexObject`] - Main entry point for container analysis
/// - [`metadata::header`] - Header validation and section table
/// - [`metadata::pools`] - The five cross-referenced id pools
/// - [`metadata::classes`] - Class definitions, member lists and code items
/// - [`metadata::values`] - Encoded values, arrays and annotations
/// - [`metadata::visitor`] - Visitor traits for class traversal
///
/// # Examples
///
/// ```rust,no_run
/// use dexscope::DexObject;
/// use std::path::Path;
///
/// let dex = DexObject::from_file(Path::new("classes.dex"))?;
/// for method in dex.methods() {
///     println!("{}->{}", method.class.descriptor.value, method.name.value);
/// }
/// # Ok::<(), dexscope::Error>(())
/// ```
pub mod metadata;

/// `dexscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dexscope` Error type
///
/// The main error type for all operations in this crate, covering file
/// loading, container validation, pool decoding and traversal.
pub use error::Error;

/// Main entry point for working with DEX containers.
///
/// See [`metadata::dexobject::DexObject`] for opening, pool access, class
/// traversal and the close lifecycle.
pub use metadata::DexObject;

pub use file::parser::Parser;
pub use file::File;
pub use metadata::{
    AccessFlags, Annotation, AnnotationElement, BodyVisitor, ClassDef, ClassVisitor, ClassVisitors,
    DexHeader, EncodedArray, EncodedValue, FieldInfo, FieldVisitor, MethodBody, MethodInfo,
    MethodVisitor, ParseOptions, ValueType, VisitOutcome, Visibility,
};
pub use metadata::pools::{
    FieldId, FieldIdRc, MethodId, MethodIdRc, ProtoId, ProtoIdRc, StringId, StringIdRc, TypeId,
    TypeIdRc,
};
