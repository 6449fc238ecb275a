//! The five cross-referenced id pools of a DEX container.
//!
//! DEX metadata is organized as dense, zero-based id tables that reference
//! each other by index: strings stand alone, types reference strings, protos
//! reference strings and types, fields and methods reference types, strings
//! and protos. The format permits forward references positionally (a type may
//! name a string that appears later in no particular order), so each pool is
//! built in two phases: raw fixed-width records are decoded first, then
//! resolved into owned records in dependency order
//! Strings → Types → Protos → Fields → Methods.
//!
//! Every cross-pool index is bounds-checked during resolution; an
//! out-of-range index fails the whole open with
//! [`crate::Error::Malformed`] — a violation is a parse failure, never a
//! runtime panic. The resulting records are immutable, `Arc`-shared
//! snapshots: ids are assigned densely and equal the record's position in
//! its pool, and ordering between two records of one pool is defined purely
//! by numeric id (sign-safe three-way comparison, never subtraction).
//!
//! # Key Components
//!
//! - [`StringId`] / [`StringIdRc`] - decoded MUTF-8 string pool entries
//! - [`TypeId`] / [`TypeIdRc`] - type descriptors
//! - [`ProtoId`] / [`ProtoIdRc`] - method prototypes (shorty, return, parameters)
//! - [`FieldId`] / [`FieldIdRc`] - field signatures
//! - [`MethodId`] / [`MethodIdRc`] - method signatures

mod fields;
mod methods;
mod protos;
mod strings;
mod types;

pub use fields::{FieldId, FieldIdRc};
pub use methods::{MethodId, MethodIdRc};
pub use protos::{ProtoId, ProtoIdRc};
pub use strings::{StringId, StringIdRc};
pub use types::{TypeId, TypeIdRc};

pub(crate) use fields::build as build_fields;
pub(crate) use protos::read_type_list;
pub(crate) use methods::build as build_methods;
pub(crate) use protos::build as build_protos;
pub(crate) use strings::build as build_strings;
pub(crate) use types::build as build_types;

use crate::Result;

/// Resolve `index` into `pool`, failing the open on an out-of-range value.
pub(crate) fn resolve<T>(pool: &[std::sync::Arc<T>], index: u32, what: &str) -> Result<std::sync::Arc<T>> {
    match pool.get(index as usize) {
        Some(entry) => Ok(entry.clone()),
        None => Err(malformed_error!(
            "{} index {} out of range (pool holds {})",
            what,
            index,
            pool.len()
        )),
    }
}
