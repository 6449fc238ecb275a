//! Decoded DEX metadata: header, id pools, classes, values and traversal.
//!
//! The layers build on each other bottom-up:
//!
//! 1. [`header`] validates the fixed 0x70-byte header and its section table.
//! 2. [`pools`] decodes the five cross-referenced id pools in dependency
//!    order (strings, types, protos, fields, methods).
//! 3. [`classes`] decodes the class-definition table eagerly and class
//!    member lists and code items lazily during traversal.
//! 4. [`values`] decodes encoded values, arrays and annotations.
//! 5. [`dexobject`] ties it all together behind [`DexObject`], and
//!    [`visitor`] defines the callback surface of
//!    [`DexObject::visit_defined_classes`].

pub mod classes;
pub mod dexobject;
pub mod header;
pub(crate) mod maps;
pub mod options;
pub mod pools;
pub mod values;
pub mod visitor;

pub use classes::{AccessFlags, ClassDef, FieldInfo, MethodBody, MethodInfo};
pub use dexobject::DexObject;
pub use header::DexHeader;
pub use options::ParseOptions;
pub use values::{Annotation, AnnotationElement, EncodedArray, EncodedValue, ValueType, Visibility};
pub use visitor::{
    BodyVisitor, ClassVisitor, ClassVisitors, FieldVisitor, MethodVisitor, VisitOutcome,
};
