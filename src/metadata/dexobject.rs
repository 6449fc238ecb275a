//! The decoded container and its lifecycle.
//!
//! [`DexObject`] is the entry point of the crate: opening a container
//! validates the header, decodes and cross-references all five id pools, the
//! class-definition table and (optionally) the annotation and encoded-array
//! pools, then keeps the backing buffer around for on-demand traversal of
//! class data and method bodies.
//!
//! The buffer can be released early with [`DexObject::close`]. Everything
//! decoded at open time stays usable afterwards; only traversal, which
//! re-reads the buffer, reports [`Error::Closed`].

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::{
    file::File,
    metadata::{
        classes::{self, ClassDef},
        header::DexHeader,
        maps::{self, TYPE_ANNOTATION_ITEM, TYPE_ENCODED_ARRAY_ITEM},
        options::ParseOptions,
        pools::{
            build_fields, build_methods, build_protos, build_strings, build_types, FieldIdRc,
            MethodIdRc, ProtoIdRc, StringIdRc, TypeIdRc,
        },
        values::{read_annotation_item, read_encoded_array, Annotation, EncodedArray},
        visitor::{ClassVisitors, VisitOutcome},
    },
    Error, Parser, Result,
};

/// A fully opened DEX container.
pub struct DexObject {
    file: Mutex<Option<File>>,
    header: DexHeader,
    strings: Vec<StringIdRc>,
    types: Vec<TypeIdRc>,
    protos: Vec<ProtoIdRc>,
    fields: Vec<FieldIdRc>,
    methods: Vec<MethodIdRc>,
    classes: Vec<ClassDef>,
    annotations: Vec<Annotation>,
    arrays: Vec<EncodedArray>,
}

impl DexObject {
    /// Open a container from a file on disk with default options.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid
    /// container.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with(path, &ParseOptions::default())
    }

    /// Open a container from a file on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid
    /// container.
    pub fn from_file_with(path: &Path, options: &ParseOptions) -> Result<Self> {
        Self::open(File::from_file(path)?, options)
    }

    /// Open a container from an in-memory buffer with default options.
    ///
    /// # Errors
    /// Returns an error if the buffer is not a valid container.
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        Self::from_mem_with(data, &ParseOptions::default())
    }

    /// Open a container from an in-memory buffer.
    ///
    /// # Errors
    /// Returns an error if the buffer is not a valid container.
    pub fn from_mem_with(data: Vec<u8>, options: &ParseOptions) -> Result<Self> {
        Self::open(File::from_mem(data)?, options)
    }

    fn open(file: File, options: &ParseOptions) -> Result<Self> {
        let data = file.data();

        let header = DexHeader::read(data, options)?;

        let strings = build_strings(data, &header)?;
        let types = build_types(data, &header, &strings)?;
        let protos = build_protos(data, &header, &strings, &types)?;
        let fields = build_fields(data, &header, &strings, &types)?;
        let methods = build_methods(data, &header, &strings, &types, &protos)?;
        let classes = classes::build(data, &header, &strings, &types)?;

        let mut annotations = Vec::new();
        let mut arrays = Vec::new();
        if options.include_annotations {
            for item in maps::read_map_list(data, &header)? {
                // Empty runs carry no items and their offsets are not
                // validated, so never seek to them.
                if item.size == 0 {
                    continue;
                }
                match item.item_type {
                    TYPE_ANNOTATION_ITEM => {
                        let mut parser = Parser::new(data);
                        parser.seek(item.offset as usize)?;
                        for _ in 0..item.size {
                            annotations.push(read_annotation_item(&mut parser, &strings, &types)?);
                        }
                    }
                    TYPE_ENCODED_ARRAY_ITEM => {
                        let mut parser = Parser::new(data);
                        parser.seek(item.offset as usize)?;
                        for _ in 0..item.size {
                            arrays.push(read_encoded_array(&mut parser)?);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(DexObject {
            file: Mutex::new(Some(file)),
            header,
            strings,
            types,
            protos,
            fields,
            methods,
            classes,
            annotations,
            arrays,
        })
    }

    /// The validated header.
    #[must_use]
    pub fn header(&self) -> &DexHeader {
        &self.header
    }

    /// The string pool, in file order.
    #[must_use]
    pub fn strings(&self) -> &[StringIdRc] {
        &self.strings
    }

    /// The type pool, in file order.
    #[must_use]
    pub fn types(&self) -> &[TypeIdRc] {
        &self.types
    }

    /// The prototype pool, in file order.
    #[must_use]
    pub fn protos(&self) -> &[ProtoIdRc] {
        &self.protos
    }

    /// The field pool, in file order.
    #[must_use]
    pub fn fields(&self) -> &[FieldIdRc] {
        &self.fields
    }

    /// The method pool, in file order.
    #[must_use]
    pub fn methods(&self) -> &[MethodIdRc] {
        &self.methods
    }

    /// The defined classes, in file order.
    #[must_use]
    pub fn classes(&self) -> &[ClassDef] {
        &self.classes
    }

    /// All annotation items, empty when annotations were not requested.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// All encoded-array items, empty when annotations were not requested.
    #[must_use]
    pub fn arrays(&self) -> &[EncodedArray] {
        &self.arrays
    }

    /// Release the backing buffer.
    ///
    /// Idempotent. Decoded pools stay accessible; only traversal is refused
    /// afterwards.
    pub fn close(&self) {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Whether the backing buffer is still held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Walk the defined classes in file order, driving the given visitors.
    ///
    /// Fields are delivered static-first, methods direct-first, and a
    /// method's body (when it has one and a body visitor is attached)
    /// directly after the method itself. `class_data` and code items are
    /// decoded only when a visitor needs them.
    ///
    /// [`VisitOutcome::Stop`] from any visitor ends the walk with `Ok(())`.
    ///
    /// # Errors
    /// Returns [`Error::Closed`] after [`DexObject::close`],
    /// [`Error::Malformed`] on invalid class data, or any error a visitor
    /// returned. A visitor error leaves the handle open.
    pub fn visit_defined_classes(&self, visitors: &mut ClassVisitors) -> Result<()> {
        let guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(file) = guard.as_ref() else {
            return Err(Error::Closed);
        };
        let data = file.data();

        let wants_members =
            visitors.field.is_some() || visitors.method.is_some() || visitors.body.is_some();

        for class in &self.classes {
            match visitors.class.visit_class(class)? {
                VisitOutcome::Continue => {}
                VisitOutcome::Skip => continue,
                VisitOutcome::Stop => return Ok(()),
            }

            if !wants_members || class.class_data_off == 0 {
                continue;
            }

            let class_data = classes::read_class_data(
                data,
                &self.header,
                class.class_data_off,
                &self.fields,
                &self.methods,
            )?;

            if let Some(field_visitor) = visitors.field.as_deref_mut() {
                for field in class_data
                    .static_fields
                    .iter()
                    .chain(&class_data.instance_fields)
                {
                    match field_visitor.visit_field(field)? {
                        VisitOutcome::Continue | VisitOutcome::Skip => {}
                        VisitOutcome::Stop => return Ok(()),
                    }
                }
            }

            if visitors.method.is_none() && visitors.body.is_none() {
                continue;
            }

            for method in class_data
                .direct_methods
                .iter()
                .chain(&class_data.virtual_methods)
            {
                let outcome = match visitors.method.as_deref_mut() {
                    Some(method_visitor) => method_visitor.visit_method(method)?,
                    None => VisitOutcome::Continue,
                };
                match outcome {
                    VisitOutcome::Continue => {}
                    VisitOutcome::Skip => continue,
                    VisitOutcome::Stop => return Ok(()),
                }

                if let Some(body_visitor) = visitors.body.as_deref_mut() {
                    if method.has_code() {
                        let body = classes::read_code_item(data, &self.header, method.code_off)?;
                        match body_visitor.visit_body(method, &body)? {
                            VisitOutcome::Continue | VisitOutcome::Skip => {}
                            VisitOutcome::Stop => return Ok(()),
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for DexObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DexObject")
            .field("version", &self.header.version)
            .field("strings", &self.strings.len())
            .field("types", &self.types.len())
            .field("protos", &self.protos.len())
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("classes", &self.classes.len())
            .field("open", &self.is_open())
            .finish()
    }
}
