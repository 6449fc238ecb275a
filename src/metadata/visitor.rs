//! Visitor traits for class traversal.
//!
//! Traversal walks the defined classes in file order and pushes each node to
//! the matching visitor: class, then the class's fields (static before
//! instance), then its methods (direct before virtual), with a method's body
//! delivered right after the method itself. Every callback returns a
//! [`VisitOutcome`] steering the walk, or an error that aborts it.
//!
//! All four traits have blanket implementations for closures, so simple
//! traversals don't need a named visitor type:
//!
//! ```no_run
//! use dexscope::{ClassVisitors, DexObject, VisitOutcome};
//!
//! # fn main() -> dexscope::Result<()> {
//! let dex = DexObject::from_file(std::path::Path::new("classes.dex"))?;
//! let mut on_class = |class: &dexscope::ClassDef| -> dexscope::Result<VisitOutcome> {
//!     println!("{}", class.descriptor());
//!     Ok(VisitOutcome::Continue)
//! };
//! dex.visit_defined_classes(&mut ClassVisitors::new(&mut on_class))?;
//! # Ok(())
//! # }
//! ```

use crate::{
    metadata::classes::{ClassDef, FieldInfo, MethodBody, MethodInfo},
    Result,
};

/// A visitor's verdict on the node it was just shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Descend into the node's children and keep walking.
    Continue,
    /// Keep walking but do not descend into this node's children.
    Skip,
    /// End the whole traversal successfully.
    Stop,
}

/// Receives each defined class.
pub trait ClassVisitor {
    /// Called once per class definition, in file order.
    ///
    /// [`VisitOutcome::Skip`] suppresses the class's fields, methods and
    /// bodies; [`VisitOutcome::Stop`] ends the traversal.
    ///
    /// # Errors
    /// Any error aborts the traversal and is returned to the caller.
    fn visit_class(&mut self, class: &ClassDef) -> Result<VisitOutcome>;
}

/// Receives each field declaration of a visited class.
pub trait FieldVisitor {
    /// Called for every static field, then every instance field.
    ///
    /// Fields have no children, so [`VisitOutcome::Skip`] behaves like
    /// [`VisitOutcome::Continue`].
    ///
    /// # Errors
    /// Any error aborts the traversal and is returned to the caller.
    fn visit_field(&mut self, field: &FieldInfo) -> Result<VisitOutcome>;
}

/// Receives each method declaration of a visited class.
pub trait MethodVisitor {
    /// Called for every direct method, then every virtual method.
    ///
    /// [`VisitOutcome::Skip`] suppresses the method's body callback.
    ///
    /// # Errors
    /// Any error aborts the traversal and is returned to the caller.
    fn visit_method(&mut self, method: &MethodInfo) -> Result<VisitOutcome>;
}

/// Receives the decoded body of each method that has one.
pub trait BodyVisitor {
    /// Called right after [`MethodVisitor::visit_method`] for methods with a
    /// `code_item`. Abstract and native methods produce no call.
    ///
    /// # Errors
    /// Any error aborts the traversal and is returned to the caller.
    fn visit_body(&mut self, method: &MethodInfo, body: &MethodBody) -> Result<VisitOutcome>;
}

impl<F> ClassVisitor for F
where
    F: FnMut(&ClassDef) -> Result<VisitOutcome>,
{
    fn visit_class(&mut self, class: &ClassDef) -> Result<VisitOutcome> {
        self(class)
    }
}

impl<F> FieldVisitor for F
where
    F: FnMut(&FieldInfo) -> Result<VisitOutcome>,
{
    fn visit_field(&mut self, field: &FieldInfo) -> Result<VisitOutcome> {
        self(field)
    }
}

impl<F> MethodVisitor for F
where
    F: FnMut(&MethodInfo) -> Result<VisitOutcome>,
{
    fn visit_method(&mut self, method: &MethodInfo) -> Result<VisitOutcome> {
        self(method)
    }
}

impl<F> BodyVisitor for F
where
    F: FnMut(&MethodInfo, &MethodBody) -> Result<VisitOutcome>,
{
    fn visit_body(&mut self, method: &MethodInfo, body: &MethodBody) -> Result<VisitOutcome> {
        self(method, body)
    }
}

/// The visitor bundle handed to [`crate::DexObject::visit_defined_classes`].
///
/// Only the class visitor is mandatory. Leaving the field, method or body
/// slot empty skips decoding the corresponding structures entirely, so a
/// class-only walk never touches `class_data` or code items.
pub struct ClassVisitors<'a> {
    /// Receives every class definition.
    pub class: &'a mut dyn ClassVisitor,
    /// Receives field declarations, when present.
    pub field: Option<&'a mut dyn FieldVisitor>,
    /// Receives method declarations, when present.
    pub method: Option<&'a mut dyn MethodVisitor>,
    /// Receives method bodies, when present.
    pub body: Option<&'a mut dyn BodyVisitor>,
}

impl<'a> ClassVisitors<'a> {
    /// A bundle visiting classes only.
    pub fn new(class: &'a mut dyn ClassVisitor) -> Self {
        ClassVisitors {
            class,
            field: None,
            method: None,
            body: None,
        }
    }

    /// Attach a field visitor.
    #[must_use]
    pub fn with_fields(mut self, field: &'a mut dyn FieldVisitor) -> Self {
        self.field = Some(field);
        self
    }

    /// Attach a method visitor.
    #[must_use]
    pub fn with_methods(mut self, method: &'a mut dyn MethodVisitor) -> Self {
        self.method = Some(method);
        self
    }

    /// Attach a body visitor.
    #[must_use]
    pub fn with_bodies(mut self, body: &'a mut dyn BodyVisitor) -> Self {
        self.body = Some(body);
        self
    }
}
