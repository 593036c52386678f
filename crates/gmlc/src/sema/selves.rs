//! Receiver contexts
//!
//! Every piece of GML code runs against some `self`. Its variables are the
//! members of the self's struct-like type, so member lookup on a self and
//! member lookup on a struct share one code path in the type store.

use crate::common::{Reference, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelfKind {
    /// The project-wide global scope, one per project
    Global,
    /// The instance scope shared by every event of one object
    Instance,
    /// A constructor's instances, or a struct literal
    Struct,
    /// An asset referenced by name, such as an object in `with (obj_player)`
    Asset,
}

impl SelfKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SelfKind::Global => "global",
            SelfKind::Instance => "instance",
            SelfKind::Struct => "struct",
            SelfKind::Asset => "asset",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelfData {
    pub kind: SelfKind,
    pub name: Option<String>,
    /// Struct-like type holding this self's variables
    pub ty: TypeId,
    /// `self`, `other` and `global` occurrences resolving to this self
    pub refs: Vec<Reference>,
}

impl SelfData {
    pub fn new(kind: SelfKind, ty: TypeId) -> Self {
        Self {
            kind,
            name: None,
            ty,
            refs: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_global(&self) -> bool {
        self.kind == SelfKind::Global
    }
}
