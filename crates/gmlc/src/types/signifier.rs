//! Named entities: variables, functions, macros, enums and members

use super::Flags;
use crate::common::{Range, Reference, ScopeId, TypeId};

/// Container a signifier is registered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Member of a struct-like type, including every self's member type
    Type(TypeId),
    /// Parameter of a function type
    Function(TypeId),
    Scope(ScopeId),
}

#[derive(Debug, Clone)]
pub struct Signifier {
    pub name: String,
    pub owner: Owner,
    /// Accumulated type; starts `Unknown` and only changes through merging
    pub ty: TypeId,
    pub flags: Flags,
    /// Declaration site, set at most once per analysis
    pub def: Option<Range>,
    pub refs: Vec<Reference>,
    pub description: Option<String>,
    /// Position in the owning function's parameter list
    pub idx: Option<usize>,
    /// Type declared in a doc comment, checked against inferred types
    pub declared_type: Option<TypeId>,
}

impl Signifier {
    pub fn new(name: impl Into<String>, owner: Owner, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            owner,
            ty,
            flags: Flags::default(),
            def: None,
            refs: Vec::new(),
            description: None,
            idx: None,
            declared_type: None,
        }
    }

    /// Natives and assets are declared outside of code
    pub fn is_declared(&self) -> bool {
        self.def.is_some() || self.flags.native() || self.flags.asset()
    }

    pub fn is_renameable(&self) -> bool {
        !self.flags.native() && !self.flags.asset()
    }

    /// Set the declaration site unless one exists already
    pub fn declare(&mut self, range: Range) -> bool {
        if self.def.is_some() {
            return false;
        }
        self.def = Some(range);
        true
    }
}
