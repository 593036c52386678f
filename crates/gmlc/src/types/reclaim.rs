//! Reclaiming unreachable types and signifiers.
//!
//! Reanalyzing a file leaves behind whatever its previous walk allocated.
//! Types are shared freely between signifiers of different files, so a
//! slot cannot be released just because the file that allocated it was
//! reset. Instead the caller marks every id it still holds and the store
//! releases the slots that cannot be reached from those roots.

use super::{Owner, Signifier, Type, TypeKind, TypeStore};
use crate::common::{ScopeId, SignifierId, TypeId};

/// Reachability marks over a [`TypeStore`]
#[derive(Debug)]
pub struct Liveness {
    types: Vec<bool>,
    signifiers: Vec<bool>,
    pending_types: Vec<TypeId>,
    pending_signifiers: Vec<SignifierId>,
}

impl Liveness {
    pub fn new(store: &TypeStore) -> Self {
        Self {
            types: vec![false; store.types.len()],
            signifiers: vec![false; store.signifiers.len()],
            pending_types: Vec::new(),
            pending_signifiers: Vec::new(),
        }
    }

    pub fn mark_type(&mut self, id: TypeId) {
        if let Some(mark) = self.types.get_mut(id.index()) {
            if !*mark {
                *mark = true;
                self.pending_types.push(id);
            }
        }
    }

    pub fn mark_signifier(&mut self, id: SignifierId) {
        if let Some(mark) = self.signifiers.get_mut(id.index()) {
            if !*mark {
                *mark = true;
                self.pending_signifiers.push(id);
            }
        }
    }

    pub fn is_type_live(&self, id: TypeId) -> bool {
        self.types.get(id.index()).copied().unwrap_or(false)
    }

    /// Follow every id reachable from what has been marked so far
    pub fn propagate(&mut self, store: &TypeStore) {
        loop {
            if let Some(id) = self.pending_types.pop() {
                self.trace_type(store.get(id));
            } else if let Some(id) = self.pending_signifiers.pop() {
                self.trace_signifier(store.signifier(id));
            } else {
                break;
            }
        }
    }

    fn trace_type(&mut self, ty: &Type) {
        let nested = [ty.parent, ty.returns, ty.constructs, ty.context, ty.items];
        for id in nested.into_iter().flatten() {
            self.mark_type(id);
        }
        for member in ty.types.iter().flatten() {
            self.mark_type(*member);
        }
        if let Some(members) = &ty.members {
            for member in members.iter() {
                self.mark_signifier(member);
            }
        }
        for param in ty.params.iter().flatten() {
            self.mark_signifier(*param);
        }
    }

    fn trace_signifier(&mut self, signifier: &Signifier) {
        self.mark_type(signifier.ty);
        if let Some(declared) = signifier.declared_type {
            self.mark_type(declared);
        }
        match signifier.owner {
            Owner::Type(ty) | Owner::Function(ty) => self.mark_type(ty),
            Owner::Scope(_) => {}
        }
    }
}

impl TypeStore {
    /// Release every slot `live` did not reach. Returns the number of
    /// types and signifiers released.
    pub fn sweep(&mut self, live: &Liveness) -> (usize, usize) {
        let mut released = (0, 0);
        let mut free = vec![false; self.types.len()];
        for id in &self.free_types {
            free[id.index()] = true;
        }
        for (index, mark) in live.types.iter().enumerate() {
            if *mark || free[index] {
                continue;
            }
            let id = TypeId::new(index);
            self.types[index] = Type::new(TypeKind::Unknown);
            self.free_types.push(id);
            released.0 += 1;
        }
        let mut free = vec![false; self.signifiers.len()];
        for id in &self.free_signifiers {
            free[id.index()] = true;
        }
        for (index, mark) in live.signifiers.iter().enumerate() {
            if *mark || free[index] {
                continue;
            }
            let id = SignifierId::new(index);
            self.signifiers[index] = Signifier::new("", Owner::Scope(ScopeId::new(0)), TypeId::new(0));
            self.free_signifiers.push(id);
            released.1 += 1;
        }
        released
    }
}
