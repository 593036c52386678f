//! Arena owning every type and signifier of a project

use super::{Members, Owner, Signifier, Type, TypeKind};
use crate::common::{ScopeId, SignifierId, TypeId};

/// Default bound on recursive walks through the type graph
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct TypeStore {
    pub(super) types: Vec<Type>,
    pub(super) signifiers: Vec<Signifier>,
    /// Slots released by [`sweep`](Self::sweep), reused before the arenas grow
    pub(super) free_types: Vec<TypeId>,
    pub(super) free_signifiers: Vec<SignifierId>,
    /// Recursion bound for narrowing, equality and generic binding
    pub max_depth: usize,
}

impl TypeStore {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            signifiers: Vec::new(),
            free_types: Vec::new(),
            free_signifiers: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.free_types.pop() {
            self.types[id.index()] = ty;
            return id;
        }
        let id = TypeId::new(self.types.len());
        self.types.push(ty);
        id
    }

    pub fn new_type(&mut self, kind: TypeKind) -> TypeId {
        self.alloc(Type::new(kind))
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.get(id).kind
    }

    /// Number of live types
    pub fn type_count(&self) -> usize {
        self.types.len() - self.free_types.len()
    }

    /// Number of live signifiers
    pub fn signifier_count(&self) -> usize {
        self.signifiers.len() - self.free_signifiers.len()
    }

    /// Shallow copy into a fresh slot; nested ids are shared
    pub fn clone_type(&mut self, id: TypeId) -> TypeId {
        let copy = self.get(id).clone();
        self.alloc(copy)
    }

    /// Overwrite a slot with a blank `Unknown` so it can be inferred again
    pub fn reset_type(&mut self, id: TypeId) {
        self.types[id.index()] = Type::new(TypeKind::Unknown);
    }

    pub fn union_of(&mut self, types: Vec<TypeId>) -> TypeId {
        match types.as_slice() {
            [] => self.new_type(TypeKind::Unknown),
            [single] => *single,
            _ => self.alloc(Type::union(types)),
        }
    }

    // ==================== Signifiers ====================

    pub fn new_signifier(&mut self, name: impl Into<String>, owner: Owner) -> SignifierId {
        let ty = self.new_type(TypeKind::Unknown);
        self.push_signifier(Signifier::new(name, owner, ty))
    }

    pub(super) fn push_signifier(&mut self, signifier: Signifier) -> SignifierId {
        if let Some(id) = self.free_signifiers.pop() {
            self.signifiers[id.index()] = signifier;
            return id;
        }
        let id = SignifierId::new(self.signifiers.len());
        self.signifiers.push(signifier);
        id
    }

    pub fn new_local(&mut self, name: impl Into<String>, scope: ScopeId) -> SignifierId {
        let id = self.new_signifier(name, Owner::Scope(scope));
        self.signifier_mut(id).flags.set_local(true);
        id
    }

    pub fn signifier(&self, id: SignifierId) -> &Signifier {
        &self.signifiers[id.index()]
    }

    pub fn signifier_mut(&mut self, id: SignifierId) -> &mut Signifier {
        &mut self.signifiers[id.index()]
    }

    /// Type of a signifier
    pub fn type_of(&self, id: SignifierId) -> TypeId {
        self.signifier(id).ty
    }

    /// Merge an observed type into a signifier's accumulated type
    pub fn add_type(&mut self, signifier: SignifierId, incoming: TypeId) -> TypeId {
        let original = self.type_of(signifier);
        let merged = self.merge_types(original, incoming);
        self.signifier_mut(signifier).ty = merged;
        merged
    }

    /// Candidate types of a signifier: the union members, or the single type
    pub fn types_of(&self, signifier: SignifierId) -> Vec<TypeId> {
        let ty = self.type_of(signifier);
        match self.get(ty) {
            t if t.kind == TypeKind::Union => t.union_members().to_vec(),
            _ => vec![ty],
        }
    }

    // ==================== Members and parameters ====================

    pub fn member(&self, ty: TypeId, name: &str) -> Option<SignifierId> {
        self.get(ty).member(name)
    }

    /// Look up a member on `ty` or any type it derives from
    pub fn member_in_chain(&self, ty: TypeId, name: &str) -> Option<SignifierId> {
        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(id) = current {
            if let Some(member) = self.member(id, name) {
                return Some(member);
            }
            depth += 1;
            if depth > self.max_depth {
                break;
            }
            current = self.get(id).parent;
        }
        None
    }

    pub fn members(&self, ty: TypeId) -> Vec<SignifierId> {
        self.get(ty)
            .members
            .as_ref()
            .map(|members| members.iter().collect())
            .unwrap_or_default()
    }

    /// Get or create the member `name` on a struct-like type
    pub fn add_member(&mut self, ty: TypeId, name: &str) -> SignifierId {
        if let Some(existing) = self.member(ty, name) {
            return existing;
        }
        let id = self.new_signifier(name, Owner::Type(ty));
        self.get_mut(ty)
            .members
            .get_or_insert_with(Members::default)
            .insert(name, id);
        id
    }

    pub fn remove_member(&mut self, ty: TypeId, name: &str) -> Option<SignifierId> {
        self.get_mut(ty).members.as_mut()?.remove(name)
    }

    pub fn param(&self, ty: TypeId, idx: usize) -> Option<SignifierId> {
        self.get(ty).param_ids().get(idx).copied()
    }

    pub fn params(&self, ty: TypeId) -> Vec<SignifierId> {
        self.get(ty).param_ids().to_vec()
    }

    /// Get the parameter at `idx`, renaming it, or append a new one
    pub fn add_param(&mut self, ty: TypeId, idx: usize, name: &str) -> SignifierId {
        if let Some(existing) = self.param(ty, idx) {
            name.clone_into(&mut self.signifier_mut(existing).name);
            return existing;
        }
        let id = self.new_signifier(name, Owner::Function(ty));
        let params = self.get_mut(ty).params.get_or_insert_with(Vec::new);
        let position = params.len();
        params.push(id);
        let sig = self.signifier_mut(id);
        sig.flags.set_parameter(true);
        sig.idx = Some(position);
        id
    }

    // ==================== Structural comparison ====================

    /// Structural equality up to the configured depth
    pub fn type_eq(&self, a: TypeId, b: TypeId) -> bool {
        self.type_eq_at(a, b, 0)
    }

    fn type_eq_at(&self, a: TypeId, b: TypeId, depth: usize) -> bool {
        if a == b || depth > self.max_depth {
            return true;
        }
        let (ta, tb) = (self.get(a), self.get(b));
        if ta.kind != tb.kind || ta.name != tb.name {
            return false;
        }
        let opt_eq = |x: Option<TypeId>, y: Option<TypeId>| match (x, y) {
            (Some(x), Some(y)) => self.type_eq_at(x, y, depth + 1),
            (None, None) => true,
            _ => false,
        };
        if !opt_eq(ta.items, tb.items)
            || !opt_eq(ta.returns, tb.returns)
            || !opt_eq(ta.constructs, tb.constructs)
        {
            return false;
        }
        let (ua, ub) = (ta.union_members(), tb.union_members());
        if ua.len() != ub.len() || !ua.iter().zip(ub).all(|(x, y)| self.type_eq_at(*x, *y, depth + 1)) {
            return false;
        }
        let (pa, pb) = (ta.param_ids(), tb.param_ids());
        if pa.len() != pb.len() || !pa.iter().zip(pb).all(|(x, y)| self.signifier_eq(*x, *y, depth)) {
            return false;
        }
        let ma: Vec<_> = self.members(a);
        let mb: Vec<_> = self.members(b);
        ma.len() == mb.len() && ma.iter().zip(&mb).all(|(x, y)| self.signifier_eq(*x, *y, depth))
    }

    fn signifier_eq(&self, a: SignifierId, b: SignifierId, depth: usize) -> bool {
        let (sa, sb) = (self.signifier(a), self.signifier(b));
        sa.name == sb.name && self.type_eq_at(sa.ty, sb.ty, depth + 1)
    }

    // ==================== Rendering ====================

    /// Signature-style rendering used for hover text
    pub fn code(&self, id: TypeId) -> String {
        let ty = self.get(id);
        if !ty.is_function() {
            return self.to_feather_string(id);
        }
        let params = ty
            .param_ids()
            .iter()
            .map(|param| {
                let sig = self.signifier(*param);
                let mut text = sig.name.clone();
                if sig.flags.optional() {
                    text.push('?');
                }
                if !self.get(sig.ty).is_unknown() {
                    text.push_str(": ");
                    text.push_str(&self.to_feather_string(sig.ty));
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mut code = format!("function {}({params})", ty.name.as_deref().unwrap_or(""));
        if ty.kind == TypeKind::Constructor {
            code.push_str(" constructor");
        }
        let result = ty
            .constructs
            .or(ty.returns)
            .filter(|result| self.kind(*result) != TypeKind::Undefined);
        if let Some(result) = result {
            code.push_str(": ");
            code.push_str(&self.to_feather_string(result));
        }
        code
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}
