//! Binding generic placeholders against concrete types

use super::{Members, Owner, TypeKind, TypeStore};
use crate::common::{SignifierId, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Observed bindings per placeholder name
pub type GenericsMap = FxHashMap<String, Vec<TypeId>>;

impl TypeStore {
    /// Bindings of every placeholder in `parameterized` observed in `concrete`
    pub fn generics_map(&self, parameterized: TypeId, concrete: TypeId) -> GenericsMap {
        let mut map = GenericsMap::default();
        self.update_generics_map(parameterized, concrete, &mut map);
        map
    }

    /// Walk `parameterized` and `concrete` in lockstep, recording what each
    /// placeholder lines up with. Shapes that do not align contribute nothing.
    pub fn update_generics_map(&self, parameterized: TypeId, concrete: TypeId, map: &mut GenericsMap) {
        self.bind_generics(parameterized, concrete, map, 0);
    }

    fn bind_generics(&self, parameterized: TypeId, concrete: TypeId, map: &mut GenericsMap, depth: usize) {
        if depth > self.max_depth {
            return;
        }
        let (p, c) = (self.get(parameterized), self.get(concrete));
        if c.kind == TypeKind::Unknown {
            return;
        }

        match p.kind {
            TypeKind::Generic => {
                let Some(name) = &p.name else { return };
                let bound = map.entry(name.clone()).or_default();
                if !bound.iter().any(|existing| self.type_eq(*existing, concrete)) {
                    bound.push(concrete);
                }
            }
            TypeKind::Union => {
                for member in p.union_members() {
                    if self.contains_generic(*member) {
                        self.bind_generics(*member, concrete, map, depth + 1);
                    }
                }
            }
            _ if c.kind == TypeKind::Union => {
                for member in c.union_members() {
                    self.bind_generics(parameterized, *member, map, depth + 1);
                }
            }
            kind if kind != c.kind => {}
            _ => {
                if let (Some(p_items), Some(c_items)) = (p.items, c.items) {
                    self.bind_generics(p_items, c_items, map, depth + 1);
                }
                for member in self.members(parameterized) {
                    let name = &self.signifier(member).name;
                    if let Some(found) = self.member_in_chain(concrete, name) {
                        self.bind_generics(self.type_of(member), self.type_of(found), map, depth + 1);
                    }
                }
                for (idx, param) in p.param_ids().iter().enumerate() {
                    if let Some(found) = self.param(concrete, idx) {
                        self.bind_generics(self.type_of(*param), self.type_of(found), map, depth + 1);
                    }
                }
                if let (Some(p_returns), Some(c_returns)) = (p.returns, c.returns) {
                    self.bind_generics(p_returns, c_returns, map, depth + 1);
                }
            }
        }
    }

    /// Whether a placeholder appears anywhere in the type's structure,
    /// following the same edges [`update_generics_map`](Self::update_generics_map) binds through
    pub fn contains_generic(&self, id: TypeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let ty = self.get(id);
            if ty.kind == TypeKind::Generic {
                return true;
            }
            pending.extend([ty.items, ty.returns, ty.constructs].into_iter().flatten());
            pending.extend_from_slice(ty.union_members());
            pending.extend(ty.param_ids().iter().map(|param| self.type_of(*param)));
            if let Some(members) = &ty.members {
                pending.extend(members.iter().map(|member| self.type_of(member)));
            }
        }
        false
    }

    /// Copy of `id` with every bound placeholder substituted.
    ///
    /// A placeholder bound to several types becomes their union; an unbound
    /// one becomes `Unknown`. Types without placeholders are returned as is.
    pub fn replace_generics(&mut self, id: TypeId, map: &GenericsMap) -> TypeId {
        self.replace_generics_at(id, map, 0)
    }

    fn replace_generics_at(&mut self, id: TypeId, map: &GenericsMap, depth: usize) -> TypeId {
        if depth > self.max_depth || !self.contains_generic(id) {
            return id;
        }
        let mut copy = self.get(id).clone();
        if copy.kind == TypeKind::Generic {
            let bound = copy
                .name
                .as_ref()
                .and_then(|name| map.get(name))
                .cloned()
                .unwrap_or_default();
            return self.union_of(bound);
        }
        if let Some(items) = copy.items {
            copy.items = Some(self.replace_generics_at(items, map, depth + 1));
        }
        if let Some(returns) = copy.returns {
            copy.returns = Some(self.replace_generics_at(returns, map, depth + 1));
        }
        if let Some(constructs) = copy.constructs {
            copy.constructs = Some(self.replace_generics_at(constructs, map, depth + 1));
        }
        if let Some(types) = copy.types.take() {
            let replaced = types
                .into_iter()
                .map(|t| self.replace_generics_at(t, map, depth + 1))
                .collect();
            copy.types = Some(replaced);
        }
        let members: Vec<SignifierId> = copy.members.as_ref().map(|m| m.iter().collect()).unwrap_or_default();
        let params = copy.params.clone().unwrap_or_default();
        let id = self.alloc(copy);

        if members.iter().any(|member| self.contains_generic(self.type_of(*member))) {
            let mut replaced = Members::default();
            for member in members {
                let sig = self.replace_in_signifier(member, Owner::Type(id), map, depth);
                replaced.insert(self.signifier(sig).name.clone(), sig);
            }
            self.get_mut(id).members = Some(replaced);
        }
        if params.iter().any(|param| self.contains_generic(self.type_of(*param))) {
            let replaced = params
                .into_iter()
                .map(|param| self.replace_in_signifier(param, Owner::Function(id), map, depth))
                .collect();
            self.get_mut(id).params = Some(replaced);
        }
        id
    }

    /// `sig` itself when its type has no placeholders, otherwise a copy
    /// owned by `owner` with the substituted type
    fn replace_in_signifier(&mut self, sig: SignifierId, owner: Owner, map: &GenericsMap, depth: usize) -> SignifierId {
        let ty = self.type_of(sig);
        if !self.contains_generic(ty) {
            return sig;
        }
        let replaced = self.replace_generics_at(ty, map, depth + 1);
        let mut copy = self.signifier(sig).clone();
        copy.owner = owner;
        copy.ty = replaced;
        copy.refs.clear();
        self.push_signifier(copy)
    }
}
