//! Type merging and structural narrowing

use super::{Type, TypeKind, TypeStore};
use crate::common::TypeId;

impl TypeStore {
    /// Merge a newly observed type into `original`, in place.
    ///
    /// The slot of `original` is rewritten so every holder of that id sees the
    /// result, and `original` is always the returned id. An earlier, more
    /// specific observation is kept over a broader later one; shapes that
    /// dominate neither way accumulate into a union in observation order.
    pub fn merge_types(&mut self, original: TypeId, incoming: TypeId) -> TypeId {
        if original == incoming {
            return original;
        }
        let original_kind = self.kind(original);
        let incoming_kind = self.kind(incoming);

        if incoming_kind == TypeKind::Unknown {
            return original;
        }
        if original_kind == TypeKind::Unknown {
            let adopted = self.get(incoming).clone();
            *self.get_mut(original) = adopted;
            return original;
        }
        if original_kind.is_maximal() {
            return original;
        }

        let same_kind = original_kind == incoming_kind && original_kind != TypeKind::Union;
        if same_kind || self.narrows(incoming, original) {
            if original_kind != TypeKind::Union {
                let details = self.get(incoming).clone();
                self.get_mut(original).coerce_details_from(&details);
            }
            return original;
        }
        if self.narrows(original, incoming) {
            return original;
        }

        if original_kind != TypeKind::Union {
            let pre_union = self.clone_type(original);
            *self.get_mut(original) = Type::union(vec![pre_union]);
        }
        let member = self.clone_type(incoming);
        self.get_mut(original)
            .types
            .get_or_insert_with(Vec::new)
            .push(member);
        original
    }

    /// Whether `narrow` can stand in wherever `broad` is expected
    pub fn narrows(&self, narrow: TypeId, broad: TypeId) -> bool {
        self.narrows_at(narrow, broad, 0)
    }

    fn narrows_at(&self, narrow: TypeId, broad: TypeId, depth: usize) -> bool {
        if narrow == broad || depth > self.max_depth {
            return true;
        }
        let (n, b) = (self.get(narrow), self.get(broad));

        if matches!(b.kind, TypeKind::Any | TypeKind::Mixed | TypeKind::Unknown) || n.kind.is_maximal() {
            return true;
        }

        if b.kind == TypeKind::Union {
            if n.kind == TypeKind::Union {
                return n.types.as_ref().is_some_and(|types| {
                    types.iter().all(|member| self.narrows_at(*member, broad, depth + 1))
                });
            }
            return b.union_members().iter().any(|member| self.narrows_at(narrow, *member, depth + 1));
        }

        if b.kind != n.kind {
            return false;
        }

        for member in self.members(broad) {
            let expected = self.signifier(member);
            let Some(found) = self.member_in_chain(narrow, &expected.name) else {
                return false;
            };
            if !self.narrows_at(self.type_of(found), expected.ty, depth + 1) {
                return false;
            }
        }

        for (position, param) in b.param_ids().iter().enumerate() {
            let expected = self.signifier(*param);
            let Some(found) = self.param(narrow, expected.idx.unwrap_or(position)) else {
                return false;
            };
            if !self.narrows_at(self.type_of(found), expected.ty, depth + 1) {
                return false;
            }
        }

        let matched = |n: Option<TypeId>, b: Option<TypeId>| match (n, b) {
            (_, None) => true,
            (Some(n), Some(b)) => self.narrows_at(n, b, depth + 1),
            (None, Some(_)) => false,
        };
        matched(n.returns, b.returns) && matched(n.constructs, b.constructs) && matched(n.items, b.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(store: &TypeStore, id: TypeId) -> Vec<TypeKind> {
        store.get(id).union_members().iter().map(|t| store.kind(*t)).collect()
    }

    fn struct_with(store: &mut TypeStore, members: &[(&str, TypeKind)]) -> TypeId {
        let st = store.new_type(TypeKind::Struct);
        for (name, kind) in members {
            let member = store.add_member(st, name);
            let ty = store.new_type(*kind);
            store.add_type(member, ty);
        }
        st
    }

    #[test]
    fn test_unknown_is_identity() {
        let mut store = TypeStore::new();
        let real = store.new_type(TypeKind::Real);
        let unknown = store.new_type(TypeKind::Unknown);
        assert_eq!(store.merge_types(real, unknown), real);
        assert_eq!(store.kind(real), TypeKind::Real);

        let unknown = store.new_type(TypeKind::Unknown);
        let string = store.new_type(TypeKind::String);
        let merged = store.merge_types(unknown, string);
        assert_eq!(merged, unknown);
        assert!(store.type_eq(merged, string));
    }

    #[test]
    fn test_string_then_real_makes_ordered_union() {
        let mut store = TypeStore::new();
        let original = store.new_type(TypeKind::String);
        let real = store.new_type(TypeKind::Real);
        let merged = store.merge_types(original, real);
        assert_eq!(merged, original);
        assert_eq!(store.kind(merged), TypeKind::Union);
        assert_eq!(kinds(&store, merged), vec![TypeKind::String, TypeKind::Real]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = TypeStore::new();
        let a = store.new_type(TypeKind::String);
        let b = store.new_type(TypeKind::Real);
        let once = store.merge_types(a, b);
        let snapshot = store.clone_type(once);
        let twice = store.merge_types(once, b);
        assert!(store.type_eq(twice, snapshot));
        assert_eq!(kinds(&store, twice), vec![TypeKind::String, TypeKind::Real]);
    }

    #[test]
    fn test_maximal_original_absorbs_everything() {
        let mut store = TypeStore::new();
        let any = store.new_type(TypeKind::Any);
        let real = store.new_type(TypeKind::Real);
        store.merge_types(any, real);
        assert_eq!(store.kind(any), TypeKind::Any);
    }

    #[test]
    fn test_same_kind_fills_missing_details() {
        let mut store = TypeStore::new();
        let array = store.new_type(TypeKind::Array);
        let items = store.new_type(TypeKind::String);
        let typed = store.alloc(Type::new(TypeKind::Array).with_items(items));
        store.merge_types(array, typed);
        assert_eq!(store.get(array).items, Some(items));
    }

    #[test]
    fn test_narrower_original_is_kept() {
        let mut store = TypeStore::new();
        let narrow = struct_with(&mut store, &[("a", TypeKind::Real), ("b", TypeKind::String)]);
        let broad = struct_with(&mut store, &[("a", TypeKind::Real)]);
        assert!(store.narrows(narrow, broad));
        store.merge_types(narrow, broad);
        assert_eq!(store.kind(narrow), TypeKind::Struct);
        assert_eq!(store.members(narrow).len(), 2);
    }

    #[test]
    fn test_narrows_is_reflexive() {
        let mut store = TypeStore::new();
        let real = store.new_type(TypeKind::Real);
        let other_real = store.new_type(TypeKind::Real);
        let st = struct_with(&mut store, &[("x", TypeKind::Real)]);
        assert!(store.narrows(real, real));
        assert!(store.narrows(real, other_real));
        assert!(store.narrows(st, st));
    }

    #[test]
    fn test_narrows_is_transitive_for_structs() {
        let mut store = TypeStore::new();
        let a = struct_with(&mut store, &[("x", TypeKind::Real), ("y", TypeKind::Real), ("z", TypeKind::String)]);
        let b = struct_with(&mut store, &[("x", TypeKind::Real), ("y", TypeKind::Real)]);
        let c = struct_with(&mut store, &[("x", TypeKind::Real)]);
        assert!(store.narrows(a, b));
        assert!(store.narrows(b, c));
        assert!(store.narrows(a, c));
        assert!(!store.narrows(c, a));
    }

    #[test]
    fn test_narrows_union_targets() {
        let mut store = TypeStore::new();
        let s = store.new_type(TypeKind::String);
        let r = store.new_type(TypeKind::Real);
        let b = store.new_type(TypeKind::Bool);
        let union = store.union_of(vec![s, r]);
        assert!(store.narrows(s, union));
        assert!(!store.narrows(b, union));
        let sub_union = store.union_of(vec![r, s]);
        assert!(store.narrows(sub_union, union));
        assert!(!store.narrows(union, s));
    }

    #[test]
    fn test_merging_a_narrower_member_keeps_union() {
        let mut store = TypeStore::new();
        let s = store.new_type(TypeKind::String);
        let r = store.new_type(TypeKind::Real);
        let merged = store.merge_types(s, r);
        let another_string = store.new_type(TypeKind::String);
        store.merge_types(merged, another_string);
        assert_eq!(kinds(&store, merged), vec![TypeKind::String, TypeKind::Real]);
    }

    #[test]
    fn test_union_member_is_detached_from_incoming_slot() {
        let mut store = TypeStore::new();
        let x = store.new_type(TypeKind::String);
        let y = store.new_type(TypeKind::Real);
        store.merge_types(x, y);
        let bool_ty = store.new_type(TypeKind::Bool);
        store.merge_types(y, bool_ty);
        assert_eq!(store.kind(y), TypeKind::Union);
        assert_eq!(kinds(&store, x), vec![TypeKind::String, TypeKind::Real]);
    }
}
