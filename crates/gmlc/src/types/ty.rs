//! The `Type` node stored in the type arena

use super::TypeKind;
use crate::common::{SignifierId, TypeId};
use rustc_hash::FxHashMap;

/// Named members of a struct-like type, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Members {
    order: Vec<SignifierId>,
    by_name: FxHashMap<String, SignifierId>,
}

impl Members {
    pub fn get(&self, name: &str) -> Option<SignifierId> {
        self.by_name.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: SignifierId) {
        let name = name.into();
        if self.by_name.insert(name, id).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<SignifierId> {
        let id = self.by_name.remove(name)?;
        self.order.retain(|member| *member != id);
        Some(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = SignifierId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One node of the type graph.
///
/// Which optional fields are meaningful depends on `kind`: members for
/// struct-like kinds, params/returns/constructs/context for function kinds,
/// items for containers, and types for unions.
#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Type this one was derived from; members are inherited through it
    pub parent: Option<TypeId>,
    pub members: Option<Members>,
    pub params: Option<Vec<SignifierId>>,
    pub returns: Option<TypeId>,
    pub constructs: Option<TypeId>,
    /// The `self` a function body runs with
    pub context: Option<TypeId>,
    pub items: Option<TypeId>,
    /// Union members, in the order they were observed
    pub types: Option<Vec<TypeId>>,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: None,
            description: None,
            parent: None,
            members: None,
            params: None,
            returns: None,
            constructs: None,
            context: None,
            items: None,
            types: None,
        }
    }

    pub fn named(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(kind)
        }
    }

    pub fn with_items(mut self, items: TypeId) -> Self {
        self.items = Some(items);
        self
    }

    pub fn union(types: Vec<TypeId>) -> Self {
        Self {
            types: Some(types),
            ..Self::new(TypeKind::Union)
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == TypeKind::Unknown
    }

    pub fn is_function(&self) -> bool {
        self.kind.is_function()
    }

    pub fn member(&self, name: &str) -> Option<SignifierId> {
        self.members.as_ref()?.get(name)
    }

    pub fn param_ids(&self) -> &[SignifierId] {
        self.params.as_deref().unwrap_or(&[])
    }

    pub fn union_members(&self) -> &[TypeId] {
        self.types.as_deref().unwrap_or(&[])
    }

    pub(crate) fn has_members(&self) -> bool {
        self.members.as_ref().is_some_and(|members| !members.is_empty())
    }

    pub(crate) fn has_params(&self) -> bool {
        self.params.as_ref().is_some_and(|params| !params.is_empty())
    }

    /// Fill every detail this type is missing from `other`, keeping `kind`
    pub(crate) fn coerce_details_from(&mut self, other: &Type) {
        if self.name.is_none() {
            self.name.clone_from(&other.name);
        }
        if self.description.is_none() {
            self.description.clone_from(&other.description);
        }
        self.parent = self.parent.or(other.parent);
        if !self.has_members() && other.members.is_some() {
            self.members.clone_from(&other.members);
        }
        if !self.has_params() && other.params.is_some() {
            self.params.clone_from(&other.params);
        }
        self.returns = self.returns.or(other.returns);
        self.constructs = self.constructs.or(other.constructs);
        self.context = self.context.or(other.context);
        self.items = self.items.or(other.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_keep_insertion_order() {
        let mut members = Members::default();
        members.insert("b", SignifierId::new(1));
        members.insert("a", SignifierId::new(0));
        members.insert("b", SignifierId::new(1));
        assert_eq!(members.iter().collect::<Vec<_>>(), vec![SignifierId::new(1), SignifierId::new(0)]);
        assert_eq!(members.remove("b"), Some(SignifierId::new(1)));
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_coerce_fills_only_missing_details() {
        let mut original = Type::named(TypeKind::Array, "first");
        let incoming = Type::named(TypeKind::Array, "second").with_items(TypeId::new(9));
        original.coerce_details_from(&incoming);
        assert_eq!(original.name.as_deref(), Some("first"));
        assert_eq!(original.items, Some(TypeId::new(9)));
        assert_eq!(original.kind, TypeKind::Array);
    }
}
