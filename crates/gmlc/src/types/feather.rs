//! Feather type-annotation strings.
//!
//! Doc comments describe types with a small syntax: `Real`, `Array<String>`,
//! `Struct.Player`, `String|Undefined`. Several spellings are accepted for the
//! same thing (`,` and `or` for `|`, square brackets for angle brackets, and
//! `Array.String` for `Array<String>`); [`normalize_feather_string`] rewrites
//! them all to the canonical form, which is also what the encoder emits.

use super::{Type, TypeKind, TypeStore};
use crate::common::TypeId;
use rustc_hash::FxHashMap;

/// Names the decoder can resolve besides the built-in kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatherContext<'a> {
    /// Named project types such as `Struct.Player`, shared rather than copied
    pub known: Option<&'a FxHashMap<String, TypeId>>,
    /// Placeholders declared with `@template`
    pub templates: &'a [String],
}

/// Rewrite every accepted notation to the canonical `|` and `<>` form
pub fn normalize_feather_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    let flush = |word: &mut String, out: &mut String| {
        if word == "or" || word == "OR" {
            out.push('|');
        } else {
            out.push_str(word);
        }
        word.clear();
    };
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '.' {
            word.push(ch);
            continue;
        }
        flush(&mut word, &mut out);
        match ch {
            ',' | '|' => out.push('|'),
            '[' | '<' => out.push('<'),
            ']' | '>' => out.push('>'),
            c if c.is_whitespace() => {}
            other => out.push(other),
        }
    }
    flush(&mut word, &mut out);
    out
}

impl TypeStore {
    pub fn type_from_feather_string(&mut self, text: &str) -> TypeId {
        self.type_from_feather_in(text, FeatherContext::default())
    }

    /// Decode a feather string, resolving project names and placeholders
    pub fn type_from_feather_in(&mut self, text: &str, ctx: FeatherContext<'_>) -> TypeId {
        let normalized = normalize_feather_string(text);
        let mut decoder = Decoder {
            input: normalized.as_bytes(),
            pos: 0,
            ctx,
        };
        let ty = decoder.parse_union(self);
        if decoder.pos < decoder.input.len() {
            tracing::debug!(text, "trailing input in feather type");
        }
        ty
    }

    /// Canonical feather rendering of a type
    pub fn to_feather_string(&self, id: TypeId) -> String {
        self.feather_at(id, 0)
    }

    fn feather_at(&self, id: TypeId, depth: usize) -> String {
        if depth > self.max_depth {
            return "Mixed".to_string();
        }
        let ty = self.get(id);
        match ty.kind {
            TypeKind::Generic => ty.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            TypeKind::Union => {
                let members = ty.union_members();
                if members.is_empty() {
                    return "Mixed".to_string();
                }
                members
                    .iter()
                    .map(|member| self.feather_at(*member, depth + 1))
                    .collect::<Vec<_>>()
                    .join("|")
            }
            kind => {
                let mut out = match &ty.name {
                    Some(name) if is_nameable(kind) => format!("{kind}.{name}"),
                    _ => kind.to_string(),
                };
                if let Some(items) = ty.items.filter(|_| kind.can_have_items()) {
                    out.push('<');
                    out.push_str(&self.feather_at(items, depth + 1));
                    out.push('>');
                }
                out
            }
        }
    }
}

/// Kinds whose named derivatives are written `Kind.Name`
fn is_nameable(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Struct | TypeKind::Enum | TypeKind::Function | TypeKind::Constructor | TypeKind::Asset(_)
    )
}

struct Decoder<'s, 'c> {
    input: &'s [u8],
    pos: usize,
    ctx: FeatherContext<'c>,
}

impl Decoder<'_, '_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_union(&mut self, store: &mut TypeStore) -> TypeId {
        let mut members = vec![self.parse_term(store)];
        while self.eat(b'|') {
            members.push(self.parse_term(store));
        }
        if members.len() == 1 {
            members[0]
        } else {
            store.alloc(Type::union(members))
        }
    }

    fn parse_term(&mut self, store: &mut TypeStore) -> TypeId {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !matches!(b, b'|' | b'<' | b'>'))
        {
            self.pos += 1;
        }
        let name = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let (mut ty, shared) = match self.resolve(store, &name) {
            Some(resolved) => resolved,
            None => (store.new_type(TypeKind::Unknown), false),
        };
        if self.eat(b'<') {
            let items = self.parse_union(store);
            self.eat(b'>');
            if shared {
                ty = store.clone_type(ty);
            }
            store.get_mut(ty).items = Some(items);
        }
        ty
    }

    /// Resolve a dotted name; the flag is set when the id is a shared project type
    fn resolve(&self, store: &mut TypeStore, name: &str) -> Option<(TypeId, bool)> {
        if name.is_empty() {
            return None;
        }
        if self.ctx.templates.iter().any(|t| t == name) {
            return Some((store.alloc(Type::named(TypeKind::Generic, name)), false));
        }
        if let Some(known) = self.ctx.known.and_then(|known| known.get(name)) {
            return Some((*known, true));
        }
        if let Some(kind) = TypeKind::from_name(name) {
            return Some((store.new_type(kind), false));
        }

        let parts: Vec<&str> = name.split('.').collect();
        for split in (1..parts.len()).rev() {
            let prefix = parts[..split].join(".");
            let Some(kind) = TypeKind::from_name(&prefix) else {
                continue;
            };
            let rest = parts[split..].join(".");
            if kind.can_have_items() {
                if let Some((items, _)) = self.resolve(store, &rest) {
                    return Some((store.alloc(Type::new(kind).with_items(items)), false));
                }
            }
            if !is_nameable(kind) {
                return Some((store.new_type(kind), false));
            }
            let qualified = format!("{kind}.{rest}");
            if let Some(known) = self.ctx.known.and_then(|known| known.get(&qualified)) {
                return Some((*known, true));
            }
            return Some((store.alloc(Type::named(kind, rest)), false));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_notations() {
        assert_eq!(normalize_feather_string("String, Real"), "String|Real");
        assert_eq!(normalize_feather_string("String or Undefined"), "String|Undefined");
        assert_eq!(normalize_feather_string("Array[String OR Real]"), "Array<String|Real>");
        assert_eq!(normalize_feather_string("Id.DsMap < Real >"), "Id.DsMap<Real>");
        assert_eq!(normalize_feather_string("Struct.order"), "Struct.order");
    }

    #[test]
    fn test_decode_parameterized_union() {
        let mut store = TypeStore::new();
        let ty = store.type_from_feather_string("Array<String|Real>");
        assert_eq!(store.kind(ty), TypeKind::Array);
        let items = store.get(ty).items.expect("array items");
        assert_eq!(store.kind(items), TypeKind::Union);
        let members: Vec<_> = store.get(items).union_members().iter().map(|t| store.kind(*t)).collect();
        assert_eq!(members, vec![TypeKind::String, TypeKind::Real]);
    }

    #[test]
    fn test_round_trip_is_structurally_stable() {
        let mut store = TypeStore::new();
        for text in [
            "Array<String|Real>",
            "Array.String",
            "Struct.Player",
            "Id.DsList<Real>",
            "Function.scr_move|Undefined",
            "Asset.GMObject",
            "Array[Array<Bool>], Pointer",
            "Array.Whatever",
            "Real.Foo",
            "Struct.Foo<Real>",
        ] {
            let decoded = store.type_from_feather_string(text);
            let encoded = store.to_feather_string(decoded);
            let again = store.type_from_feather_string(&encoded);
            assert!(store.type_eq(decoded, again), "{text} -> {encoded}");
        }
    }

    #[test]
    fn test_encode_canonical_forms() {
        let mut store = TypeStore::new();
        let cases = [
            ("Array.String", "Array<String>"),
            ("string or real", "String|Real"),
            ("Struct.Player", "Struct.Player"),
            ("Id.DsMap[Real]", "Id.DsMap<Real>"),
            ("Asset.GMObject", "Asset.GMObject"),
            ("Struct.Foo<Real>", "Struct.Foo<Real>"),
            ("Real.Foo", "Real"),
        ];
        for (input, expected) in cases {
            let ty = store.type_from_feather_string(input);
            assert_eq!(store.to_feather_string(ty), expected);
        }
        let empty_union = store.alloc(Type::union(Vec::new()));
        assert_eq!(store.to_feather_string(empty_union), "Mixed");
    }

    #[test]
    fn test_templates_and_unknown_names() {
        let mut store = TypeStore::new();
        let templates = vec!["T".to_string()];
        let ctx = FeatherContext {
            known: None,
            templates: &templates,
        };
        let ty = store.type_from_feather_in("Array<T>", ctx);
        let items = store.get(ty).items.expect("array items");
        assert_eq!(store.kind(items), TypeKind::Generic);
        assert_eq!(store.to_feather_string(ty), "Array<T>");

        let unknown = store.type_from_feather_string("Whatever");
        assert_eq!(store.kind(unknown), TypeKind::Unknown);
    }

    #[test]
    fn test_known_types_are_shared() {
        let mut store = TypeStore::new();
        let player = store.alloc(Type::named(TypeKind::Struct, "Player"));
        let mut known = FxHashMap::default();
        known.insert("Struct.Player".to_string(), player);
        let ctx = FeatherContext {
            known: Some(&known),
            templates: &[],
        };
        assert_eq!(store.type_from_feather_in("Struct.Player", ctx), player);
        let array = store.type_from_feather_in("Array<Struct.Player>", ctx);
        assert_eq!(store.get(array).items, Some(player));
    }
}
