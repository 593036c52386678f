//! Expression typing for the symbol pass

use super::analyzer::Analyzer;
use super::diagnostics::DiagnosticKind;
use crate::common::{Referent, SignifierId, Span, TypeId};
use crate::frontend::cst::{Arg, BinOp, ContextKeyword, Expr, ExprKind, Ident, StructEntry, TemplatePart, UnaryOp};
use crate::frontend::parse_jsdoc;
use crate::project::CallSite;
use crate::types::{AssetKind, GenericsMap, HandleKind, TypeKind, TypeStore};

/// The function type a value of type `ty` can be called as
pub(crate) fn callable(store: &TypeStore, ty: TypeId) -> Option<TypeId> {
    let node = store.get(ty);
    if node.is_function() {
        return Some(ty);
    }
    node.union_members().iter().copied().find(|member| store.get(*member).is_function())
}

impl Analyzer<'_> {
    /// Walk an expression and return its inferred type
    pub(super) fn expr(&mut self, expr: &Expr) -> TypeId {
        match &expr.kind {
            ExprKind::Real(_) => self.new_type(TypeKind::Real),
            ExprKind::String(_) => self.new_type(TypeKind::String),
            ExprKind::Template(parts) => {
                for part in parts {
                    if let TemplatePart::Expr(inner) = part {
                        self.expr(inner);
                    }
                }
                self.new_type(TypeKind::String)
            }
            ExprKind::Bool(_) => self.new_type(TypeKind::Bool),
            ExprKind::Undefined => self.new_type(TypeKind::Undefined),
            ExprKind::Pointer => self.new_type(TypeKind::Pointer),
            ExprKind::Ident(ident) => {
                let sig = self.ident_sig(ident);
                self.project.store.type_of(sig)
            }
            ExprKind::Context(keyword) => self.context(*keyword, expr.span),
            ExprKind::Array(items) => self.array(items),
            ExprKind::Struct(entries) => self.struct_literal(entries, expr.span),
            ExprKind::Function(function) => self.visit_function(function, None, None, None),
            ExprKind::Call { callee, args } => self.call(callee, args, expr.span, false),
            ExprKind::New { callee, args } => self.call(callee, args, expr.span, true),
            ExprKind::Member { object, property } => match self.member_sig(object, property) {
                Some(sig) => self.project.store.type_of(sig),
                None => self.new_type(TypeKind::Unknown),
            },
            ExprKind::Index { object, indices, .. } => {
                let container = self.expr(object);
                for index in indices {
                    self.expr(index);
                }
                match self.project.store.get(container).items {
                    Some(items) => items,
                    None => self.new_type(TypeKind::Unknown),
                }
            }
            ExprKind::Unary { op, operand } => {
                self.expr(operand);
                match op {
                    UnaryOp::Not => self.new_type(TypeKind::Bool),
                    UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => self.new_type(TypeKind::Real),
                }
            }
            ExprKind::Update { operand, .. } => {
                self.expr(operand);
                self.new_type(TypeKind::Real)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                self.binary(*op, left, right)
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                let then_ty = self.expr(then_branch);
                let else_ty = self.expr(else_branch);
                self.either(then_ty, else_ty)
            }
            ExprKind::Paren(inner) => self.expr(inner),
            ExprKind::Error => self.new_type(TypeKind::Unknown),
        }
    }

    fn binary(&mut self, op: BinOp, left: TypeId, right: TypeId) -> TypeId {
        if op.is_comparison_or_logical() {
            return self.new_type(TypeKind::Bool);
        }
        match op {
            BinOp::Nullish => self.either(left, right),
            BinOp::Add
                if [left, right]
                    .iter()
                    .any(|ty| self.project.store.kind(*ty) == TypeKind::String) =>
            {
                self.new_type(TypeKind::String)
            }
            _ => self.new_type(TypeKind::Real),
        }
    }

    /// Fresh type merging two alternatives
    fn either(&mut self, first: TypeId, second: TypeId) -> TypeId {
        let merged = self.new_type(TypeKind::Unknown);
        self.project.store.merge_types(merged, first);
        self.project.store.merge_types(merged, second);
        merged
    }

    pub(super) fn ident_sig(&mut self, ident: &Ident) -> SignifierId {
        let sig = match self.lookup(&ident.name) {
            Some(sig) => sig,
            None => self.unresolved(&ident.name),
        };
        self.access(sig, ident.span, false);
        sig
    }

    fn context(&mut self, keyword: ContextKeyword, span: Span) -> TypeId {
        let self_id = match keyword {
            ContextKeyword::SelfKw => {
                if self.self_is_global() {
                    self.finding(DiagnosticKind::GlobalSelf, span, "`self` refers to the global scope here");
                }
                self.current_self()
            }
            ContextKeyword::Other => self.outer_self(),
            ContextKeyword::Global => self.project.global_self,
            ContextKeyword::Noone | ContextKeyword::All => {
                return self.new_type(TypeKind::Id(HandleKind::Instance));
            }
        };
        let range = self.range(span);
        self.project.add_ref(Referent::SelfRef(self_id), range, false);
        self.project.self_data(self_id).ty
    }

    fn array(&mut self, items: &[Expr]) -> TypeId {
        let array = self.new_type(TypeKind::Array);
        if items.is_empty() {
            return array;
        }
        let item_ty = self.new_type(TypeKind::Unknown);
        for item in items {
            let ty = self.expr(item);
            self.project.store.merge_types(item_ty, ty);
        }
        self.project.store.get_mut(array).items = Some(item_ty);
        array
    }

    fn struct_literal(&mut self, entries: &[StructEntry], span: Span) -> TypeId {
        let ty = self.new_type(TypeKind::Struct);
        let self_id = self.project.struct_self(ty);
        self.enter_struct(span.start, self_id);
        for entry in entries {
            let doc = entry
                .doc
                .as_ref()
                .map(|doc| parse_jsdoc(&doc.text))
                .filter(|doc| !doc.is_empty());
            let value = match &entry.value {
                Some(value) => self.value_type(value, &entry.key.name, doc.as_ref()),
                // `{ name }` reads the variable of the same name
                None => {
                    let sig = self.ident_sig(&entry.key);
                    self.project.store.type_of(sig)
                }
            };
            let is_function = entry
                .value
                .as_ref()
                .is_some_and(|value| matches!(value.unparenthesized().kind, ExprKind::Function(_)));

            let member = self.project.store.add_member(ty, &entry.key.name);
            self.project.store.signifier_mut(member).flags.set_instance(true);
            self.declare(member, entry.key.span);
            self.reference(member, entry.key.span);
            self.assign_type(member, value, doc.as_ref().filter(|_| !is_function), entry.key.span);
        }
        self.leave_struct(span.end);
        ty
    }

    fn call(&mut self, callee: &Expr, args: &[Arg], span: Span, is_new: bool) -> TypeId {
        let (callee_ty, callee_sig) = match &callee.unparenthesized().kind {
            ExprKind::Ident(ident) => {
                let sig = self.ident_sig(ident);
                (self.project.store.type_of(sig), Some(sig))
            }
            ExprKind::Member { object, property } => match self.member_sig(object, property) {
                Some(sig) => (self.project.store.type_of(sig), Some(sig)),
                None => (self.new_type(TypeKind::Unknown), None),
            },
            _ => (self.expr(callee), None),
        };
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            arg_types.push(arg.expr.as_ref().map(|expr| self.expr(expr)));
        }

        let Some(function) = callable(&self.project.store, callee_ty) else {
            return self.new_type(TypeKind::Unknown);
        };
        if let Some(callee) = callee_sig {
            let site = CallSite {
                callee,
                span,
                args: args.iter().map(|arg| arg.span).collect(),
            };
            self.project.files[self.file.index()].calls.push(site);
        }

        let node = self.project.store.get(function);
        let result = if is_new { node.constructs.or(node.returns) } else { node.returns };
        let Some(result) = result else {
            return self.new_type(TypeKind::Unknown);
        };
        if !self.project.store.contains_generic(result) {
            return result;
        }

        let store = &self.project.store;
        let params = store.params(function);
        let variadic = params.last().copied().filter(|param| store.signifier(*param).name == "...");
        let mut bindings = GenericsMap::default();
        for (idx, arg) in arg_types.iter().enumerate() {
            let (Some(arg), Some(param)) = (arg, params.get(idx).copied().or(variadic)) else {
                continue;
            };
            store.update_generics_map(store.type_of(param), *arg, &mut bindings);
        }
        tracing::trace!(bindings = bindings.len(), "substituting generics");
        self.project.store.replace_generics(result, &bindings)
    }

    /// `global.name`, registering the name as a global when it is new
    pub(super) fn global_member(&mut self, object: &Expr, property: &Ident) -> Option<SignifierId> {
        if !matches!(object.unparenthesized().kind, ExprKind::Context(ContextKeyword::Global)) {
            return None;
        }
        self.context(ContextKeyword::Global, object.span);
        let sig = self.project.ensure_global(&property.name);
        self.access(sig, property.span, true);
        Some(sig)
    }

    /// Signifier named by a dot access, created on struct types when missing
    pub(super) fn member_sig(&mut self, object: &Expr, property: &Ident) -> Option<SignifierId> {
        if let Some(sig) = self.global_member(object, property) {
            return Some(sig);
        }
        let object_ty = self.expr(object);
        let container = self.member_container(object_ty)?;
        let sig = match self.project.store.member_in_chain(container, &property.name) {
            Some(sig) => sig,
            None if self.project.store.kind(container) == TypeKind::Struct => {
                let sig = self.project.store.add_member(container, &property.name);
                self.project.store.signifier_mut(sig).flags.set_instance(true);
                sig
            }
            None => return None,
        };
        self.reference(sig, property.span);
        Some(sig)
    }

    /// Type holding the members reachable through a value of type `ty`
    pub(super) fn member_container(&self, ty: TypeId) -> Option<TypeId> {
        let direct = |ty: TypeId| {
            let ty = self.canonical(ty);
            match self.project.store.kind(ty) {
                TypeKind::Struct | TypeKind::Enum => Some(ty),
                TypeKind::Asset(AssetKind::GMObject) => self.object_self(ty).map(|id| self.project.self_data(id).ty),
                _ => None,
            }
        };
        let node = self.project.store.get(ty);
        if node.kind == TypeKind::Union {
            return node.union_members().iter().copied().find_map(direct);
        }
        direct(ty)
    }
}

#[cfg(test)]
mod tests {
    use crate::common::FileId;
    use crate::project::Project;
    use crate::types::TypeKind;
    use pretty_assertions::assert_eq;

    fn analyzed(source: &str) -> (Project, FileId) {
        let mut project = Project::default();
        let file = project.add_file("scripts/test/test.gml", source);
        project.analyze_all();
        (project, file)
    }

    fn type_at(project: &Project, file: FileId, needle: &str) -> String {
        let text = &project.file(file).unwrap().text;
        let offset = text.find(needle).unwrap();
        let sig = project.reference_at(file, offset).unwrap().signifier().unwrap();
        project.store().to_feather_string(project.type_of(sig))
    }

    #[test]
    fn test_literal_and_operator_types() {
        let (project, file) = analyzed(
            "var a = 1 + 2;\nvar b = \"x\" + 1;\nvar c = a > 1;\nvar d = !c;\nvar e = $\"{a}\";\nvar f = [1, 2];",
        );
        assert_eq!(type_at(&project, file, "a ="), "Real");
        assert_eq!(type_at(&project, file, "b ="), "String");
        assert_eq!(type_at(&project, file, "c ="), "Bool");
        assert_eq!(type_at(&project, file, "d ="), "Bool");
        assert_eq!(type_at(&project, file, "e ="), "String");
        assert_eq!(type_at(&project, file, "f ="), "Array<Real>");
    }

    #[test]
    fn test_ternary_and_nullish_merge() {
        let (project, file) = analyzed("var a = true ? 1 : \"s\";\nvar b = undefined ?? 2;");
        assert_eq!(type_at(&project, file, "a ="), "Real|String");
        assert_eq!(type_at(&project, file, "b ="), "Undefined|Real");
    }

    #[test]
    fn test_generic_return_is_substituted() {
        let (project, file) = analyzed("var v = array_pop([\"a\", \"b\"]);");
        assert_eq!(type_at(&project, file, "v ="), "String");
    }

    #[test]
    fn test_function_returns_are_inferred() {
        let (project, file) = analyzed("function twice(n) { return n * 2; }\nvar r = twice(4);");
        assert_eq!(type_at(&project, file, "r ="), "Real");
        let twice = project.global("twice").unwrap();
        let ty = project.type_of(twice);
        assert_eq!(project.store().kind(ty), TypeKind::Function);
        assert_eq!(project.store().code(ty), "function twice(n: Any): Real");
    }

    #[test]
    fn test_constructor_members() {
        let (project, file) = analyzed(
            "function Point(_x, _y) constructor {\n    x = _x;\n    y = _y;\n}\nvar p = new Point(1, 2);\nvar px = p.x;",
        );
        let point = project.known_type("Struct.Point").unwrap();
        let names: Vec<_> = project
            .store()
            .members(point)
            .iter()
            .map(|m| project.signifier(*m).name.clone())
            .collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(type_at(&project, file, "p ="), "Struct.Point");
        assert_eq!(type_at(&project, file, "px ="), "Any");
    }

    #[test]
    fn test_struct_literal_members() {
        let (project, file) = analyzed("var s = { hp: 10, name: \"bob\" };\nvar n = s.name;");
        assert_eq!(type_at(&project, file, "n ="), "String");
        let text = &project.file(file).unwrap().text;
        let hp = project.reference_at(file, text.find("hp").unwrap()).unwrap();
        assert!(hp.is_declaration);
    }

    #[test]
    fn test_parent_constructor_arguments_resolve_to_params() {
        let text = "function A(v) constructor {}\nfunction B(a) : A(a) constructor {}";
        let (project, file) = analyzed(text);
        let param = project.reference_at(file, text.find("B(a)").unwrap() + 2).unwrap();
        let arg = project.reference_at(file, text.find("A(a)").unwrap() + 2).unwrap();
        assert!(param.is_declaration);
        assert!(!arg.is_declaration);
        assert_eq!(arg.signifier(), param.signifier());
        let parent = project.reference_at(file, text.find("A(a)").unwrap()).unwrap();
        assert_eq!(parent.signifier(), project.global("A"));
    }

    #[test]
    fn test_block_doc_comment_types_params() {
        let text = "/**\n * @param {Real} a\n */\nfunction f(a) { var copy = a; }\nf(1);";
        let (project, file) = analyzed(text);
        assert!(project.diagnostics(file).is_empty());
        assert_eq!(type_at(&project, file, "copy ="), "Real");
    }

    #[test]
    fn test_index_write_does_not_touch_declared_return() {
        let (project, file) = analyzed(
            "/// @returns {Array<Real>}\nfunction make() { return []; }\nvar a = make();\na[0] = \"s\";",
        );
        let make = project.global("make").unwrap();
        assert_eq!(project.store().code(project.type_of(make)), "function make(): Array<Real>");
        assert_eq!(type_at(&project, file, "a ="), "Array<Real|String>");
    }
}
