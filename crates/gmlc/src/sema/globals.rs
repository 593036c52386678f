//! Global declaration pass
//!
//! Runs over every file before any file is walked, so that a script may use
//! a function, macro or enum declared in a file loaded after it. Only
//! declaration sites are recorded here; references are added by the walk.

use crate::common::{FileId, Range, SignifierId, Span, TypeId};
use crate::frontend::cst::{
    Arg, AssignOp, Block, ContextKeyword, EnumDecl, Expr, ExprKind, FunctionExpr, Ident, Stmt, StmtKind, TemplatePart,
};
use crate::project::Project;
use crate::types::{Type, TypeKind};

#[tracing::instrument(level = "debug", skip_all, fields(file = %file))]
pub(crate) fn collect_globals(project: &mut Project, file: FileId) {
    let program = std::mem::take(&mut project.files[file.index()].program);
    let is_script = project.self_data(project.files[file.index()].self_id).is_global();
    let mut collector = GlobalCollector {
        project: &mut *project,
        file,
        is_script,
        nesting: 0,
    };
    collector.stmts(&program.stmts);
    project.files[file.index()].program = program;
}

struct GlobalCollector<'p> {
    project: &'p mut Project,
    file: FileId,
    is_script: bool,
    /// Function bodies and `with` blocks entered so far
    nesting: usize,
}

impl GlobalCollector<'_> {
    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn block(&mut self, block: &Block) {
        self.stmts(&block.stmts);
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Function(function) => {
                if self.nesting == 0 && self.is_script {
                    self.declare_function(function);
                }
                self.function_body(function);
            }
            StmtKind::GlobalVar(names) => {
                for name in names {
                    self.declare_global(name);
                }
            }
            StmtKind::Macro(decl) => {
                if let Some(sig) = self.declare_global(&decl.name) {
                    self.project.store.signifier_mut(sig).flags.set_macro(true);
                }
                if let Some(value) = &decl.value {
                    self.expr(value);
                }
            }
            StmtKind::Enum(decl) => self.declare_enum(decl),
            StmtKind::Assign { target, op, value } => {
                if let (AssignOp::Assign, Some(name)) = (op, global_member(target)) {
                    self.declare_global(name);
                } else {
                    self.expr(target);
                }
                self.expr(value);
            }
            StmtKind::Var(decls) | StmtKind::Static(decls) => {
                for decl in decls {
                    if let Some(init) = &decl.init {
                        self.expr(init);
                    }
                }
            }
            StmtKind::Expr(expr) | StmtKind::Throw(expr) | StmtKind::Delete(expr) => self.expr(expr),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                self.stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch);
                }
            }
            StmtKind::While { condition: cond, body }
            | StmtKind::Repeat { count: cond, body }
            | StmtKind::DoUntil { body, condition: cond } => {
                self.expr(cond);
                self.stmt(body);
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(condition) = condition {
                    self.expr(condition);
                }
                if let Some(update) = update {
                    self.stmt(update);
                }
                self.stmt(body);
            }
            StmtKind::With { target, body } => {
                self.expr(target);
                self.nesting += 1;
                self.stmt(body);
                self.nesting -= 1;
            }
            StmtKind::Switch { discriminant, cases } => {
                self.expr(discriminant);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.expr(test);
                    }
                    self.stmts(&case.body);
                }
            }
            StmtKind::Try { body, catch, finally } => {
                self.block(body);
                if let Some(catch) = catch {
                    self.block(&catch.body);
                }
                if let Some(finally) = finally {
                    self.block(finally);
                }
            }
            StmtKind::Block(block) => self.block(block),
            StmtKind::Exit | StmtKind::Break | StmtKind::Continue | StmtKind::Error => {}
        }
    }

    /// Only looks for nested function bodies and `global.x = ...` inside them
    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Function(function) => self.function_body(function),
            ExprKind::Array(items) => items.iter().for_each(|item| self.expr(item)),
            ExprKind::Struct(entries) => {
                for entry in entries {
                    if let Some(value) = &entry.value {
                        self.expr(value);
                    }
                }
            }
            ExprKind::Template(parts) => {
                for part in parts {
                    if let TemplatePart::Expr(expr) = part {
                        self.expr(expr);
                    }
                }
            }
            ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
                self.expr(callee);
                self.args(args);
            }
            ExprKind::Member { object, .. } => self.expr(object),
            ExprKind::Index { object, indices, .. } => {
                self.expr(object);
                indices.iter().for_each(|index| self.expr(index));
            }
            ExprKind::Unary { operand, .. } | ExprKind::Update { operand, .. } | ExprKind::Paren(operand) => {
                self.expr(operand);
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                self.expr(then_branch);
                self.expr(else_branch);
            }
            ExprKind::Real(_)
            | ExprKind::String(_)
            | ExprKind::Bool(_)
            | ExprKind::Undefined
            | ExprKind::Pointer
            | ExprKind::Ident(_)
            | ExprKind::Context(_)
            | ExprKind::Error => {}
        }
    }

    fn args(&mut self, args: &[Arg]) {
        for arg in args {
            if let Some(expr) = &arg.expr {
                self.expr(expr);
            }
        }
    }

    fn function_body(&mut self, function: &FunctionExpr) {
        self.nesting += 1;
        for param in &function.params {
            if let Some(default) = &param.default {
                self.expr(default);
            }
        }
        if let Some(parent) = &function.parent {
            self.args(&parent.args);
        }
        self.block(&function.body);
        self.nesting -= 1;
    }

    fn range(&self, span: Span) -> Range {
        Range::new(self.file, span)
    }

    /// Get or create the global and declare it here. Natives cannot be
    /// redeclared, so `None` is returned for them.
    fn declare_global(&mut self, name: &Ident) -> Option<SignifierId> {
        let sig = self.project.ensure_global(&name.name);
        let range = self.range(name.span);
        let entry = self.project.store.signifier_mut(sig);
        if entry.flags.native() || entry.flags.asset() {
            tracing::debug!(name = %name.name, "declaration shadows a built-in");
            return None;
        }
        if entry.declare(range) {
            self.project.files[self.file.index()].declared.push(sig);
        }
        Some(sig)
    }

    fn declare_function(&mut self, function: &FunctionExpr) {
        let Some(name) = &function.name else {
            return;
        };
        let Some(sig) = self.declare_global(name) else {
            return;
        };
        let kind = if function.is_constructor {
            TypeKind::Constructor
        } else {
            TypeKind::Function
        };
        let ty = function_slot(self.project, sig, kind, &name.name);
        self.project.known_types.insert(format!("Function.{}", name.name), ty);

        if !function.is_constructor {
            self.project.store.get_mut(ty).constructs = None;
            return;
        }
        let constructs = constructs_of(self.project, ty, &name.name);
        if let Some(parent) = &function.parent {
            let parent_sig = self.project.ensure_global(&parent.name.name);
            let parent_ty = function_slot(self.project, parent_sig, TypeKind::Constructor, &parent.name.name);
            let parent_constructs = constructs_of(self.project, parent_ty, &parent.name.name);
            if parent_constructs != constructs {
                self.project.store.get_mut(constructs).parent = Some(parent_constructs);
            }
        }
    }

    fn declare_enum(&mut self, decl: &EnumDecl) {
        let Some(sig) = self.declare_global(&decl.name) else {
            return;
        };
        let ty = self.project.store.type_of(sig);
        if self.project.store.kind(ty) != TypeKind::Enum {
            *self.project.store.get_mut(ty) = Type::named(TypeKind::Enum, decl.name.name.as_str());
        }
        self.project.known_types.insert(format!("Enum.{}", decl.name.name), ty);

        for (idx, member) in decl.members.iter().enumerate() {
            let member_sig = self.project.store.add_member(ty, &member.name.name);
            let range = self.range(member.name.span);
            let real = self.project.store.new_type(TypeKind::Real);
            self.project.store.add_type(member_sig, real);
            let entry = self.project.store.signifier_mut(member_sig);
            entry.idx = Some(idx);
            entry.flags.set_writable(false);
            if entry.declare(range) {
                self.project.files[self.file.index()].declared.push(member_sig);
            }
            if let Some(value) = &member.value {
                self.expr(value);
            }
        }
    }
}

/// The property name of `global.name`
fn global_member(target: &Expr) -> Option<&Ident> {
    match &target.unparenthesized().kind {
        ExprKind::Member { object, property }
            if matches!(object.unparenthesized().kind, ExprKind::Context(ContextKeyword::Global)) =>
        {
            Some(property)
        }
        _ => None,
    }
}

/// The function type stored in a signifier's slot, created or converted as needed
pub(crate) fn function_slot(project: &mut Project, sig: SignifierId, kind: TypeKind, name: &str) -> TypeId {
    let ty = project.store.type_of(sig);
    let current = project.store.get_mut(ty);
    if current.kind.is_function() || current.is_unknown() {
        current.kind = kind;
        if current.name.is_none() {
            current.name = Some(name.to_string());
        }
        return ty;
    }
    // a global function has exactly one type
    *current = Type::named(kind, name);
    ty
}

/// The struct type built by a constructor, shared with `Struct.Name` references
pub(crate) fn constructs_of(project: &mut Project, ctor: TypeId, name: &str) -> TypeId {
    if let Some(existing) = project.store.get(ctor).constructs {
        return existing;
    }
    let key = format!("Struct.{name}");
    let constructs = match project.known_types.get(&key) {
        Some(known) => *known,
        None => project.store.alloc(Type::named(TypeKind::Struct, name)),
    };
    project.store.get_mut(ctor).constructs = Some(constructs);
    project.known_types.insert(key, constructs);
    constructs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collected(source: &str) -> (Project, FileId) {
        let mut project = Project::default();
        let file = project.add_file("scripts/test/test.gml", source);
        collect_globals(&mut project, file);
        (project, file)
    }

    #[test]
    fn test_collects_every_global_form() {
        let (project, file) = collected(
            "function add(a, b) { global.total = a + b; }\n\
             globalvar score;\n\
             #macro MAX 10\n\
             enum Color { red, green }\n\
             global.lives = 3;",
        );
        for name in ["add", "score", "MAX", "Color", "total", "lives"] {
            let sig = project.global(name).unwrap_or_else(|| panic!("{name} missing"));
            assert!(project.signifier(sig).is_declared(), "{name} not declared");
            assert_eq!(project.signifier(sig).def.map(|d| d.file()), Some(file));
        }
        assert!(project.signifier(project.global("MAX").unwrap()).flags.is_macro());
        assert!(project.file(file).unwrap().references().is_empty());
    }

    #[test]
    fn test_enum_members_are_indexed() {
        let (project, _) = collected("enum Color { red, green = 5, blue }");
        let color = project.global("Color").unwrap();
        let ty = project.type_of(color);
        assert_eq!(project.store().kind(ty), TypeKind::Enum);
        assert_eq!(project.known_type("Enum.Color"), Some(ty));
        let blue = project.store().member(ty, "blue").unwrap();
        assert_eq!(project.signifier(blue).idx, Some(2));
        assert_eq!(project.store().kind(project.type_of(blue)), TypeKind::Real);
    }

    #[test]
    fn test_constructor_inheritance() {
        let (project, _) = collected("function Child() : Base() constructor {}\nfunction Base() constructor {}");
        let child = project.known_type("Struct.Child").unwrap();
        let base = project.known_type("Struct.Base").unwrap();
        assert_eq!(project.store().get(child).parent, Some(base));
        let base_fn = project.type_of(project.global("Base").unwrap());
        assert_eq!(project.store().kind(base_fn), TypeKind::Constructor);
        assert_eq!(project.store().get(base_fn).constructs, Some(base));
    }

    #[test]
    fn test_nested_functions_stay_local() {
        let (project, _) = collected("function outer() { function inner() {} }\nwith (o_thing) { function odd() {} }");
        assert!(project.global("outer").is_some());
        assert!(project.global("inner").is_none());
        assert!(project.global("odd").is_none());
    }

    #[test]
    fn test_object_files_declare_no_functions() {
        let mut project = Project::default();
        let file = project.add_file("objects/o_player/Create_0.gml", "function jump() {}\nglobal.gravity = 1;");
        collect_globals(&mut project, file);
        assert!(project.global("jump").is_none());
        assert!(project.global("gravity").is_some());
    }
}
