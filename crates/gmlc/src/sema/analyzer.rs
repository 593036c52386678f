//! Symbol pass: the per-file walk
//!
//! Resolves every identifier to a signifier, records references, declares
//! locals and members, and infers types by merging what each assignment and
//! doc comment says. Scope ranges are cut as the walk enters and leaves
//! function bodies, `with` blocks and struct literals.
//!
//! Expression handling lives in `expr.rs`.

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::globals::{constructs_of, function_slot};
use super::selves::{SelfData, SelfKind};
use crate::common::{FileId, Range, Referent, ScopeId, SelfId, SignifierId, Span, TypeId};
use crate::frontend::cst::{
    Arg, AssignOp, Block, Declarator, EnumDecl, Expr, ExprKind, FunctionExpr, Ident, MacroDecl, Stmt, StmtKind,
};
use crate::frontend::{parse_jsdoc, Jsdoc};
use crate::project::{Access, Project};
use crate::types::{AssetKind, FeatherContext, Type, TypeKind};

#[tracing::instrument(level = "debug", skip_all, fields(file = %file))]
pub(crate) fn analyze_file(project: &mut Project, file: FileId) {
    let index = file.index();
    let program = std::mem::take(&mut project.files[index].program);
    let self_id = project.files[index].self_id;
    let top_scope = project.files[index].top_scope;

    let mut analyzer = Analyzer {
        project: &mut *project,
        file,
        selves: vec![self_id],
        locals: vec![top_scope],
        returns: Vec::new(),
        function_depth: 0,
        file_self: self_id,
    };
    analyzer.stmts(&program.stmts);

    let file_data = &mut project.files[index];
    let end = file_data.text.len();
    file_data.scopes.close(end);
    tracing::debug!(
        refs = file_data.refs.len(),
        scopes = file_data.scopes.len(),
        findings = file_data.findings.len(),
        "walked file"
    );
    file_data.program = program;
}

pub(crate) struct Analyzer<'p> {
    pub(super) project: &'p mut Project,
    pub(super) file: FileId,
    /// Innermost last
    selves: Vec<SelfId>,
    locals: Vec<ScopeId>,
    /// Return types seen in each enclosing function body
    returns: Vec<Vec<TypeId>>,
    function_depth: usize,
    file_self: SelfId,
}

fn doc_of(stmt: &Stmt) -> Option<Jsdoc> {
    let doc = parse_jsdoc(&stmt.doc.as_ref()?.text);
    (!doc.is_empty()).then_some(doc)
}

impl Analyzer<'_> {
    // ==================== Context ====================

    pub(super) fn range(&self, span: Span) -> Range {
        Range::new(self.file, span)
    }

    pub(super) fn current_self(&self) -> SelfId {
        self.selves.last().copied().unwrap_or(self.project.global_self)
    }

    /// The self active outside the innermost `with`
    pub(super) fn outer_self(&self) -> SelfId {
        match self.selves.len() {
            0 | 1 => self.project.global_self,
            n => self.selves[n - 2],
        }
    }

    pub(super) fn self_type(&self) -> TypeId {
        self.project.self_data(self.current_self()).ty
    }

    pub(super) fn self_is_global(&self) -> bool {
        self.project.self_data(self.current_self()).is_global()
    }

    fn local(&self) -> ScopeId {
        self.locals.last().copied().unwrap_or(self.project.files[self.file.index()].top_scope)
    }

    pub(super) fn new_type(&mut self, kind: TypeKind) -> TypeId {
        self.project.store.new_type(kind)
    }

    pub(super) fn finding(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, self.range(span), message);
        self.project.files[self.file.index()].findings.push(diagnostic);
    }

    /// Open a scope range at `at`, optionally swapping the self or local scope
    fn enter(&mut self, at: usize, self_id: Option<SelfId>, local: Option<ScopeId>) {
        self.selves.extend(self_id);
        self.locals.extend(local);
        self.sync_range(at);
    }

    fn leave(&mut self, at: usize, pop_self: bool, pop_local: bool) {
        if pop_self {
            self.selves.pop();
        }
        if pop_local {
            self.locals.pop();
        }
        self.sync_range(at);
    }

    fn sync_range(&mut self, at: usize) {
        let (self_id, local) = (self.current_self(), self.local());
        let range = self.project.files[self.file.index()].scopes.create_next(at);
        range.self_id = self_id;
        range.local = local;
    }

    // ==================== Signifiers ====================

    pub(super) fn reference(&mut self, sig: SignifierId, span: Span) {
        let range = self.range(span);
        let is_declaration = self.project.store.signifier(sig).def == Some(range);
        self.project.add_ref(Referent::Signifier(sig), range, is_declaration);
    }

    /// A reference that should be reported if its signifier is never declared
    pub(super) fn access(&mut self, sig: SignifierId, span: Span, via_global: bool) {
        self.reference(sig, span);
        if self.project.store.signifier(sig).flags.local() {
            return;
        }
        let range = self.range(span);
        self.project.files[self.file.index()].accesses.push(Access {
            signifier: sig,
            range,
            via_global,
        });
    }

    pub(super) fn declare(&mut self, sig: SignifierId, span: Span) -> bool {
        let range = self.range(span);
        let declared = self.project.store.signifier_mut(sig).declare(range);
        if declared {
            self.project.files[self.file.index()].declared.push(sig);
        }
        declared
    }

    /// Local scope, then the current self, then the global self
    pub(super) fn lookup(&self, name: &str) -> Option<SignifierId> {
        if let Some(sig) = self.project.scope(self.local()).get(name) {
            return Some(sig);
        }
        if !self.self_is_global() {
            if let Some(sig) = self.project.store.member_in_chain(self.self_type(), name) {
                return Some(sig);
            }
        }
        self.project.global(name)
    }

    /// Signifier for a name nothing declares yet: a global in scripts, a
    /// member of the current self anywhere else
    pub(super) fn unresolved(&mut self, name: &str) -> SignifierId {
        if self.self_is_global() {
            return self.project.ensure_global(name);
        }
        let self_ty = self.self_type();
        let sig = self.project.store.add_member(self_ty, name);
        self.project.store.signifier_mut(sig).flags.set_instance(true);
        sig
    }

    /// Reference the local of that name in the current scope, or declare it
    fn add_symbol(&mut self, ident: &Ident) -> SignifierId {
        let scope = self.local();
        if let Some(existing) = self.project.scope(scope).get(&ident.name) {
            self.reference(existing, ident.span);
            return existing;
        }
        let sig = self.project.store.new_local(ident.name.as_str(), scope);
        self.declare(sig, ident.span);
        self.project.scopes[scope.index()].insert(ident.name.as_str(), sig);
        self.reference(sig, ident.span);
        sig
    }

    pub(super) fn feather(&mut self, text: &str, templates: &[String]) -> TypeId {
        let project = &mut *self.project;
        let ctx = FeatherContext {
            known: Some(&project.known_types),
            templates,
        };
        project.store.type_from_feather_in(text, ctx)
    }

    /// Merge an assigned type into a signifier, checking it against a
    /// `@type` doc tag when there is one
    pub(super) fn assign_type(&mut self, sig: SignifierId, ty: TypeId, doc: Option<&Jsdoc>, span: Span) {
        if let Some(doc) = doc {
            if let Some(text) = &doc.ty {
                let declared = self.feather(text, &doc.templates);
                let store = &self.project.store;
                let conflicting =
                    !store.get(ty).is_unknown() && !store.narrows(ty, declared) && !store.narrows(declared, ty);
                if conflicting {
                    let message = format!(
                        "inferred type `{}` does not match declared type `{}`",
                        store.to_feather_string(ty),
                        store.to_feather_string(declared)
                    );
                    self.finding(DiagnosticKind::JsdocMismatch, span, message);
                }
                self.project.store.signifier_mut(sig).declared_type = Some(declared);
                self.project.store.add_type(sig, declared);
            }
            if !doc.description.is_empty() {
                self.project.store.signifier_mut(sig).description = Some(doc.description.clone());
            }
            if doc.deprecated {
                self.project.store.signifier_mut(sig).flags.set_deprecated(true);
            }
        }
        self.project.store.add_type(sig, ty);
    }

    /// Named struct types resolve to the shared type registered for them
    pub(super) fn canonical(&self, ty: TypeId) -> TypeId {
        let node = self.project.store.get(ty);
        match (&node.kind, &node.name) {
            (TypeKind::Struct, Some(name)) => self.project.known_type(&format!("Struct.{name}")).unwrap_or(ty),
            _ => ty,
        }
    }

    // ==================== Statements ====================

    pub(super) fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn block(&mut self, block: &Block) {
        self.stmts(&block.stmts);
    }

    fn stmt(&mut self, stmt: &Stmt) {
        let doc = doc_of(stmt);
        let doc = doc.as_ref();
        match &stmt.kind {
            StmtKind::Var(decls) => {
                for decl in decls {
                    self.var_decl(decl, doc);
                }
            }
            StmtKind::Static(decls) => {
                for decl in decls {
                    self.static_decl(decl, doc);
                }
            }
            StmtKind::GlobalVar(names) => {
                for name in names {
                    if let Some(sig) = self.project.global(&name.name) {
                        self.reference(sig, name.span);
                    }
                }
            }
            StmtKind::Function(function) => self.function_stmt(function, doc),
            StmtKind::Enum(decl) => self.enum_decl(decl),
            StmtKind::Macro(decl) => self.macro_decl(decl),
            StmtKind::Assign { target, op, value } => self.assign(target, *op, value, doc),
            StmtKind::Expr(expr) | StmtKind::Throw(expr) | StmtKind::Delete(expr) => {
                self.expr(expr);
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
            StmtKind::While { condition, body } | StmtKind::Repeat { count: condition, body } => {
                self.expr(condition);
                self.stmt(body);
            }
            StmtKind::DoUntil { body, condition } => {
                self.stmt(body);
                self.expr(condition);
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
            StmtKind::With { target, body } => self.with_stmt(target, body, doc),
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
                    if let Some(param) = &catch.param {
                        let sig = self.add_symbol(param);
                        let any = self.new_type(TypeKind::Any);
                        self.project.store.add_type(sig, any);
                    }
                    self.block(&catch.body);
                }
                if let Some(finally) = finally {
                    self.block(finally);
                }
            }
            StmtKind::Return(value) => {
                let ty = match value {
                    Some(value) => self.expr(value),
                    None => self.new_type(TypeKind::Undefined),
                };
                if let Some(returns) = self.returns.last_mut() {
                    returns.push(ty);
                }
            }
            StmtKind::Block(block) => self.block(block),
            StmtKind::Exit | StmtKind::Break | StmtKind::Continue | StmtKind::Error => {}
        }
    }

    /// Type of an assigned value; function literals take the assigned name
    pub(super) fn value_type(&mut self, value: &Expr, name: &str, doc: Option<&Jsdoc>) -> TypeId {
        match &value.unparenthesized().kind {
            ExprKind::Function(function) => self.visit_function(function, None, doc, Some(name)),
            _ => self.expr(value),
        }
    }

    fn var_decl(&mut self, decl: &Declarator, doc: Option<&Jsdoc>) {
        let ty = match &decl.init {
            Some(init) => self.value_type(init, &decl.name.name, doc),
            None => self.new_type(TypeKind::Unknown),
        };
        let sig = self.add_symbol(&decl.name);
        let is_function = decl.init.as_ref().is_some_and(|init| matches!(init.unparenthesized().kind, ExprKind::Function(_)));
        self.assign_type(sig, ty, doc.filter(|_| !is_function), decl.name.span);
    }

    fn static_decl(&mut self, decl: &Declarator, doc: Option<&Jsdoc>) {
        let ty = match &decl.init {
            Some(init) => self.value_type(init, &decl.name.name, doc),
            None => self.new_type(TypeKind::Unknown),
        };
        let self_ty = self.self_type();
        let sig = self.project.store.add_member(self_ty, &decl.name.name);
        self.project.store.signifier_mut(sig).flags.set_static(true);
        self.declare(sig, decl.name.span);
        self.reference(sig, decl.name.span);
        self.assign_type(sig, ty, None, decl.name.span);
    }

    fn function_stmt(&mut self, function: &FunctionExpr, doc: Option<&Jsdoc>) {
        let Some(name) = &function.name else {
            self.visit_function(function, None, doc, None);
            return;
        };
        let at_file_top = self.function_depth == 0 && self.current_self() == self.file_self;
        let declared_globally = at_file_top && self.self_is_global();
        let sig = match self.project.global(&name.name) {
            Some(sig) if declared_globally => sig,
            _ if self.self_is_global() => {
                let sig = self.project.ensure_global(&name.name);
                self.declare(sig, name.span);
                sig
            }
            _ => {
                let self_ty = self.self_type();
                let sig = self.project.store.add_member(self_ty, &name.name);
                self.project.store.signifier_mut(sig).flags.set_instance(true);
                self.declare(sig, name.span);
                sig
            }
        };
        self.reference(sig, name.span);
        self.visit_function(function, Some(sig), doc, None);
    }

    /// Walk a function literal or declaration and return its type.
    ///
    /// With a signifier, the function type lives in that signifier's slot;
    /// otherwise a fresh type is created.
    pub(super) fn visit_function(
        &mut self,
        function: &FunctionExpr,
        sig: Option<SignifierId>,
        doc: Option<&Jsdoc>,
        fallback_name: Option<&str>,
    ) -> TypeId {
        let kind = if function.is_constructor {
            TypeKind::Constructor
        } else {
            TypeKind::Function
        };
        let name = function
            .name
            .as_ref()
            .map(|ident| ident.name.as_str())
            .or(fallback_name)
            .unwrap_or("");
        let fn_ty = match sig {
            Some(sig) => function_slot(self.project, sig, kind, name),
            None if name.is_empty() => self.project.store.alloc(Type::new(kind)),
            None => self.project.store.alloc(Type::named(kind, name)),
        };
        let constructs = if function.is_constructor {
            let label = if name.is_empty() { "anonymous" } else { name };
            Some(constructs_of(self.project, fn_ty, label))
        } else {
            self.project.store.get_mut(fn_ty).constructs = None;
            None
        };

        let templates = doc.map(|doc| doc.templates.clone()).unwrap_or_default();
        if let (Some(sig), Some(doc)) = (sig, doc) {
            let entry = self.project.store.signifier_mut(sig);
            if !doc.description.is_empty() {
                entry.description = Some(doc.description.clone());
            }
            entry.flags.set_deprecated(doc.deprecated);
        }

        let context = match (constructs, doc.and_then(|doc| doc.self_type.as_deref())) {
            (Some(constructs), _) => self.project.struct_self(constructs),
            (None, Some(text)) => self.doc_self(text),
            (None, None) => self.current_self(),
        };
        let context_ty = self.project.self_data(context).ty;
        self.project.store.get_mut(fn_ty).context = Some(context_ty);

        let local = self.project.new_scope(self.file);
        self.enter(function.params_span.start, Some(context), Some(local));
        self.returns.push(Vec::new());
        self.function_depth += 1;

        self.params(function, fn_ty, doc, &templates);
        if let Some(parent) = &function.parent {
            let parent_sig = match self.lookup(&parent.name.name) {
                Some(sig) => sig,
                None => self.unresolved(&parent.name.name),
            };
            self.access(parent_sig, parent.name.span, false);
            self.args(&parent.args);
        }
        self.block(&function.body);

        self.function_depth -= 1;
        let returns = self.returns.pop().unwrap_or_default();
        let returns = match doc.and_then(|doc| doc.returns.as_deref()) {
            Some(text) => self.feather(text, &templates),
            None if returns.is_empty() => self.new_type(TypeKind::Undefined),
            None => {
                let merged = self.new_type(TypeKind::Unknown);
                for ty in returns {
                    self.project.store.merge_types(merged, ty);
                }
                merged
            }
        };
        self.project.store.get_mut(fn_ty).returns = Some(returns);
        self.leave(function.body.span.end, true, true);
        fn_ty
    }

    fn args(&mut self, args: &[Arg]) {
        for arg in args {
            if let Some(expr) = &arg.expr {
                self.expr(expr);
            }
        }
    }

    fn params(&mut self, function: &FunctionExpr, fn_ty: TypeId, doc: Option<&Jsdoc>, templates: &[String]) {
        for (idx, param) in function.params.iter().enumerate() {
            let doc_param = doc.and_then(|doc| doc.params.get(idx));
            let doc_param = match doc_param {
                Some(documented) if documented.name != param.name.name && !documented.is_variadic() => {
                    let message = format!(
                        "`@param {}` does not match parameter `{}`",
                        documented.name, param.name.name
                    );
                    self.finding(DiagnosticKind::JsdocMismatch, param.name.span, message);
                    None
                }
                other => other,
            };

            let sig = self.project.store.add_param(fn_ty, idx, &param.name.name);
            let optional = param.default.is_some() || doc_param.is_some_and(|documented| documented.optional);
            {
                let entry = self.project.store.signifier_mut(sig);
                entry.flags.set_parameter(true);
                entry.flags.set_optional(optional);
                if let Some(documented) = doc_param.filter(|documented| !documented.description.is_empty()) {
                    entry.description = Some(documented.description.clone());
                }
            }
            self.declare(sig, param.name.span);
            let scope = self.local();
            self.project.scopes[scope.index()].insert(param.name.name.as_str(), sig);
            self.reference(sig, param.name.span);

            let ty = match (doc_param.and_then(|documented| documented.ty.as_deref()), &param.default) {
                (Some(text), _) => self.feather(text, templates),
                (None, Some(default)) => self.expr(default),
                (None, None) => self.new_type(TypeKind::Any),
            };
            self.project.store.add_type(sig, ty);
        }

        // documented parameters beyond the written ones, such as `...`
        let Some(doc) = doc else {
            return;
        };
        for (idx, documented) in doc.params.iter().enumerate().skip(function.params.len()) {
            let sig = self.project.store.add_param(fn_ty, idx, &documented.name);
            self.project.store.signifier_mut(sig).flags.set_optional(documented.optional || documented.is_variadic());
            let ty = match &documented.ty {
                Some(text) => self.feather(text, templates),
                None => self.new_type(TypeKind::Any),
            };
            self.project.store.add_type(sig, ty);
        }
    }

    /// Self named by a `@self` tag
    fn doc_self(&mut self, text: &str) -> SelfId {
        let ty = self.feather(text, &[]);
        let ty = self.canonical(ty);
        match self.project.store.kind(ty) {
            TypeKind::Struct => self.project.struct_self(ty),
            TypeKind::Constructor | TypeKind::Function => match self.project.store.get(ty).constructs {
                Some(constructs) => self.project.struct_self(constructs),
                None => self.current_self(),
            },
            TypeKind::Asset(AssetKind::GMObject) => self.object_self(ty).unwrap_or_else(|| self.current_self()),
            _ => self.current_self(),
        }
    }

    pub(super) fn object_self(&self, ty: TypeId) -> Option<SelfId> {
        let name = self.project.store.get(ty).name.as_deref()?;
        self.project.object_self(name)
    }

    fn with_stmt(&mut self, target: &Expr, body: &Stmt, doc: Option<&Jsdoc>) {
        let ty = self.expr(target);
        let self_id = match doc.and_then(|doc| doc.self_type.as_deref()) {
            Some(text) => self.doc_self(text),
            None => self.with_self(ty),
        };
        self.enter(body.span.start, Some(self_id), None);
        self.stmt(body);
        self.leave(body.span.end, true, false);
    }

    /// Self a `with` block runs against
    fn with_self(&mut self, ty: TypeId) -> SelfId {
        let ty = self.canonical(ty);
        if ty == self.project.global_type() {
            return self.project.global_self;
        }
        let project = &*self.project;
        if let Some(id) = project.objects.values().copied().find(|id| project.self_data(*id).ty == ty) {
            return id;
        }
        match self.project.store.kind(ty) {
            TypeKind::Struct => self.project.struct_self(ty),
            TypeKind::Asset(AssetKind::GMObject) => match self.object_self(ty) {
                Some(id) => id,
                None => self.anonymous_self(SelfKind::Asset),
            },
            _ => self.anonymous_self(SelfKind::Struct),
        }
    }

    pub(super) fn anonymous_self(&mut self, kind: SelfKind) -> SelfId {
        let ty = self.new_type(TypeKind::Struct);
        let id = self.project.new_self(SelfData::new(kind, ty));
        self.project.struct_selves.insert(ty, id);
        id
    }

    pub(super) fn enter_struct(&mut self, at: usize, self_id: SelfId) {
        self.enter(at, Some(self_id), None);
    }

    pub(super) fn leave_struct(&mut self, at: usize) {
        self.leave(at, true, false);
    }

    fn enum_decl(&mut self, decl: &EnumDecl) {
        let Some(sig) = self.project.global(&decl.name.name) else {
            return;
        };
        self.reference(sig, decl.name.span);
        let ty = self.project.store.type_of(sig);
        for member in &decl.members {
            if let Some(member_sig) = self.project.store.member(ty, &member.name.name) {
                self.reference(member_sig, member.name.span);
            }
            if let Some(value) = &member.value {
                self.expr(value);
            }
        }
    }

    fn macro_decl(&mut self, decl: &MacroDecl) {
        let value = decl.value.as_ref().map(|value| self.expr(value));
        let Some(sig) = self.project.global(&decl.name.name) else {
            return;
        };
        self.reference(sig, decl.name.span);
        if let Some(value) = value {
            self.project.store.add_type(sig, value);
        }
    }

    // ==================== Assignment ====================

    fn assign(&mut self, target: &Expr, op: AssignOp, value: &Expr, doc: Option<&Jsdoc>) {
        let name = match &target.unparenthesized().kind {
            ExprKind::Ident(ident) => ident.name.as_str(),
            ExprKind::Member { property, .. } => property.name.as_str(),
            _ => "",
        };
        let is_function = matches!(value.unparenthesized().kind, ExprKind::Function(_));
        let value_ty = self.value_type(value, name, doc);
        let ty = match op {
            AssignOp::Assign | AssignOp::Nullish => value_ty,
            AssignOp::Add if self.project.store.kind(value_ty) == TypeKind::String => value_ty,
            _ => self.new_type(TypeKind::Real),
        };
        let doc = doc.filter(|_| !is_function);

        match &target.unparenthesized().kind {
            ExprKind::Ident(ident) => self.assign_ident(ident, ty, doc),
            ExprKind::Member { object, property } => self.assign_member(object, property, ty, doc),
            ExprKind::Index { object, indices, .. } => {
                let container = self.expr(object);
                for index in indices {
                    self.expr(index);
                }
                if self.project.store.kind(container) == TypeKind::Array {
                    // item types may be shared with the type the array was copied from
                    let items = match self.project.store.get(container).items {
                        Some(items) => self.project.store.clone_type(items),
                        None => self.new_type(TypeKind::Unknown),
                    };
                    self.project.store.get_mut(container).items = Some(items);
                    self.project.store.merge_types(items, ty);
                }
            }
            _ => {
                self.expr(target);
            }
        }
    }

    fn assign_ident(&mut self, ident: &Ident, ty: TypeId, doc: Option<&Jsdoc>) {
        let sig = match self.lookup(&ident.name) {
            Some(sig) => {
                let entry = self.project.store.signifier(sig);
                // globals are only declared by `globalvar` and `global.x = ...`
                let declarable = entry.def.is_none() && !entry.flags.global() && !entry.flags.native();
                if declarable {
                    self.declare(sig, ident.span);
                }
                sig
            }
            None if self.self_is_global() => self.project.ensure_global(&ident.name),
            None => {
                let sig = self.unresolved(&ident.name);
                self.declare(sig, ident.span);
                sig
            }
        };
        self.access(sig, ident.span, false);
        self.assign_type(sig, ty, doc, ident.span);
    }

    fn assign_member(&mut self, object: &Expr, property: &Ident, ty: TypeId, doc: Option<&Jsdoc>) {
        if let Some(sig) = self.global_member(object, property) {
            self.assign_type(sig, ty, doc, property.span);
            return;
        }
        let object_ty = self.expr(object);
        let Some(container) = self.member_container(object_ty) else {
            return;
        };
        let sig = match self.project.store.member_in_chain(container, &property.name) {
            Some(sig) => sig,
            None if self.project.store.kind(container) == TypeKind::Struct => {
                let sig = self.project.store.add_member(container, &property.name);
                self.project.store.signifier_mut(sig).flags.set_instance(true);
                sig
            }
            None => return,
        };
        let entry = self.project.store.signifier(sig);
        if entry.def.is_none() && !entry.flags.native() && !entry.flags.global() {
            self.declare(sig, property.span);
        }
        self.reference(sig, property.span);
        self.assign_type(sig, ty, doc, property.span);
    }
}
