//! The project registry
//!
//! A [`Project`] owns every arena of an analysis: the type store, selves,
//! local scopes and files. Analysis runs in three stages over the files in
//! insertion order:
//! 1. Collect global declarations from every file
//! 2. Walk every file, resolving identifiers and inferring types
//! 3. Compute each file's diagnostics
//!
//! Because globals are collected before any file is walked, cross-file
//! visibility does not depend on load order.

mod config;
mod file;
mod query;
mod rename;

pub use config::AnalysisConfig;
pub use file::{Access, CallSite, SourceFile};
pub use query::ReferenceHit;
pub use rename::{FileEdits, TextEdit};

use crate::common::{AnalysisError, AnalysisResult, FileId, Range, Reference, Referent, ScopeId, SelfId, SignifierId, TypeId};
use crate::sema::{self, LocalScope, NativeSpec, SelfData, SelfKind};
use crate::types::{AssetKind, Liveness, Signifier, Type, TypeKind, TypeStore};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::Dispatch;

#[derive(Debug)]
pub struct Project {
    pub(crate) store: TypeStore,
    pub(crate) selves: Vec<SelfData>,
    pub(crate) scopes: Vec<LocalScope>,
    pub(crate) files: Vec<SourceFile>,
    /// Named types such as `Struct.Player`, shared by every doc comment that names them
    pub(crate) known_types: FxHashMap<String, TypeId>,
    pub(crate) global_self: SelfId,
    /// Parent of every instance self's type; holds the built-in instance variables
    pub(crate) instance_base: TypeId,
    pub(crate) objects: FxHashMap<String, SelfId>,
    /// Self of each constructor or struct type, created on first use
    pub(crate) struct_selves: FxHashMap<TypeId, SelfId>,
    free_selves: Vec<SelfId>,
    config: AnalysisConfig,
    dispatch: Option<Dispatch>,
}

impl Project {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_natives(config, &NativeSpec::embedded())
    }

    pub fn with_natives(config: AnalysisConfig, natives: &NativeSpec) -> Self {
        let mut store = TypeStore::new();
        store.max_depth = config.max_generic_depth;
        let global_ty = store.alloc(Type::named(TypeKind::Struct, "global"));
        let instance_base = store.alloc(Type::named(TypeKind::Struct, "instance"));

        let mut project = Self {
            store,
            selves: vec![SelfData::new(SelfKind::Global, global_ty).named("global")],
            scopes: Vec::new(),
            files: Vec::new(),
            known_types: FxHashMap::default(),
            global_self: SelfId::new(0),
            instance_base,
            objects: FxHashMap::default(),
            struct_selves: FxHashMap::default(),
            free_selves: Vec::new(),
            config,
            dispatch: None,
        };
        natives.install(&mut project);
        project
    }

    /// Route this project's log output to `dispatch` instead of the
    /// thread's default subscriber
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    fn in_dispatch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        match self.dispatch.clone() {
            Some(dispatch) => tracing::dispatcher::with_default(&dispatch, || f(self)),
            None => f(self),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    pub fn signifier(&self, id: SignifierId) -> &Signifier {
        self.store.signifier(id)
    }

    pub fn type_of(&self, id: SignifierId) -> TypeId {
        self.store.type_of(id)
    }

    pub fn self_data(&self, id: SelfId) -> &SelfData {
        &self.selves[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &LocalScope {
        &self.scopes[id.index()]
    }

    pub fn global_self(&self) -> SelfId {
        self.global_self
    }

    /// A member of the global self, declared or not
    pub fn global(&self, name: &str) -> Option<SignifierId> {
        self.store.member(self.global_type(), name)
    }

    /// Every declared global, in registration order
    pub fn globals(&self) -> Vec<SignifierId> {
        self.store
            .members(self.global_type())
            .into_iter()
            .filter(|id| self.signifier(*id).is_declared())
            .collect()
    }

    pub fn known_type(&self, name: &str) -> Option<TypeId> {
        self.known_types.get(name).copied()
    }

    /// Instance self of a named object
    pub fn object_self(&self, name: &str) -> Option<SelfId> {
        self.objects.get(name).copied()
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    pub fn file_id(&self, name: &str) -> Option<FileId> {
        self.files.iter().find(|file| file.name == name).map(|file| file.id)
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub(crate) fn global_type(&self) -> TypeId {
        self.selves[self.global_self.index()].ty
    }

    /// Register a file. Files under `objects/<name>/` run against that
    /// object's instance self; every other file is a script.
    ///
    /// Nothing is analyzed until [`analyze_all`](Self::analyze_all).
    pub fn add_file(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let name = name.into();
        let id = FileId::new(self.files.len());
        let self_id = match object_name(&name) {
            Some(object) => self.instance_self(&object),
            None => self.global_self,
        };
        let top_scope = self.new_scope(id);
        tracing::debug!(file = %name, %id, self_id = %self_id, "adding file");
        self.files.push(SourceFile::new(id, name, text.into(), self_id, top_scope));
        id
    }

    /// Analyze every file from scratch
    pub fn analyze_all(&mut self) {
        self.in_dispatch(|project| {
            let ids: Vec<FileId> = project.files.iter().map(|file| file.id).collect();
            for id in &ids {
                project.reset_file(*id);
            }
            project.reclaim();
            for id in &ids {
                sema::collect_globals(project, *id);
            }
            for id in &ids {
                sema::analyze_file(project, *id);
            }
            for id in &ids {
                project.refresh_diagnostics(*id);
            }
            tracing::info!(files = ids.len(), types = project.store.type_count(), "analysis complete");
        });
    }

    /// Replace one file's text and analyze it again.
    ///
    /// Diagnostics are recomputed for this file and for every other file
    /// referencing a signifier this file touched before or after the edit.
    pub fn reparse(&mut self, id: FileId, text: impl Into<String>) -> AnalysisResult<()> {
        if self.file(id).is_none() {
            return Err(AnalysisError::unknown_file(id.to_string()));
        }
        let text = text.into();
        self.in_dispatch(|project| {
            let mut touched = project.reset_file(id);
            project.reclaim();
            project.files[id.index()].set_text(text);
            sema::collect_globals(project, id);
            sema::analyze_file(project, id);
            touched.extend(project.files[id.index()].refs.iter().map(|r| r.referent));

            project.refresh_diagnostics(id);
            let dependents: Vec<FileId> = project
                .files
                .iter()
                .filter(|file| file.id != id && file.refs.iter().any(|r| touched.contains(&r.referent)))
                .map(|file| file.id)
                .collect();
            tracing::debug!(file = %id, dependents = dependents.len(), "reparsed file");
            for other in dependents {
                project.refresh_diagnostics(other);
            }
        });
        Ok(())
    }

    /// Record one occurrence of `referent` in both the referent's list and
    /// the file's offset index
    pub fn add_ref(&mut self, referent: Referent, range: Range, is_declaration: bool) {
        let reference = Reference::new(referent, range, is_declaration);
        match referent {
            Referent::Signifier(id) => self.store.signifier_mut(id).refs.push(reference),
            Referent::SelfRef(id) => self.selves[id.index()].refs.push(reference),
        }
        if let Some(file) = self.files.get_mut(range.file().index()) {
            file.insert_ref(reference);
        }
    }

    fn referent_refs_mut(&mut self, referent: Referent) -> &mut Vec<Reference> {
        match referent {
            Referent::Signifier(id) => &mut self.store.signifier_mut(id).refs,
            Referent::SelfRef(id) => &mut self.selves[id.index()].refs,
        }
    }

    /// Get or create a global signifier
    pub(crate) fn ensure_global(&mut self, name: &str) -> SignifierId {
        let global_ty = self.global_type();
        let sig = self.store.add_member(global_ty, name);
        self.store.signifier_mut(sig).flags.set_global(true);
        sig
    }

    /// A fresh local scope for `file`, reusing one of its spare scopes first
    pub(crate) fn new_scope(&mut self, file: FileId) -> ScopeId {
        let spare = self.files.get_mut(file.index()).and_then(|f| f.spare_scopes.pop());
        let id = match spare {
            Some(id) => {
                self.scopes[id.index()].clear();
                id
            }
            None => {
                let id = ScopeId::new(self.scopes.len());
                self.scopes.push(LocalScope::new(id, file));
                id
            }
        };
        if let Some(source) = self.files.get_mut(file.index()) {
            source.owned_scopes.push(id);
        }
        id
    }

    pub(crate) fn new_self(&mut self, data: SelfData) -> SelfId {
        if let Some(id) = self.free_selves.pop() {
            self.selves[id.index()] = data;
            return id;
        }
        let id = SelfId::new(self.selves.len());
        self.selves.push(data);
        id
    }

    /// The self whose variables are the members of `ty`
    pub(crate) fn struct_self(&mut self, ty: TypeId) -> SelfId {
        if let Some(id) = self.struct_selves.get(&ty) {
            return *id;
        }
        let mut data = SelfData::new(SelfKind::Struct, ty);
        data.name.clone_from(&self.store.get(ty).name);
        let id = self.new_self(data);
        self.struct_selves.insert(ty, id);
        id
    }

    /// Instance self of an object, registering the object's asset name as a
    /// global on first use
    pub(crate) fn instance_self(&mut self, object: &str) -> SelfId {
        if let Some(id) = self.objects.get(object) {
            return *id;
        }
        let mut ty = Type::named(TypeKind::Struct, object);
        ty.parent = Some(self.instance_base);
        let ty = self.store.alloc(ty);
        let id = self.new_self(SelfData::new(SelfKind::Instance, ty).named(object));
        self.objects.insert(object.to_string(), id);

        let asset = self.ensure_global(object);
        let asset_ty = self.store.alloc(Type::named(TypeKind::Asset(AssetKind::GMObject), object));
        self.store.add_type(asset, asset_ty);
        let sig = self.store.signifier_mut(asset);
        sig.flags.set_asset(true);
        sig.flags.set_writable(false);
        id
    }

    /// Forget everything a previous analysis of this file recorded and
    /// return the referents its references pointed at
    fn reset_file(&mut self, id: FileId) -> FxHashSet<Referent> {
        let index = id.index();
        let old_refs = std::mem::take(&mut self.files[index].refs);
        let touched: FxHashSet<Referent> = old_refs.iter().map(|r| r.referent).collect();
        for referent in &touched {
            self.referent_refs_mut(*referent).retain(|r| r.file() != id);
        }

        let declared = std::mem::take(&mut self.files[index].declared);
        for sig in declared {
            let entry = self.store.signifier_mut(sig);
            if !entry.def.is_some_and(|def| def.file() == id) {
                continue;
            }
            entry.def = None;
            entry.description = None;
            entry.declared_type = None;
            entry.flags.set_macro(false);
            let ty = entry.ty;
            self.store.reset_type(ty);
        }

        let file = &mut self.files[index];
        let mut owned = std::mem::take(&mut file.owned_scopes);
        file.spare_scopes.append(&mut owned);
        for scope in file.spare_scopes.clone() {
            self.scopes[scope.index()].clear();
        }
        let top_scope = self.new_scope(id);
        self.files[index].reset(top_scope);
        touched
    }

    /// Release every type, signifier and self that no file, registry or
    /// live type still reaches
    fn reclaim(&mut self) {
        let mut live = Liveness::new(&self.store);
        let mut live_selves = vec![false; self.selves.len()];
        let mut root_selves = vec![self.global_self];
        root_selves.extend(self.objects.values().copied());

        live.mark_type(self.instance_base);
        for ty in self.known_types.values() {
            live.mark_type(*ty);
        }
        for scope in &self.scopes {
            for sig in scope.symbols() {
                live.mark_signifier(sig);
            }
        }
        for file in &self.files {
            root_selves.push(file.self_id);
            root_selves.extend(file.scopes.iter().map(|range| range.self_id));
            for reference in &file.refs {
                match reference.referent {
                    Referent::Signifier(sig) => live.mark_signifier(sig),
                    Referent::SelfRef(id) => root_selves.push(id),
                }
            }
            for sig in &file.declared {
                live.mark_signifier(*sig);
            }
            for access in &file.accesses {
                live.mark_signifier(access.signifier);
            }
            for call in &file.calls {
                live.mark_signifier(call.callee);
            }
        }
        for id in root_selves {
            if !live_selves[id.index()] {
                live_selves[id.index()] = true;
                live.mark_type(self.selves[id.index()].ty);
            }
        }

        // a struct's self lives exactly as long as its type
        loop {
            live.propagate(&self.store);
            let mut changed = false;
            for (ty, id) in &self.struct_selves {
                if !live_selves[id.index()] && live.is_type_live(*ty) {
                    live_selves[id.index()] = true;
                    live.mark_type(self.selves[id.index()].ty);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        self.struct_selves.retain(|_, id| live_selves[id.index()]);

        let mut free = vec![false; self.selves.len()];
        for id in &self.free_selves {
            free[id.index()] = true;
        }
        let mut released_selves = 0;
        for (index, is_live) in live_selves.iter().enumerate() {
            if *is_live || free[index] {
                continue;
            }
            self.selves[index] = SelfData::new(SelfKind::Struct, self.instance_base);
            self.free_selves.push(SelfId::new(index));
            released_selves += 1;
        }
        let (types, signifiers) = self.store.sweep(&live);
        tracing::debug!(types, signifiers, selves = released_selves, "reclaimed unreachable slots");
    }

    fn refresh_diagnostics(&mut self, id: FileId) {
        let diagnostics = sema::file_diagnostics(self, id);
        tracing::debug!(file = %id, count = diagnostics.len(), "computed diagnostics");
        self.files[id.index()].diagnostics = diagnostics;
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Object name from a path such as `objects/o_player/Create_0.gml`
fn object_name(path: &str) -> Option<String> {
    let mut parts = path.split(['/', '\\']);
    parts.find(|part| part.eq_ignore_ascii_case("objects"))?;
    let name = parts.next()?;
    // the object directory must be followed by an event file
    parts.next()?;
    (!name.is_empty()).then(|| name.to_string())
}
