//! Analysis driver and pipeline orchestration

use crate::common::{AnalysisResult, DiagnosticReporter};
use crate::frontend::{dump_cst, dump_tokens, FrontendConfig};
use crate::project::{AnalysisConfig, Project};
use crate::sema::{NativeSpec, Severity};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads GML sources from disk into an analyzed [`Project`]
pub struct Pipeline {
    config: AnalysisConfig,
    natives: NativeSpec,
    frontend: FrontendConfig,
}

/// Totals over every file of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            natives: NativeSpec::embedded(),
            frontend: FrontendConfig::default(),
        }
    }

    /// Replace the embedded native database
    pub fn with_natives(mut self, natives: NativeSpec) -> Self {
        self.natives = natives;
        self
    }

    pub fn with_frontend(mut self, frontend: FrontendConfig) -> Self {
        self.frontend = frontend;
        self
    }

    /// Every `.gml` file named by `paths`, walking directories, in a stable order
    pub fn collect_sources(paths: &[PathBuf]) -> AnalysisResult<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for path in paths {
            if path.is_dir() {
                walk(path, &mut sources)?;
            } else {
                sources.push(path.clone());
            }
        }
        sources.sort();
        sources.dedup();
        Ok(sources)
    }

    /// Read and analyze every source file, registering each with `reporter`
    /// under the same index as its [`FileId`](crate::common::FileId)
    pub fn load(&self, paths: &[PathBuf], reporter: &mut DiagnosticReporter) -> AnalysisResult<Project> {
        let mut project = Project::with_natives(self.config.clone(), &self.natives);
        for path in Self::collect_sources(paths)? {
            let text = fs::read_to_string(&path)?;
            let name = path.to_string_lossy().replace('\\', "/");

            if self.frontend.dump_tokens {
                eprintln!("=== Tokens: {name} ===\n{}", dump_tokens(&text));
            }
            if self.frontend.dump_cst {
                eprintln!("=== CST: {name} ===\n{}", dump_cst(&text));
            }
            if self.frontend.verbose {
                eprintln!("Loading {name}");
            }

            reporter.add_file(name.as_str(), text.as_str());
            project.add_file(name, text);
        }
        project.analyze_all();
        Ok(project)
    }

    /// Render every diagnostic of the project and count them by severity
    pub fn report(project: &Project, reporter: &DiagnosticReporter) -> Summary {
        let mut summary = Summary::default();
        for file in project.files() {
            summary.files += 1;
            for diagnostic in project.diagnostics(file.id) {
                match diagnostic.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.infos += 1,
                }
                reporter.emit(&diagnostic.to_codespan(file.id.index()));
            }
        }
        summary
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// One line per declared, non-native global: `name: Type`
pub fn type_listing(project: &Project) -> String {
    let store = project.store();
    let mut out = String::new();
    for id in project.globals() {
        let sig = project.signifier(id);
        if sig.flags.native() {
            continue;
        }
        let ty = sig.ty;
        let rendered = if store.get(ty).is_function() {
            store.code(ty)
        } else {
            format!("{}: {}", sig.name, store.to_feather_string(ty))
        };
        out.push_str(&rendered);
        out.push('\n');
    }
    out
}

fn walk(dir: &Path, sources: &mut Vec<PathBuf>) -> AnalysisResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "gml") {
            sources.push(path);
        }
    }
    Ok(())
}
