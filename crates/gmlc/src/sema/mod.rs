//! Semantic analysis
//!
//! Analysis of a project runs in stages:
//! 1. `globals` declares every script-level function, `globalvar`, macro,
//!    enum and `global.name` assignment, so every file sees every global
//! 2. `analyzer` walks each file, binding identifiers to signifiers,
//!    recording references and scope ranges, and inferring types
//! 3. `checks` turns what the walk recorded into per-file diagnostics
//!
//! Native functions, variables and constants are installed up front from a
//! JSON seed (see [`NativeSpec`]).

mod analyzer;
mod checks;
mod diagnostics;
mod expr;
mod globals;
mod native;
mod scope;
mod selves;

pub(crate) use analyzer::analyze_file;
pub(crate) use checks::file_diagnostics;
pub(crate) use globals::collect_globals;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, QuickFix, Severity};
pub use native::{NativeConstant, NativeFunction, NativeParam, NativeSpec, NativeVariable};
pub use scope::{LocalScope, ScopeRange, ScopeRanges};
pub use selves::{SelfData, SelfKind};
