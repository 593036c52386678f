//! GML Analyzer - semantic analysis for GameMaker Language projects
//!
//! This library turns a set of GML source files into a queryable model:
//! every identifier bound to a signifier, every reference indexed by offset,
//! and a structural type inferred for every signifier.
//!
//! ## Architecture
//!
//! The analyzer is organized into:
//! - **Frontend** (`frontend/`): Lexer, parser and doc comment parsing
//! - **Types** (`types/`): Type arena, signifiers, merging and generics
//! - **Sema** (`sema/`): Global collection, the symbol walk and diagnostics
//! - **Project** (`project/`): File registry, reparsing, queries and rename
//! - **Driver** (`driver/`): Loading sources from disk and reporting
//! - **Common** (`common/`): Shared infrastructure (ids, spans, errors)

pub mod common;
pub mod types;
pub mod frontend;
pub mod sema;
pub mod project;
pub mod driver;

// Re-exports for convenience
pub use common::{AnalysisError, AnalysisResult, DiagnosticReporter, FileId, Range, Reference, SignifierId, Span, TypeId};
pub use project::{AnalysisConfig, Project};
pub use sema::{Diagnostic, DiagnosticKind, Severity};
