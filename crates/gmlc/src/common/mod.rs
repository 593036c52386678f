//! Common infrastructure shared by the frontend, the type engine and the project model

mod error;
mod ids;
mod location;
mod span;

pub use error::{AnalysisError, AnalysisResult, DiagnosticReporter};
pub use ids::{FileId, ScopeId, SelfId, SignifierId, TypeId};
pub use location::{LineIndex, Location, Position, Range, Reference, Referent};
pub use span::Span;
