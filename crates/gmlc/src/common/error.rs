//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

/// Failure of an analysis API call.
///
/// Findings about the analyzed code are never errors; they are reported as
/// [`Diagnostic`](crate::sema::Diagnostic)s. This type covers operations that
/// cannot produce a result at all.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Cannot rename: {message}")]
    Rename { message: String },

    #[error("Unknown file: {name}")]
    UnknownFile { name: String },

    #[error("Invalid native spec: {0}")]
    NativeSpec(#[from] serde_json::Error),

    #[error("Invalid config: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn rename(message: impl Into<String>) -> Self {
        Self::Rename {
            message: message.into(),
        }
    }

    pub fn unknown_file(name: impl Into<String>) -> Self {
        Self::UnknownFile { name: name.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Diagnostic reporter for pretty terminal output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(color: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(color),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Render an already-built diagnostic against the registered files
    pub fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::rename("`self` is a reserved keyword");
        assert_eq!(err.to_string(), "Cannot rename: `self` is a reserved keyword");

        let err = AnalysisError::unknown_file("scripts/a/a.gml");
        assert_eq!(err.to_string(), "Unknown file: scripts/a/a.gml");

        let json: Result<u8, _> = serde_json::from_str("{");
        let err = AnalysisError::from(json.unwrap_err());
        assert!(matches!(err, AnalysisError::NativeSpec(_)));
    }
}
