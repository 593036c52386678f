//! Per-file diagnostics, computed once every file has been walked

use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, QuickFix};
use super::expr::callable;
use crate::common::{FileId, Range, SignifierId};
use crate::project::{Project, SourceFile};
use rustc_hash::FxHashSet;

pub(crate) fn file_diagnostics(project: &Project, id: FileId) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let Some(file) = project.file(id) else {
        return diagnostics;
    };
    syntax_errors(file, &mut diagnostics);
    diagnostics.extend(file.findings.iter().cloned());
    undeclared(project, file, &mut diagnostics);
    calls(project, file, &mut diagnostics);
    if project.config().report_unused {
        unused(project, file, &mut diagnostics);
    }
    diagnostics
}

fn syntax_errors(file: &SourceFile, diagnostics: &mut Diagnostics) {
    for error in &file.lex_errors {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::SyntaxError,
            Range::new(file.id, error.span),
            error.message.as_str(),
        ));
    }
    for error in &file.parse_errors {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::SyntaxError,
            Range::new(file.id, error.span),
            error.message.as_str(),
        ));
    }
}

/// One report per signifier per file, at its first access
fn undeclared(project: &Project, file: &SourceFile, diagnostics: &mut Diagnostics) {
    let mut accesses: Vec<_> = file.accesses.iter().collect();
    accesses.sort_by_key(|access| access.range.start.offset);

    let mut reported: FxHashSet<SignifierId> = FxHashSet::default();
    for access in accesses {
        let sig = project.signifier(access.signifier);
        if sig.is_declared() || !reported.insert(access.signifier) {
            continue;
        }
        let (kind, message) = if access.via_global {
            (
                DiagnosticKind::UndeclaredGlobalReference,
                format!("`global.{}` is never declared", sig.name),
            )
        } else {
            (
                DiagnosticKind::UndeclaredVariableReference,
                format!("`{}` is never declared", sig.name),
            )
        };
        diagnostics.push(
            Diagnostic::new(kind, access.range, message)
                .with_severity(project.config().undeclared_severity)
                .with_fix(QuickFix::DeclareVariable { name: sig.name.clone() }),
        );
    }
}

fn calls(project: &Project, file: &SourceFile, diagnostics: &mut Diagnostics) {
    let store = project.store();
    for call in &file.calls {
        let Some(function) = callable(store, store.type_of(call.callee)) else {
            continue;
        };
        let params = store.params(function);
        let variadic = params.last().is_some_and(|param| store.signifier(*param).name == "...");

        let missing = params.iter().enumerate().find(|(idx, param)| {
            let param = store.signifier(**param);
            *idx >= call.args.len() && !param.flags.optional() && param.name != "..."
        });
        if let Some((_, param)) = missing {
            let message = format!(
                "missing required argument `{}` of `{}`",
                store.signifier(*param).name,
                project.signifier(call.callee).name
            );
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingRequiredArgument,
                Range::new(file.id, call.span),
                message,
            ));
        }

        if variadic {
            continue;
        }
        for arg in call.args.iter().skip(params.len()) {
            let message = format!(
                "`{}` takes {} argument{}",
                project.signifier(call.callee).name,
                params.len(),
                if params.len() == 1 { "" } else { "s" }
            );
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::TooManyArguments, Range::new(file.id, *arg), message)
                    .with_fix(QuickFix::RemoveArgument),
            );
        }
    }
}

/// Global functions declared here that nothing but their declaration refers to
fn unused(project: &Project, file: &SourceFile, diagnostics: &mut Diagnostics) {
    for id in &file.declared {
        let sig = project.signifier(*id);
        let Some(def) = sig.def.filter(|def| def.file() == file.id) else {
            continue;
        };
        let is_function = project.store().get(sig.ty).is_function();
        if !sig.flags.global() || sig.flags.native() || !is_function {
            continue;
        }
        if sig.refs.iter().all(|reference| reference.is_declaration) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Unused,
                def,
                format!("`{}` is never used", sig.name),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::project::{AnalysisConfig, Project};
    use crate::sema::{DiagnosticKind, QuickFix, Severity};
    use pretty_assertions::assert_eq;

    fn kinds_of(source: &str) -> Vec<DiagnosticKind> {
        let mut project = Project::default();
        let file = project.add_file("scripts/test/test.gml", source);
        project.analyze_all();
        project.diagnostics(file).iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_undeclared_reported_once() {
        let mut project = Project::default();
        let file = project.add_file("scripts/test/test.gml", "show_debug_message(score);\nscore += 1;\nvar s = score;");
        project.analyze_all();
        let undeclared: Vec<_> = project
            .diagnostics(file)
            .into_iter()
            .filter(|d| d.kind == DiagnosticKind::UndeclaredVariableReference)
            .collect();
        assert_eq!(undeclared.len(), 1);
        assert_eq!(undeclared[0].range.start.offset, 19);
        assert_eq!(undeclared[0].quick_fix, Some(QuickFix::DeclareVariable { name: "score".into() }));
    }

    #[test]
    fn test_undeclared_global_reference() {
        assert_eq!(kinds_of("var a = global.missing;"), vec![DiagnosticKind::UndeclaredGlobalReference]);
        assert!(kinds_of("global.present = 1;\nvar a = global.present;").is_empty());
    }

    #[test]
    fn test_argument_counts() {
        let kinds = kinds_of("function f(a, b) {}\nf(1);\nf(1, 2, 3, 4);\nf(1, 2);");
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MissingRequiredArgument,
                DiagnosticKind::TooManyArguments,
                DiagnosticKind::TooManyArguments,
            ]
        );
    }

    #[test]
    fn test_optional_and_variadic_params() {
        assert!(kinds_of("function f(a, b = 2) {}\nf(1);").is_empty());
        assert!(kinds_of("show_debug_message(1, 2, 3, 4);").is_empty());
    }

    #[test]
    fn test_unused_global_function() {
        assert_eq!(kinds_of("function lonely() {}"), vec![DiagnosticKind::Unused]);
        assert!(kinds_of("function used() {}\nused();").is_empty());

        let config = AnalysisConfig {
            report_unused: false,
            ..AnalysisConfig::default()
        };
        let mut project = Project::new(config);
        let file = project.add_file("scripts/test/test.gml", "function lonely() {}");
        project.analyze_all();
        assert!(project.diagnostics(file).is_empty());
    }

    #[test]
    fn test_global_self_and_jsdoc_mismatch() {
        let kinds = kinds_of("self.x = 1;");
        assert!(kinds.contains(&DiagnosticKind::GlobalSelf));

        let kinds = kinds_of("/// @param {Real} b\nfunction f(a) {}\nf(1);");
        assert_eq!(kinds, vec![DiagnosticKind::JsdocMismatch]);

        let kinds = kinds_of("/// @type {String}\nvar a = 1;");
        assert_eq!(kinds, vec![DiagnosticKind::JsdocMismatch]);
    }

    #[test]
    fn test_syntax_errors_and_severity() {
        let mut project = Project::new(AnalysisConfig {
            undeclared_severity: Severity::Error,
            ..AnalysisConfig::default()
        });
        let file = project.add_file("scripts/test/test.gml", "var a = (1;\nb = 2;");
        project.analyze_all();
        let diagnostics = project.diagnostics(file);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SyntaxError);
        let undeclared = diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::UndeclaredVariableReference)
            .unwrap();
        assert_eq!(undeclared.severity, Severity::Error);
    }
}
