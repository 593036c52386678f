//! Rename and incremental reparse

use gml_analyzer::project::Project;
use gml_analyzer::{AnalysisError, DiagnosticKind, FileId};
use pretty_assertions::assert_eq;

fn two_files(first: &str, second: &str) -> (Project, FileId, FileId) {
    let mut project = Project::default();
    let a = project.add_file("scripts/a/a.gml", first);
    let b = project.add_file("scripts/b/b.gml", second);
    project.analyze_all();
    (project, a, b)
}

#[test]
fn rename_across_two_files() {
    let (project, a, b) = two_files("globalvar lives;", "lives = 3;");
    let edits = project.rename(b, 0, "health").unwrap();

    let files: Vec<_> = edits.iter().map(|group| group.file).collect();
    assert_eq!(files, vec![a, b]);
    assert!(edits.iter().all(|group| group.edits.len() == 1));
    assert_eq!(edits[0].edits[0].range.start.offset, 10);
    assert_eq!(edits[1].edits[0].range.start.offset, 0);
    assert_eq!(edits[1].edits[0].replacement, "health");
}

#[test]
fn rename_rejects_context_keywords() {
    let text = "function Player() constructor {\n    self.hp = 1;\n    with (other) { hp = 2; }\n}";
    let (project, a, _) = two_files(text, "");
    for keyword in ["self", "other"] {
        let err = project.rename(a, text.find(keyword).unwrap(), "me").unwrap_err();
        assert_eq!(err.to_string(), format!("Cannot rename: `{keyword}` is a reserved keyword"));
    }
}

#[test]
fn rename_rejects_natives_and_bad_names() {
    let text = "var total = irandom(6);";
    let (project, a, _) = two_files(text, "");
    let err = project.rename(a, text.find("irandom").unwrap(), "roll").unwrap_err();
    assert!(matches!(err, AnalysisError::Rename { .. }));
    for name in ["function", "9lives", "two words"] {
        let err = project.rename(a, 4, name).unwrap_err();
        assert!(matches!(err, AnalysisError::Rename { .. }));
    }
    assert!(matches!(
        project.rename(FileId::new(9), 0, "x").unwrap_err(),
        AnalysisError::UnknownFile { .. }
    ));
}

#[test]
fn reparse_clears_declarations_and_keeps_other_references() {
    let (mut project, a, b) = two_files("globalvar lives;", "lives = 3;\nshow_debug_message(lives);");
    let lives = project.global("lives").unwrap();
    assert!(project.signifier(lives).is_declared());
    assert!(project.diagnostics(b).is_empty());

    project.reparse(a, "var unrelated = 1;").unwrap();

    let sig = project.signifier(lives);
    assert!(!sig.is_declared());
    assert_eq!(sig.refs.len(), 2);
    assert!(sig.refs.iter().all(|r| r.file() == b));
    let kinds: Vec<_> = project.diagnostics(b).iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::UndeclaredVariableReference]);

    project.reparse(a, "globalvar lives;").unwrap();
    assert!(project.signifier(lives).is_declared());
    assert!(project.diagnostics(b).is_empty());
    assert_eq!(project.find_references(lives).len(), 3);
}

#[test]
fn reparse_replaces_local_information() {
    let mut project = Project::default();
    let file = project.add_file("scripts/a/a.gml", "var a = 1;");
    project.analyze_all();
    project.reparse(file, "var b = \"s\";\nvar c = b;").unwrap();

    let text = &project.file(file).unwrap().text;
    assert_eq!(text, "var b = \"s\";\nvar c = b;");
    let c = project.reference_at(file, 17).unwrap().signifier().unwrap();
    assert_eq!(project.signifier(c).name, "c");
    assert_eq!(project.store().to_feather_string(project.type_of(c)), "String");
    assert_eq!(project.file(file).unwrap().references().len(), 3);
}
