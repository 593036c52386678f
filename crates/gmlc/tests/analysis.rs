//! End-to-end analysis of small projects through the public API

use gml_analyzer::project::Project;
use gml_analyzer::types::TypeKind;
use gml_analyzer::{DiagnosticKind, FileId, SignifierId};
use pretty_assertions::assert_eq;

fn analyzed(files: &[(&str, &str)]) -> (Project, Vec<FileId>) {
    let mut project = Project::default();
    let ids = files.iter().map(|(name, text)| project.add_file(*name, *text)).collect();
    project.analyze_all();
    (project, ids)
}

fn sig_at(project: &Project, file: FileId, text: &str, needle: &str) -> SignifierId {
    let offset = text.find(needle).unwrap();
    project.reference_at(file, offset).unwrap().signifier().unwrap()
}

fn kinds(project: &Project, file: FileId) -> Vec<DiagnosticKind> {
    project.diagnostics(file).iter().map(|d| d.kind).collect()
}

#[test]
fn reassignment_widens_to_union_in_assignment_order() {
    let text = "var x = 10; x = \"hi\";";
    let (project, ids) = analyzed(&[("scripts/main/main.gml", text)]);
    let x = sig_at(&project, ids[0], text, "x");

    let ty = project.type_of(x);
    assert_eq!(project.store().kind(ty), TypeKind::Union);
    assert_eq!(project.store().to_feather_string(ty), "Real|String");

    let refs = &project.signifier(x).refs;
    assert_eq!(refs.len(), 2);
    assert!(refs[0].is_declaration);
    assert!(!refs[1].is_declaration);
}

#[test]
fn globalvar_is_visible_from_other_files_in_either_order() {
    let declares = "globalvar G;";
    let uses = "var copy = global.G;";
    for files in [
        [("scripts/a/a.gml", declares), ("scripts/b/b.gml", uses)],
        [("scripts/b/b.gml", uses), ("scripts/a/a.gml", declares)],
    ] {
        let (project, ids) = analyzed(&files);
        let user = if files[0].1 == uses { ids[0] } else { ids[1] };
        let g = sig_at(&project, user, uses, "G");
        let sig = project.signifier(g);
        assert!(sig.flags.global());
        assert!(sig.is_declared());
        assert_eq!(project.global("G"), Some(g));
        assert!(project.diagnostics(user).is_empty());
    }
}

#[test]
fn calls_are_checked_against_functions_from_later_files() {
    let (project, ids) = analyzed(&[
        ("scripts/use/use.gml", "hit(1);\nhit(1, 2, 3);"),
        ("scripts/hit/hit.gml", "function hit(target, amount) {}"),
    ]);
    assert_eq!(
        kinds(&project, ids[0]),
        vec![DiagnosticKind::MissingRequiredArgument, DiagnosticKind::TooManyArguments]
    );
    assert!(kinds(&project, ids[1]).is_empty());
}

#[test]
fn undeclared_variable_is_reported_once_per_file() {
    let (project, ids) = analyzed(&[
        ("scripts/a/a.gml", "show_debug_message(mystery);\nmystery += 1;"),
        ("scripts/b/b.gml", "var m = mystery;"),
    ]);
    for file in ids {
        let undeclared: Vec<_> = kinds(&project, file)
            .into_iter()
            .filter(|kind| *kind == DiagnosticKind::UndeclaredVariableReference)
            .collect();
        assert_eq!(undeclared.len(), 1);
    }
}

#[test]
fn native_generic_return_is_substituted() {
    let text = "var v = array_pop([\"a\"]);\nvar n = array_length([1, 2]);";
    let (project, ids) = analyzed(&[("scripts/main/main.gml", text)]);
    let store = project.store();
    let v = sig_at(&project, ids[0], text, "v");
    assert_eq!(store.to_feather_string(project.type_of(v)), "String");
    let n = sig_at(&project, ids[0], text, "n =");
    assert_eq!(store.to_feather_string(project.type_of(n)), "Real");
}

#[test]
fn object_events_share_instance_variables() {
    let create = "hp = 10;\nspeed = 2;";
    let step = "hp -= 1;\nif (hp <= 0) { instance_destroy_self = true; }";
    let (project, ids) = analyzed(&[
        ("objects/o_enemy/Create_0.gml", create),
        ("objects/o_enemy/Step_0.gml", step),
    ]);
    let hp_create = sig_at(&project, ids[0], create, "hp");
    let hp_step = sig_at(&project, ids[1], step, "hp");
    assert_eq!(hp_create, hp_step);
    assert!(project.signifier(hp_create).flags.instance());

    let speed = sig_at(&project, ids[0], create, "speed");
    assert!(project.signifier(speed).flags.native());
    assert!(project.diagnostics(ids[0]).is_empty());
}

#[test]
fn enums_macros_and_constructors() {
    let text = "\
enum Dir { left, right = 5 }
#macro TILE 16
/// @param {Real} _x
function Vec(_x) constructor {
    x = _x;
    static len = function() { return x; };
}
var d = Dir.right;
var t = TILE;
var v = new Vec(1);
var l = v.len();";
    let (project, ids) = analyzed(&[("scripts/main/main.gml", text)]);
    let store = project.store();
    let render = |name: &str| {
        let offset = text.find(&format!("var {name} =")).unwrap() + 4;
        let sig = project.reference_at(ids[0], offset).unwrap().signifier().unwrap();
        store.to_feather_string(project.type_of(sig))
    };

    assert_eq!(render("d"), "Real");
    assert_eq!(render("t"), "Real");
    assert_eq!(render("v"), "Struct.Vec");
    assert_eq!(render("l"), "Real");

    let right = sig_at(&project, ids[0], text, "right =");
    assert_eq!(project.signifier(right).idx, Some(1));
    let tile = project.global("TILE").unwrap();
    assert!(project.signifier(tile).flags.is_macro());
    assert!(kinds(&project, ids[0]).is_empty());
}
