//! Editor-facing queries over an analyzed project

use super::Project;
use crate::common::{FileId, Range, Reference, Referent, SignifierId};
use crate::sema::Diagnostic;
use rustc_hash::FxHashSet;

/// One occurrence of a signifier, with the text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceHit {
    pub file: FileId,
    pub range: Range,
    pub text: String,
}

impl Project {
    /// The innermost reference covering `offset`
    pub fn reference_at(&self, file: FileId, offset: usize) -> Option<Reference> {
        self.file(file)?.reference_at(offset).copied()
    }

    /// Where the signifier referenced at `offset` is declared
    pub fn definition_at(&self, file: FileId, offset: usize) -> Option<Range> {
        let sig = self.reference_at(file, offset)?.signifier()?;
        self.signifier(sig).def
    }

    /// Every occurrence of `sig` across the project, ordered by file then offset
    pub fn find_references(&self, sig: SignifierId) -> Vec<ReferenceHit> {
        let mut hits: Vec<ReferenceHit> = self
            .signifier(sig)
            .refs
            .iter()
            .filter_map(|reference| {
                let file = self.file(reference.file())?;
                Some(ReferenceHit {
                    file: file.id,
                    range: reference.range,
                    text: file.slice(reference.range.span()).to_string(),
                })
            })
            .collect();
        hits.sort_by_key(|hit| (hit.file, hit.range.start.offset));
        hits
    }

    /// Names visible at `offset`: locals first, then members of the current
    /// self and its parents, then declared globals. Inner names shadow outer ones.
    pub fn symbols_in_scope_at(&self, file: FileId, offset: usize) -> Vec<SignifierId> {
        let Some(source) = self.file(file) else {
            return Vec::new();
        };
        let range = source.scopes().at(offset);
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut symbols = Vec::new();
        let mut push = |id: SignifierId, symbols: &mut Vec<SignifierId>| {
            if seen.insert(self.signifier(id).name.as_str()) {
                symbols.push(id);
            }
        };

        for id in self.scope(range.local).symbols() {
            push(id, &mut symbols);
        }
        let data = self.self_data(range.self_id);
        if !data.is_global() {
            let mut ty = Some(data.ty);
            while let Some(current) = ty {
                for id in self.store.members(current) {
                    push(id, &mut symbols);
                }
                ty = self.store.get(current).parent;
            }
        }
        for id in self.globals() {
            push(id, &mut symbols);
        }
        symbols
    }

    /// Hover text for whatever is referenced at `offset`
    pub fn hover(&self, file: FileId, offset: usize) -> Option<String> {
        let reference = self.reference_at(file, offset)?;
        match reference.referent {
            Referent::Signifier(id) => {
                let sig = self.signifier(id);
                let ty = self.type_of(id);
                let mut text = if self.store.get(ty).is_function() {
                    self.store.code(ty)
                } else {
                    format!("{}: {}", sig.name, self.store.to_feather_string(ty))
                };
                if sig.flags.deprecated() {
                    text.push_str("\n\n@deprecated");
                }
                if let Some(description) = sig.description.as_deref().filter(|d| !d.is_empty()) {
                    text.push_str("\n\n");
                    text.push_str(description);
                }
                Some(text)
            }
            Referent::SelfRef(id) => {
                let data = self.self_data(id);
                let keyword = self.file(file)?.slice(reference.range.span());
                Some(format!("{keyword}: {}", self.store.to_feather_string(data.ty)))
            }
        }
    }

    /// Diagnostics of a file ordered by position
    pub fn diagnostics(&self, file: FileId) -> Vec<&Diagnostic> {
        self.file(file).map(|source| source.diagnostics().all()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::common::Referent;
    use crate::project::Project;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "/// @desc Adds two numbers\nfunction add(a, b = 0) {\n    var sum = a + b;\n    return sum;\n}\nvar total = add(1, 2);";

    fn offset_of(text: &str, needle: &str) -> usize {
        text.find(needle).unwrap()
    }

    #[test]
    fn test_hover_function_and_variable() {
        let mut project = Project::default();
        let file = project.add_file("scripts/add/add.gml", SCRIPT);
        project.analyze_all();

        let hover = project.hover(file, offset_of(SCRIPT, "add(1")).unwrap();
        assert_eq!(hover, "function add(a: Any, b?: Real): Real\n\nAdds two numbers");

        let hover = project.hover(file, offset_of(SCRIPT, "total")).unwrap();
        assert_eq!(hover, "total: Real");
        assert_eq!(project.hover(file, 0), None);
    }

    #[test]
    fn test_definition_and_references() {
        let mut project = Project::default();
        let file = project.add_file("scripts/add/add.gml", SCRIPT);
        let other = project.add_file("scripts/use/use.gml", "var x2 = add(3);");
        project.analyze_all();

        let def = project.definition_at(other, offset_of("var x2 = add(3);", "add")).unwrap();
        assert_eq!(def.file(), file);
        assert_eq!(def.start.offset, offset_of(SCRIPT, "add("));

        let sig = project.global("add").unwrap();
        let hits = project.find_references(sig);
        let places: Vec<_> = hits.iter().map(|hit| (hit.file, hit.text.as_str())).collect();
        assert_eq!(places, vec![(file, "add"), (file, "add"), (other, "add")]);
    }

    #[test]
    fn test_symbols_in_scope() {
        let mut project = Project::default();
        let file = project.add_file("scripts/add/add.gml", SCRIPT);
        project.analyze_all();
        let names = |offset: usize| -> Vec<String> {
            project
                .symbols_in_scope_at(file, offset)
                .into_iter()
                .map(|id| project.signifier(id).name.clone())
                .collect()
        };

        let inside = names(offset_of(SCRIPT, "var sum"));
        assert_eq!(&inside[..3], &["a".to_string(), "b".to_string(), "sum".to_string()]);
        assert!(inside.contains(&"add".to_string()));
        assert!(inside.contains(&"show_debug_message".to_string()));
        assert!(!inside.contains(&"total".to_string()));

        let outside = names(SCRIPT.len());
        assert_eq!(outside[0], "total");
        assert!(!outside.contains(&"sum".to_string()));
    }

    #[test]
    fn test_instance_symbols_include_builtins() {
        let mut project = Project::default();
        let file = project.add_file("objects/o_player/Create_0.gml", "hp = 3;\n");
        project.analyze_all();
        let names: Vec<_> = project
            .symbols_in_scope_at(file, 7)
            .into_iter()
            .map(|id| project.signifier(id).name.clone())
            .collect();
        assert!(names.contains(&"hp".to_string()));
        assert!(names.contains(&"x".to_string()));
        assert!(names.contains(&"o_player".to_string()));
    }

    #[test]
    fn test_hover_on_self_keyword() {
        let mut project = Project::default();
        let text = "function Point() constructor {\n    self.x = 1;\n}";
        let file = project.add_file("scripts/point/point.gml", text);
        project.analyze_all();
        let offset = offset_of(text, "self");
        assert!(matches!(project.reference_at(file, offset).unwrap().referent, Referent::SelfRef(_)));
        assert_eq!(project.hover(file, offset).unwrap(), "self: Struct.Point");
    }
}
