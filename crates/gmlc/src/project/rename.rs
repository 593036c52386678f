//! Project-wide rename

use super::Project;
use crate::common::{AnalysisError, AnalysisResult, FileId, Range, Referent};
use crate::frontend::{tokenize, TokenKind};

/// Replace the text covered by `range`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub replacement: String,
}

/// Every edit of one file, ordered by offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdits {
    pub file: FileId,
    pub edits: Vec<TextEdit>,
}

impl Project {
    /// Edits renaming the symbol at `offset` to `new_name` everywhere it is
    /// referenced
    pub fn rename(&self, file: FileId, offset: usize, new_name: &str) -> AnalysisResult<Vec<FileEdits>> {
        let source = self
            .file(file)
            .ok_or_else(|| AnalysisError::unknown_file(file.to_string()))?;
        let reference = self
            .reference_at(file, offset)
            .ok_or_else(|| AnalysisError::rename(format!("no symbol at offset {offset}")))?;
        let sig = match reference.referent {
            Referent::Signifier(sig) => sig,
            Referent::SelfRef(_) => {
                let keyword = source.slice(reference.range.span());
                return Err(AnalysisError::rename(format!("`{keyword}` is a reserved keyword")));
            }
        };
        let signifier = self.signifier(sig);
        if !signifier.is_renameable() {
            return Err(AnalysisError::rename(format!(
                "`{}` is built in and cannot be renamed",
                signifier.name
            )));
        }
        validate_name(new_name)?;

        let mut ranges: Vec<Range> = signifier.refs.iter().map(|r| r.range).collect();
        ranges.sort();
        ranges.dedup();

        let mut grouped: Vec<FileEdits> = Vec::new();
        for range in ranges {
            let edit = TextEdit {
                range,
                replacement: new_name.to_string(),
            };
            match grouped.last_mut() {
                Some(last) if last.file == range.file() => last.edits.push(edit),
                _ => grouped.push(FileEdits {
                    file: range.file(),
                    edits: vec![edit],
                }),
            }
        }
        tracing::debug!(
            from = %signifier.name,
            to = new_name,
            files = grouped.len(),
            "computed rename"
        );
        Ok(grouped)
    }
}

/// A new name must lex as exactly one identifier
fn validate_name(name: &str) -> AnalysisResult<()> {
    let output = tokenize(name);
    let valid = output.errors.is_empty()
        && matches!(
            output.tokens.as_slice(),
            [ident, eof] if matches!(ident.kind, TokenKind::Identifier(_)) && eof.kind == TokenKind::Eof
                && ident.span.start == 0 && ident.span.end == name.len()
        );
    if valid {
        Ok(())
    } else {
        Err(AnalysisError::rename(format!("`{name}` is not a valid identifier")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("player_hp").is_ok());
        assert!(validate_name("_x2").is_ok());
        assert!(validate_name("var").is_err());
        assert!(validate_name("2x").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_rename_local_in_one_file() {
        let mut project = Project::default();
        let text = "var count = 1;\ncount += 1;\nshow_debug_message(count);";
        let file = project.add_file("scripts/a/a.gml", text);
        project.analyze_all();

        let edits = project.rename(file, 5, "total").unwrap();
        assert_eq!(edits.len(), 1);
        let offsets: Vec<_> = edits[0].edits.iter().map(|e| e.range.start.offset).collect();
        assert_eq!(offsets, vec![4, 15, 46]);
        assert!(edits[0].edits.iter().all(|e| e.replacement == "total"));
    }

    #[test]
    fn test_rename_rejections() {
        let mut project = Project::default();
        let text = "function Point() constructor {\n    self.x = 1;\n}\nvar n = irandom(3);";
        let file = project.add_file("scripts/a/a.gml", text);
        project.analyze_all();

        let err = project.rename(file, text.find("self").unwrap(), "me").unwrap_err();
        assert_eq!(err.to_string(), "Cannot rename: `self` is a reserved keyword");
        let err = project.rename(file, text.find("irandom").unwrap(), "roll").unwrap_err();
        assert!(matches!(err, AnalysisError::Rename { .. }));
        let err = project.rename(file, text.find("Point").unwrap(), "while").unwrap_err();
        assert!(matches!(err, AnalysisError::Rename { .. }));
        assert!(project.rename(file, text.find("Point").unwrap(), "Vec2").is_ok());
    }
}
