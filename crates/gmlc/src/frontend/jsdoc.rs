//! Doc comment parsing
//!
//! Accepts both `///` line comments and `/** */` blocks. Types are kept as raw
//! Feather strings; resolving them is up to the analyzer, which knows the
//! templates and named types in scope.

use regex::Regex;
use std::sync::LazyLock;

static LINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:///|/\*\*|\*/|\*)?\s?").expect("static pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(?<tag>[A-Za-z_]+)\b\s*(?:\{\s*(?<ty>[^}]*?)\s*\})?\s*(?<rest>.*)$").expect("static pattern")
});

static PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[\s*(?<optional>[A-Za-z_][A-Za-z0-9_]*|\.\.\.)\s*(?:=\s*(?<default>[^\]]*?))?\s*\]|(?<name>[A-Za-z_][A-Za-z0-9_]*|\.\.\.))\s*(?<desc>.*)$",
    )
    .expect("static pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsdocKind {
    /// Only free text
    #[default]
    Description,
    /// Documents a function: params, returns, self
    Function,
    /// Declares the type of a variable with `@type`
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsdocParam {
    /// Parameter name, `...` for variadic parameters
    pub name: String,
    pub ty: Option<String>,
    pub optional: bool,
    pub default: Option<String>,
    pub description: String,
}

impl JsdocParam {
    pub fn is_variadic(&self) -> bool {
        self.name == "..."
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Jsdoc {
    pub kind: JsdocKind,
    pub description: String,
    pub params: Vec<JsdocParam>,
    pub returns: Option<String>,
    pub returns_description: String,
    pub ty: Option<String>,
    /// Type named by `@self` or `@context`
    pub self_type: Option<String>,
    pub templates: Vec<String>,
    pub deprecated: bool,
    pub pure: bool,
    pub ignore: bool,
}

impl Jsdoc {
    pub fn param(&self, name: &str) -> Option<&JsdocParam> {
        self.params.iter().find(|param| param.name == name)
    }

    pub fn is_empty(&self) -> bool {
        *self == Jsdoc::default()
    }
}

/// Where continuation lines are appended
#[derive(Clone, Copy)]
enum Target {
    Description,
    Param(usize),
    Returns,
    Nothing,
}

fn append(text: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(line);
}

fn strip_line(line: &str) -> &str {
    let line = line.trim_end();
    let line = line.strip_suffix("*/").unwrap_or(line);
    let start = LINE_PREFIX.find(line).map_or(0, |m| m.end());
    line[start..].trim()
}

/// Parse the text of one doc comment (all of its lines)
pub fn parse_jsdoc(text: &str) -> Jsdoc {
    let mut doc = Jsdoc::default();
    let mut target = Target::Description;
    let mut is_function = false;

    for raw in text.lines() {
        let line = strip_line(raw);
        let Some(caps) = TAG.captures(line) else {
            match target {
                Target::Description => append(&mut doc.description, line),
                Target::Param(i) => append(&mut doc.params[i].description, line),
                Target::Returns => append(&mut doc.returns_description, line),
                Target::Nothing => {}
            }
            continue;
        };
        let tag = caps.name("tag").map_or("", |m| m.as_str());
        let ty = caps.name("ty").map(|m| m.as_str().to_string()).filter(|t| !t.is_empty());
        let rest = caps.name("rest").map_or("", |m| m.as_str().trim());

        target = match tag {
            "param" | "parameter" | "arg" | "argument" => {
                is_function = true;
                match parse_param(rest, ty) {
                    Some(param) => {
                        doc.params.push(param);
                        Target::Param(doc.params.len() - 1)
                    }
                    None => Target::Nothing,
                }
            }
            "return" | "returns" => {
                is_function = true;
                doc.returns = ty;
                append(&mut doc.returns_description, rest);
                Target::Returns
            }
            "type" => {
                doc.ty = ty;
                Target::Nothing
            }
            "self" | "context" => {
                is_function = true;
                doc.self_type = ty.or_else(|| rest.split_whitespace().next().map(str::to_string));
                Target::Nothing
            }
            "template" => {
                doc.templates.extend(
                    rest.split([',', ' ', '\t'])
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
                Target::Nothing
            }
            "desc" | "description" => {
                append(&mut doc.description, rest);
                Target::Description
            }
            "func" | "function" => {
                is_function = true;
                Target::Description
            }
            "deprecated" => {
                doc.deprecated = true;
                Target::Nothing
            }
            "pure" => {
                doc.pure = true;
                Target::Nothing
            }
            "ignore" => {
                doc.ignore = true;
                Target::Nothing
            }
            _ => Target::Nothing,
        };
    }

    doc.kind = if doc.ty.is_some() {
        JsdocKind::Type
    } else if is_function {
        JsdocKind::Function
    } else {
        JsdocKind::Description
    };
    doc
}

fn parse_param(rest: &str, ty: Option<String>) -> Option<JsdocParam> {
    let caps = PARAM.captures(rest)?;
    let (name, optional) = match (caps.name("optional"), caps.name("name")) {
        (Some(name), _) => (name.as_str(), true),
        (None, Some(name)) => (name.as_str(), false),
        (None, None) => return None,
    };
    Some(JsdocParam {
        name: name.to_string(),
        optional: optional || name == "...",
        default: caps.name("default").map(|m| m.as_str().trim().to_string()),
        description: caps.name("desc").map_or(String::new(), |m| m.as_str().trim().to_string()),
        ty,
    })
}
