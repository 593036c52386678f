//! Built-in functions, variables and constants
//!
//! The runtime's API is described by a JSON document. A small default copy is
//! embedded in the crate; the CLI can replace it with a complete one.

use crate::common::{AnalysisResult, SignifierId};
use crate::project::Project;
use crate::types::{FeatherContext, Type, TypeKind};
use serde::Deserialize;

const EMBEDDED: &str = include_str!("natives.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NativeSpec {
    pub functions: Vec<NativeFunction>,
    pub variables: Vec<NativeVariable>,
    pub constants: Vec<NativeConstant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeFunction {
    pub name: String,
    #[serde(default)]
    pub params: Vec<NativeParam>,
    #[serde(default)]
    pub returns: Option<String>,
    /// Placeholders usable in the parameter and return types
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeParam {
    /// `...` marks a variadic tail
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeVariable {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    /// Present on every instance rather than on the global self
    #[serde(default)]
    pub instance: bool,
    #[serde(default = "writable_by_default")]
    pub writable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeConstant {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
}

fn writable_by_default() -> bool {
    true
}

impl NativeSpec {
    pub fn from_json(text: &str) -> AnalysisResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The seed shipped with the crate
    pub fn embedded() -> Self {
        match Self::from_json(EMBEDDED) {
            Ok(spec) => spec,
            Err(error) => {
                tracing::error!(%error, "embedded native spec is invalid");
                Self::default()
            }
        }
    }

    /// Register every entry as a native signifier
    pub fn install(&self, project: &mut Project) {
        for function in &self.functions {
            install_function(project, function);
        }
        for variable in &self.variables {
            let sig = if variable.instance {
                let base = project.instance_base;
                let sig = project.store.add_member(base, &variable.name);
                project.store.signifier_mut(sig).flags.set_instance(true);
                sig
            } else {
                project.ensure_global(&variable.name)
            };
            set_native_type(project, sig, variable.ty.as_deref(), &[]);
            project.store.signifier_mut(sig).flags.set_writable(variable.writable);
        }
        for constant in &self.constants {
            let sig = project.ensure_global(&constant.name);
            set_native_type(project, sig, constant.ty.as_deref(), &[]);
            project.store.signifier_mut(sig).flags.set_writable(false);
        }
        tracing::debug!(
            functions = self.functions.len(),
            variables = self.variables.len(),
            constants = self.constants.len(),
            "installed natives"
        );
    }
}

fn install_function(project: &mut Project, function: &NativeFunction) {
    let sig = project.ensure_global(&function.name);
    let ty = project.store.type_of(sig);
    let mut node = Type::named(TypeKind::Function, function.name.as_str());
    node.description.clone_from(&function.description);
    *project.store.get_mut(ty) = node;

    for (idx, param) in function.params.iter().enumerate() {
        let param_sig = project.store.add_param(ty, idx, &param.name);
        project.store.signifier_mut(param_sig).flags.set_optional(param.optional);
        set_native_type(project, param_sig, param.ty.as_deref(), &function.templates);
    }
    let returns = decode(project, function.returns.as_deref().unwrap_or("Undefined"), &function.templates);
    project.store.get_mut(ty).returns = Some(returns);

    let entry = project.store.signifier_mut(sig);
    entry.flags.set_native(true);
    entry.flags.set_writable(false);
    entry.flags.set_deprecated(function.deprecated);
    entry.description.clone_from(&function.description);
}

fn set_native_type(project: &mut Project, sig: SignifierId, ty: Option<&str>, templates: &[String]) {
    let decoded = decode(project, ty.unwrap_or("Any"), templates);
    project.store.add_type(sig, decoded);
    project.store.signifier_mut(sig).flags.set_native(true);
}

fn decode(project: &mut Project, text: &str, templates: &[String]) -> crate::common::TypeId {
    let ctx = FeatherContext {
        known: Some(&project.known_types),
        templates,
    };
    project.store.type_from_feather_in(text, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::AnalysisConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_seed_parses() {
        let spec = NativeSpec::embedded();
        assert!(spec.functions.iter().any(|f| f.name == "array_pop"));
        assert!(spec.variables.iter().any(|v| v.name == "x" && v.instance));
        assert!(spec.constants.iter().any(|c| c.name == "c_white"));
    }

    #[test]
    fn test_install_marks_natives() {
        let spec = NativeSpec::from_json(
            r#"{
                "functions": [{ "name": "clamp", "params": [
                    { "name": "val", "type": "Real" },
                    { "name": "min", "type": "Real" },
                    { "name": "max", "type": "Real", "optional": true }
                ], "returns": "Real" }],
                "variables": [{ "name": "hspeed", "type": "Real", "instance": true }],
                "constants": [{ "name": "c_red", "type": "Real" }]
            }"#,
        )
        .unwrap();
        let project = Project::with_natives(AnalysisConfig::default(), &spec);

        let clamp = project.global("clamp").unwrap();
        let sig = project.signifier(clamp);
        assert!(sig.flags.native());
        assert!(sig.is_declared());
        assert!(!sig.is_renameable());
        assert_eq!(project.store().code(sig.ty), "function clamp(val: Real, min: Real, max?: Real): Real");

        let c_red = project.global("c_red").unwrap();
        assert!(!project.signifier(c_red).flags.writable());
        assert!(project.global("hspeed").is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let spec = NativeSpec::from_json(r#"{ "variables": [{ "name": "score" }] }"#).unwrap();
        assert!(spec.functions.is_empty());
        assert!(spec.variables[0].writable);
        assert!(!spec.variables[0].instance);
        assert!(NativeSpec::from_json("{").is_err());
    }
}
