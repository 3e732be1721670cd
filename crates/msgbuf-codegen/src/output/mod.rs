//! Type Generator.
//!
//! Emission is split into one unit per top-level definition (the definition
//! and everything nested in it). Units only read the resolved [`Model`], so
//! they can be emitted in parallel; each buffers its own output and the file
//! is assembled only once every unit succeeded.

pub mod rust;
mod writer;

pub use writer::CodeWriter;

use crate::config::{Features, GeneratorConfig};
use crate::error::GenerateError;
use crate::model::{DefRef, Model};
use crate::naming;
use crate::plugin::{GeneratorPlugin, get_plugin};
use std::collections::HashSet;
use tracing::{debug, info_span};

/// First line of every generated file.
pub const HEADER: &str = "// @generated by msgbuf-codegen. Do not edit.";

/// Type parameter names used by visitor signatures, chosen so they never
/// shadow a generated type.
#[derive(Debug, Clone)]
pub struct Generics {
    pub result: String,
    pub arg: String,
    pub visitor: String,
}

impl Generics {
    fn new(model: &Model) -> Self {
        let mut taken: HashSet<String> = HashSet::new();
        for info in &model.messages {
            taken.insert(naming::type_name(&info.name));
            taken.insert(naming::base_name(&info.name));
            taken.insert(naming::visitor_name(&info.name));
        }
        for info in &model.enums {
            taken.insert(naming::type_name(&info.name));
        }
        let result = naming::fresh("R", &taken);
        taken.insert(result.clone());
        let arg = naming::fresh("A", &taken);
        taken.insert(arg.clone());
        let visitor = naming::fresh("V", &taken);
        Self {
            result,
            arg,
            visitor,
        }
    }
}

/// Shared, read-only state of one generation run.
pub struct Context<'m> {
    pub model: &'m Model,
    pub features: Features,
    /// Path prefix of the runtime crate, e.g. `::msgbuf_runtime`.
    pub runtime: String,
    pub plugins: Vec<&'static dyn GeneratorPlugin>,
    pub generics: Generics,
}

/// Output of one top-level definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub name: String,
    pub code: String,
}

/// All units of a compilation, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedFile {
    pub units: Vec<GeneratedUnit>,
}

impl GeneratedFile {
    pub fn render(&self) -> String {
        let mut text = String::from(HEADER);
        text.push('\n');
        for unit in &self.units {
            text.push_str(&unit.code);
        }
        text
    }

    pub fn unit(&self, name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|unit| unit.name == name)
    }
}

/// Generate every definition of a resolved model.
pub fn generate(model: &Model, config: &GeneratorConfig) -> Result<GeneratedFile, GenerateError> {
    let _span = info_span!("generate", units = model.roots.len()).entered();
    let features = Features::resolve(config, model);
    debug!(?features, "resolved features");

    let ctx = Context {
        model,
        features,
        runtime: config.runtime_crate.clone(),
        plugins: resolve_plugins(config, &features)?,
        generics: Generics::new(model),
    };
    Ok(GeneratedFile {
        units: emit_units(&ctx, config.parallel)?,
    })
}

fn resolve_plugins(
    config: &GeneratorConfig,
    features: &Features,
) -> Result<Vec<&'static dyn GeneratorPlugin>, GenerateError> {
    let mut plugins = Vec::new();
    for name in &config.plugins {
        let plugin = get_plugin(name).ok_or_else(|| GenerateError::UnknownPlugin(name.clone()))?;
        if plugin.enabled(features) {
            plugins.push(plugin);
        } else {
            debug!(plugin = %name, "plugin disabled");
        }
    }
    Ok(plugins)
}

#[cfg(feature = "parallel")]
fn emit_units(ctx: &Context<'_>, parallel: bool) -> Result<Vec<GeneratedUnit>, GenerateError> {
    use rayon::prelude::*;

    if parallel {
        ctx.model
            .roots
            .par_iter()
            .map(|root| emit_unit(ctx, *root))
            .collect()
    } else {
        emit_sequential(ctx)
    }
}

#[cfg(not(feature = "parallel"))]
fn emit_units(ctx: &Context<'_>, _parallel: bool) -> Result<Vec<GeneratedUnit>, GenerateError> {
    emit_sequential(ctx)
}

fn emit_sequential(ctx: &Context<'_>) -> Result<Vec<GeneratedUnit>, GenerateError> {
    ctx.model
        .roots
        .iter()
        .map(|root| emit_unit(ctx, *root))
        .collect()
}

fn emit_unit(ctx: &Context<'_>, root: DefRef) -> Result<GeneratedUnit, GenerateError> {
    let name = match root {
        DefRef::Message(id) => ctx.model.message(id).name.clone(),
        DefRef::Enum(id) => ctx.model.enumeration(id).name.clone(),
    };
    let mut out = CodeWriter::new();
    for member in ctx.model.unit_members(root) {
        rust::emit_definition(ctx, member, &mut out)?;
    }
    let code = out.finish();
    debug!(unit = %name, bytes = code.len(), "emitted unit");
    Ok(GeneratedUnit { name, code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::resolve;
    use crate::ids::assign;
    use crate::ir::{EnumDef, Field, MessageDef, PrimitiveKind as P, Schema, Type};

    fn model(schema: &Schema) -> Model {
        let mut model = resolve(schema).unwrap();
        assign(&mut model).unwrap();
        model
    }

    #[test]
    fn generics_avoid_type_names() {
        let model = model(&Schema::single(vec![
            MessageDef::new("R", Vec::new()).into(),
            MessageDef::new("A", Vec::new()).into(),
        ]));
        let generics = Generics::new(&model);
        assert_eq!(generics.result, "R2");
        assert_eq!(generics.arg, "A2");
        assert_eq!(generics.visitor, "V");
    }

    #[test]
    fn units_follow_declaration_order() {
        let schema = Schema::single(vec![
            EnumDef::simple("Color", &["RED"]).into(),
            MessageDef::new("Point", vec![Field::new("x", Type::Primitive(P::Int32))]).into(),
        ]);
        let model = model(&schema);
        for parallel in [false, true] {
            let config = GeneratorConfig {
                parallel,
                ..Default::default()
            };
            let file = generate(&model, &config).unwrap();
            let names: Vec<&str> = file.units.iter().map(|unit| unit.name.as_str()).collect();
            assert_eq!(names, ["Color", "Point"]);
            assert!(file.render().starts_with(HEADER));
        }
    }

    #[test]
    fn unknown_plugins_fail() {
        let model = model(&Schema::single(Vec::new()));
        let config = GeneratorConfig {
            plugins: vec!["yaml".into()],
            ..Default::default()
        };
        let err = generate(&model, &config).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownPlugin(name) if name == "yaml"));
    }
}
