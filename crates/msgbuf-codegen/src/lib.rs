//! Schema compiler for msgbuf message families.
//!
//! `msgbuf-codegen` turns a schema of messages and enums into Rust source:
//! plain data types with accessors, a self-describing JSON codec, a compact
//! tagged binary codec, reflective property access and exhaustive visitors
//! over inheritance families.
//!
//! # Architecture
//!
//! ```text
//! Input            Resolution             Output
//! ─────────     ──────────────────     ──────────────────────────
//! JSON IR  ─┐                          ┌─> data types + accessors
//!           ├─> Schema ─> Model ──────┼─> JSON / binary codecs
//! builders ─┘   (ir.rs)  (hierarchy,  ├─> reflection tables
//!                         ids)        ├─> visitors
//!                                     └─> plugins (xml, ...)
//! ```
//!
//! # Example
//!
//! ```
//! use msgbuf_codegen::ir::{Field, MessageDef, PrimitiveKind, Schema, Type};
//! use msgbuf_codegen::{GeneratorConfig, compile};
//!
//! let schema = Schema::single(vec![
//!     MessageDef::abstract_("Shape", Vec::new()).into(),
//!     MessageDef::new("Circle", vec![Field::new("radius", Type::Primitive(PrimitiveKind::Double))])
//!         .extends("Shape")
//!         .into(),
//! ]);
//! let code = compile(&schema, &GeneratorConfig::default()).unwrap();
//! assert!(code.contains("pub enum Shape"));
//! assert!(code.contains("pub struct Circle"));
//! ```
//!
//! From a build script, use [`Builder`]:
//!
//! ```ignore
//! fn main() {
//!     msgbuf_codegen::Builder::new()
//!         .plugin("xml")
//!         .compile("schemas/shapes.json")
//!         .unwrap();
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - emit independent definitions on a rayon pool
//! - `plugin-xml` - register the built-in XML reader plugin

pub mod builder;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod input;
pub mod ir;
pub mod model;
pub mod naming;
pub mod output;
pub mod plan;
pub mod plugin;

pub use builder::Builder;
pub use config::GeneratorConfig;
pub use error::{GenerateError, SchemaError};
pub use input::{load_schema, parse_schema_json};
pub use plan::PlanError;
pub use plugin::{GeneratorPlugin, PluginError, get_plugin, plugin_names, register_plugin};

use ir::Schema;
use model::Model;
use tracing::info;

/// Resolve a schema into its model with every identifier assigned.
pub fn analyze(schema: &Schema) -> Result<Model, GenerateError> {
    let mut model = hierarchy::resolve(schema)?;
    ids::assign(&mut model)?;
    Ok(model)
}

/// Compile a schema into the source of one Rust module.
///
/// Nothing is produced unless every definition compiles.
pub fn compile(schema: &Schema, config: &GeneratorConfig) -> Result<String, GenerateError> {
    let model = analyze(schema)?;
    let file = output::generate(&model, config)?;
    info!(
        messages = model.messages.len(),
        enums = model.enums.len(),
        "compiled schema"
    );
    Ok(file.render())
}

