//! Plugin extension points.
//!
//! A plugin contributes extra members for alternative formats. It sees the
//! resolved model read-only and appends to two places per message:
//!
//! - the **storage surface**: members of the `impl` block of each struct that
//!   holds fields (a concrete type, or the `<Name>Base` of an abstract type);
//! - the **public surface**: items emitted after the public type (the concrete
//!   struct or the abstract enum).
//!
//! Plugins are looked up by name in the [`registry`] and only run when listed
//! in [`GeneratorConfig::plugins`](crate::config::GeneratorConfig::plugins).

pub mod registry;
#[cfg(feature = "plugin-xml")]
pub mod xml;

use crate::config::Features;
use crate::model::{FieldInfo, MessageId, MessageInfo, Model};
use crate::output::CodeWriter;
use crate::plan::{EncodingPlan, ValuePlan};

pub use registry::{get_plugin, plugin_names, register_plugin};

/// A diagnostic raised by a plugin; aborts generation of the definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PluginError(pub String);

/// A field as seen by the generator and its plugins.
#[derive(Debug, Clone)]
pub struct FieldView<'m> {
    pub info: &'m FieldInfo,
    pub plan: EncodingPlan,
    /// Storage field and getter identifier.
    pub ident: String,
    /// Name of the `<FIELD>_PROP` key constant.
    pub prop: String,
    /// Name of the `<FIELD>_TAG` constant.
    pub tag: String,
}

/// A message handed to a plugin.
pub struct MessageView<'a> {
    pub model: &'a Model,
    pub id: MessageId,
    pub info: &'a MessageInfo,
    /// Rust type the emitted members belong to.
    pub type_name: &'a str,
    /// Path prefix of the runtime crate.
    pub runtime: &'a str,
    /// Fields declared by this message.
    pub fields: &'a [FieldView<'a>],
    /// Fields declared by ancestors, root first.
    pub inherited: &'a [FieldView<'a>],
}

impl MessageView<'_> {
    /// Whether field lookups can be delegated to a `base` struct.
    pub fn has_base(&self) -> bool {
        self.info.generalization.is_some()
    }

    /// Local fields followed by ancestor fields.
    pub fn ordered_fields(&self) -> impl Iterator<Item = &FieldView<'_>> {
        self.fields.iter().chain(self.inherited.iter())
    }

    /// Rust type of a single value.
    pub fn value_type(&self, plan: &ValuePlan) -> String {
        crate::output::rust::codec::value_type(self.model, plan)
    }
}

/// A generator plugin.
///
/// # Implementing Custom Plugins
///
/// ```
/// use msgbuf_codegen::config::Features;
/// use msgbuf_codegen::ir::{MessageDef, Schema};
/// use msgbuf_codegen::output::CodeWriter;
/// use msgbuf_codegen::plugin::{GeneratorPlugin, MessageView, PluginError, register_plugin};
/// use msgbuf_codegen::{GeneratorConfig, compile};
///
/// struct Describe;
///
/// impl GeneratorPlugin for Describe {
///     fn name(&self) -> &'static str { "describe" }
///     fn enabled(&self, _: &Features) -> bool { true }
///     fn storage_surface(&self, _: &MessageView<'_>, _: &mut CodeWriter) -> Result<(), PluginError> { Ok(()) }
///     fn public_surface(&self, view: &MessageView<'_>, out: &mut CodeWriter) -> Result<(), PluginError> {
///         out.line(format!("// {}", view.info.name));
///         Ok(())
///     }
/// }
///
/// register_plugin(&Describe);
///
/// let schema = Schema::single(vec![MessageDef::new("Point", Vec::new()).into()]);
/// let config = GeneratorConfig {
///     plugins: vec!["describe".into()],
///     ..Default::default()
/// };
/// assert!(compile(&schema, &config).unwrap().contains("// Point"));
/// ```
pub trait GeneratorPlugin: Send + Sync {
    /// Unique plugin identifier used in configuration (e.g. "xml").
    fn name(&self) -> &'static str;

    /// Whether the plugin's stage survives the configuration and schema options.
    fn enabled(&self, features: &Features) -> bool;

    /// Members appended inside the `impl` block of a field-holding struct.
    fn storage_surface(
        &self,
        view: &MessageView<'_>,
        out: &mut CodeWriter,
    ) -> Result<(), PluginError>;

    /// Items appended after a message's public type.
    fn public_surface(
        &self,
        view: &MessageView<'_>,
        out: &mut CodeWriter,
    ) -> Result<(), PluginError>;
}
