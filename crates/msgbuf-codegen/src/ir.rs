//! Definition model for message schemas.
//!
//! Schema front ends produce this representation; the [`hierarchy`](crate::hierarchy)
//! and [`ids`](crate::ids) passes turn it into a resolved
//! [`Model`](crate::model::Model). Everything here is serde-serialisable so a
//! schema can be stored and loaded as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a schema option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(f64),
    String(String),
}

/// Options attached to a definition, keyed by option name.
pub type Options = BTreeMap<String, OptionValue>;

/// Common surface of every definition kind.
pub trait Part {
    fn name(&self) -> &str;
    fn docs(&self) -> Option<&str>;
    fn options(&self) -> &Options;

    /// Whether a boolean option is set to `true`.
    fn flag(&self, option: &str) -> bool {
        matches!(self.options().get(option), Some(OptionValue::Flag(true)))
    }

    fn string_option(&self, option: &str) -> Option<&str> {
        match self.options().get(option) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }
}

macro_rules! impl_part {
    ($($ty:ty),*) => {
        $(
            impl Part for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn docs(&self) -> Option<&str> {
                    self.docs.as_deref()
                }

                fn options(&self) -> &Options {
                    &self.options
                }
            }
        )*
    };
}

pub(crate) use impl_part;

/// A complete compilation input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Definition files, in declaration order.
    pub files: Vec<DefinitionFile>,
    /// Compilation-wide option sets.
    pub options: Vec<OptionContainer>,
}

/// A named bag of options that applies to a whole compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionContainer {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
}

/// One schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionFile {
    /// File name, used for diagnostics.
    pub name: String,
    pub package: Option<String>,
    pub docs: Option<String>,
    pub options: Options,
    pub definitions: Vec<Definition>,
}

/// A top-level or nested definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Definition {
    Message(MessageDef),
    Enum(EnumDef),
}

/// A message type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDef {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
    /// Abstract messages only exist through their specializations.
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Name of the generalization.
    pub extends: Option<String>,
    /// Explicit binary type discriminator.
    pub id: Option<u32>,
    pub fields: Vec<Field>,
    /// Nested enums and messages.
    pub definitions: Vec<Definition>,
}

/// An enumeration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDef {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
    /// Constants in declaration order; the first one is the default.
    pub constants: Vec<Constant>,
}

/// An enum constant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constant {
    pub name: String,
    /// Explicit binary code.
    pub index: Option<i32>,
    pub docs: Option<String>,
    pub options: Options,
}

/// A message field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub repeated: bool,
    /// Transient fields are left out of the binary encoding.
    #[serde(default)]
    pub transient: bool,
    /// Explicit binary tag.
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub options: Options,
}

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Uint32,
    Sint32,
    Fixed32,
    Sfixed32,
    Int64,
    Uint64,
    Sint64,
    Fixed64,
    Sfixed64,
    Float,
    Double,
    String,
    Bytes,
}

impl PrimitiveKind {
    /// Schema spelling of the kind.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Sint32 => "sint32",
            Self::Fixed32 => "fixed32",
            Self::Sfixed32 => "sfixed32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Sint64 => "sint64",
            Self::Fixed64 => "fixed64",
            Self::Sfixed64 => "sfixed64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

/// A field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Primitive(PrimitiveKind),
    /// Reference to a message or enum by name.
    Custom(String),
    Map { key: Box<Type>, value: Box<Type> },
}

impl_part!(OptionContainer, DefinitionFile, MessageDef, EnumDef, Constant, Field);

impl Part for Definition {
    fn name(&self) -> &str {
        match self {
            Definition::Message(def) => def.name(),
            Definition::Enum(def) => def.name(),
        }
    }

    fn docs(&self) -> Option<&str> {
        match self {
            Definition::Message(def) => def.docs(),
            Definition::Enum(def) => def.docs(),
        }
    }

    fn options(&self) -> &Options {
        match self {
            Definition::Message(def) => def.options(),
            Definition::Enum(def) => def.options(),
        }
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file holding the given definitions.
    pub fn add(&mut self, file: DefinitionFile) {
        self.files.push(file);
    }

    /// Build a single-file schema.
    pub fn single(definitions: Vec<Definition>) -> Self {
        Self {
            files: vec![DefinitionFile {
                name: "schema".into(),
                definitions,
                ..Default::default()
            }],
            options: Vec::new(),
        }
    }
}

impl MessageDef {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            ..Default::default()
        }
    }

    pub fn abstract_(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name, fields)
        }
    }

    pub fn extends(mut self, generalization: impl Into<String>) -> Self {
        self.extends = Some(generalization.into());
        self
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_nested(mut self, definition: Definition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl EnumDef {
    pub fn new(name: impl Into<String>, constants: Vec<Constant>) -> Self {
        Self {
            name: name.into(),
            constants,
            ..Default::default()
        }
    }

    /// Constants with positional codes.
    pub fn simple(name: impl Into<String>, constants: &[&str]) -> Self {
        Self::new(name, constants.iter().map(|c| Constant::new(*c)).collect())
    }
}

impl Constant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            repeated: false,
            transient: false,
            index: None,
            docs: None,
            options: Options::new(),
        }
    }

    pub fn repeated(name: impl Into<String>, ty: Type) -> Self {
        Self {
            repeated: true,
            ..Self::new(name, ty)
        }
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl Type {
    pub fn custom(name: impl Into<String>) -> Self {
        Type::Custom(name.into())
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

impl From<MessageDef> for Definition {
    fn from(def: MessageDef) -> Self {
        Definition::Message(def)
    }
}

impl From<EnumDef> for Definition {
    fn from(def: EnumDef) -> Self {
        Definition::Enum(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_schema_programmatically() {
        let schema = Schema::single(vec![
            EnumDef::simple("Color", &["RED", "GREEN"]).into(),
            MessageDef::abstract_("Shape", vec![Field::new("name", Type::Primitive(PrimitiveKind::String))]).into(),
            MessageDef::new("Circle", vec![Field::new("radius", Type::Primitive(PrimitiveKind::Int32))])
                .extends("Shape")
                .into(),
        ]);

        assert_eq!(schema.files.len(), 1);
        assert_eq!(schema.files[0].definitions.len(), 3);
        assert_eq!(schema.files[0].definitions[2].name(), "Circle");
    }

    #[test]
    fn options_answer_flags_and_strings() {
        let message = MessageDef::new("Item", Vec::new())
            .with_option("NoBinary", OptionValue::Flag(true))
            .with_option("Name", OptionValue::String("item".into()));
        assert!(message.flag("NoBinary"));
        assert!(!message.flag("NoXml"));
        assert_eq!(message.string_option("Name"), Some("item"));
        assert_eq!(message.string_option("NoBinary"), None);
    }

    #[test]
    fn definitions_deserialize_from_json() {
        let json = serde_json::json!({
            "message": {
                "name": "Circle",
                "extends": "Shape",
                "fields": [
                    { "name": "radius", "type": { "primitive": "int32" } },
                    { "name": "tags", "type": { "map": { "key": { "primitive": "string" }, "value": { "custom": "Tag" } } } }
                ]
            }
        });
        let def: Definition = serde_json::from_value(json).unwrap();
        let Definition::Message(message) = def else {
            panic!("expected a message");
        };
        assert_eq!(message.extends.as_deref(), Some("Shape"));
        assert_eq!(message.fields[0].ty, Type::Primitive(PrimitiveKind::Int32));
        assert_eq!(
            message.fields[1].ty,
            Type::map(Type::Primitive(PrimitiveKind::String), Type::custom("Tag"))
        );
    }
}
