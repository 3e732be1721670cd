//! Format codec planning.
//!
//! A pure function from a field's type and shape to its wire layout under
//! both formats. The plan never depends on the field's position, only on
//! what it holds.

use crate::ir::PrimitiveKind;
use crate::model::{EnumId, FieldInfo, MessageId, Model, ResolvedType};

/// Binary value kind; mirrors `msgbuf_runtime::DataType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Int,
    Sint,
    Fint,
    Long,
    Slong,
    Flong,
    Float,
    Double,
    String,
    Binary,
    Object,
}

impl WireKind {
    /// Variant name of the matching runtime `DataType`.
    pub fn data_type(self) -> &'static str {
        match self {
            WireKind::Int => "Int",
            WireKind::Sint => "Sint",
            WireKind::Fint => "Fint",
            WireKind::Long => "Long",
            WireKind::Slong => "Slong",
            WireKind::Flong => "Flong",
            WireKind::Float => "Float",
            WireKind::Double => "Double",
            WireKind::String => "String",
            WireKind::Binary => "Binary",
            WireKind::Object => "Object",
        }
    }

    fn label(self) -> &'static str {
        match self {
            WireKind::Int => "int",
            WireKind::Sint => "sint",
            WireKind::Fint => "fint",
            WireKind::Long => "long",
            WireKind::Slong => "slong",
            WireKind::Flong => "flong",
            WireKind::Float => "float",
            WireKind::Double => "double",
            WireKind::String => "string",
            WireKind::Binary => "binary",
            WireKind::Object => "object",
        }
    }
}

/// JSON token shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Boolean,
    Integer,
    Number,
    String,
    /// A base64 string, `null` allowed on read.
    Base64,
    /// The declared name of an enum constant.
    EnumName,
    /// A message's own property object.
    Object,
    /// A `[discriminator, content]` pair.
    Discriminated,
}

impl JsonShape {
    fn label(self) -> &'static str {
        match self {
            JsonShape::Boolean => "boolean",
            JsonShape::Integer => "integer",
            JsonShape::Number => "number",
            JsonShape::String => "string",
            JsonShape::Base64 => "base64",
            JsonShape::EnumName => "enum-name",
            JsonShape::Object => "object",
            JsonShape::Discriminated => "discriminated",
        }
    }
}

/// How a message-typed value is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRef {
    /// The declared type is abstract: the discriminator travels with the value.
    Polymorphic,
    /// The declared type is concrete: only its content is written.
    Monomorphic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Primitive(PrimitiveKind),
    Enum(EnumId),
    Message { id: MessageId, dispatch: MessageRef },
}

/// Value a field holds before anything is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    False,
    Zero,
    ZeroFloat,
    EmptyString,
    EmptyBytes,
    FirstConstant,
    Absent,
}

impl DefaultValue {
    fn label(self) -> &'static str {
        match self {
            DefaultValue::False => "false",
            DefaultValue::Zero => "0",
            DefaultValue::ZeroFloat => "0.0",
            DefaultValue::EmptyString => "\"\"",
            DefaultValue::EmptyBytes => "empty bytes",
            DefaultValue::FirstConstant => "first constant",
            DefaultValue::Absent => "absent",
        }
    }
}

/// Encoding of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuePlan {
    pub target: Target,
    pub wire: WireKind,
    pub json: JsonShape,
    pub default: DefaultValue,
}

/// Encoding of a whole field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPlan {
    /// A single value; message values are nullable and written only when present.
    Scalar { value: ValuePlan, nullable: bool },
    /// A length-prefixed binary array and a JSON array of elements.
    Repeated { element: ValuePlan },
    /// A binary array of key/value records; a JSON object when keys are strings,
    /// otherwise a JSON array of `{"key", "value"}` records.
    Map {
        key: ValuePlan,
        value: ValuePlan,
        json_object: bool,
    },
}

/// A type composition no codec can express.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("map keys must be strings, integers, booleans or enums, not {0}")]
    MapKey(String),
    #[error("maps cannot nest inside maps")]
    NestedMap,
    #[error("repeated fields cannot hold maps")]
    RepeatedMap,
}

/// Plan a primitive value.
pub fn primitive(kind: PrimitiveKind) -> ValuePlan {
    use PrimitiveKind as P;
    let (wire, json, default) = match kind {
        P::Bool => (WireKind::Int, JsonShape::Boolean, DefaultValue::False),
        P::Int32 | P::Uint32 => (WireKind::Int, JsonShape::Integer, DefaultValue::Zero),
        P::Sint32 => (WireKind::Sint, JsonShape::Integer, DefaultValue::Zero),
        P::Fixed32 | P::Sfixed32 => (WireKind::Fint, JsonShape::Integer, DefaultValue::Zero),
        P::Int64 | P::Uint64 => (WireKind::Long, JsonShape::Integer, DefaultValue::Zero),
        P::Sint64 => (WireKind::Slong, JsonShape::Integer, DefaultValue::Zero),
        P::Fixed64 | P::Sfixed64 => (WireKind::Flong, JsonShape::Integer, DefaultValue::Zero),
        P::Float => (WireKind::Float, JsonShape::Number, DefaultValue::ZeroFloat),
        P::Double => (WireKind::Double, JsonShape::Number, DefaultValue::ZeroFloat),
        P::String => (WireKind::String, JsonShape::String, DefaultValue::EmptyString),
        P::Bytes => (WireKind::Binary, JsonShape::Base64, DefaultValue::EmptyBytes),
    };
    ValuePlan {
        target: Target::Primitive(kind),
        wire,
        json,
        default,
    }
}

/// Plan a single (non-map) value of the given type.
pub fn plan_value(model: &Model, ty: &ResolvedType) -> Result<ValuePlan, PlanError> {
    Ok(match ty {
        ResolvedType::Primitive(kind) => primitive(*kind),
        ResolvedType::Enum(id) => ValuePlan {
            target: Target::Enum(*id),
            wire: WireKind::Int,
            json: JsonShape::EnumName,
            default: DefaultValue::FirstConstant,
        },
        ResolvedType::Message(id) => {
            let (dispatch, json) = if model.message(*id).is_abstract {
                (MessageRef::Polymorphic, JsonShape::Discriminated)
            } else {
                (MessageRef::Monomorphic, JsonShape::Object)
            };
            ValuePlan {
                target: Target::Message { id: *id, dispatch },
                wire: WireKind::Object,
                json,
                default: DefaultValue::Absent,
            }
        }
        ResolvedType::Map { .. } => return Err(PlanError::NestedMap),
    })
}

fn plan_key(model: &Model, ty: &ResolvedType) -> Result<ValuePlan, PlanError> {
    match ty {
        ResolvedType::Primitive(
            kind @ (PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::Bytes),
        ) => Err(PlanError::MapKey(kind.keyword().to_string())),
        ResolvedType::Message(id) => Err(PlanError::MapKey(format!(
            "message `{}`",
            model.message(*id).name
        ))),
        _ => plan_value(model, ty),
    }
}

/// Plan a field.
pub fn plan_field(model: &Model, field: &FieldInfo) -> Result<EncodingPlan, PlanError> {
    match &field.ty {
        ResolvedType::Map { .. } if field.repeated => Err(PlanError::RepeatedMap),
        ResolvedType::Map { key, value } => Ok(EncodingPlan::Map {
            key: plan_key(model, key)?,
            value: plan_value(model, value)?,
            json_object: matches!(**key, ResolvedType::Primitive(PrimitiveKind::String)),
        }),
        ty if field.repeated => Ok(EncodingPlan::Repeated {
            element: plan_value(model, ty)?,
        }),
        ty => {
            let value = plan_value(model, ty)?;
            Ok(EncodingPlan::Scalar {
                nullable: matches!(value.target, Target::Message { .. }),
                value,
            })
        }
    }
}

impl ValuePlan {
    /// One-line description, for diagnostics and tests.
    pub fn describe(&self, model: &Model) -> String {
        let subject = match self.target {
            Target::Primitive(kind) => kind.keyword().to_string(),
            Target::Enum(id) => format!("enum {}", model.enumeration(id).name),
            Target::Message { id, .. } => format!("message {}", model.message(id).name),
        };
        format!(
            "{subject} [binary {}, json {}, default {}]",
            self.wire.label(),
            self.json.label(),
            self.default.label()
        )
    }
}

impl EncodingPlan {
    pub fn describe(&self, model: &Model) -> String {
        match self {
            EncodingPlan::Scalar {
                value,
                nullable: false,
            } => value.describe(model),
            EncodingPlan::Scalar {
                value,
                nullable: true,
            } => format!("optional {}", value.describe(model)),
            EncodingPlan::Repeated { element } => {
                format!("repeated {}", element.describe(model))
            }
            EncodingPlan::Map {
                key,
                value,
                json_object,
            } => format!(
                "map {} => {} as {}",
                key.describe(model),
                value.describe(model),
                if *json_object { "object" } else { "entries" }
            ),
        }
    }
}
