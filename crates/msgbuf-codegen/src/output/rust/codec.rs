//! Read and write expressions for single values.
//!
//! Writers assume a `writer` binding and readers a `reader` binding in scope.
//! Read expressions for messages evaluate to `Option<T>`; everything else
//! evaluates to the value itself.

use crate::ir::PrimitiveKind as P;
use crate::model::Model;
use crate::naming;
use crate::plan::{EncodingPlan, MessageRef, Target, ValuePlan};

/// How generated code reaches a value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Access<'a> {
    /// A place of the value's own type, such as `self.radius`.
    Place(&'a str),
    /// A reference to the value, such as a loop binding.
    Ref(&'a str),
}

impl Access<'_> {
    fn copied(self) -> String {
        match self {
            Access::Place(place) => place.to_string(),
            Access::Ref(reference) => format!("*{reference}"),
        }
    }

    fn borrowed(self) -> String {
        match self {
            Access::Place(place) => format!("&{place}"),
            Access::Ref(reference) => reference.to_string(),
        }
    }

    fn receiver(self) -> String {
        match self {
            Access::Place(expr) | Access::Ref(expr) => expr.to_string(),
        }
    }
}

pub(crate) fn primitive_type(kind: P) -> &'static str {
    match kind {
        P::Bool => "bool",
        P::Int32 | P::Sint32 | P::Sfixed32 => "i32",
        P::Uint32 | P::Fixed32 => "u32",
        P::Int64 | P::Sint64 | P::Sfixed64 => "i64",
        P::Uint64 | P::Fixed64 => "u64",
        P::Float => "f32",
        P::Double => "f64",
        P::String => "String",
        P::Bytes => "Vec<u8>",
    }
}

/// Rust type of a single value.
pub fn value_type(model: &Model, plan: &ValuePlan) -> String {
    match plan.target {
        Target::Primitive(kind) => primitive_type(kind).to_string(),
        Target::Enum(id) => naming::type_name(&model.enumeration(id).name),
        Target::Message { id, .. } => naming::type_name(&model.message(id).name),
    }
}

/// Rust type of a field's storage.
pub(crate) fn storage_type(model: &Model, runtime: &str, plan: &EncodingPlan) -> String {
    match plan {
        EncodingPlan::Scalar {
            value,
            nullable: true,
        } => format!("Option<Box<{}>>", value_type(model, value)),
        EncodingPlan::Scalar { value, .. } => value_type(model, value),
        EncodingPlan::Repeated { element } => format!("Vec<{}>", value_type(model, element)),
        EncodingPlan::Map { key, value, .. } => format!(
            "{runtime}::IndexMap<{}, {}>",
            value_type(model, key),
            value_type(model, value)
        ),
    }
}

pub(crate) fn is_message(plan: &ValuePlan) -> bool {
    matches!(plan.target, Target::Message { .. })
}

/// Whether the value is `Copy` and handed out by value.
pub(crate) fn is_copy(plan: &ValuePlan) -> bool {
    !matches!(
        plan.target,
        Target::Primitive(P::String | P::Bytes) | Target::Message { .. }
    )
}

pub(crate) fn json_write(plan: &ValuePlan, access: Access<'_>) -> String {
    match plan.target {
        Target::Primitive(kind) => match kind {
            P::Bool => format!("writer.write_bool({})", access.copied()),
            P::Int32 | P::Sint32 | P::Sfixed32 => {
                format!("writer.write_i64(i64::from({}))", access.copied())
            }
            P::Uint32 | P::Fixed32 => format!("writer.write_u64(u64::from({}))", access.copied()),
            P::Int64 | P::Sint64 | P::Sfixed64 => format!("writer.write_i64({})", access.copied()),
            P::Uint64 | P::Fixed64 => format!("writer.write_u64({})", access.copied()),
            P::Float => format!("writer.write_f64(f64::from({}))", access.copied()),
            P::Double => format!("writer.write_f64({})", access.copied()),
            P::String => format!("writer.write_str({})", access.borrowed()),
            P::Bytes => format!("writer.write_binary({})", access.borrowed()),
        },
        Target::Enum(_) => format!("writer.write_str({}.name())", access.receiver()),
        Target::Message {
            dispatch: MessageRef::Polymorphic,
            ..
        } => format!("{}.write_json(writer)", access.receiver()),
        Target::Message {
            dispatch: MessageRef::Monomorphic,
            ..
        } => format!("{}.write_json_content(writer)", access.receiver()),
    }
}

pub(crate) fn json_read(model: &Model, plan: &ValuePlan) -> String {
    match plan.target {
        Target::Primitive(kind) => match kind {
            P::Bool => "reader.next_bool()?",
            P::Int32 | P::Sint32 | P::Sfixed32 => "reader.next_int()?",
            P::Uint32 | P::Fixed32 => "reader.next_uint()?",
            P::Int64 | P::Sint64 | P::Sfixed64 => "reader.next_long()?",
            P::Uint64 | P::Fixed64 => "reader.next_ulong()?",
            P::Float => "reader.next_float()?",
            P::Double => "reader.next_double()?",
            P::String => "reader.next_string()?",
            P::Bytes => "reader.next_binary()?",
        }
        .to_string(),
        Target::Enum(_) => format!(
            "{}::from_name(&reader.next_string()?)",
            value_type(model, plan)
        ),
        Target::Message {
            dispatch: MessageRef::Polymorphic,
            ..
        } => format!("{}::read_json(reader)?", value_type(model, plan)),
        Target::Message {
            dispatch: MessageRef::Monomorphic,
            ..
        } => format!(
            "reader.next_nullable({}::read_json_content)?",
            value_type(model, plan)
        ),
    }
}

pub(crate) fn binary_write(plan: &ValuePlan, access: Access<'_>) -> String {
    let method = match plan.target {
        Target::Primitive(kind) => match kind {
            P::Bool => "write_bool",
            P::Int32 => "write_int",
            P::Uint32 => "write_uint",
            P::Sint32 => "write_sint",
            P::Fixed32 => "write_fixed_int",
            P::Sfixed32 => "write_sfixed_int",
            P::Int64 => "write_long",
            P::Uint64 => "write_ulong",
            P::Sint64 => "write_slong",
            P::Fixed64 => "write_fixed_long",
            P::Sfixed64 => "write_sfixed_long",
            P::Float => "write_float",
            P::Double => "write_double",
            P::String => return format!("writer.write_string({})", access.borrowed()),
            P::Bytes => return format!("writer.write_binary({})", access.borrowed()),
        },
        Target::Enum(_) => return format!("writer.write_int({}.code())", access.receiver()),
        Target::Message { .. } => return format!("{}.write_binary(writer)", access.receiver()),
    };
    format!("writer.{method}({})", access.copied())
}

pub(crate) fn binary_read(model: &Model, plan: &ValuePlan) -> String {
    match plan.target {
        Target::Primitive(kind) => {
            let method = match kind {
                P::Bool => "next_bool",
                P::Int32 => "next_int",
                P::Uint32 => "next_uint",
                P::Sint32 => "next_sint",
                P::Fixed32 => "next_fixed_int",
                P::Sfixed32 => "next_sfixed_int",
                P::Int64 => "next_long",
                P::Uint64 => "next_ulong",
                P::Sint64 => "next_slong",
                P::Fixed64 => "next_fixed_long",
                P::Sfixed64 => "next_sfixed_long",
                P::Float => "next_float",
                P::Double => "next_double",
                P::String => "next_string",
                P::Bytes => "next_binary",
            };
            format!("reader.{method}()?")
        }
        Target::Enum(_) => format!("{}::from_code(reader.next_int()?)", value_type(model, plan)),
        Target::Message { .. } => format!("{}::read_binary(reader)?", value_type(model, plan)),
    }
}
