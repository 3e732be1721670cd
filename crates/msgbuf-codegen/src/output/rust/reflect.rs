//! Reflective property tables.

use super::codec::{is_copy, is_message, value_type};
use super::{Variants, dispatch_block, dispatch_param, literal};
use crate::model::Model;
use crate::output::{CodeWriter, Context};
use crate::plan::{EncodingPlan, Target};
use crate::plugin::FieldView;

/// `get` and `set` closures of one table entry.
fn accessors(model: &Model, rt: &str, field: &FieldView<'_>) -> (String, String) {
    let ident = &field.ident;
    let prop = &field.prop;
    match &field.plan {
        EncodingPlan::Scalar {
            value,
            nullable: true,
        } if is_message(value) => {
            let ty = value_type(model, value);
            (
                format!("{rt}::Value::other(this.{ident}.as_deref().cloned())"),
                format!("this.{ident} = value.downcast::<Option<{ty}>>(Self::{prop})?.map(Box::new);"),
            )
        }
        EncodingPlan::Scalar { value, .. } if matches!(value.target, Target::Primitive(_)) => {
            let get = if is_copy(value) {
                format!("{rt}::Value::from(this.{ident})")
            } else {
                format!("{rt}::Value::from(this.{ident}.clone())")
            };
            (
                get,
                format!("this.{ident} = {rt}::FromValue::from_value(value, Self::{prop})?;"),
            )
        }
        EncodingPlan::Scalar { .. } => (
            format!("{rt}::Value::other(this.{ident})"),
            format!("this.{ident} = value.downcast(Self::{prop})?;"),
        ),
        EncodingPlan::Repeated { .. } | EncodingPlan::Map { .. } => (
            format!("{rt}::Value::other(this.{ident}.clone())"),
            format!("this.{ident} = value.downcast(Self::{prop})?;"),
        ),
    }
}

/// `PROPERTY_TABLE`, `reflect_get` and `reflect_set` of a data struct.
pub(super) fn emit_table(
    ctx: &Context<'_>,
    fields: &[FieldView<'_>],
    has_base: bool,
    out: &mut CodeWriter,
) {
    let rt = &ctx.runtime;
    out.blank();
    if fields.is_empty() {
        out.line(format!("const PROPERTY_TABLE: &'static [{rt}::Property<Self>] = &[];"));
    } else {
        out.line(format!("const PROPERTY_TABLE: &'static [{rt}::Property<Self>] = &["));
        for field in fields {
            let (get, set) = accessors(ctx.model, rt, field);
            out.line(format!("    {rt}::Property {{"));
            out.line(format!("        name: Self::{},", field.prop));
            out.line(format!("        get: |this| {get},"));
            out.line(format!("        set: |this, value| {{ {set} Ok(()) }},"));
            out.line("    },");
        }
        out.line("];");
    }

    let fallback_get = if has_base {
        "self.base.reflect_get(name)".to_string()
    } else {
        format!("Err({rt}::reflect::unknown(name))")
    };
    out.blank();
    out.open(format!("fn reflect_get(&self, name: &str) -> {rt}::Result<{rt}::Value>"));
    out.open(format!("match {rt}::reflect::lookup(Self::PROPERTY_TABLE, name)"));
    out.line("Some(property) => Ok((property.get)(self)),");
    out.line(format!("None => {fallback_get},"));
    out.close();
    out.close();

    let fallback_set = if has_base {
        "self.base.reflect_set(name, value)".to_string()
    } else {
        format!("Err({rt}::reflect::unknown(name))")
    };
    let value = if has_base || !fields.is_empty() { "value" } else { "_value" };
    out.blank();
    out.open(format!(
        "fn reflect_set(&mut self, name: &str, {value}: {rt}::Value) -> {rt}::Result<()>"
    ));
    out.open(format!("match {rt}::reflect::lookup(Self::PROPERTY_TABLE, name)"));
    out.line(format!("Some(property) => (property.set)(self, {value}),"));
    out.line(format!("None => {fallback_set},"));
    out.close();
    out.close();
}

/// `PROPERTY_NAMES` of a concrete type: every key, ancestor keys first.
pub(super) fn emit_names(inherited: &[FieldView<'_>], fields: &[FieldView<'_>], out: &mut CodeWriter) {
    let names: Vec<String> = inherited
        .iter()
        .chain(fields)
        .map(|field| literal(&field.info.key))
        .collect();
    out.line(format!(
        "pub const PROPERTY_NAMES: &'static [&'static str] = &[{}];",
        names.join(", ")
    ));
}

pub(super) fn emit_concrete_methods(out: &mut CodeWriter) {
    out.blank();
    out.line("/// Property keys, ancestor keys first.");
    out.open("pub fn property_names(&self) -> &'static [&'static str]");
    out.line("Self::PROPERTY_NAMES");
    out.close();
}

pub(super) fn emit_abstract_methods(ctx: &Context<'_>, variants: &Variants, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    out.blank();
    out.line("/// Property keys of the contained type, ancestor keys first.");
    out.open("pub fn property_names(&self) -> &'static [&'static str]");
    dispatch_block(out, variants, |_| "inner.property_names()".into(), None);
    out.close();

    let (name, value) = (dispatch_param(variants, "name"), dispatch_param(variants, "value"));
    out.blank();
    out.open(format!("fn reflect_get(&self, {name}: &str) -> {rt}::Result<{rt}::Value>"));
    dispatch_block(out, variants, |_| "inner.reflect_get(name)".into(), None);
    out.close();

    out.blank();
    out.open(format!(
        "fn reflect_set(&mut self, {name}: &str, {value}: {rt}::Value) -> {rt}::Result<()>"
    ));
    dispatch_block(out, variants, |_| "inner.reflect_set(name, value)".into(), None);
    out.close();
}

/// `impl Reflective` delegating to the generated methods.
pub(super) fn emit_trait(ctx: &Context<'_>, type_name: &str, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    out.blank();
    out.open(format!("impl {rt}::Reflective for {type_name}"));
    out.open("fn properties(&self) -> &'static [&'static str]");
    out.line("self.property_names()");
    out.close();
    out.blank();
    out.open(format!("fn get(&self, name: &str) -> {rt}::Result<{rt}::Value>"));
    out.line("self.reflect_get(name)");
    out.close();
    out.blank();
    out.open(format!("fn set(&mut self, name: &str, value: {rt}::Value) -> {rt}::Result<()>"));
    out.line("self.reflect_set(name, value)");
    out.close();
    out.close();
}
