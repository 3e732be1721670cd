//! JSON codec emission.
//!
//! Concrete messages read and write a property object; members of an abstract
//! family wrap it in a `[discriminator, content]` array. Abstract enums look
//! the discriminator up in a table built on first use.

use super::codec::{Access, is_message, json_read, json_write};
use super::{Variants, dispatch_block, dispatch_param};
use crate::model::{MessageId, Model};
use crate::naming;
use crate::output::{CodeWriter, Context};
use crate::plan::{EncodingPlan, ValuePlan};
use crate::plugin::FieldView;

/// `write_json_fields`: ancestor fields first, then local ones.
pub(super) fn emit_field_writer(
    ctx: &Context<'_>,
    fields: &[FieldView<'_>],
    has_base: bool,
    out: &mut CodeWriter,
) {
    let rt = &ctx.runtime;
    out.blank();
    if fields.is_empty() && !has_base {
        out.line(format!("fn write_json_fields(&self, _writer: &mut {rt}::JsonWriter) {{}}"));
        return;
    }
    out.open(format!("fn write_json_fields(&self, writer: &mut {rt}::JsonWriter)"));
    if has_base {
        out.line("self.base.write_json_fields(writer);");
    }
    for field in fields {
        write_field(field, out);
    }
    out.close();
}

fn write_field(field: &FieldView<'_>, out: &mut CodeWriter) {
    let place = format!("self.{}", field.ident);
    let name = format!("writer.name(Self::{});", field.prop);
    match &field.plan {
        EncodingPlan::Scalar {
            value,
            nullable: false,
        } => {
            out.line(name);
            out.line(format!("{};", json_write(value, Access::Place(&place))));
        }
        EncodingPlan::Scalar { value, .. } => {
            out.open(format!("if let Some(value) = &{place}"));
            out.line(name);
            out.line(format!("{};", json_write(value, Access::Ref("value"))));
            out.close();
        }
        EncodingPlan::Repeated { element } => {
            out.line(name);
            out.line("writer.begin_array();");
            out.open(format!("for item in &{place}"));
            out.line(format!("{};", json_write(element, Access::Ref("item"))));
            out.close();
            out.line("writer.end_array();");
        }
        EncodingPlan::Map {
            value,
            json_object: true,
            ..
        } => {
            out.line(name);
            out.line("writer.begin_object();");
            out.open(format!("for (key, value) in &{place}"));
            out.line("writer.name(key);");
            out.line(format!("{};", json_write(value, Access::Ref("value"))));
            out.close();
            out.line("writer.end_object();");
        }
        EncodingPlan::Map { key, value, .. } => {
            out.line(name);
            out.line("writer.begin_array();");
            out.open(format!("for (key, value) in &{place}"));
            out.line("writer.begin_object();");
            out.line("writer.name(\"key\");");
            out.line(format!("{};", json_write(key, Access::Ref("key"))));
            out.line("writer.name(\"value\");");
            out.line(format!("{};", json_write(value, Access::Ref("value"))));
            out.line("writer.end_object();");
            out.close();
            out.line("writer.end_array();");
        }
    }
}

/// `read_json_field`: local keys, then the ancestor, then skip.
pub(super) fn emit_field_reader(
    ctx: &Context<'_>,
    fields: &[FieldView<'_>],
    has_base: bool,
    out: &mut CodeWriter,
) {
    let rt = &ctx.runtime;
    let name = if fields.is_empty() && !has_base { "_name" } else { "name" };
    out.blank();
    out.open(format!(
        "fn read_json_field(&mut self, reader: &mut {rt}::JsonReader, {name}: &str) -> {rt}::Result<()>"
    ));
    let fallback = if has_base {
        "self.base.read_json_field(reader, name)?"
    } else {
        "reader.skip_value()?"
    };
    if fields.is_empty() {
        out.line(format!("{fallback};"));
    } else {
        out.open("match name");
        for field in fields {
            read_field(ctx.model, field, out);
        }
        out.line(format!("_ => {fallback},"));
        out.close();
    }
    out.line("Ok(())");
    out.close();
}

/// Statement storing one element read by `read` into `place`.
fn push(plan: &ValuePlan, read: &str, place: &str) -> String {
    if is_message(plan) {
        format!("if let Some(item) = {read} {{ {place}.push(item); }}")
    } else {
        format!("{place}.push({read});")
    }
}

/// Statement adding an entry whose key and value are optional locals.
///
/// Entries go through the `put_*` accessor so a repeated key fails the read.
pub(super) fn put_entry(value: &ValuePlan, put: &str) -> String {
    if is_message(value) {
        format!("if let Some(value) = value {{ self.{put}(key.unwrap_or_default(), value)?; }}")
    } else {
        format!("self.{put}(key.unwrap_or_default(), value.unwrap_or_default())?;")
    }
}

fn read_field(model: &Model, field: &FieldView<'_>, out: &mut CodeWriter) {
    let place = format!("self.{}", field.ident);
    let put = naming::accessor("put", &field.info.name);
    let arm = format!("Self::{} =>", field.prop);
    match &field.plan {
        EncodingPlan::Scalar {
            value,
            nullable: false,
        } => out.line(format!("{arm} {place} = {},", json_read(model, value))),
        EncodingPlan::Scalar { value, .. } => {
            out.line(format!("{arm} {place} = {}.map(Box::new),", json_read(model, value)))
        }
        EncodingPlan::Repeated { element } => {
            out.open(arm);
            out.line(format!("{place}.clear();"));
            out.line("reader.begin_array()?;");
            out.open("while reader.has_next()");
            out.line(push(element, &json_read(model, element), &place));
            out.close();
            out.line("reader.end_array()?;");
            out.close();
        }
        EncodingPlan::Map {
            value,
            json_object: true,
            ..
        } => {
            out.open(arm);
            out.line(format!("{place}.clear();"));
            out.line("reader.begin_object()?;");
            out.open("while reader.has_next()");
            out.line("let key = reader.next_name()?;");
            let read = json_read(model, value);
            if is_message(value) {
                out.line(format!("if let Some(value) = {read} {{ self.{put}(key, value)?; }}"));
            } else {
                out.line(format!("let value = {read};"));
                out.line(format!("self.{put}(key, value)?;"));
            }
            out.close();
            out.line("reader.end_object()?;");
            out.close();
        }
        EncodingPlan::Map { key, value, .. } => {
            out.open(arm);
            out.line(format!("{place}.clear();"));
            out.line("reader.begin_array()?;");
            out.open("while reader.has_next()");
            out.line("let mut key = None;");
            out.line("let mut value = None;");
            out.line("reader.begin_object()?;");
            out.open("while reader.has_next()");
            out.open("match reader.next_name()?.as_str()");
            out.line(format!("\"key\" => key = Some({}),", json_read(model, key)));
            let read = json_read(model, value);
            if is_message(value) {
                out.line(format!("\"value\" => value = {read},"));
            } else {
                out.line(format!("\"value\" => value = Some({read}),"));
            }
            out.line("_ => reader.skip_value()?,");
            out.close();
            out.close();
            out.line("reader.end_object()?;");
            out.line(put_entry(value, &put));
            out.close();
            out.line("reader.end_array()?;");
            out.close();
        }
    }
}

/// Public JSON surface of a concrete message.
pub(super) fn emit_concrete(ctx: &Context<'_>, id: MessageId, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    let family = ctx.model.message(id).abstract_family;

    out.blank();
    out.line("/// Read a message; `None` for `null` or another type's discriminator.");
    out.open(format!(
        "pub fn read_json(reader: &mut {rt}::JsonReader) -> {rt}::Result<Option<Self>>"
    ));
    out.open("if reader.peek_null()");
    out.line("reader.skip_value()?;");
    out.line("return Ok(None);");
    out.close();
    if family {
        out.line("reader.begin_array()?;");
        out.line("let json_type = reader.next_string()?;");
        out.open("let value = if json_type == Self::JSON_TYPE");
        out.line("Some(Self::read_json_content(reader)?)");
        out.close();
        out.open("else");
        out.line("reader.skip_value()?;");
        out.line("None");
        out.close_with(";");
        out.line("reader.end_array()?;");
        out.line("Ok(value)");
    } else {
        out.line("Ok(Some(Self::read_json_content(reader)?))");
    }
    out.close();

    out.blank();
    out.open(format!(
        "fn read_json_content(reader: &mut {rt}::JsonReader) -> {rt}::Result<Self>"
    ));
    out.line("let mut value = Self::default();");
    out.line("reader.begin_object()?;");
    out.open("while reader.has_next()");
    out.line("let name = reader.next_name()?;");
    out.line("value.read_json_field(reader, &name)?;");
    out.close();
    out.line("reader.end_object()?;");
    out.line("Ok(value)");
    out.close();

    out.blank();
    out.open(format!("pub fn write_json(&self, writer: &mut {rt}::JsonWriter)"));
    if family {
        out.line("writer.begin_array();");
        out.line("writer.write_str(Self::JSON_TYPE);");
        out.line("self.write_json_content(writer);");
        out.line("writer.end_array();");
    } else {
        out.line("self.write_json_content(writer);");
    }
    out.close();

    out.blank();
    out.open(format!("fn write_json_content(&self, writer: &mut {rt}::JsonWriter)"));
    out.line("writer.begin_object();");
    out.line("self.write_json_fields(writer);");
    out.line("writer.end_object();");
    out.close();
}

/// Public JSON surface of an abstract enum.
pub(super) fn emit_abstract(ctx: &Context<'_>, id: MessageId, variants: &Variants, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    let model = ctx.model;
    let name = &variants.enum_name;

    out.blank();
    out.line("/// Read a message; `None` for `null` or an unknown discriminator.");
    out.open(format!(
        "pub fn read_json(reader: &mut {rt}::JsonReader) -> {rt}::Result<Option<Self>>"
    ));
    out.open(format!(
        "static FACTORIES: ::std::sync::LazyLock<::std::collections::HashMap<&'static str, {rt}::JsonFactory<{name}>>> = ::std::sync::LazyLock::new(||"
    ));
    out.line("::std::collections::HashMap::from([");
    for concrete in model.concrete_specializations(id) {
        let ty = naming::type_name(&model.message(concrete).name);
        out.line(format!(
            "    ({ty}::JSON_TYPE, (|reader: &mut {rt}::JsonReader| -> {rt}::Result<{name}> {{ Ok({name}::from({ty}::read_json_content(reader)?)) }}) as {rt}::JsonFactory<{name}>),"
        ));
    }
    out.line("])");
    out.close_with(");");
    out.open("if reader.peek_null()");
    out.line("reader.skip_value()?;");
    out.line("return Ok(None);");
    out.close();
    out.line("reader.begin_array()?;");
    out.line("let json_type = reader.next_string()?;");
    out.open("let value = match FACTORIES.get(json_type.as_str())");
    out.line("Some(factory) => Some(factory(reader)?),");
    out.open("None =>");
    out.line("reader.skip_value()?;");
    out.line("None");
    out.close();
    out.close_with(";");
    out.line("reader.end_array()?;");
    out.line("Ok(value)");
    out.close();

    out.blank();
    out.open(format!("pub fn write_json(&self, writer: &mut {rt}::JsonWriter)"));
    out.line("writer.begin_array();");
    out.line("writer.write_str(self.json_type());");
    out.line("self.write_json_content(writer);");
    out.line("writer.end_array();");
    out.close();

    out.blank();
    let writer = dispatch_param(variants, "writer");
    out.open(format!("fn write_json_content(&self, {writer}: &mut {rt}::JsonWriter)"));
    dispatch_block(out, variants, |_| "inner.write_json_content(writer)".into(), None);
    out.close();

    out.blank();
    out.line("/// JSON discriminator of the contained type.");
    out.open("pub fn json_type(&self) -> &'static str");
    dispatch_block(out, variants, |_| "inner.json_type()".into(), None);
    out.close();
}
