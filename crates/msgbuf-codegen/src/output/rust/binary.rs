//! Binary codec emission.
//!
//! Every message is an object of `(tag, value)` pairs. Members of an abstract
//! family open with the type discriminator under tag 0; transient fields are
//! never written.

use super::codec::{Access, binary_read, binary_write, is_message};
use super::json::put_entry;
use super::{Variants, dispatch_block, dispatch_param};
use crate::model::{MessageId, Model};
use crate::naming;
use crate::output::{CodeWriter, Context};
use crate::plan::EncodingPlan;
use crate::plugin::FieldView;

fn encoded<'a, 'm>(fields: &'a [FieldView<'m>]) -> impl Iterator<Item = &'a FieldView<'m>> {
    fields.iter().filter(|field| !field.info.transient && field.info.tag.is_some())
}

/// `write_binary_fields`: ancestor fields first, then local ones.
pub(super) fn emit_field_writer(
    ctx: &Context<'_>,
    fields: &[FieldView<'_>],
    has_base: bool,
    out: &mut CodeWriter,
) {
    let rt = &ctx.runtime;
    out.blank();
    if encoded(fields).next().is_none() && !has_base {
        out.line(format!("fn write_binary_fields(&self, _writer: &mut {rt}::DataWriter) {{}}"));
        return;
    }
    out.open(format!("fn write_binary_fields(&self, writer: &mut {rt}::DataWriter)"));
    if has_base {
        out.line("self.base.write_binary_fields(writer);");
    }
    for field in encoded(fields) {
        write_field(ctx, field, out);
    }
    out.close();
}

fn write_field(ctx: &Context<'_>, field: &FieldView<'_>, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    let place = format!("self.{}", field.ident);
    let name = format!("writer.name(Self::{});", field.tag);
    match &field.plan {
        EncodingPlan::Scalar {
            value,
            nullable: false,
        } => {
            out.line(name);
            out.line(format!("{};", binary_write(value, Access::Place(&place))));
        }
        EncodingPlan::Scalar { value, .. } => {
            out.open(format!("if let Some(value) = &{place}"));
            out.line(name);
            out.line(format!("{};", binary_write(value, Access::Ref("value"))));
            out.close();
        }
        EncodingPlan::Repeated { element } => {
            out.line(name);
            out.line(format!(
                "writer.begin_array({rt}::DataType::{}, {place}.len());",
                element.wire.data_type()
            ));
            out.open(format!("for item in &{place}"));
            out.line(format!("{};", binary_write(element, Access::Ref("item"))));
            out.close();
            out.line("writer.end_array();");
        }
        EncodingPlan::Map { key, value, .. } => {
            out.line(name);
            out.line(format!("writer.begin_array({rt}::DataType::Object, {place}.len());"));
            out.open(format!("for (key, value) in &{place}"));
            out.line("writer.begin_object();");
            out.line("writer.name(1);");
            out.line(format!("{};", binary_write(key, Access::Ref("key"))));
            out.line("writer.name(2);");
            out.line(format!("{};", binary_write(value, Access::Ref("value"))));
            out.line("writer.end_object();");
            out.close();
            out.line("writer.end_array();");
        }
    }
}

/// `read_binary_field`: local tags, then the ancestor, then skip.
pub(super) fn emit_field_reader(
    ctx: &Context<'_>,
    fields: &[FieldView<'_>],
    has_base: bool,
    out: &mut CodeWriter,
) {
    let rt = &ctx.runtime;
    let any_local = encoded(fields).next().is_some();
    let tag = if any_local || has_base { "tag" } else { "_tag" };
    out.blank();
    out.open(format!(
        "fn read_binary_field(&mut self, reader: &mut {rt}::DataReader<'_>, {tag}: u32) -> {rt}::Result<()>"
    ));
    let fallback = if has_base {
        "self.base.read_binary_field(reader, tag)?"
    } else {
        "reader.skip_value()?"
    };
    if any_local {
        out.open("match tag");
        for field in encoded(fields) {
            read_field(ctx.model, field, out);
        }
        out.line(format!("_ => {fallback},"));
        out.close();
    } else {
        out.line(format!("{fallback};"));
    }
    out.line("Ok(())");
    out.close();
}

fn read_field(model: &Model, field: &FieldView<'_>, out: &mut CodeWriter) {
    let place = format!("self.{}", field.ident);
    let arm = format!("Self::{} =>", field.tag);
    match &field.plan {
        EncodingPlan::Scalar {
            value,
            nullable: false,
        } => out.line(format!("{arm} {place} = {},", binary_read(model, value))),
        EncodingPlan::Scalar { value, .. } => {
            out.line(format!("{arm} {place} = {}.map(Box::new),", binary_read(model, value)))
        }
        EncodingPlan::Repeated { element } => {
            out.open(arm);
            out.line(format!("{place}.clear();"));
            out.line("reader.begin_array()?;");
            out.open("while reader.has_next()?");
            let read = binary_read(model, element);
            if is_message(element) {
                out.line(format!("if let Some(item) = {read} {{ {place}.push(item); }}"));
            } else {
                out.line(format!("{place}.push({read});"));
            }
            out.close();
            out.line("reader.end_array()?;");
            out.close();
        }
        EncodingPlan::Map { key, value, .. } => {
            out.open(arm);
            out.line(format!("{place}.clear();"));
            out.line("reader.begin_array()?;");
            out.open("while reader.has_next()?");
            out.line("let mut key = None;");
            out.line("let mut value = None;");
            out.line("reader.begin_object()?;");
            out.open("while reader.has_next()?");
            out.open("match reader.next_name()?");
            out.line(format!("1 => key = Some({}),", binary_read(model, key)));
            let read = binary_read(model, value);
            if is_message(value) {
                out.line(format!("2 => value = {read},"));
            } else {
                out.line(format!("2 => value = Some({read}),"));
            }
            out.line("_ => reader.skip_value()?,");
            out.close();
            out.close();
            out.line("reader.end_object()?;");
            out.line(put_entry(value, &naming::accessor("put", &field.info.name)));
            out.close();
            out.line("reader.end_array()?;");
            out.close();
        }
    }
}

/// Public binary surface of a concrete message.
pub(super) fn emit_concrete(ctx: &Context<'_>, id: MessageId, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    let info = ctx.model.message(id);
    let discriminated = info.abstract_family && info.type_id.is_some();

    out.blank();
    if discriminated {
        out.line("/// Read a message; `None` if the object holds another member of the family.");
    }
    out.open(format!(
        "pub fn read_binary(reader: &mut {rt}::DataReader<'_>) -> {rt}::Result<Option<Self>>"
    ));
    out.line("reader.begin_object()?;");
    if discriminated {
        out.open("if reader.read_type_id()? != Self::TYPE_ID");
        out.line("reader.end_object()?;");
        out.line("return Ok(None);");
        out.close();
    }
    out.line("let value = Self::read_binary_fields(reader)?;");
    out.line("reader.end_object()?;");
    out.line("Ok(Some(value))");
    out.close();

    out.blank();
    out.open(format!(
        "fn read_binary_fields(reader: &mut {rt}::DataReader<'_>) -> {rt}::Result<Self>"
    ));
    out.line("let mut value = Self::default();");
    out.open("while reader.has_next()?");
    out.line("let tag = reader.next_name()?;");
    out.line("value.read_binary_field(reader, tag)?;");
    out.close();
    out.line("Ok(value)");
    out.close();

    out.blank();
    out.open(format!("pub fn write_binary(&self, writer: &mut {rt}::DataWriter)"));
    out.line("writer.begin_object();");
    if discriminated {
        out.line("writer.name(0);");
        out.line("writer.write_uint(Self::TYPE_ID);");
    }
    out.line("self.write_binary_fields(writer);");
    out.line("writer.end_object();");
    out.close();
}

/// Public binary surface of an abstract enum.
pub(super) fn emit_abstract(ctx: &Context<'_>, id: MessageId, variants: &Variants, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    let model = ctx.model;
    let name = &variants.enum_name;

    out.blank();
    out.line("/// Read a message; `None` for an unknown discriminator.");
    out.open(format!(
        "pub fn read_binary(reader: &mut {rt}::DataReader<'_>) -> {rt}::Result<Option<Self>>"
    ));
    out.open(format!(
        "static FACTORIES: ::std::sync::LazyLock<::std::collections::HashMap<u32, {rt}::BinaryFactory<{name}>>> = ::std::sync::LazyLock::new(||"
    ));
    out.line("::std::collections::HashMap::from([");
    for concrete in model.concrete_specializations(id) {
        let ty = naming::type_name(&model.message(concrete).name);
        out.line(format!(
            "    ({ty}::TYPE_ID, (|reader: &mut {rt}::DataReader<'_>| -> {rt}::Result<{name}> {{ Ok({name}::from({ty}::read_binary_fields(reader)?)) }}) as {rt}::BinaryFactory<{name}>),"
        ));
    }
    out.line("])");
    out.close_with(");");
    out.line("reader.begin_object()?;");
    out.line("let type_id = reader.read_type_id()?;");
    out.line("let value = FACTORIES.get(&type_id).map(|factory| factory(reader)).transpose()?;");
    out.line("reader.end_object()?;");
    out.line("Ok(value)");
    out.close();

    out.blank();
    let writer = dispatch_param(variants, "writer");
    out.open(format!("pub fn write_binary(&self, {writer}: &mut {rt}::DataWriter)"));
    dispatch_block(out, variants, |_| "inner.write_binary(writer)".into(), None);
    out.close();

    out.blank();
    out.line("/// Binary discriminator of the contained type.");
    out.open("pub fn type_id(&self) -> u32");
    dispatch_block(out, variants, |_| "inner.type_id()".into(), None);
    out.close();
}
