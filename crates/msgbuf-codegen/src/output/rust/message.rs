//! Message emission.
//!
//! A message is emitted as its public type followed by its data struct:
//!
//! ```text
//! concrete:  struct Circle { base: ShapeBase, radius }  + impl + trait impls
//! abstract:  trait ShapeVisitor, enum Shape { Circle(Circle), .. }, From impls,
//!            impl + trait impls, struct ShapeBase { x, y } + impl
//! ```
//!
//! Plugins append to the data struct's `impl` (storage surface) and after the
//! public type (public surface).

use super::accessors::{accessors, emit_dispatched, emit_forwarded, emit_local};
use super::codec::storage_type;
use super::{Variants, ancestor_fields, binary, data_name, json, literal, local_fields, reflect, visitor};
use crate::error::GenerateError;
use crate::model::MessageId;
use crate::naming;
use crate::output::{CodeWriter, Context};
use crate::plugin::{FieldView, GeneratorPlugin, MessageView, PluginError};
use tracing::{debug, debug_span, error};

type Stage = fn(&dyn GeneratorPlugin, &MessageView<'_>, &mut CodeWriter) -> Result<(), PluginError>;

pub(super) fn emit(ctx: &Context<'_>, id: MessageId, out: &mut CodeWriter) -> Result<(), GenerateError> {
    let model = ctx.model;
    let info = model.message(id);
    let _span = debug_span!("message", name = %info.name, is_abstract = info.is_abstract).entered();

    let fields = local_fields(model, id)?;
    let inherited = ancestor_fields(model, id)?;
    debug!(fields = fields.len(), inherited = inherited.len(), "emitting message");

    if info.is_abstract {
        emit_abstract(ctx, id, &fields, &inherited, out)?;
    } else {
        let type_name = naming::type_name(&info.name);
        emit_data(ctx, id, &fields, &inherited, out)?;
        emit_concrete_traits(ctx, &type_name, out);
        run_plugins(ctx, &view(ctx, id, &type_name, &fields, &inherited), out, |plugin, view, out| {
            plugin.public_surface(view, out)
        })?;
    }
    Ok(())
}

fn view<'a>(
    ctx: &'a Context<'_>,
    id: MessageId,
    type_name: &'a str,
    fields: &'a [FieldView<'a>],
    inherited: &'a [FieldView<'a>],
) -> MessageView<'a> {
    MessageView {
        model: ctx.model,
        id,
        info: ctx.model.message(id),
        type_name,
        runtime: &ctx.runtime,
        fields,
        inherited,
    }
}

fn run_plugins(
    ctx: &Context<'_>,
    view: &MessageView<'_>,
    out: &mut CodeWriter,
    stage: Stage,
) -> Result<(), GenerateError> {
    for plugin in &ctx.plugins {
        stage(*plugin, view, out).map_err(|PluginError(message)| {
            error!(plugin = plugin.name(), definition = %view.info.name, %message, "plugin rejected definition");
            GenerateError::Plugin {
                plugin: plugin.name().to_string(),
                definition: view.info.name.clone(),
                message,
            }
        })?;
    }
    Ok(())
}

/// The struct holding the fields `id` declares, and its `impl`.
///
/// For a concrete message this is the public type itself.
fn emit_data(
    ctx: &Context<'_>,
    id: MessageId,
    fields: &[FieldView<'_>],
    inherited: &[FieldView<'_>],
    out: &mut CodeWriter,
) -> Result<(), GenerateError> {
    let model = ctx.model;
    let rt = &ctx.runtime;
    let features = ctx.features;
    let info = model.message(id);
    let name = data_name(model, id);
    let concrete = !info.is_abstract;
    let has_base = info.generalization.is_some();

    out.blank();
    if concrete {
        out.docs(info.docs.as_deref());
        out.line("#[derive(Debug, Clone, PartialEq, Default)]");
        out.open(format!("pub struct {name}"));
    } else {
        out.line(format!("/// Fields declared by [`{}`].", naming::type_name(&info.name)));
        out.line("#[derive(Debug, Clone, PartialEq, Default)]");
        out.open(format!("struct {name}"));
    }
    if let Some(parent) = info.generalization {
        out.line(format!("base: {},", data_name(model, parent)));
    }
    for field in fields {
        out.line(format!("{}: {},", field.ident, storage_type(model, rt, &field.plan)));
    }
    out.close();

    out.blank();
    out.open(format!("impl {name}"));
    if concrete {
        out.line(format!("pub const JSON_TYPE: &'static str = {};", literal(&info.json_type)));
        if let (true, Some(type_id)) = (features.binary, info.type_id) {
            out.line(format!("pub const TYPE_ID: u32 = {type_id};"));
        }
    }
    for field in fields {
        out.line(format!("pub const {}: &'static str = {};", field.prop, literal(&field.info.key)));
        if let (true, Some(tag)) = (features.binary, field.info.tag) {
            out.line(format!("pub const {}: u32 = {tag};", field.tag));
        }
    }
    if concrete && features.reflection {
        reflect::emit_names(inherited, fields, out);
    }

    if concrete {
        out.blank();
        out.open("pub fn new() -> Self");
        out.line("Self::default()");
        out.close();
    }

    for field in inherited {
        emit_forwarded(out, field, &accessors(model, rt, field));
    }
    for field in fields {
        emit_local(out, field, &accessors(model, rt, field));
    }

    if concrete {
        out.blank();
        out.open("pub fn json_type(&self) -> &'static str");
        out.line("Self::JSON_TYPE");
        out.close();
        if features.binary && info.type_id.is_some() {
            out.blank();
            out.open("pub fn type_id(&self) -> u32");
            out.line("Self::TYPE_ID");
            out.close();
        }
    }

    json::emit_field_writer(ctx, fields, has_base, out);
    json::emit_field_reader(ctx, fields, has_base, out);
    if concrete {
        json::emit_concrete(ctx, id, out);
    }

    if features.binary {
        binary::emit_field_writer(ctx, fields, has_base, out);
        binary::emit_field_reader(ctx, fields, has_base, out);
        if concrete {
            binary::emit_concrete(ctx, id, out);
        }
    }

    if features.reflection {
        reflect::emit_table(ctx, fields, has_base, out);
        if concrete {
            reflect::emit_concrete_methods(out);
        }
    }

    if concrete && features.interfaces {
        visitor::emit_concrete(ctx, id, out);
    }

    run_plugins(ctx, &view(ctx, id, &name, fields, inherited), out, |plugin, view, out| {
        plugin.storage_surface(view, out)
    })?;
    out.close();
    Ok(())
}

/// Runtime trait impls forwarding to the inherent methods.
fn emit_concrete_traits(ctx: &Context<'_>, type_name: &str, out: &mut CodeWriter) {
    let rt = &ctx.runtime;
    out.blank();
    out.open(format!("impl {rt}::JsonMessage for {type_name}"));
    out.open(format!(
        "fn read_json(reader: &mut {rt}::JsonReader) -> {rt}::Result<Option<Self>>"
    ));
    out.line("Self::read_json(reader)");
    out.close();
    out.blank();
    out.open(format!("fn write_json(&self, writer: &mut {rt}::JsonWriter)"));
    out.line("self.write_json(writer)");
    out.close();
    out.close();

    if ctx.features.binary {
        out.blank();
        out.open(format!("impl {rt}::BinaryMessage for {type_name}"));
        out.open(format!(
            "fn read_binary(reader: &mut {rt}::DataReader<'_>) -> {rt}::Result<Option<Self>>"
        ));
        out.line("Self::read_binary(reader)");
        out.close();
        out.blank();
        out.open(format!("fn write_binary(&self, writer: &mut {rt}::DataWriter)"));
        out.line("self.write_binary(writer)");
        out.close();
        out.close();
    }

    if ctx.features.reflection {
        reflect::emit_trait(ctx, type_name, out);
    }
}

fn emit_abstract(
    ctx: &Context<'_>,
    id: MessageId,
    fields: &[FieldView<'_>],
    inherited: &[FieldView<'_>],
    out: &mut CodeWriter,
) -> Result<(), GenerateError> {
    let model = ctx.model;
    let rt = &ctx.runtime;
    let info = model.message(id);
    let variants = Variants::of(model, id);
    let name = &variants.enum_name;

    if ctx.features.interfaces {
        visitor::emit_trait(ctx, id, &variants, out);
    }

    out.blank();
    out.docs(info.docs.as_deref());
    out.line("#[derive(Debug, Clone, PartialEq)]");
    if variants.items.is_empty() {
        out.line(format!("pub enum {name} {{}}"));
    } else {
        out.open(format!("pub enum {name}"));
        for variant in &variants.items {
            out.line(format!("{0}({0}),", variant.name));
        }
        out.close();
    }

    for spec in model.transitive_specializations(id) {
        let spec_name = naming::type_name(&model.message(spec).name);
        let wrap = if variants.items.iter().any(|variant| variant.id == spec) {
            format!("{name}::{spec_name}(value)")
        } else {
            let Some(holder) = variants
                .items
                .iter()
                .find(|variant| variant.is_abstract && model.transitive_specializations(variant.id).contains(&spec))
            else {
                continue;
            };
            format!("{name}::{0}({0}::from(value))", holder.name)
        };
        out.blank();
        out.open(format!("impl From<{spec_name}> for {name}"));
        out.open(format!("fn from(value: {spec_name}) -> Self"));
        out.line(wrap);
        out.close();
        out.close();
    }

    out.blank();
    out.open(format!("impl {name}"));
    for field in inherited.iter().chain(fields) {
        emit_dispatched(out, field, &accessors(model, rt, field), &variants);
    }
    json::emit_abstract(ctx, id, &variants, out);
    if ctx.features.binary {
        binary::emit_abstract(ctx, id, &variants, out);
    }
    if ctx.features.reflection {
        reflect::emit_abstract_methods(ctx, &variants, out);
    }
    if ctx.features.interfaces {
        visitor::emit_abstract(ctx, id, &variants, out);
    }
    out.close();

    emit_concrete_traits(ctx, name, out);
    run_plugins(ctx, &view(ctx, id, name, fields, inherited), out, |plugin, view, out| {
        plugin.public_surface(view, out)
    })?;

    emit_data(ctx, id, fields, inherited, out)
}
