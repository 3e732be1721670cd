//! Rust backend: one module's worth of items per definition.
//!
//! Concrete messages become structs; abstract messages become enums over
//! their specializations plus a `<Name>Base` struct for the fields they
//! declare. Each generated item refers to the runtime crate by its full path
//! so the output can be `include!`d anywhere.

mod accessors;
mod binary;
pub(crate) mod codec;
mod enums;
mod json;
mod message;
mod reflect;
mod visitor;

use super::{CodeWriter, Context};
use crate::error::GenerateError;
use crate::model::{DefRef, FieldInfo, MessageId, MessageInfo, Model};
use crate::naming;
use crate::plan::plan_field;
use crate::plugin::FieldView;

pub(crate) fn emit_definition(
    ctx: &Context<'_>,
    definition: DefRef,
    out: &mut CodeWriter,
) -> Result<(), GenerateError> {
    match definition {
        DefRef::Enum(id) => {
            enums::emit(ctx, id, out);
            Ok(())
        }
        DefRef::Message(id) => message::emit(ctx, id, out),
    }
}

fn field_view<'m>(
    model: &'m Model,
    owner: &MessageInfo,
    info: &'m FieldInfo,
) -> Result<FieldView<'m>, GenerateError> {
    let plan = plan_field(model, info).map_err(|source| GenerateError::Unsupported {
        message: owner.name.clone(),
        field: info.name.clone(),
        source,
    })?;
    Ok(FieldView {
        info,
        plan,
        ident: naming::field_ident(&info.name),
        prop: naming::constant(&info.name, "PROP"),
        tag: naming::constant(&info.name, "TAG"),
    })
}

/// Fields declared by `id`.
pub(crate) fn local_fields(model: &Model, id: MessageId) -> Result<Vec<FieldView<'_>>, GenerateError> {
    let owner = model.message(id);
    owner
        .fields
        .iter()
        .map(|info| field_view(model, owner, info))
        .collect()
}

/// Fields declared by the ancestors of `id`, root first.
pub(crate) fn ancestor_fields(model: &Model, id: MessageId) -> Result<Vec<FieldView<'_>>, GenerateError> {
    model
        .ancestors(id)
        .into_iter()
        .flat_map(|ancestor| {
            let owner = model.message(ancestor);
            owner.fields.iter().map(move |info| field_view(model, owner, info))
        })
        .collect()
}

/// Name of the struct holding the fields `id` declares.
pub(crate) fn data_name(model: &Model, id: MessageId) -> String {
    let info = model.message(id);
    if info.is_abstract {
        naming::base_name(&info.name)
    } else {
        naming::type_name(&info.name)
    }
}

pub(crate) struct Variant {
    pub id: MessageId,
    pub name: String,
    pub is_abstract: bool,
}

/// Variants of an abstract enum.
pub(crate) struct Variants {
    pub enum_name: String,
    pub items: Vec<Variant>,
}

impl Variants {
    pub(crate) fn of(model: &Model, id: MessageId) -> Self {
        Self {
            enum_name: naming::type_name(&model.message(id).name),
            items: model
                .variants(id)
                .into_iter()
                .map(|variant| {
                    let info = model.message(variant);
                    Variant {
                        id: variant,
                        name: naming::type_name(&info.name),
                        is_abstract: info.is_abstract,
                    }
                })
                .collect(),
        }
    }
}

/// Emit `match self { Enum::Variant(inner) => arm, .. }` followed by `tail`.
///
/// An enum without variants is uninhabited, so its match is the whole body.
pub(crate) fn dispatch_block(
    out: &mut CodeWriter,
    variants: &Variants,
    arm: impl Fn(&Variant) -> String,
    tail: Option<&str>,
) {
    if variants.items.is_empty() {
        out.line("match *self {}");
        return;
    }
    out.open("match self");
    for variant in &variants.items {
        out.line(format!(
            "{}::{}(inner) => {},",
            variants.enum_name,
            variant.name,
            arm(variant)
        ));
    }
    out.close();
    if let Some(tail) = tail {
        out.line(tail);
    }
}

/// Name of a parameter only read by the arms of `dispatch_block`; an empty
/// family has no arms, so the parameter is marked unused.
pub(crate) fn dispatch_param(variants: &Variants, name: &str) -> String {
    if variants.items.is_empty() {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Rust string literal for `text`.
pub(crate) fn literal(text: &str) -> String {
    format!("{text:?}")
}
