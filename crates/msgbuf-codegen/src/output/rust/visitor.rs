//! Visitor contracts for abstract families.
//!
//! `<Name>Visitor<R, A>` declares one method per concrete variant of `Name`
//! and inherits the visitors of its abstract variants, so implementing the
//! root's visitor covers every concrete type in the family.

use super::Variants;
use crate::model::MessageId;
use crate::naming;
use crate::output::{CodeWriter, Context};

pub(super) fn emit_trait(ctx: &Context<'_>, id: MessageId, variants: &Variants, out: &mut CodeWriter) {
    let model = ctx.model;
    let info = model.message(id);
    let (r, a) = (&ctx.generics.result, &ctx.generics.arg);
    let name = naming::visitor_name(&info.name);

    let supertraits: Vec<String> = variants
        .items
        .iter()
        .filter(|variant| variant.is_abstract)
        .map(|variant| format!("{}<{r}, {a}>", naming::visitor_name(&model.message(variant.id).name)))
        .collect();
    let bounds = if supertraits.is_empty() {
        String::new()
    } else {
        format!(": {}", supertraits.join(" + "))
    };

    out.blank();
    out.line(format!("/// Exhaustive dispatch over the concrete members of [`{}`].", variants.enum_name));
    let concrete: Vec<_> = variants.items.iter().filter(|variant| !variant.is_abstract).collect();
    if concrete.is_empty() {
        out.line(format!("pub trait {name}<{r}, {a}>{bounds} {{}}"));
        return;
    }
    out.open(format!("pub trait {name}<{r}, {a}>{bounds}"));
    for variant in concrete {
        out.line(format!(
            "fn {}(&mut self, value: &{}, arg: {a}) -> {r};",
            naming::visit_method(&model.message(variant.id).name),
            variant.name
        ));
    }
    out.close();
}

/// `visit` on an abstract enum: concrete variants call their case, abstract
/// variants forward to their own `visit`.
pub(super) fn emit_abstract(ctx: &Context<'_>, id: MessageId, variants: &Variants, out: &mut CodeWriter) {
    let model = ctx.model;
    let generics = &ctx.generics;
    let (r, a, v) = (&generics.result, &generics.arg, &generics.visitor);
    let trait_name = naming::visitor_name(&model.message(id).name);

    out.blank();
    let arg = if variants.items.is_empty() { "_arg" } else { "arg" };
    let visitor = if variants.items.is_empty() { "_visitor" } else { "visitor" };
    out.open(format!(
        "pub fn visit<{r}, {a}, {v}: {trait_name}<{r}, {a}> + ?Sized>(&self, {visitor}: &mut {v}, {arg}: {a}) -> {r}"
    ));
    super::dispatch_block(
        out,
        variants,
        |variant| {
            if variant.is_abstract {
                "inner.visit(visitor, arg)".to_string()
            } else {
                format!(
                    "visitor.{}(inner, arg)",
                    naming::visit_method(&model.message(variant.id).name)
                )
            }
        },
        None,
    );
    out.close();
}

/// `visit` on a concrete member of an abstract family.
pub(super) fn emit_concrete(ctx: &Context<'_>, id: MessageId, out: &mut CodeWriter) {
    let model = ctx.model;
    let Some(family) = model.abstract_generalization(id) else {
        return;
    };
    let generics = &ctx.generics;
    let (r, a, v) = (&generics.result, &generics.arg, &generics.visitor);
    let trait_name = naming::visitor_name(&model.message(family).name);

    out.blank();
    out.open(format!(
        "pub fn visit<{r}, {a}, {v}: {trait_name}<{r}, {a}> + ?Sized>(&self, visitor: &mut {v}, arg: {a}) -> {r}"
    ));
    out.line(format!(
        "visitor.{}(self, arg)",
        naming::visit_method(&model.message(id).name)
    ));
    out.close();
}
