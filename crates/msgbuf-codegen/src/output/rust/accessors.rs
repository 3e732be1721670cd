//! Field accessor surface.
//!
//! Each field yields a list of [`Accessor`] signatures. The same signature is
//! rendered three ways: against local storage, forwarded to `self.base`, or
//! dispatched over the variants of an abstract enum.

use super::codec::{is_copy, storage_type, value_type};
use super::{Variants, dispatch_block, dispatch_param};
use crate::model::Model;
use crate::naming;
use crate::output::CodeWriter;
use crate::plan::EncodingPlan;
use crate::plugin::FieldView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Returns {
    /// Returns the body expression.
    Value,
    /// Returns `&mut Self` after the body.
    Chain,
    /// Returns `Result<&mut Self>` after the body.
    TryChain,
}

#[derive(Debug, Clone)]
pub(crate) struct Accessor {
    name: String,
    mutable: bool,
    params: Vec<(&'static str, String)>,
    ret: String,
    returns: Returns,
    body: Vec<String>,
    getter: bool,
}

impl Accessor {
    fn getter(name: String, ret: String, body: String) -> Self {
        Self {
            name,
            mutable: false,
            params: Vec::new(),
            ret,
            returns: Returns::Value,
            body: vec![body],
            getter: true,
        }
    }

    fn chain(name: String, params: Vec<(&'static str, String)>, body: Vec<String>) -> Self {
        Self {
            name,
            mutable: true,
            params,
            ret: "&mut Self".into(),
            returns: Returns::Chain,
            body,
            getter: false,
        }
    }

    fn signature(&self) -> String {
        self.signature_with(|name| name.to_string())
    }

    fn signature_with(&self, param: impl Fn(&str) -> String) -> String {
        let receiver = if self.mutable { "&mut self" } else { "&self" };
        let params: String = self
            .params
            .iter()
            .map(|(name, ty)| format!(", {}: {ty}", param(*name)))
            .collect();
        format!("pub fn {}({receiver}{params}) -> {}", self.name, self.ret)
    }

    fn call(&self, target: &str) -> String {
        let args: Vec<&str> = self.params.iter().map(|(name, _)| *name).collect();
        format!("{target}.{}({})", self.name, args.join(", "))
    }

    fn tail(&self) -> Option<&'static str> {
        match self.returns {
            Returns::Value => None,
            Returns::Chain => Some("self"),
            Returns::TryChain => Some("Ok(self)"),
        }
    }
}

/// Accessor signatures and local bodies for one field.
pub(crate) fn accessors(model: &Model, runtime: &str, field: &FieldView<'_>) -> Vec<Accessor> {
    let ident = &field.ident;
    let name = &field.info.name;
    let place = format!("self.{ident}");
    let setter = naming::accessor("set", name);

    match &field.plan {
        EncodingPlan::Scalar {
            value,
            nullable: true,
        } => {
            let ty = value_type(model, value);
            vec![
                Accessor::getter(ident.clone(), format!("Option<&{ty}>"), format!("{place}.as_deref()")),
                Accessor {
                    mutable: true,
                    ..Accessor::getter(
                        naming::mut_accessor(name),
                        format!("Option<&mut {ty}>"),
                        format!("{place}.as_deref_mut()"),
                    )
                },
                Accessor::getter(naming::accessor("has", name), "bool".into(), format!("{place}.is_some()")),
                Accessor::chain(
                    setter,
                    vec![("value", format!("impl Into<Option<{ty}>>"))],
                    vec![format!("{place} = value.into().map(Box::new);")],
                ),
            ]
        }
        EncodingPlan::Scalar { value, .. } => {
            let ty = value_type(model, value);
            if is_copy(value) {
                vec![
                    Accessor::getter(ident.clone(), ty.clone(), place.clone()),
                    Accessor::chain(setter, vec![("value", ty)], vec![format!("{place} = value;")]),
                ]
            } else {
                let (borrowed, into) = if ty == "String" {
                    ("&str", "impl Into<String>")
                } else {
                    ("&[u8]", "impl Into<Vec<u8>>")
                };
                vec![
                    Accessor::getter(ident.clone(), borrowed.into(), format!("&{place}")),
                    Accessor::chain(setter, vec![("value", into.into())], vec![format!("{place} = value.into();")]),
                ]
            }
        }
        EncodingPlan::Repeated { element } => {
            let ty = value_type(model, element);
            vec![
                Accessor::getter(ident.clone(), format!("&[{ty}]"), format!("&{place}")),
                Accessor {
                    mutable: true,
                    ..Accessor::getter(naming::mut_accessor(name), format!("&mut Vec<{ty}>"), format!("&mut {place}"))
                },
                Accessor::chain(
                    setter,
                    vec![("values", format!("impl IntoIterator<Item = {ty}>"))],
                    vec![format!("{place}.clear();"), format!("{place}.extend(values);")],
                ),
                Accessor::chain(
                    naming::accessor("add", name),
                    vec![("value", ty)],
                    vec![format!("{place}.push(value);")],
                ),
            ]
        }
        EncodingPlan::Map { key, value, .. } => {
            let key_ty = value_type(model, key);
            let value_ty = value_type(model, value);
            let storage = storage_type(model, runtime, &field.plan);
            vec![
                Accessor::getter(ident.clone(), format!("&{storage}"), format!("&{place}")),
                Accessor::chain(
                    setter,
                    vec![("entries", format!("impl IntoIterator<Item = ({key_ty}, {value_ty})>"))],
                    vec![format!("{place}.clear();"), format!("{place}.extend(entries);")],
                ),
                Accessor {
                    ret: format!("{runtime}::Result<&mut Self>"),
                    returns: Returns::TryChain,
                    ..Accessor::chain(
                        naming::accessor("put", name),
                        vec![("key", key_ty), ("value", value_ty)],
                        vec![
                            format!("if {place}.contains_key(&key) {{"),
                            format!(
                                "    return Err({runtime}::Error::DuplicateKey {{ property: Self::{}, key: format!(\"{{key:?}}\") }});",
                                field.prop
                            ),
                            "}".into(),
                            format!("{place}.insert(key, value);"),
                        ],
                    )
                },
            ]
        }
    }
}

/// Render accessors that operate on local storage.
pub(crate) fn emit_local(out: &mut CodeWriter, field: &FieldView<'_>, accessors: &[Accessor]) {
    for accessor in accessors {
        out.blank();
        if accessor.getter && !accessor.mutable {
            out.docs(field.info.docs.as_deref());
        }
        out.open(accessor.signature());
        for line in &accessor.body {
            out.line(line);
        }
        if let Some(tail) = accessor.tail() {
            out.line(tail);
        }
        out.close();
    }
}

/// Render accessors that forward to the generalization's storage.
pub(crate) fn emit_forwarded(out: &mut CodeWriter, field: &FieldView<'_>, accessors: &[Accessor]) {
    for accessor in accessors {
        out.blank();
        if accessor.getter && !accessor.mutable {
            out.docs(field.info.docs.as_deref());
        }
        out.open(accessor.signature());
        let call = accessor.call("self.base");
        match accessor.returns {
            Returns::Value => out.line(call),
            Returns::Chain => out.line(format!("{call};")),
            Returns::TryChain => out.line(format!("{call}?;")),
        }
        if let Some(tail) = accessor.tail() {
            out.line(tail);
        }
        out.close();
    }
}

/// Render accessors that dispatch over an abstract enum's variants.
pub(crate) fn emit_dispatched(
    out: &mut CodeWriter,
    field: &FieldView<'_>,
    accessors: &[Accessor],
    variants: &Variants,
) {
    for accessor in accessors {
        out.blank();
        if accessor.getter && !accessor.mutable {
            out.docs(field.info.docs.as_deref());
        }
        out.open(accessor.signature_with(|name| dispatch_param(variants, name)));
        let call = accessor.call("inner");
        match accessor.returns {
            Returns::Value => dispatch_block(out, variants, |_| call.clone(), None),
            Returns::Chain => dispatch_block(out, variants, |_| format!("{{ {call}; }}"), accessor.tail()),
            Returns::TryChain => {
                dispatch_block(out, variants, |_| format!("{{ {call}?; }}"), accessor.tail())
            }
        }
        out.close();
    }
}
