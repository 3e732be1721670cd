//! XML reader plugin.
//!
//! Adds read support for an XML rendering of messages on top of `roxmltree`:
//!
//! - primitive and enum fields may appear as attributes or as child elements
//!   whose text is the value; repeated ones are comma-separated lists;
//! - message fields are child elements. A field of abstract type wraps the
//!   element naming the concrete type; repeated message fields wrap one
//!   element per item;
//! - map fields have no XML rendering and are rejected.
//!
//! Element and attribute names come from the `XmlName` option, then `Name`,
//! then the kebab-cased schema name.

use super::{FieldView, GeneratorPlugin, MessageView, PluginError};
use crate::config::Features;
use crate::ir::{Part, PrimitiveKind as P};
use crate::naming;
use crate::output::CodeWriter;
use crate::plan::{EncodingPlan, MessageRef, Target, ValuePlan};

/// Option overriding the XML name of a message or field.
pub const XML_NAME_OPTION: &str = "XmlName";

pub struct XmlPlugin;

pub static XML_PLUGIN: XmlPlugin = XmlPlugin;

fn xml_name(part: &dyn Part) -> String {
    part.string_option(XML_NAME_OPTION)
        .or_else(|| part.string_option(crate::ids::NAME_OPTION))
        .map(str::to_string)
        .unwrap_or_else(|| naming::xml_name(part.name()))
}

fn xml_constant(field: &FieldView<'_>) -> String {
    naming::constant(&field.info.name, "XML")
}

/// A value with a text rendering.
enum Text {
    Primitive(P),
    /// An enum, by Rust type name.
    Enum(String),
}

/// Text rendering of a field and whether it is a list, if it has one.
fn textual(view: &MessageView<'_>, plan: &EncodingPlan) -> Option<(Text, bool)> {
    let (value, list) = match plan {
        EncodingPlan::Scalar { value, .. } => (value, false),
        EncodingPlan::Repeated { element } => (element, true),
        EncodingPlan::Map { .. } => return None,
    };
    match value.target {
        Target::Primitive(kind) => Some((Text::Primitive(kind), list)),
        Target::Enum(_) => Some((Text::Enum(view.value_type(value)), list)),
        Target::Message { .. } => None,
    }
}

/// Expression parsing `text` into a single value.
fn parse_one(rt: &str, kind: &Text, text: &str, constant: &str) -> String {
    match kind {
        Text::Primitive(P::String) => format!("{text}.to_string()"),
        Text::Primitive(P::Bytes) => format!("{rt}::xml::decode_base64({text})?"),
        Text::Primitive(_) => format!("{rt}::xml::parse({text}, Self::{constant})?"),
        Text::Enum(ty) => format!("{ty}::from_name({text}.trim())"),
    }
}

/// Expression parsing a comma-separated `text` into a `Vec`.
fn parse_list(rt: &str, kind: &Text, text: &str, constant: &str) -> String {
    match kind {
        Text::Primitive(P::String) => {
            format!("{rt}::xml::split_list({text}).map(str::to_string).collect()")
        }
        Text::Primitive(P::Bytes) => format!(
            "{rt}::xml::split_list({text}).map({rt}::xml::decode_base64).collect::<{rt}::Result<_>>()?"
        ),
        Text::Primitive(_) => format!("{rt}::xml::parse_list({text}, Self::{constant})?"),
        Text::Enum(ty) => format!("{rt}::xml::split_list({text}).map({ty}::from_name).collect()"),
    }
}

/// Statement assigning a textual field from `text`.
fn assign_text(rt: &str, field: &FieldView<'_>, kind: &Text, list: bool, text: &str) -> String {
    let constant = xml_constant(field);
    let parse = if list {
        parse_list(rt, kind, text, &constant)
    } else {
        parse_one(rt, kind, text, &constant)
    };
    format!("self.{} = {parse}", field.ident)
}

fn is_polymorphic(plan: &ValuePlan) -> bool {
    matches!(
        plan.target,
        Target::Message {
            dispatch: MessageRef::Polymorphic,
            ..
        }
    )
}

impl XmlPlugin {
    fn reject_maps(&self, view: &MessageView<'_>) -> Result<(), PluginError> {
        match view.fields.iter().find(|field| matches!(field.plan, EncodingPlan::Map { .. })) {
            Some(field) => Err(PluginError(format!(
                "field `{}` is a map, which has no XML rendering",
                field.info.name
            ))),
            None => Ok(()),
        }
    }

    fn emit_attribute_reader(&self, view: &MessageView<'_>, out: &mut CodeWriter) {
        let rt = view.runtime;
        let attributes: Vec<(&FieldView<'_>, Text, bool)> = view
            .fields
            .iter()
            .filter_map(|field| textual(view, &field.plan).map(|(kind, list)| (field, kind, list)))
            .collect();
        let has_base = view.has_base();
        let (name, value) = if attributes.is_empty() && !has_base {
            ("_name", "_value")
        } else {
            ("name", "value")
        };
        out.blank();
        out.open(format!(
            "fn read_xml_attribute(&mut self, {name}: &str, {value}: &str) -> {rt}::Result<()>"
        ));
        let fallback = has_base.then_some("self.base.read_xml_attribute(name, value)?");
        if attributes.is_empty() {
            if let Some(fallback) = fallback {
                out.line(format!("{fallback};"));
            }
        } else {
            out.open("match name");
            for (field, kind, list) in &attributes {
                out.line(format!(
                    "Self::{} => {},",
                    xml_constant(field),
                    assign_text(rt, field, kind, *list, "value")
                ));
            }
            out.line(format!("_ => {},", fallback.unwrap_or("{}")));
            out.close();
        }
        out.line("Ok(())");
        out.close();
    }

    fn emit_element_reader(&self, view: &MessageView<'_>, out: &mut CodeWriter) {
        let rt = view.runtime;
        let has_base = view.has_base();
        let node = if view.fields.is_empty() && !has_base { "_node" } else { "node" };
        out.blank();
        out.open(format!(
            "fn read_xml_element(&mut self, {node}: {rt}::xml::roxmltree::Node<'_, '_>) -> {rt}::Result<()>"
        ));
        let fallback = has_base.then_some("self.base.read_xml_element(node)?");
        if view.fields.is_empty() {
            if let Some(fallback) = fallback {
                out.line(format!("{fallback};"));
            }
        } else {
            out.open("match node.tag_name().name()");
            for field in view.fields {
                self.emit_element_arm(view, field, out);
            }
            out.line(format!("_ => {},", fallback.unwrap_or("{}")));
            out.close();
        }
        out.line("Ok(())");
        out.close();
    }

    fn emit_element_arm(&self, view: &MessageView<'_>, field: &FieldView<'_>, out: &mut CodeWriter) {
        let rt = view.runtime;
        let arm = format!("Self::{} =>", xml_constant(field));
        let place = format!("self.{}", field.ident);
        if let Some((kind, list)) = textual(view, &field.plan) {
            let text = format!("{rt}::xml::text(node)");
            out.line(format!("{arm} {},", assign_text(rt, field, &kind, list, &text)));
            return;
        }
        match &field.plan {
            EncodingPlan::Scalar { value, .. } => {
                let ty = view.value_type(value);
                if is_polymorphic(value) {
                    out.open(arm);
                    out.open(format!("{place} = match {rt}::xml::first_element(node)"));
                    out.line(format!("Some(child) => {ty}::read_xml(child)?.map(Box::new),"));
                    out.line("None => None,");
                    out.close_with(";");
                    out.close();
                } else {
                    out.line(format!("{arm} {place} = Some(Box::new({ty}::read_xml_content(node)?)),"));
                }
            }
            EncodingPlan::Repeated { element } => {
                let ty = view.value_type(element);
                out.open(arm);
                out.line(format!("{place}.clear();"));
                out.open(format!("for child in {rt}::xml::elements(node)"));
                if is_polymorphic(element) {
                    out.open(format!("if let Some(item) = {ty}::read_xml(child)?"));
                    out.line(format!("{place}.push(item);"));
                    out.close();
                } else {
                    out.line(format!("{place}.push({ty}::read_xml_content(child)?);"));
                }
                out.close();
                out.close();
            }
            EncodingPlan::Map { .. } => {}
        }
    }
}

impl GeneratorPlugin for XmlPlugin {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn enabled(&self, features: &Features) -> bool {
        features.xml
    }

    fn storage_surface(&self, view: &MessageView<'_>, out: &mut CodeWriter) -> Result<(), PluginError> {
        self.reject_maps(view)?;
        out.blank();
        for field in view.fields {
            out.line(format!(
                "pub const {}: &'static str = {:?};",
                xml_constant(field),
                xml_name(field.info)
            ));
        }
        self.emit_attribute_reader(view, out);
        self.emit_element_reader(view, out);
        Ok(())
    }

    fn public_surface(&self, view: &MessageView<'_>, out: &mut CodeWriter) -> Result<(), PluginError> {
        let rt = view.runtime;
        let ty = view.type_name;
        let model = view.model;
        out.blank();
        out.open(format!("impl {ty}"));
        if view.info.is_abstract {
            let concrete = model.concrete_specializations(view.id);
            let node = if concrete.is_empty() { "_node" } else { "node" };
            out.line("/// Read the member of the family named by the element; `None` if unknown.");
            out.open(format!(
                "pub fn read_xml({node}: {rt}::xml::roxmltree::Node<'_, '_>) -> {rt}::Result<Option<Self>>"
            ));
            if concrete.is_empty() {
                out.line("Ok(None)");
            } else {
                out.open("Ok(match node.tag_name().name()");
                for id in concrete {
                    let name = naming::type_name(&model.message(id).name);
                    out.line(format!(
                        "{name}::XML_ELEMENT => Some({ty}::from({name}::read_xml_content(node)?)),"
                    ));
                }
                out.line("_ => None,");
                out.close_with(")");
            }
            out.close();
        } else {
            out.line(format!("pub const XML_ELEMENT: &'static str = {:?};", xml_name(view.info)));
            out.blank();
            out.open(format!(
                "fn read_xml_content(node: {rt}::xml::roxmltree::Node<'_, '_>) -> {rt}::Result<Self>"
            ));
            out.line("let mut value = Self::default();");
            out.open("for attribute in node.attributes()");
            out.line("value.read_xml_attribute(attribute.name(), attribute.value())?;");
            out.close();
            out.open(format!("for child in {rt}::xml::elements(node)"));
            out.line("value.read_xml_element(child)?;");
            out.close();
            out.line("Ok(value)");
            out.close();
            out.blank();
            out.open(format!(
                "pub fn read_xml(node: {rt}::xml::roxmltree::Node<'_, '_>) -> {rt}::Result<Option<Self>>"
            ));
            out.line("Ok(Some(Self::read_xml_content(node)?))");
            out.close();
        }
        out.close();

        out.blank();
        out.open(format!("impl {rt}::XmlMessage for {ty}"));
        out.open(format!(
            "fn read_xml(node: {rt}::xml::roxmltree::Node<'_, '_>) -> {rt}::Result<Option<Self>>"
        ));
        out.line("Self::read_xml(node)");
        out.close();
        out.close();
        Ok(())
    }
}
