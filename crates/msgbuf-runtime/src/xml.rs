//! Helpers for readers generated by the XML plugin.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use roxmltree::Node;
use std::str::FromStr;

pub use roxmltree;

/// A message that can be read from an XML element.
pub trait XmlMessage: Sized {
    /// Read a message from an element; `None` if the element names an unknown type.
    fn read_xml(node: Node<'_, '_>) -> Result<Option<Self>>;

    fn from_xml_str(text: &str) -> Result<Option<Self>> {
        let document = roxmltree::Document::parse(text)?;
        Self::read_xml(document.root_element())
    }
}

/// Parse a scalar from attribute or element text.
pub fn parse<T: FromStr>(text: &str, property: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| Error::Xml(format!("invalid value {text:?} for `{property}`")))
}

/// Split a comma-separated list, dropping empty items.
pub fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Parse a comma-separated list of scalars.
pub fn parse_list<T: FromStr>(text: &str, property: &str) -> Result<Vec<T>> {
    split_list(text).map(|item| parse(item, property)).collect()
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Text content of an element, empty if it has none.
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}

/// Child elements, skipping text and comments.
pub fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

pub fn first_element<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    elements(node).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_and_lists_parse() {
        assert_eq!(parse::<i32>(" 42 ", "n").unwrap(), 42);
        assert_eq!(parse::<bool>("true", "flag").unwrap(), true);
        assert_eq!(parse_list::<u8>("1, 2,,3", "items").unwrap(), vec![1, 2, 3]);
        assert!(matches!(parse::<i32>("x", "n"), Err(Error::Xml(_))));
    }

    #[test]
    fn element_helpers_skip_text() {
        let document = roxmltree::Document::parse("<a> <b>hi</b> <c/> </a>").unwrap();
        let root = document.root_element();
        let names: Vec<_> = elements(root).map(|n| n.tag_name().name()).collect();
        assert_eq!(names, vec!["b", "c"]);
        let first = first_element(root).unwrap();
        assert_eq!(text(first), "hi");
        assert_eq!(decode_base64(" aGk= ").unwrap(), b"hi");
    }
}
