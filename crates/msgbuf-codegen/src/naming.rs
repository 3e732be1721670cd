//! Naming-convention policy: schema identifiers to Rust identifiers.
//!
//! Every function here is pure. Schema names are free-form, so each one is
//! cased with `heck` and then escaped against Rust keywords, prelude names
//! and the methods the generator itself emits.

use heck::{ToKebabCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const UNRAWABLE: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Names a generated type must not shadow.
const PRELUDE: &[&str] = &[
    "Self", "Option", "Some", "None", "Result", "Ok", "Err", "Box", "Vec", "String", "Default",
    "Clone", "Copy", "Debug", "PartialEq", "Eq", "PartialOrd", "Ord", "Hash", "From", "Into",
    "Send", "Sync", "Sized", "Drop", "Iterator", "IntoIterator", "Extend", "ToString",
    "ToOwned", "AsRef", "AsMut", "Fn", "FnMut", "FnOnce",
];

/// Methods emitted on every message.
const GENERATED_METHODS: &[&str] = &[
    "new", "base", "visit", "json_type", "type_id", "property_names", "reflect_get",
    "reflect_set", "read_json", "read_json_content", "read_json_field", "write_json",
    "write_json_content", "write_json_fields", "read_binary", "read_binary_fields",
    "read_binary_field", "write_binary", "write_binary_fields", "read_xml", "read_xml_content",
    "read_xml_attribute", "read_xml_element", "to_json_value", "to_json_string",
    "from_json_value", "from_json_str", "to_bytes", "from_bytes", "from_xml_str", "properties",
    "get", "set",
];

/// Rust type name for a message or enum.
pub fn type_name(name: &str) -> String {
    let mut ident = name.to_upper_camel_case();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 'T');
    }
    if PRELUDE.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Data struct holding the fields declared by an abstract type.
pub fn base_name(name: &str) -> String {
    format!("{}Base", type_name(name))
}

pub fn visitor_name(name: &str) -> String {
    format!("{}Visitor", type_name(name))
}

/// Visitor case for a concrete type.
pub fn visit_method(name: &str) -> String {
    format!("visit_{}", type_name(name).to_snake_case())
}

/// Snake-case stem shared by a field's storage and accessors.
fn field_stem(name: &str) -> String {
    let mut stem = name.to_snake_case();
    if stem.is_empty() || stem.starts_with(|c: char| c.is_ascii_digit()) {
        stem.insert(0, 'f');
    }
    if GENERATED_METHODS.contains(&stem.as_str()) || UNRAWABLE.contains(&stem.as_str()) {
        stem.push('_');
    }
    stem
}

/// Storage field and getter name.
pub fn field_ident(name: &str) -> String {
    let stem = field_stem(name);
    if KEYWORDS.contains(&stem.as_str()) {
        format!("r#{stem}")
    } else {
        stem
    }
}

/// Prefixed accessor such as `set_radius` or `has_center`.
pub fn accessor(prefix: &str, name: &str) -> String {
    format!("{prefix}_{}", field_stem(name))
}

/// Mutable accessor such as `points_mut`.
pub fn mut_accessor(name: &str) -> String {
    format!("{}_mut", field_stem(name))
}

/// Associated constant such as `RADIUS_PROP`.
pub fn constant(name: &str, suffix: &str) -> String {
    let stem = name.to_shouty_snake_case();
    if stem.is_empty() || stem.starts_with(|c: char| c.is_ascii_digit()) {
        format!("F{stem}_{suffix}")
    } else {
        format!("{stem}_{suffix}")
    }
}

/// Enum variant for a constant.
pub fn variant_name(constant: &str) -> String {
    let mut ident = constant.to_upper_camel_case();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 'V');
    }
    if ident == "Self" {
        ident.push('_');
    }
    ident
}

/// Default XML element or attribute name.
pub fn xml_name(name: &str) -> String {
    name.to_kebab_case()
}

/// `base` unless a type by that name exists, then `base2`, `base3`, ...
pub fn fresh(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_avoid_the_prelude() {
        assert_eq!(type_name("atomic_shape"), "AtomicShape");
        assert_eq!(type_name("Circle"), "Circle");
        assert_eq!(type_name("Option"), "Option_");
        assert_eq!(type_name("string"), "String_");
        assert_eq!(base_name("Shape"), "ShapeBase");
        assert_eq!(visitor_name("shape"), "ShapeVisitor");
        assert_eq!(visit_method("AtomicShape"), "visit_atomic_shape");
    }

    #[test]
    fn fields_escape_keywords_and_generated_methods() {
        assert_eq!(field_ident("firstName"), "first_name");
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("self"), "self_");
        assert_eq!(field_ident("visit"), "visit_");
        assert_eq!(accessor("set", "type"), "set_type");
        assert_eq!(accessor("set", "base"), "set_base_");
        assert_eq!(mut_accessor("points"), "points_mut");
    }

    #[test]
    fn constants_and_variants() {
        assert_eq!(constant("firstName", "PROP"), "FIRST_NAME_PROP");
        assert_eq!(constant("radius", "TAG"), "RADIUS_TAG");
        assert_eq!(variant_name("UNIVERSAL"), "Universal");
        assert_eq!(variant_name("news_group"), "NewsGroup");
        assert_eq!(variant_name("2D"), "V2d");
        assert_eq!(xml_name("firstName"), "first-name");
    }

    #[test]
    fn fresh_names_skip_taken_ones() {
        let taken: HashSet<String> = ["R".to_string(), "R2".to_string()].into();
        assert_eq!(fresh("R", &taken), "R3");
        assert_eq!(fresh("A", &taken), "A");
    }
}
