//! Identifier assignment.
//!
//! Annotates a resolved [`Model`] with every stable identifier the codecs
//! use: enum codes, binary type discriminators, JSON type names, field tags
//! and field keys. Assignment depends only on declaration order, so two runs
//! over the same schema agree.

use crate::error::SchemaError;
use crate::ir::Part;
use crate::model::{MessageId, Model};
use crate::naming;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Option overriding a JSON discriminator or property key.
pub const NAME_OPTION: &str = "Name";

pub fn assign(model: &mut Model) -> Result<(), SchemaError> {
    let _span = tracing::debug_span!("assign_ids").entered();
    assign_enum_codes(model)?;
    assign_type_ids(model)?;
    assign_fields(model)?;
    Ok(())
}

fn assign_enum_codes(model: &mut Model) -> Result<(), SchemaError> {
    for info in &mut model.enums {
        if info.constants.is_empty() {
            return Err(SchemaError::EmptyEnum(info.name.clone()));
        }

        let mut used: HashMap<i32, String> = HashMap::new();
        let mut names = HashSet::new();
        for constant in &info.constants {
            if !names.insert(constant.name.as_str()) {
                return Err(SchemaError::DuplicateConstant {
                    name: info.name.clone(),
                    constant: constant.name.clone(),
                });
            }
            let Some(code) = constant.explicit_code else {
                continue;
            };
            if code < 0 {
                return Err(SchemaError::NegativeCode {
                    name: info.name.clone(),
                    constant: constant.name.clone(),
                    code,
                });
            }
            if let Some(other) = used.insert(code, constant.name.clone()) {
                return Err(SchemaError::DuplicateCode {
                    name: info.name.clone(),
                    constant: constant.name.clone(),
                    code,
                    other,
                });
            }
        }

        let mut next = 0;
        for constant in &mut info.constants {
            constant.code = match constant.explicit_code {
                Some(code) => code,
                None => {
                    while used.contains_key(&next) {
                        next += 1;
                    }
                    used.insert(next, constant.name.clone());
                    next
                }
            };
            constant.json_name = constant
                .string_option(NAME_OPTION)
                .unwrap_or(&constant.name)
                .to_string();
        }
    }
    Ok(())
}

fn assign_type_ids(model: &mut Model) -> Result<(), SchemaError> {
    for id in model.message_ids().collect::<Vec<_>>() {
        let message = model.message(id);
        let json_type = message
            .string_option(NAME_OPTION)
            .unwrap_or(&message.name)
            .to_string();
        model.message_mut(id).json_type = json_type;
    }

    let members: Vec<MessageId> = model
        .message_ids()
        .filter(|id| {
            let message = model.message(*id);
            message.abstract_family && !message.is_abstract
        })
        .collect();

    for id in model.message_ids() {
        let message = model.message(id);
        if message.explicit_id.is_some() && !members.contains(&id) {
            warn!(message = %message.name, "type id ignored outside of an abstract family");
        }
    }

    let mut families: HashMap<MessageId, HashMap<u32, MessageId>> = HashMap::new();
    for id in &members {
        let message = model.message(*id);
        let Some(explicit) = message.explicit_id else {
            continue;
        };
        if explicit == 0 {
            return Err(SchemaError::ReservedTypeId(message.name.clone()));
        }
        let family = families.entry(model.root(*id)).or_default();
        if let Some(other) = family.insert(explicit, *id) {
            return Err(SchemaError::DuplicateTypeId {
                message: message.name.clone(),
                id: explicit,
                other: model.message(other).name.clone(),
            });
        }
    }

    let mut counters: HashMap<MessageId, u32> = HashMap::new();
    for id in members {
        let root = model.root(id);
        let type_id = match model.message(id).explicit_id {
            Some(explicit) => explicit,
            None => {
                let family = families.entry(root).or_default();
                let next = counters.entry(root).or_insert(1);
                while family.contains_key(&*next) {
                    *next += 1;
                }
                family.insert(*next, id);
                *next
            }
        };
        debug!(message = %model.message(id).name, type_id, "assigned type id");
        model.message_mut(id).type_id = Some(type_id);
    }
    Ok(())
}

fn assign_fields(model: &mut Model) -> Result<(), SchemaError> {
    // Ancestors first, so their tags are known when a specialization is numbered.
    let mut order: Vec<MessageId> = model.message_ids().collect();
    order.sort_by_key(|id| model.ancestors(*id).len());

    for id in order {
        let message_name = model.message(id).name.clone();
        let qualified = |field: &str| format!("{message_name}.{field}");

        let mut tags: HashMap<u32, String> = HashMap::new();
        let mut keys: HashMap<String, String> = HashMap::new();
        let mut names: HashSet<String> = HashSet::new();
        // Rust items derived from field names; distinct names can fold together.
        let mut idents: HashMap<String, String> = HashMap::new();
        for ancestor in model.ancestors(id) {
            let ancestor = model.message(ancestor);
            for field in &ancestor.fields {
                let owner = format!("{}.{}", ancestor.name, field.name);
                if let Some(tag) = field.tag {
                    tags.insert(tag, owner.clone());
                }
                for ident in field_items(&field.name) {
                    idents.insert(ident, owner.clone());
                }
                keys.insert(field.key.clone(), owner);
                names.insert(field.name.clone());
            }
        }

        let fields = &model.message(id).fields;
        for field in fields {
            if !names.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    message: message_name.clone(),
                    field: field.name.clone(),
                });
            }
            for ident in field_items(&field.name) {
                if let Some(other) = idents.insert(ident.clone(), qualified(&field.name)) {
                    return Err(SchemaError::IdentifierClash {
                        message: message_name.clone(),
                        field: field.name.clone(),
                        ident,
                        other,
                    });
                }
            }
            if field.transient {
                continue;
            }
            let Some(tag) = field.explicit_tag else {
                continue;
            };
            if tag == 0 {
                return Err(SchemaError::ReservedTag {
                    message: message_name.clone(),
                    field: field.name.clone(),
                });
            }
            if let Some(other) = tags.insert(tag, qualified(&field.name)) {
                return Err(SchemaError::DuplicateTag {
                    message: message_name.clone(),
                    field: field.name.clone(),
                    tag,
                    other,
                });
            }
        }

        let mut next = 1;
        let mut assigned = Vec::with_capacity(fields.len());
        for field in fields {
            let tag = if field.transient {
                None
            } else if let Some(tag) = field.explicit_tag {
                Some(tag)
            } else {
                while tags.contains_key(&next) {
                    next += 1;
                }
                tags.insert(next, qualified(&field.name));
                Some(next)
            };

            let key = field
                .string_option(NAME_OPTION)
                .unwrap_or(&field.name)
                .to_string();
            if let Some(other) = keys.insert(key.clone(), qualified(&field.name)) {
                return Err(SchemaError::DuplicateKey {
                    message: message_name.clone(),
                    field: field.name.clone(),
                    key,
                    other,
                });
            }
            assigned.push((tag, key));
        }

        for (field, (tag, key)) in model.message_mut(id).fields.iter_mut().zip(assigned) {
            field.tag = tag;
            field.key = key;
        }
    }
    Ok(())
}

/// Getter and property constant generated for a field.
fn field_items(name: &str) -> [String; 2] {
    [naming::field_ident(name), naming::constant(name, "PROP")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::resolve;
    use crate::ir::{Constant, EnumDef, Field, MessageDef, OptionValue, PrimitiveKind, Schema, Type};
    use crate::model::DefRef;

    fn int(name: &str) -> Field {
        Field::new(name, Type::Primitive(PrimitiveKind::Int32))
    }

    fn compile(schema: &Schema) -> Result<Model, SchemaError> {
        let mut model = resolve(schema)?;
        assign(&mut model)?;
        Ok(model)
    }

    fn message<'m>(model: &'m Model, name: &str) -> &'m crate::model::MessageInfo {
        match model.lookup(name) {
            Some(DefRef::Message(id)) => model.message(id),
            other => panic!("{name} is not a message: {other:?}"),
        }
    }

    fn tags(model: &Model, name: &str) -> Vec<Option<u32>> {
        message(model, name).fields.iter().map(|f| f.tag).collect()
    }

    fn shapes() -> Schema {
        Schema::single(vec![
            MessageDef::abstract_("Shape", vec![int("x"), int("y")]).into(),
            MessageDef::new("Circle", vec![int("radius")])
                .extends("Shape")
                .into(),
            MessageDef::new("Rectangle", vec![int("width"), int("height")])
                .extends("Shape")
                .into(),
            MessageDef::abstract_("Node", Vec::new()).into(),
            MessageDef::new("Leaf", Vec::new()).extends("Node").into(),
        ])
    }

    #[test]
    fn enum_codes_fill_gaps_around_explicit_codes() {
        let schema = Schema::single(vec![
            EnumDef::new(
                "Scope",
                vec![
                    Constant::new("UNIVERSAL").with_index(7),
                    Constant::new("WEB").with_index(1),
                    Constant::new("LOCAL"),
                    Constant::new("OTHER"),
                ],
            )
            .into(),
        ]);
        let model = compile(&schema).unwrap();
        let codes: Vec<i32> = model.enums[0].constants.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![7, 1, 0, 2]);
    }

    #[test]
    fn duplicate_enum_codes_fail() {
        let schema = Schema::single(vec![
            EnumDef::new(
                "E",
                vec![Constant::new("A").with_index(1), Constant::new("B").with_index(1)],
            )
            .into(),
        ]);
        assert!(matches!(
            compile(&schema),
            Err(SchemaError::DuplicateCode { code: 1, .. })
        ));
    }

    #[test]
    fn empty_enum_fails() {
        let schema = Schema::single(vec![EnumDef::new("E", Vec::new()).into()]);
        assert_eq!(
            compile(&schema).unwrap_err(),
            SchemaError::EmptyEnum("E".into())
        );
    }

    #[test]
    fn tags_continue_after_ancestor_tags() {
        let model = compile(&shapes()).unwrap();
        assert_eq!(tags(&model, "Shape"), vec![Some(1), Some(2)]);
        assert_eq!(tags(&model, "Circle"), vec![Some(3)]);
        assert_eq!(tags(&model, "Rectangle"), vec![Some(3), Some(4)]);
    }

    #[test]
    fn explicit_tags_are_kept_and_skipped() {
        let schema = Schema::single(vec![
            MessageDef::new("A", vec![int("a"), int("b").with_index(1), int("c")]).into(),
        ]);
        let model = compile(&schema).unwrap();
        assert_eq!(tags(&model, "A"), vec![Some(2), Some(1), Some(3)]);
    }

    #[test]
    fn colliding_tags_fail() {
        let schema = Schema::single(vec![
            MessageDef::abstract_("Base", vec![int("a")]).into(),
            MessageDef::new("Sub", vec![int("b").with_index(1)])
                .extends("Base")
                .into(),
        ]);
        assert_eq!(
            compile(&schema).unwrap_err(),
            SchemaError::DuplicateTag {
                message: "Sub".into(),
                field: "b".into(),
                tag: 1,
                other: "Base.a".into()
            }
        );
    }

    #[test]
    fn tag_zero_is_reserved() {
        let schema = Schema::single(vec![MessageDef::new("A", vec![int("a").with_index(0)]).into()]);
        assert!(matches!(
            compile(&schema),
            Err(SchemaError::ReservedTag { .. })
        ));
    }

    #[test]
    fn transient_fields_have_no_tag() {
        let schema = Schema::single(vec![
            MessageDef::new("A", vec![int("a").transient(), int("b")]).into(),
        ]);
        let model = compile(&schema).unwrap();
        assert_eq!(tags(&model, "A"), vec![None, Some(1)]);
    }

    #[test]
    fn keys_honour_name_option() {
        let schema = Schema::single(vec![
            MessageDef::new(
                "A",
                vec![int("first_name").with_option("Name", OptionValue::String("firstName".into()))],
            )
            .with_option("Name", OptionValue::String("a".into()))
            .into(),
        ]);
        let model = compile(&schema).unwrap();
        let a = message(&model, "A");
        assert_eq!(a.json_type, "a");
        assert_eq!(a.fields[0].key, "firstName");
    }

    #[test]
    fn duplicate_keys_across_hierarchy_fail() {
        let schema = Schema::single(vec![
            MessageDef::abstract_("Base", vec![int("a")]).into(),
            MessageDef::new(
                "Sub",
                vec![int("b").with_option("Name", OptionValue::String("a".into()))],
            )
            .extends("Base")
            .into(),
        ]);
        assert!(matches!(
            compile(&schema),
            Err(SchemaError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn case_folded_field_names_clash() {
        let schema = Schema::single(vec![
            MessageDef::new("Point", vec![int("fooBar"), int("foo_bar")]).into(),
        ]);
        let err = compile(&schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `Point.foo_bar` generates `foo_bar`, already generated for `Point.fooBar`"
        );

        let schema = Schema::single(vec![
            MessageDef::abstract_("Shape", vec![int("x")]).into(),
            MessageDef::new("Circle", vec![int("X")]).extends("Shape").into(),
        ]);
        assert!(matches!(
            compile(&schema),
            Err(SchemaError::IdentifierClash { field, other, .. })
                if field == "X" && other == "Shape.x"
        ));
    }

    #[test]
    fn type_ids_are_per_family_in_declaration_order() {
        let model = compile(&shapes()).unwrap();
        assert_eq!(message(&model, "Circle").type_id, Some(1));
        assert_eq!(message(&model, "Rectangle").type_id, Some(2));
        assert_eq!(message(&model, "Leaf").type_id, Some(1));
        assert_eq!(message(&model, "Shape").type_id, None);
    }

    #[test]
    fn explicit_type_ids_are_respected() {
        let schema = Schema::single(vec![
            MessageDef::abstract_("Shape", Vec::new()).into(),
            MessageDef::new("Circle", Vec::new()).extends("Shape").into(),
            MessageDef::new("Square", Vec::new())
                .extends("Shape")
                .with_id(1)
                .into(),
        ]);
        let model = compile(&schema).unwrap();
        assert_eq!(message(&model, "Square").type_id, Some(1));
        assert_eq!(message(&model, "Circle").type_id, Some(2));
    }

    #[test]
    fn duplicate_type_ids_fail() {
        let schema = Schema::single(vec![
            MessageDef::abstract_("Shape", Vec::new()).into(),
            MessageDef::new("A", Vec::new()).extends("Shape").with_id(3).into(),
            MessageDef::new("B", Vec::new()).extends("Shape").with_id(3).into(),
        ]);
        assert!(matches!(
            compile(&schema),
            Err(SchemaError::DuplicateTypeId { id: 3, .. })
        ));
    }

    #[test]
    fn assignment_is_stable_across_runs() {
        let first = compile(&shapes()).unwrap();
        let second = compile(&shapes()).unwrap();
        for (a, b) in first.messages.iter().zip(&second.messages) {
            assert_eq!(a.type_id, b.type_id);
            assert_eq!(a.json_type, b.json_type);
            let a_tags: Vec<_> = a.fields.iter().map(|f| f.tag).collect();
            let b_tags: Vec<_> = b.fields.iter().map(|f| f.tag).collect();
            assert_eq!(a_tags, b_tags);
        }
    }
}
