//! Hierarchy resolution.
//!
//! Registers every definition by name, resolves `extends` references (which
//! may point forward), records direct specializations and resolves field
//! types. Any unresolvable reference fails the whole compilation.

use crate::error::SchemaError;
use crate::ir::{self, Definition, MessageDef, Part, Schema};
use crate::model::{
    ConstantInfo, DefRef, EnumId, EnumInfo, FieldInfo, FileInfo, MessageId, MessageInfo, Model,
    ResolvedType,
};
use std::collections::HashSet;
use tracing::debug;

/// Build the resolved model for a schema.
pub fn resolve(schema: &Schema) -> Result<Model, SchemaError> {
    let _span = tracing::debug_span!("resolve", files = schema.files.len()).entered();

    let mut registrar = Registrar {
        model: Model::default(),
        pending: Vec::new(),
    };
    registrar.model.options = schema
        .options
        .iter()
        .map(|container| container.options.clone())
        .collect();
    for (index, file) in schema.files.iter().enumerate() {
        registrar.model.files.push(FileInfo {
            name: file.name.clone(),
            package: file.package.clone(),
            docs: file.docs.clone(),
            options: file.options.clone(),
        });
        for definition in &file.definitions {
            let reference = registrar.register(definition, index)?;
            registrar.model.roots.push(reference);
        }
    }

    let Registrar { mut model, pending } = registrar;
    link_generalizations(&mut model, &pending)?;
    check_cycles(&model)?;
    check_abstractness(&model)?;

    for id in model.message_ids().collect::<Vec<_>>() {
        let in_family = model.message(id).is_abstract
            || model
                .ancestors(id)
                .into_iter()
                .any(|ancestor| model.message(ancestor).is_abstract);
        model.message_mut(id).abstract_family = in_family;
    }

    for (id, def) in &pending {
        let fields = def
            .fields
            .iter()
            .map(|field| resolve_field(&model, def, field))
            .collect::<Result<Vec<_>, _>>()?;
        model.message_mut(*id).fields = fields;

        let info = model.message(*id);
        debug!(
            message = %info.name,
            generalization = ?info.generalization.map(|g| &model.message(g).name),
            specializations = info.specializations.len(),
            abstract_family = info.abstract_family,
            "resolved message"
        );
    }

    Ok(model)
}

struct Registrar<'s> {
    model: Model,
    pending: Vec<(MessageId, &'s MessageDef)>,
}

impl<'s> Registrar<'s> {
    fn register(&mut self, definition: &'s Definition, file: usize) -> Result<DefRef, SchemaError> {
        match definition {
            Definition::Message(def) => {
                let id = MessageId(self.model.messages.len());
                self.model.messages.push(MessageInfo {
                    name: def.name.clone(),
                    docs: def.docs.clone(),
                    options: def.options.clone(),
                    is_abstract: def.is_abstract,
                    file,
                    explicit_id: def.id,
                    generalization: None,
                    specializations: Vec::new(),
                    abstract_family: false,
                    type_id: None,
                    json_type: String::new(),
                    fields: Vec::new(),
                    nested: Vec::new(),
                });
                self.insert_name(&def.name, DefRef::Message(id))?;
                self.pending.push((id, def));

                let nested = def
                    .definitions
                    .iter()
                    .map(|nested| self.register(nested, file))
                    .collect::<Result<Vec<_>, _>>()?;
                self.model.message_mut(id).nested = nested;
                Ok(DefRef::Message(id))
            }
            Definition::Enum(def) => {
                let id = EnumId(self.model.enums.len());
                self.model.enums.push(EnumInfo {
                    name: def.name.clone(),
                    docs: def.docs.clone(),
                    options: def.options.clone(),
                    file,
                    constants: def
                        .constants
                        .iter()
                        .map(|constant| ConstantInfo {
                            name: constant.name.clone(),
                            docs: constant.docs.clone(),
                            options: constant.options.clone(),
                            explicit_code: constant.index,
                            code: 0,
                            json_name: String::new(),
                        })
                        .collect(),
                });
                self.insert_name(&def.name, DefRef::Enum(id))?;
                Ok(DefRef::Enum(id))
            }
        }
    }

    fn insert_name(&mut self, name: &str, reference: DefRef) -> Result<(), SchemaError> {
        if self
            .model
            .names
            .insert(name.to_string(), reference)
            .is_some()
        {
            return Err(SchemaError::DuplicateDefinition(name.to_string()));
        }
        Ok(())
    }
}

fn link_generalizations(
    model: &mut Model,
    pending: &[(MessageId, &MessageDef)],
) -> Result<(), SchemaError> {
    for (id, def) in pending {
        let Some(extends) = &def.extends else {
            continue;
        };
        match model.lookup(extends) {
            Some(DefRef::Message(parent)) => {
                model.message_mut(*id).generalization = Some(parent);
                model.message_mut(parent).specializations.push(*id);
            }
            Some(DefRef::Enum(_)) => {
                return Err(SchemaError::ExtendsNonMessage {
                    message: def.name.clone(),
                    extends: extends.clone(),
                });
            }
            None => {
                return Err(SchemaError::UnresolvedExtends {
                    message: def.name.clone(),
                    extends: extends.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_cycles(model: &Model) -> Result<(), SchemaError> {
    for id in model.message_ids() {
        let mut seen = HashSet::from([id]);
        let mut current = model.message(id).generalization;
        while let Some(parent) = current {
            if !seen.insert(parent) {
                return Err(SchemaError::InheritanceCycle(model.message(id).name.clone()));
            }
            current = model.message(parent).generalization;
        }
    }
    Ok(())
}

fn check_abstractness(model: &Model) -> Result<(), SchemaError> {
    for id in model.message_ids() {
        let message = model.message(id);
        if let Some(parent) = message.generalization {
            let parent = model.message(parent);
            if message.is_abstract && !parent.is_abstract {
                return Err(SchemaError::AbstractExtendsConcrete {
                    message: message.name.clone(),
                    extends: parent.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn resolve_field(model: &Model, owner: &MessageDef, field: &ir::Field) -> Result<FieldInfo, SchemaError> {
    let ty = resolve_type(model, owner, field, &field.ty)?;
    if field.repeated && matches!(ty, ResolvedType::Map { .. }) {
        return Err(SchemaError::RepeatedMap {
            message: owner.name.clone(),
            field: field.name.clone(),
        });
    }
    Ok(FieldInfo {
        name: field.name.clone(),
        docs: field.docs().map(str::to_string),
        options: field.options.clone(),
        ty,
        repeated: field.repeated,
        transient: field.transient,
        explicit_tag: field.index,
        tag: None,
        key: String::new(),
    })
}

fn resolve_type(
    model: &Model,
    owner: &MessageDef,
    field: &ir::Field,
    ty: &ir::Type,
) -> Result<ResolvedType, SchemaError> {
    Ok(match ty {
        ir::Type::Primitive(kind) => ResolvedType::Primitive(*kind),
        ir::Type::Custom(reference) => match model.lookup(reference) {
            Some(DefRef::Message(id)) => ResolvedType::Message(id),
            Some(DefRef::Enum(id)) => ResolvedType::Enum(id),
            None => {
                return Err(SchemaError::UnresolvedType {
                    message: owner.name.clone(),
                    field: field.name.clone(),
                    reference: reference.clone(),
                });
            }
        },
        ir::Type::Map { key, value } => ResolvedType::Map {
            key: Box::new(resolve_type(model, owner, field, key)?),
            value: Box::new(resolve_type(model, owner, field, value)?),
        },
    })
}
