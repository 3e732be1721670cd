//! Resolved schema graph.
//!
//! Definitions live in two arenas indexed by [`MessageId`] and [`EnumId`].
//! The graph is built by [`hierarchy::resolve`](crate::hierarchy::resolve),
//! annotated by [`ids::assign`](crate::ids::assign) and read-only afterwards.

use crate::ir::{Options, Part, PrimitiveKind, impl_part};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub(crate) usize);

/// Reference to a message or enum definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefRef {
    Message(MessageId),
    Enum(EnumId),
}

/// A field type with custom references resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Primitive(PrimitiveKind),
    Message(MessageId),
    Enum(EnumId),
    Map {
        key: Box<ResolvedType>,
        value: Box<ResolvedType>,
    },
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
    pub ty: ResolvedType,
    pub repeated: bool,
    pub transient: bool,
    pub explicit_tag: Option<u32>,
    /// Binary tag; transient fields have none.
    pub tag: Option<u32>,
    /// JSON and reflective property key.
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct MessageInfo {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
    pub is_abstract: bool,
    /// Index into [`Model::files`].
    pub file: usize,
    pub explicit_id: Option<u32>,
    pub generalization: Option<MessageId>,
    /// Direct specializations in declaration order.
    pub specializations: Vec<MessageId>,
    /// Whether this type or one of its ancestors is abstract.
    pub abstract_family: bool,
    /// Binary discriminator, assigned to concrete members of abstract families.
    pub type_id: Option<u32>,
    /// JSON and reflective discriminator.
    pub json_type: String,
    pub fields: Vec<FieldInfo>,
    pub nested: Vec<DefRef>,
}

#[derive(Debug, Clone)]
pub struct ConstantInfo {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
    pub explicit_code: Option<i32>,
    pub code: i32,
    /// Name written to JSON.
    pub json_name: String,
}

#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub name: String,
    pub docs: Option<String>,
    pub options: Options,
    pub file: usize,
    /// The first constant is the default.
    pub constants: Vec<ConstantInfo>,
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: String,
    pub package: Option<String>,
    pub docs: Option<String>,
    pub options: Options,
}

impl_part!(FieldInfo, MessageInfo, ConstantInfo, EnumInfo, FileInfo);

/// The resolved schema.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub files: Vec<FileInfo>,
    /// Compilation-wide option sets.
    pub options: Vec<Options>,
    pub messages: Vec<MessageInfo>,
    pub enums: Vec<EnumInfo>,
    /// Top-level definitions in declaration order.
    pub roots: Vec<DefRef>,
    pub(crate) names: HashMap<String, DefRef>,
}

impl Model {
    pub fn message(&self, id: MessageId) -> &MessageInfo {
        &self.messages[id.0]
    }

    pub(crate) fn message_mut(&mut self, id: MessageId) -> &mut MessageInfo {
        &mut self.messages[id.0]
    }

    pub fn enumeration(&self, id: EnumId) -> &EnumInfo {
        &self.enums[id.0]
    }

    /// Look a definition up by name. Qualified names resolve by their last segment.
    pub fn lookup(&self, name: &str) -> Option<DefRef> {
        self.names.get(name).copied().or_else(|| {
            let (_, simple) = name.rsplit_once('.')?;
            self.names.get(simple).copied()
        })
    }

    pub fn message_ids(&self) -> impl Iterator<Item = MessageId> + '_ {
        (0..self.messages.len()).map(MessageId)
    }

    pub fn enum_ids(&self) -> impl Iterator<Item = EnumId> + '_ {
        (0..self.enums.len()).map(EnumId)
    }

    /// Whether any file or compilation-wide option set turns on a flag.
    pub fn global_flag(&self, option: &str) -> bool {
        self.files.iter().any(|file| file.flag(option))
            || self.options.iter().any(|options| {
                matches!(
                    options.get(option),
                    Some(crate::ir::OptionValue::Flag(true))
                )
            })
    }

    /// Generalization chain, root first, not including `id`.
    pub fn ancestors(&self, id: MessageId) -> Vec<MessageId> {
        let mut chain = Vec::new();
        let mut current = self.message(id).generalization;
        while let Some(parent) = current {
            if chain.len() > self.messages.len() {
                break;
            }
            chain.push(parent);
            current = self.message(parent).generalization;
        }
        chain.reverse();
        chain
    }

    pub fn root(&self, id: MessageId) -> MessageId {
        self.ancestors(id).first().copied().unwrap_or(id)
    }

    /// All specializations, breadth-first in order of discovery.
    pub fn transitive_specializations(&self, id: MessageId) -> Vec<MessageId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<MessageId> = self.message(id).specializations.iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            order.push(next);
            queue.extend(self.message(next).specializations.iter().copied());
        }
        order
    }

    pub fn concrete_specializations(&self, id: MessageId) -> Vec<MessageId> {
        self.transitive_specializations(id)
            .into_iter()
            .filter(|spec| !self.message(*spec).is_abstract)
            .collect()
    }

    /// Nearest abstract ancestor, whose visitor declares the case for `id`.
    pub fn abstract_generalization(&self, id: MessageId) -> Option<MessageId> {
        self.ancestors(id)
            .into_iter()
            .rev()
            .find(|ancestor| self.message(*ancestor).is_abstract)
    }

    /// Fields of `id` and its ancestors, ancestor fields first.
    pub fn inherited_fields(&self, id: MessageId) -> Vec<(MessageId, &FieldInfo)> {
        self.ancestors(id)
            .into_iter()
            .chain(std::iter::once(id))
            .flat_map(|owner| {
                self.message(owner)
                    .fields
                    .iter()
                    .map(move |field| (owner, field))
            })
            .collect()
    }

    /// Members of an abstract type's sum: abstract direct specializations
    /// (which nest their own members) and every concrete type reached without
    /// passing through another abstract type.
    pub fn variants(&self, id: MessageId) -> Vec<MessageId> {
        let mut variants = Vec::new();
        for spec in &self.message(id).specializations {
            variants.push(*spec);
            if !self.message(*spec).is_abstract {
                variants.extend(self.transitive_specializations(*spec));
            }
        }
        variants
    }

    /// Definitions of a top-level unit: the root followed by its nested
    /// definitions, depth first.
    pub fn unit_members(&self, root: DefRef) -> Vec<DefRef> {
        let mut members = vec![root];
        let mut index = 0;
        while index < members.len() {
            if let DefRef::Message(id) = members[index] {
                let nested = &self.message(id).nested;
                members.splice(index + 1..index + 1, nested.iter().copied());
            }
            index += 1;
        }
        members
    }
}
