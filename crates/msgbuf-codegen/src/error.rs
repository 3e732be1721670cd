//! Compilation errors.

use crate::plan::PlanError;

/// A schema that cannot be compiled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("definition `{0}` is declared more than once")]
    DuplicateDefinition(String),

    #[error("field `{message}.{field}` refers to unknown type `{reference}`")]
    UnresolvedType {
        message: String,
        field: String,
        reference: String,
    },

    #[error("`{message}` extends unknown type `{extends}`")]
    UnresolvedExtends { message: String, extends: String },

    #[error("`{message}` extends `{extends}`, which is not a message")]
    ExtendsNonMessage { message: String, extends: String },

    #[error("inheritance cycle through `{0}`")]
    InheritanceCycle(String),

    #[error("abstract `{message}` cannot extend concrete `{extends}`")]
    AbstractExtendsConcrete { message: String, extends: String },

    #[error("field `{message}.{field}` is a repeated map")]
    RepeatedMap { message: String, field: String },

    #[error("field `{message}.{field}` is already declared by `{message}` or an ancestor")]
    DuplicateField { message: String, field: String },

    #[error("field `{message}.{field}` generates `{ident}`, already generated for `{other}`")]
    IdentifierClash {
        message: String,
        field: String,
        ident: String,
        other: String,
    },

    #[error("field `{message}.{field}` uses key `{key}`, already used by `{other}`")]
    DuplicateKey {
        message: String,
        field: String,
        key: String,
        other: String,
    },

    #[error("field `{message}.{field}` uses tag {tag}, already used by `{other}`")]
    DuplicateTag {
        message: String,
        field: String,
        tag: u32,
        other: String,
    },

    #[error("field `{message}.{field}` uses tag 0, reserved for the type discriminator")]
    ReservedTag { message: String, field: String },

    #[error("`{message}` uses type id {id}, already used by `{other}`")]
    DuplicateTypeId {
        message: String,
        id: u32,
        other: String,
    },

    #[error("`{0}` uses type id 0, reserved for the discriminator slot")]
    ReservedTypeId(String),

    #[error("enum `{0}` declares no constants")]
    EmptyEnum(String),

    #[error("constant `{name}.{constant}` has negative code {code}")]
    NegativeCode {
        name: String,
        constant: String,
        code: i32,
    },

    #[error("constant `{name}.{constant}` uses code {code}, already used by `{other}`")]
    DuplicateCode {
        name: String,
        constant: String,
        code: i32,
        other: String,
    },

    #[error("constant `{name}.{constant}` is declared twice")]
    DuplicateConstant { name: String, constant: String },
}

/// Any failure of a compilation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("field `{message}.{field}` cannot be encoded: {source}")]
    Unsupported {
        message: String,
        field: String,
        #[source]
        source: PlanError,
    },

    #[error("plugin `{plugin}` rejected `{definition}`: {message}")]
    Plugin {
        plugin: String,
        definition: String,
        message: String,
    },

    #[error("no plugin named `{0}` is registered")]
    UnknownPlugin(String),

    #[error("invalid schema document: {0}")]
    Input(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
