//! Errors raised while decoding payloads or manipulating generated messages.

/// Runtime error type shared by every generated codec and accessor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The binary payload is structurally invalid.
    #[error("malformed binary payload: {0}")]
    Binary(String),

    /// The binary payload ended in the middle of a value.
    #[error("unexpected end of binary payload")]
    UnexpectedEof,

    /// The JSON document does not have the expected shape.
    #[error("malformed JSON payload: {0}")]
    Json(String),

    /// The JSON text could not be parsed.
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A byte field held invalid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The XML document does not have the expected shape.
    #[error("malformed XML payload: {0}")]
    Xml(String),

    /// The XML text could not be parsed.
    #[cfg(feature = "xml")]
    #[error("invalid XML: {0}")]
    XmlSyntax(#[from] roxmltree::Error),

    /// A map entry was added for a key that is already present.
    #[error("duplicate key {key} in map `{property}`")]
    DuplicateKey { property: &'static str, key: String },

    /// Reflective access named a property the message does not have.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    /// A reflective setter received a value of the wrong shape.
    #[error("property `{property}` expects {expected}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
    },

    /// An abstract-rooted binary object did not start with its type discriminator.
    #[error("polymorphic object is missing its type discriminator")]
    MissingDiscriminator,
}

/// Result alias used by generated code.
pub type Result<T, E = Error> = std::result::Result<T, E>;
