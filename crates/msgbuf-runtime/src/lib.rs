//! Runtime support for code generated by `msgbuf-codegen`.
//!
//! Generated types are written against the primitives in this crate:
//!
//! ```text
//! generated type ──> JsonMessage   ──> JsonWriter / JsonReader   (serde_json::Value)
//!                ├─> BinaryMessage ──> DataWriter / DataReader   (tagged binary)
//!                ├─> Reflective    ──> Property tables, Value
//!                └─> XmlMessage    ──> roxmltree helpers          (feature "xml")
//! ```
//!
//! # Example
//!
//! ```
//! use msgbuf_runtime::{DataReader, DataWriter};
//!
//! let mut writer = DataWriter::new();
//! writer.begin_object();
//! writer.name(1);
//! writer.write_string("hello");
//! writer.end_object();
//! let bytes = writer.into_bytes();
//!
//! let mut reader = DataReader::new(&bytes);
//! reader.begin_object().unwrap();
//! assert_eq!(reader.next_name().unwrap(), 1);
//! assert_eq!(reader.next_string().unwrap(), "hello");
//! reader.end_object().unwrap();
//! ```

pub mod binary;
pub mod error;
pub mod json;
pub mod reflect;
#[cfg(feature = "xml")]
pub mod xml;

pub use binary::{DataReader, DataType, DataWriter};
pub use error::{Error, Result};
pub use indexmap::IndexMap;
pub use json::{JsonReader, JsonWriter};
pub use reflect::{FromValue, Property, Reflective, Value};
#[cfg(feature = "xml")]
pub use xml::XmlMessage;

/// Reads the content of one concrete member of a polymorphic family from JSON.
pub type JsonFactory<T> = fn(&mut JsonReader) -> Result<T>;

/// Reads the fields of one concrete member of a polymorphic family from binary.
pub type BinaryFactory<T> = fn(&mut DataReader<'_>) -> Result<T>;

/// A message with a JSON encoding.
pub trait JsonMessage: Sized {
    /// Read a message; `None` for `null` or an unknown type discriminator.
    fn read_json(reader: &mut JsonReader) -> Result<Option<Self>>;

    fn write_json(&self, writer: &mut JsonWriter);

    fn to_json_value(&self) -> serde_json::Value {
        let mut writer = JsonWriter::new();
        self.write_json(&mut writer);
        writer.into_value()
    }

    fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }

    fn from_json_value(value: serde_json::Value) -> Result<Option<Self>> {
        Self::read_json(&mut JsonReader::new(value))
    }

    fn from_json_str(text: &str) -> Result<Option<Self>> {
        Self::read_json(&mut JsonReader::parse(text)?)
    }
}

/// A message with a binary encoding.
pub trait BinaryMessage: Sized {
    /// Read a message; `None` for an unknown type discriminator.
    fn read_binary(reader: &mut DataReader<'_>) -> Result<Option<Self>>;

    fn write_binary(&self, writer: &mut DataWriter);

    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = DataWriter::new();
        self.write_binary(&mut writer);
        writer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Option<Self>> {
        Self::read_binary(&mut DataReader::new(bytes))
    }
}
