//! Reflective property access by string key.
//!
//! Each generated type owns a static table of [`Property`] entries for the
//! fields it declares and chains to its ancestor's table on a miss.

use crate::error::{Error, Result};
use std::any::Any;
use std::fmt;

/// A dynamically typed property value.
///
/// Scalars have dedicated variants; enums, messages and containers travel
/// as [`Value::Other`] and are recovered with [`Value::downcast`].
pub enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Other(Box<dyn Any>),
}

impl Value {
    pub fn other<T: Any>(value: T) -> Self {
        Value::Other(Box::new(value))
    }

    /// Recover a value stored with [`Value::other`].
    pub fn downcast<T: Any>(self, property: &str) -> Result<T> {
        let expected = std::any::type_name::<T>();
        match self {
            Value::Other(boxed) => boxed
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| mismatch(property, expected)),
            _ => Err(mismatch(property, expected)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Long(_) => "long",
            Value::ULong(_) => "ulong",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Other(_) => "other",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::UInt(v) => write!(f, "UInt({v})"),
            Value::Long(v) => write!(f, "Long({v})"),
            Value::ULong(v) => write!(f, "ULong({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Double(v) => write!(f, "Double({v})"),
            Value::String(v) => write!(f, "String({v:?})"),
            Value::Bytes(v) => write!(f, "Bytes({v:?})"),
            Value::Other(_) => f.write_str("Other(..)"),
        }
    }
}

fn mismatch(property: &str, expected: &'static str) -> Error {
    Error::TypeMismatch {
        property: property.to_string(),
        expected,
    }
}

/// Conversion out of a [`Value`] for the scalar kinds.
pub trait FromValue: Sized {
    fn from_value(value: Value, property: &str) -> Result<Self>;
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident, $label:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value, property: &str) -> Result<Self> {
                    match value {
                        Value::$variant(value) => Ok(value),
                        other => {
                            tracing::debug!(property, found = other.kind(), "reflective type mismatch");
                            Err(mismatch(property, $label))
                        }
                    }
                }
            }
        )*
    };
}

scalar_value! {
    bool => Bool, "bool";
    i32 => Int, "int";
    u32 => UInt, "uint";
    i64 => Long, "long";
    u64 => ULong, "ulong";
    f32 => Float, "float";
    f64 => Double, "double";
    String => String, "string";
    Vec<u8> => Bytes, "bytes";
}

/// A reflective accessor pair for one field.
pub struct Property<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Value,
    pub set: fn(&mut T, Value) -> Result<()>,
}

/// Find a property by key in a type's local table.
pub fn lookup<T>(table: &'static [Property<T>], name: &str) -> Option<&'static Property<T>> {
    table.iter().find(|property| property.name == name)
}

/// Uniform reflective access implemented by every generated message.
pub trait Reflective {
    /// Field keys, ancestor fields first.
    fn properties(&self) -> &'static [&'static str];

    fn get(&self, name: &str) -> Result<Value>;

    fn set(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Report an unknown key once the root of a hierarchy is reached.
pub fn unknown(name: &str) -> Error {
    Error::UnknownProperty(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Point {
        x: i32,
        tags: Vec<String>,
    }

    const POINT: &[Property<Point>] = &[
        Property {
            name: "x",
            get: |this| Value::from(this.x),
            set: |this, value| {
                this.x = FromValue::from_value(value, "x")?;
                Ok(())
            },
        },
        Property {
            name: "tags",
            get: |this| Value::other(this.tags.clone()),
            set: |this, value| {
                this.tags = value.downcast("tags")?;
                Ok(())
            },
        },
    ];

    #[test]
    fn table_lookup_round_trips() {
        let mut point = Point::default();
        let x = lookup(POINT, "x").unwrap();
        (x.set)(&mut point, Value::Int(4)).unwrap();
        assert!(matches!((x.get)(&point), Value::Int(4)));

        let tags = lookup(POINT, "tags").unwrap();
        (tags.set)(&mut point, Value::other(vec!["a".to_string()])).unwrap();
        assert_eq!(point.tags, vec!["a".to_string()]);
        assert!(lookup(POINT, "y").is_none());
    }

    #[test]
    fn wrong_shape_is_a_mismatch() {
        let mut point = Point::default();
        let x = lookup(POINT, "x").unwrap();
        let err = (x.set)(&mut point, Value::String("four".into())).unwrap_err();
        assert_eq!(err.to_string(), "property `x` expects int");

        let tags = lookup(POINT, "tags").unwrap();
        assert!(matches!(
            (tags.set)(&mut point, Value::other(3u8)),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
