//! JSON token stream over [`serde_json::Value`].
//!
//! The writer builds a value tree in insertion order; the reader walks an
//! owned tree with the same begin/name/value/end protocol as the binary
//! reader, so generated code reads both formats the same way.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use tracing::trace;

enum WriteFrame {
    Object {
        key: Option<String>,
        map: Map<String, Value>,
    },
    Array {
        key: Option<String>,
        items: Vec<Value>,
    },
}

/// Builds a JSON value from a stream of writer calls.
#[derive(Default)]
pub struct JsonWriter {
    stack: Vec<WriteFrame>,
    pending: Option<String>,
    result: Option<Value>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the property name of the next value.
    pub fn name(&mut self, name: &str) {
        self.pending = Some(name.to_string());
    }

    fn push(&mut self, key: Option<String>, value: Value) {
        match self.stack.last_mut() {
            Some(WriteFrame::Object { map, .. }) => {
                map.insert(key.unwrap_or_default(), value);
            }
            Some(WriteFrame::Array { items, .. }) => items.push(value),
            None => self.result = Some(value),
        }
    }

    fn value(&mut self, value: Value) {
        let key = self.pending.take();
        self.push(key, value);
    }

    pub fn begin_object(&mut self) {
        let key = self.pending.take();
        self.stack.push(WriteFrame::Object {
            key,
            map: Map::new(),
        });
    }

    pub fn end_object(&mut self) {
        if let Some(WriteFrame::Object { key, map }) = self.stack.pop() {
            self.push(key, Value::Object(map));
        }
    }

    pub fn begin_array(&mut self) {
        let key = self.pending.take();
        self.stack.push(WriteFrame::Array {
            key,
            items: Vec::new(),
        });
    }

    pub fn end_array(&mut self) {
        if let Some(WriteFrame::Array { key, items }) = self.stack.pop() {
            self.push(key, Value::Array(items));
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.value(Value::Bool(value));
    }

    pub fn write_i64(&mut self, value: i64) {
        self.value(Value::from(value));
    }

    pub fn write_u64(&mut self, value: u64) {
        self.value(Value::from(value));
    }

    /// Non-finite numbers have no JSON form and are written as the strings
    /// `"NaN"`, `"Infinity"` and `"-Infinity"`.
    pub fn write_f64(&mut self, value: f64) {
        let value = match Number::from_f64(value) {
            Some(number) => Value::Number(number),
            None if value.is_nan() => Value::String("NaN".into()),
            None if value > 0.0 => Value::String("Infinity".into()),
            None => Value::String("-Infinity".into()),
        };
        self.value(value);
    }

    pub fn write_str(&mut self, value: &str) {
        self.value(Value::String(value.to_string()));
    }

    /// Byte sequences are written as standard base64.
    pub fn write_binary(&mut self, value: &[u8]) {
        self.value(Value::String(STANDARD.encode(value)));
    }

    pub fn write_null(&mut self) {
        self.value(Value::Null);
    }

    pub fn into_value(self) -> Value {
        self.result.unwrap_or(Value::Null)
    }
}

enum ReadFrame {
    Object(Peekable<serde_json::map::IntoIter>),
    Array(Peekable<std::vec::IntoIter<Value>>),
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::Json(format!("expected {expected}, found {}", describe(found)))
}

/// Walks a JSON value with the same protocol the generated readers use for
/// the binary format.
pub struct JsonReader {
    stack: Vec<ReadFrame>,
    pending: Option<Value>,
}

impl JsonReader {
    pub fn new(value: Value) -> Self {
        Self {
            stack: Vec::new(),
            pending: Some(value),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    fn next_value(&mut self) -> Result<Value> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        match self.stack.last_mut() {
            Some(ReadFrame::Array(items)) => items
                .next()
                .ok_or_else(|| Error::Json("read past the end of an array".into())),
            Some(ReadFrame::Object(_)) => {
                Err(Error::Json("value read without a property name".into()))
            }
            None => Err(Error::Json("no value left to read".into())),
        }
    }

    /// Whether the current object or array has another property or element.
    pub fn has_next(&mut self) -> bool {
        match self.stack.last_mut() {
            Some(ReadFrame::Object(entries)) => entries.peek().is_some(),
            Some(ReadFrame::Array(items)) => items.peek().is_some(),
            None => false,
        }
    }

    /// Whether the next value is `null`.
    pub fn peek_null(&mut self) -> bool {
        if let Some(value) = &self.pending {
            return value.is_null();
        }
        match self.stack.last_mut() {
            Some(ReadFrame::Array(items)) => items.peek().is_some_and(Value::is_null),
            _ => false,
        }
    }

    /// Read the next value with `read`, or consume a `null` as `None`.
    pub fn next_nullable<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.peek_null() {
            self.skip_value()?;
            return Ok(None);
        }
        read(self).map(Some)
    }

    pub fn next_name(&mut self) -> Result<String> {
        match self.stack.last_mut() {
            Some(ReadFrame::Object(entries)) => {
                let (name, value) = entries
                    .next()
                    .ok_or_else(|| Error::Json("read past the end of an object".into()))?;
                self.pending = Some(value);
                Ok(name)
            }
            _ => Err(Error::Json("property name read outside of an object".into())),
        }
    }

    pub fn begin_object(&mut self) -> Result<()> {
        match self.next_value()? {
            Value::Object(map) => {
                self.stack.push(ReadFrame::Object(map.into_iter().peekable()));
                Ok(())
            }
            other => Err(mismatch("an object", &other)),
        }
    }

    pub fn end_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(ReadFrame::Object(_)) => Ok(()),
            _ => Err(Error::Json("end of object outside of an object".into())),
        }
    }

    pub fn begin_array(&mut self) -> Result<()> {
        match self.next_value()? {
            Value::Array(items) => {
                self.stack.push(ReadFrame::Array(items.into_iter().peekable()));
                Ok(())
            }
            other => Err(mismatch("an array", &other)),
        }
    }

    pub fn end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(ReadFrame::Array(_)) => Ok(()),
            _ => Err(Error::Json("end of array outside of an array".into())),
        }
    }

    pub fn skip_value(&mut self) -> Result<()> {
        let value = self.next_value()?;
        trace!(kind = describe(&value), "skipping JSON value");
        Ok(())
    }

    pub fn next_bool(&mut self) -> Result<bool> {
        match self.next_value()? {
            Value::Bool(value) => Ok(value),
            other => Err(mismatch("a boolean", &other)),
        }
    }

    /// Integer kinds accept any whole JSON number.
    pub fn next_long(&mut self) -> Result<i64> {
        let value = self.next_value()?;
        if let Some(value) = value.as_i64() {
            return Ok(value);
        }
        match value.as_f64() {
            Some(float) if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 => {
                Ok(float as i64)
            }
            _ => Err(mismatch("an integer", &value)),
        }
    }

    pub fn next_ulong(&mut self) -> Result<u64> {
        let value = self.next_value()?;
        if let Some(value) = value.as_u64() {
            return Ok(value);
        }
        match value.as_f64() {
            Some(float) if float.fract() == 0.0 && float >= 0.0 && float < u64::MAX as f64 => {
                Ok(float as u64)
            }
            _ => Err(mismatch("an unsigned integer", &value)),
        }
    }

    pub fn next_int(&mut self) -> Result<i32> {
        let value = self.next_long()?;
        i32::try_from(value).map_err(|_| Error::Json(format!("{value} does not fit in 32 bits")))
    }

    pub fn next_uint(&mut self) -> Result<u32> {
        let value = self.next_ulong()?;
        u32::try_from(value).map_err(|_| Error::Json(format!("{value} does not fit in 32 bits")))
    }

    pub fn next_double(&mut self) -> Result<f64> {
        match self.next_value()? {
            Value::Number(number) => number
                .as_f64()
                .ok_or_else(|| Error::Json(format!("{number} is not representable"))),
            Value::String(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => Err(Error::Json(format!("expected a number, found string {text:?}"))),
            },
            other => Err(mismatch("a number", &other)),
        }
    }

    pub fn next_float(&mut self) -> Result<f32> {
        Ok(self.next_double()? as f32)
    }

    /// `null` reads back as the empty string.
    pub fn next_string(&mut self) -> Result<String> {
        match self.next_value()? {
            Value::String(value) => Ok(value),
            Value::Null => Ok(String::new()),
            other => Err(mismatch("a string", &other)),
        }
    }

    /// Byte sequences are base64 strings; `null` reads back as empty.
    pub fn next_binary(&mut self) -> Result<Vec<u8>> {
        match self.next_value()? {
            Value::String(value) => Ok(STANDARD.decode(value)?),
            Value::Null => Ok(Vec::new()),
            other => Err(mismatch("a base64 string", &other)),
        }
    }
}
