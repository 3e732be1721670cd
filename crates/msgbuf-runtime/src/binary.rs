//! Compact tagged binary format.
//!
//! Every value inside an object is preceded by a header carrying the field tag
//! and the value kind, so readers can skip fields they do not know.
//!
//! ```text
//! object := (header value)* 0x00
//! header := varint(tag << 4 | kind)
//! array  := kind:u8 varint(count) value{count} 0x00
//! ```
//!
//! Integers use LEB128 varints (zigzag for the signed kinds), fixed-width
//! kinds are little-endian, strings and byte sequences are length-prefixed.

use crate::error::{Error, Result};
use tracing::trace;

/// Kind of a value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    Int = 1,
    Sint = 2,
    Fint = 3,
    Long = 4,
    Slong = 5,
    Flong = 6,
    Float = 7,
    Double = 8,
    String = 9,
    Binary = 10,
    Object = 11,
    Array = 12,
}

impl DataType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Int,
            2 => Self::Sint,
            3 => Self::Fint,
            4 => Self::Long,
            5 => Self::Slong,
            6 => Self::Flong,
            7 => Self::Float,
            8 => Self::Double,
            9 => Self::String,
            10 => Self::Binary,
            11 => Self::Object,
            12 => Self::Array,
            _ => return None,
        })
    }
}

fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Streaming writer for the binary format.
///
/// Call [`name`](Self::name) before each field value inside an object; array
/// elements and the top-level object are written without a header.
#[derive(Debug, Default)]
pub struct DataWriter {
    buf: Vec<u8>,
    pending: Option<u32>,
}

impl DataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag of the next value.
    pub fn name(&mut self, tag: u32) {
        self.pending = Some(tag);
    }

    fn header(&mut self, kind: DataType) {
        if let Some(tag) = self.pending.take() {
            self.varint((u64::from(tag) << 4) | u64::from(kind.code()));
        }
    }

    fn varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    pub fn begin_object(&mut self) {
        self.header(DataType::Object);
    }

    pub fn end_object(&mut self) {
        self.buf.push(0);
    }

    pub fn begin_array(&mut self, element: DataType, len: usize) {
        self.header(DataType::Array);
        self.buf.push(element.code());
        self.varint(len as u64);
    }

    pub fn end_array(&mut self) {
        self.buf.push(0);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.header(DataType::Int);
        self.varint(u64::from(value));
    }

    pub fn write_int(&mut self, value: i32) {
        self.header(DataType::Int);
        self.varint(i64::from(value) as u64);
    }

    pub fn write_uint(&mut self, value: u32) {
        self.header(DataType::Int);
        self.varint(u64::from(value));
    }

    pub fn write_sint(&mut self, value: i32) {
        self.header(DataType::Sint);
        self.varint(u64::from(zigzag32(value)));
    }

    pub fn write_fixed_int(&mut self, value: u32) {
        self.header(DataType::Fint);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_sfixed_int(&mut self, value: i32) {
        self.header(DataType::Fint);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_long(&mut self, value: i64) {
        self.header(DataType::Long);
        self.varint(value as u64);
    }

    pub fn write_ulong(&mut self, value: u64) {
        self.header(DataType::Long);
        self.varint(value);
    }

    pub fn write_slong(&mut self, value: i64) {
        self.header(DataType::Slong);
        self.varint(zigzag64(value));
    }

    pub fn write_fixed_long(&mut self, value: u64) {
        self.header(DataType::Flong);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_sfixed_long(&mut self, value: i64) {
        self.header(DataType::Flong);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_float(&mut self, value: f32) {
        self.header(DataType::Float);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_double(&mut self, value: f64) {
        self.header(DataType::Double);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_string(&mut self, value: &str) {
        self.header(DataType::String);
        self.varint(value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn write_binary(&mut self, value: &[u8]) {
        self.header(DataType::Binary);
        self.varint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Object,
    Array { kind: DataType, remaining: usize },
}

/// Pull reader for the binary format.
#[derive(Debug)]
pub struct DataReader<'a> {
    data: &'a [u8],
    pos: usize,
    pending: Option<DataType>,
    frames: Vec<Frame>,
}

impl<'a> DataReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending: None,
            frames: Vec::new(),
        }
    }

    /// Whether every byte of the input has been consumed.
    pub fn is_finished(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn byte(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.pos).copied().ok_or(Error::UnexpectedEof)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(Error::UnexpectedEof)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let byte = self.byte()?;
            // The tenth byte may only carry the top bit.
            if shift == 63 && byte > 1 {
                return Err(Error::Binary("varint overflows 64 bits".into()));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn length(&mut self) -> Result<usize> {
        usize::try_from(self.varint()?)
            .map_err(|_| Error::Binary("length does not fit in memory".into()))
    }

    /// Kind of the value about to be read; `None` for the top-level value.
    fn value_kind(&mut self) -> Result<Option<DataType>> {
        if let Some(kind) = self.pending.take() {
            return Ok(Some(kind));
        }
        match self.frames.last_mut() {
            Some(Frame::Array { kind, remaining }) => {
                if *remaining == 0 {
                    return Err(Error::Binary("read past the end of an array".into()));
                }
                *remaining -= 1;
                Ok(Some(*kind))
            }
            Some(Frame::Object) => Err(Error::Binary("value read without a field header".into())),
            None => Ok(None),
        }
    }

    fn expect(&mut self, expected: DataType) -> Result<()> {
        match self.value_kind()? {
            Some(kind) if kind != expected => Err(Error::Binary(format!(
                "expected {expected:?} value, found {kind:?}"
            ))),
            _ => Ok(()),
        }
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.expect(DataType::Object)?;
        self.frames.push(Frame::Object);
        Ok(())
    }

    /// Consume the end marker of the current object, skipping any fields left unread.
    pub fn end_object(&mut self) -> Result<()> {
        if !matches!(self.frames.last(), Some(Frame::Object)) {
            return Err(Error::Binary("end of object outside of an object".into()));
        }
        self.skip_remaining()?;
        self.frames.pop();
        self.byte()?;
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.expect(DataType::Array)?;
        self.open_array()
    }

    fn open_array(&mut self) -> Result<()> {
        let code = self.byte()?;
        let kind = DataType::from_code(code)
            .ok_or_else(|| Error::Binary(format!("unknown array element kind {code}")))?;
        let remaining = self.length()?;
        self.frames.push(Frame::Array { kind, remaining });
        Ok(())
    }

    /// Consume the end marker of the current array, skipping any elements left unread.
    pub fn end_array(&mut self) -> Result<()> {
        if !matches!(self.frames.last(), Some(Frame::Array { .. })) {
            return Err(Error::Binary("end of array outside of an array".into()));
        }
        while self.has_next()? {
            self.skip_value()?;
        }
        self.frames.pop();
        match self.byte()? {
            0 => Ok(()),
            other => Err(Error::Binary(format!(
                "expected end of array, found {other:#04x}"
            ))),
        }
    }

    /// Whether the current object or array has another field or element.
    pub fn has_next(&mut self) -> Result<bool> {
        match self.frames.last() {
            Some(Frame::Object) => Ok(self.peek_byte()? != 0),
            Some(Frame::Array { remaining, .. }) => Ok(*remaining > 0),
            None => Ok(false),
        }
    }

    /// Read the next field header and return its tag.
    pub fn next_name(&mut self) -> Result<u32> {
        if !matches!(self.frames.last(), Some(Frame::Object)) {
            return Err(Error::Binary("field header outside of an object".into()));
        }
        let header = self.varint()?;
        let code = (header & 0x0f) as u8;
        let kind = DataType::from_code(code)
            .ok_or_else(|| Error::Binary(format!("unknown value kind {code}")))?;
        let tag = u32::try_from(header >> 4)
            .map_err(|_| Error::Binary(format!("field tag {} out of range", header >> 4)))?;
        self.pending = Some(kind);
        Ok(tag)
    }

    /// Skip the next value, whatever its kind.
    pub fn skip_value(&mut self) -> Result<()> {
        let kind = self
            .value_kind()?
            .ok_or_else(|| Error::Binary("cannot skip the top-level value".into()))?;
        trace!(?kind, "skipping binary value");
        match kind {
            DataType::Int | DataType::Sint | DataType::Long | DataType::Slong => {
                self.varint()?;
            }
            DataType::Fint | DataType::Float => {
                self.take(4)?;
            }
            DataType::Flong | DataType::Double => {
                self.take(8)?;
            }
            DataType::String | DataType::Binary => {
                let len = self.length()?;
                self.take(len)?;
            }
            DataType::Object => {
                self.frames.push(Frame::Object);
                self.end_object()?;
            }
            DataType::Array => {
                self.open_array()?;
                self.end_array()?;
            }
        }
        Ok(())
    }

    /// Skip every remaining field of the current object.
    pub fn skip_remaining(&mut self) -> Result<()> {
        while self.has_next()? {
            self.next_name()?;
            self.skip_value()?;
        }
        Ok(())
    }

    /// Read the type discriminator that opens an abstract-rooted object.
    pub fn read_type_id(&mut self) -> Result<u32> {
        if !self.has_next()? || self.next_name()? != 0 {
            return Err(Error::MissingDiscriminator);
        }
        self.next_uint()
    }

    pub fn next_bool(&mut self) -> Result<bool> {
        self.expect(DataType::Int)?;
        Ok(self.varint()? != 0)
    }

    pub fn next_int(&mut self) -> Result<i32> {
        self.expect(DataType::Int)?;
        Ok(self.varint()? as i64 as i32)
    }

    pub fn next_uint(&mut self) -> Result<u32> {
        self.expect(DataType::Int)?;
        Ok(self.varint()? as u32)
    }

    pub fn next_sint(&mut self) -> Result<i32> {
        self.expect(DataType::Sint)?;
        let value = self.varint()? as u32;
        Ok(((value >> 1) as i32) ^ -((value & 1) as i32))
    }

    pub fn next_fixed_int(&mut self) -> Result<u32> {
        self.expect(DataType::Fint)?;
        Ok(u32::from_le_bytes(self.fixed()?))
    }

    pub fn next_sfixed_int(&mut self) -> Result<i32> {
        self.expect(DataType::Fint)?;
        Ok(i32::from_le_bytes(self.fixed()?))
    }

    pub fn next_long(&mut self) -> Result<i64> {
        self.expect(DataType::Long)?;
        Ok(self.varint()? as i64)
    }

    pub fn next_ulong(&mut self) -> Result<u64> {
        self.expect(DataType::Long)?;
        self.varint()
    }

    pub fn next_slong(&mut self) -> Result<i64> {
        self.expect(DataType::Slong)?;
        let value = self.varint()?;
        Ok(((value >> 1) as i64) ^ -((value & 1) as i64))
    }

    pub fn next_fixed_long(&mut self) -> Result<u64> {
        self.expect(DataType::Flong)?;
        Ok(u64::from_le_bytes(self.fixed()?))
    }

    pub fn next_sfixed_long(&mut self) -> Result<i64> {
        self.expect(DataType::Flong)?;
        Ok(i64::from_le_bytes(self.fixed()?))
    }

    pub fn next_float(&mut self) -> Result<f32> {
        self.expect(DataType::Float)?;
        Ok(f32::from_le_bytes(self.fixed()?))
    }

    pub fn next_double(&mut self) -> Result<f64> {
        self.expect(DataType::Double)?;
        Ok(f64::from_le_bytes(self.fixed()?))
    }

    pub fn next_string(&mut self) -> Result<String> {
        self.expect(DataType::String)?;
        let len = self.length()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Binary(format!("invalid UTF-8 in string: {e}")))
    }

    pub fn next_binary(&mut self) -> Result<Vec<u8>> {
        self.expect(DataType::Binary)?;
        let len = self.length()?;
        Ok(self.take(len)?.to_vec())
    }
}
