//! Open Sound Control 1.0 decoder.
//!
//! The relay never filters on the result: decoding only exists so verbose
//! logs can show what a producer sent. Everything here works on borrowed
//! slices and never panics on malformed input.

use std::fmt;

use thiserror::Error;

const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Bundles nested deeper than this are rejected.
const MAX_BUNDLE_DEPTH: usize = 32;

/// Errors raised while decoding an OSC packet
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OscDecodeError {
    #[error("empty packet")]
    Empty,

    #[error("unexpected end of packet at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEnd { offset: usize, needed: usize },

    #[error("address pattern must start with '/' (got {0:?})")]
    InvalidAddress(String),

    #[error("string starting at offset {offset} is not NUL terminated")]
    UnterminatedString { offset: usize },

    #[error("string starting at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("type tag string must start with ',' (got {0:?})")]
    MissingTypeTagComma(String),

    #[error("unknown type tag '{0}'")]
    UnknownTypeTag(char),

    #[error("character argument {0:#x} is not a valid char")]
    InvalidChar(u32),

    #[error("unbalanced array brackets in type tags")]
    UnbalancedArray,

    #[error("negative size {0}")]
    NegativeSize(i32),

    #[error("bundle element of {size} bytes exceeds the {remaining} bytes left")]
    InvalidElementSize { size: usize, remaining: usize },

    #[error("bundles nested too deeply")]
    NestingTooDeep,
}

/// NTP-style time tag used by bundles and `t` arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscTimeTag {
    pub seconds: u32,
    pub fraction: u32,
}

impl OscTimeTag {
    /// The special "execute immediately" tag
    pub const IMMEDIATE: OscTimeTag = OscTimeTag {
        seconds: 0,
        fraction: 1,
    };

    pub fn is_immediate(&self) -> bool {
        *self == Self::IMMEDIATE
    }
}

impl fmt::Display for OscTimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_immediate() {
            write!(f, "immediate")
        } else {
            write!(f, "{}.{:08x}", self.seconds, self.fraction)
        }
    }
}

/// A single decoded argument
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    TimeTag(OscTimeTag),
    Symbol(String),
    Char(char),
    Color([u8; 4]),
    Midi([u8; 4]),
    True,
    False,
    Nil,
    Impulse,
    Array(Vec<OscArg>),
}

impl fmt::Display for OscArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArg::Int(v) => write!(f, "{v}"),
            OscArg::Float(v) => write!(f, "{v}"),
            OscArg::String(v) => write!(f, "{v:?}"),
            OscArg::Blob(v) => write!(f, "<blob {} bytes>", v.len()),
            OscArg::Long(v) => write!(f, "{v}"),
            OscArg::Double(v) => write!(f, "{v}"),
            OscArg::TimeTag(v) => write!(f, "{v}"),
            OscArg::Symbol(v) => write!(f, "'{v}"),
            OscArg::Char(v) => write!(f, "{v:?}"),
            OscArg::Color([r, g, b, a]) => write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}"),
            OscArg::Midi(bytes) => write!(f, "midi{bytes:02x?}"),
            OscArg::True => write!(f, "true"),
            OscArg::False => write!(f, "false"),
            OscArg::Nil => write!(f, "nil"),
            OscArg::Impulse => write!(f, "impulse"),
            OscArg::Array(items) => {
                write!(f, "[")?;
                write_joined(f, items, ", ")?;
                write!(f, "]")
            }
        }
    }
}

/// Address pattern plus arguments
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        if !self.args.is_empty() {
            write!(f, " ")?;
            write_joined(f, &self.args, ", ")?;
        }
        Ok(())
    }
}

/// Time-tagged group of packets
#[derive(Debug, Clone, PartialEq)]
pub struct OscBundle {
    pub time_tag: OscTimeTag,
    pub content: Vec<OscPacket>,
}

impl fmt::Display for OscBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#bundle@{} {{ ", self.time_tag)?;
        write_joined(f, &self.content, "; ")?;
        write!(f, " }}")
    }
}

/// A decoded OSC packet
#[derive(Debug, Clone, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl OscPacket {
    /// Number of messages carried, counting through nested bundles
    pub fn message_count(&self) -> usize {
        match self {
            OscPacket::Message(_) => 1,
            OscPacket::Bundle(bundle) => bundle.content.iter().map(Self::message_count).sum(),
        }
    }
}

impl fmt::Display for OscPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscPacket::Message(message) => fmt::Display::fmt(message, f),
            OscPacket::Bundle(bundle) => fmt::Display::fmt(bundle, f),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Decode one datagram as an OSC message or bundle
pub fn decode(data: &[u8]) -> Result<OscPacket, OscDecodeError> {
    if data.is_empty() {
        return Err(OscDecodeError::Empty);
    }
    decode_packet(data, 0)
}

fn decode_packet(data: &[u8], depth: usize) -> Result<OscPacket, OscDecodeError> {
    if data.starts_with(BUNDLE_TAG) {
        if depth >= MAX_BUNDLE_DEPTH {
            return Err(OscDecodeError::NestingTooDeep);
        }
        decode_bundle(data, depth).map(OscPacket::Bundle)
    } else {
        decode_message(data).map(OscPacket::Message)
    }
}

fn decode_message(data: &[u8]) -> Result<OscMessage, OscDecodeError> {
    let mut reader = Reader::new(data);

    let address = reader.read_string()?;
    if !address.starts_with('/') {
        return Err(OscDecodeError::InvalidAddress(address));
    }

    // Type tags are optional in OSC 1.0 when no arguments follow.
    if reader.is_empty() {
        return Ok(OscMessage {
            address,
            args: Vec::new(),
        });
    }

    let type_tags = reader.read_string()?;
    let Some(tags) = type_tags.strip_prefix(',') else {
        return Err(OscDecodeError::MissingTypeTagComma(type_tags.clone()));
    };
    let args = reader.read_arguments(tags)?;

    Ok(OscMessage { address, args })
}

fn decode_bundle(data: &[u8], depth: usize) -> Result<OscBundle, OscDecodeError> {
    let mut reader = Reader::new(data);
    reader.take(BUNDLE_TAG.len())?;
    let time_tag = reader.read_time_tag()?;

    let mut content = Vec::new();
    while !reader.is_empty() {
        let size = reader.read_size()?;
        let remaining = reader.remaining();
        if size > remaining {
            return Err(OscDecodeError::InvalidElementSize { size, remaining });
        }
        let element = reader.take(size)?;
        content.push(decode_packet(element, depth + 1)?);
    }

    Ok(OscBundle { time_tag, content })
}

/// Cursor over a packet; every read is bounds checked
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], OscDecodeError> {
        if len > self.remaining() {
            return Err(OscDecodeError::UnexpectedEnd {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], OscDecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32, OscDecodeError> {
        self.take_array().map(u32::from_be_bytes)
    }

    fn read_i32(&mut self) -> Result<i32, OscDecodeError> {
        self.take_array().map(i32::from_be_bytes)
    }

    fn read_size(&mut self) -> Result<usize, OscDecodeError> {
        let size = self.read_i32()?;
        usize::try_from(size).map_err(|_| OscDecodeError::NegativeSize(size))
    }

    fn read_time_tag(&mut self) -> Result<OscTimeTag, OscDecodeError> {
        Ok(OscTimeTag {
            seconds: self.read_u32()?,
            fraction: self.read_u32()?,
        })
    }

    /// Skip the zero padding that aligns every field to 4 bytes
    fn skip_padding(&mut self, len: usize) -> Result<(), OscDecodeError> {
        let padding = (4 - len % 4) % 4;
        self.take(padding).map(|_| ())
    }

    fn read_string(&mut self) -> Result<String, OscDecodeError> {
        let start = self.pos;
        let rest = &self.data[start..];
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(OscDecodeError::UnterminatedString { offset: start });
        };
        let text = std::str::from_utf8(&rest[..nul])
            .map_err(|_| OscDecodeError::InvalidUtf8 { offset: start })?
            .to_owned();
        self.take(nul + 1)?;
        self.skip_padding(nul + 1)?;
        Ok(text)
    }

    fn read_blob(&mut self) -> Result<Vec<u8>, OscDecodeError> {
        let size = self.read_size()?;
        let blob = self.take(size)?.to_vec();
        self.skip_padding(size)?;
        Ok(blob)
    }

    fn read_arguments(&mut self, tags: &str) -> Result<Vec<OscArg>, OscDecodeError> {
        let mut stack: Vec<Vec<OscArg>> = vec![Vec::new()];
        for tag in tags.chars() {
            match tag {
                '[' => stack.push(Vec::new()),
                ']' => {
                    if stack.len() < 2 {
                        return Err(OscDecodeError::UnbalancedArray);
                    }
                    let items = stack.pop().ok_or(OscDecodeError::UnbalancedArray)?;
                    stack
                        .last_mut()
                        .ok_or(OscDecodeError::UnbalancedArray)?
                        .push(OscArg::Array(items));
                }
                tag => {
                    let arg = self.read_argument(tag)?;
                    stack
                        .last_mut()
                        .ok_or(OscDecodeError::UnbalancedArray)?
                        .push(arg);
                }
            }
        }
        if stack.len() != 1 {
            return Err(OscDecodeError::UnbalancedArray);
        }
        stack.pop().ok_or(OscDecodeError::UnbalancedArray)
    }

    fn read_argument(&mut self, tag: char) -> Result<OscArg, OscDecodeError> {
        let arg = match tag {
            'i' => OscArg::Int(self.read_i32()?),
            'f' => OscArg::Float(self.take_array().map(f32::from_be_bytes)?),
            's' => OscArg::String(self.read_string()?),
            'S' => OscArg::Symbol(self.read_string()?),
            'b' => OscArg::Blob(self.read_blob()?),
            'h' => OscArg::Long(self.take_array().map(i64::from_be_bytes)?),
            'd' => OscArg::Double(self.take_array().map(f64::from_be_bytes)?),
            't' => OscArg::TimeTag(self.read_time_tag()?),
            'c' => {
                let code = self.read_u32()?;
                OscArg::Char(char::from_u32(code).ok_or(OscDecodeError::InvalidChar(code))?)
            }
            'r' => OscArg::Color(self.take_array()?),
            'm' => OscArg::Midi(self.take_array()?),
            'T' => OscArg::True,
            'F' => OscArg::False,
            'N' => OscArg::Nil,
            'I' => OscArg::Impulse,
            other => return Err(OscDecodeError::UnknownTypeTag(other)),
        };
        Ok(arg)
    }
}
