//! RESP message model: type tags, messages, and decoder tokens.

use bytes::Bytes;

use crate::utils;

/// Simple string replies common enough to keep as shared static instances.
const PREDEFINED_SIMPLE_STRINGS: &[&[u8]] = &[b"OK", b"QUEUED"];

/// Error replies common enough to keep as shared static instances.
const PREDEFINED_ERRORS: &[&[u8]] = &[b"ERR"];

/// The RESP type tag of a frame, mapped bit-exactly to its wire marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespKind {
    /// `+`
    SimpleString,
    /// `-`
    Error,
    /// `:`
    Integer,
    /// `$`
    BulkString,
    /// `*`
    Array,
}

impl RespKind {
    /// Resolve a wire marker byte to its kind.
    pub fn from_marker(marker: u8) -> Option<RespKind> {
        match marker {
            utils::SIMPLE_STRING => Some(RespKind::SimpleString),
            utils::ERROR => Some(RespKind::Error),
            utils::INTEGER => Some(RespKind::Integer),
            utils::BULK_STRING => Some(RespKind::BulkString),
            utils::ARRAY => Some(RespKind::Array),
            _ => None,
        }
    }

    /// The wire marker byte for this kind.
    pub fn marker(self) -> u8 {
        match self {
            RespKind::SimpleString => utils::SIMPLE_STRING,
            RespKind::Error => utils::ERROR,
            RespKind::Integer => utils::INTEGER,
            RespKind::BulkString => utils::BULK_STRING,
            RespKind::Array => utils::ARRAY,
        }
    }

    /// Whether the payload is CRLF-delimited rather than length-prefixed.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            RespKind::SimpleString | RespKind::Error | RespKind::Integer
        )
    }
}

/// A complete RESP message.
///
/// Bulk strings and arrays distinguish their null form from their empty
/// form: `None` is null on the wire (`$-1\r\n` / `*-1\r\n`), while `Some`
/// with no content is empty (`$0\r\n\r\n` / `*0\r\n`).
///
/// Bulk string payloads are [`Bytes`] slices that share the allocation of
/// the buffer they were decoded from; cloning retains, dropping releases.
/// Dropping an array drops each child exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespMessage {
    /// Simple string: `+OK\r\n`. Content carries no CR or LF.
    SimpleString(Bytes),

    /// Error: `-ERR message\r\n`. Content carries no CR or LF.
    Error(Bytes),

    /// Integer: `:1000\r\n`
    Integer(i64),

    /// Bulk string: `$6\r\nfoobar\r\n`, or `$-1\r\n` when `None`
    BulkString(Option<Bytes>),

    /// Array: `*2\r\n...`, or `*-1\r\n` when `None`
    Array(Option<Vec<RespMessage>>),
}

impl RespMessage {
    /// Create a simple string, reusing a predefined instance on exact match.
    pub fn simple_string(content: impl Into<Bytes>) -> Self {
        RespMessage::SimpleString(intern(PREDEFINED_SIMPLE_STRINGS, content.into()))
    }

    /// Create an error, reusing a predefined instance on exact match.
    pub fn error(content: impl Into<Bytes>) -> Self {
        RespMessage::Error(intern(PREDEFINED_ERRORS, content.into()))
    }

    /// Create an integer message.
    pub fn integer(value: i64) -> Self {
        RespMessage::Integer(value)
    }

    /// Create a bulk string holding `content`.
    pub fn bulk_string(content: impl Into<Bytes>) -> Self {
        RespMessage::BulkString(Some(content.into()))
    }

    /// The null bulk string, `$-1\r\n`.
    pub const fn null_bulk_string() -> Self {
        RespMessage::BulkString(None)
    }

    /// The empty bulk string, `$0\r\n\r\n`.
    pub const fn empty_bulk_string() -> Self {
        RespMessage::BulkString(Some(Bytes::new()))
    }

    /// Create an array owning `children`.
    pub fn array(children: Vec<RespMessage>) -> Self {
        RespMessage::Array(Some(children))
    }

    /// The null array, `*-1\r\n`.
    pub const fn null_array() -> Self {
        RespMessage::Array(None)
    }

    /// The empty array, `*0\r\n`.
    pub const fn empty_array() -> Self {
        RespMessage::Array(Some(Vec::new()))
    }

    /// The type tag of this message.
    pub fn kind(&self) -> RespKind {
        match self {
            RespMessage::SimpleString(_) => RespKind::SimpleString,
            RespMessage::Error(_) => RespKind::Error,
            RespMessage::Integer(_) => RespKind::Integer,
            RespMessage::BulkString(_) => RespKind::BulkString,
            RespMessage::Array(_) => RespKind::Array,
        }
    }

    /// True for the null bulk string and the null array.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            RespMessage::BulkString(None) | RespMessage::Array(None)
        )
    }

    /// True for error messages.
    pub fn is_error(&self) -> bool {
        matches!(self, RespMessage::Error(_))
    }

    /// Try to view the content as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// Try to view the content bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RespMessage::SimpleString(s) | RespMessage::Error(s) => Some(s),
            RespMessage::BulkString(Some(b)) => Some(b),
            _ => None,
        }
    }

    /// Try to read the integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespMessage::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to view the array children.
    pub fn as_array(&self) -> Option<&[RespMessage]> {
        match self {
            RespMessage::Array(Some(children)) => Some(children),
            _ => None,
        }
    }
}

fn intern(table: &[&'static [u8]], content: Bytes) -> Bytes {
    for &predefined in table {
        if content == predefined {
            return Bytes::from_static(predefined);
        }
    }
    content
}

impl From<i64> for RespMessage {
    fn from(value: i64) -> Self {
        RespMessage::Integer(value)
    }
}

impl From<Bytes> for RespMessage {
    fn from(content: Bytes) -> Self {
        RespMessage::BulkString(Some(content))
    }
}

impl From<Vec<u8>> for RespMessage {
    fn from(content: Vec<u8>) -> Self {
        RespMessage::BulkString(Some(Bytes::from(content)))
    }
}

impl From<&'static str> for RespMessage {
    fn from(content: &'static str) -> Self {
        RespMessage::BulkString(Some(Bytes::from_static(content.as_bytes())))
    }
}

impl From<Vec<RespMessage>> for RespMessage {
    fn from(children: Vec<RespMessage>) -> Self {
        RespMessage::Array(Some(children))
    }
}

/// The `*<count>\r\n` prelude that opens an array, delivered as its own
/// token so that consumers can stream children without buffering them.
///
/// A negative declared length encodes the null array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayHeader {
    length: i64,
}

impl ArrayHeader {
    /// Create a header with the given declared child count.
    pub fn new(length: i64) -> Self {
        ArrayHeader { length }
    }

    /// The declared child count.
    pub fn length(self) -> i64 {
        self.length
    }

    /// True when the header encodes the null array.
    pub fn is_null(self) -> bool {
        self.length < 0
    }
}

/// A unit of decoder output: a finished leaf message, or the header that
/// opens an array.
///
/// A header is not a valid terminal message; it must be consumed by the
/// aggregator or honored by a streaming consumer before the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A fully decoded leaf message
    Message(RespMessage),
    /// An array opening, carrying the declared child count
    ArrayHeader(ArrayHeader),
}

impl From<RespMessage> for Token {
    fn from(message: RespMessage) -> Self {
        Token::Message(message)
    }
}

impl From<ArrayHeader> for Token {
    fn from(header: ArrayHeader) -> Self {
        Token::ArrayHeader(header)
    }
}
