//! Error types for RESP decoding.

use thiserror::Error;

/// Errors that can occur while decoding a RESP frame.
///
/// "Not enough bytes" is deliberately absent: the decoder signals it by
/// returning `Ok(None)` and expects to be re-entered once more data has
/// arrived. Every variant here is fatal for the connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	/// First byte of a frame is not a RESP type marker
	#[error("unknown type marker: {0:#04x}")]
	UnknownType(u8),

	/// Non-numeric bytes where a decimal integer was expected
	#[error("invalid integer: {0:?}")]
	InvalidInteger(String),

	/// Negative bulk string length other than -1
	#[error("invalid bulk string length: {0}")]
	InvalidBulkStringLength(i64),

	/// Negative array length other than -1
	#[error("invalid array length: {0}")]
	InvalidArrayLength(i64),

	/// Declared length does not fit a native signed 32-bit index
	#[error("declared length out of supported range: {0}")]
	LengthOutOfRange(i64),

	/// Line feed without a preceding carriage return
	#[error("line feed without preceding carriage return")]
	MissingCr,

	/// CR inside simple string or error content
	#[error("line break inside inline content")]
	EmbeddedLineBreak,

	/// Bulk string payload not followed by CRLF
	#[error("missing CRLF after bulk string payload")]
	MissingCrlf,
}
