//! Resumable byte-to-token RESP decoder.

use bytes::Buf;
use bytes::BytesMut;
use memchr::memchr;
use tracing::trace;

use crate::error::ParseError;
use crate::message::ArrayHeader;
use crate::message::RespKind;
use crate::message::RespMessage;
use crate::message::Token;
use crate::utils;

/// Largest declared length accepted for length-prefixed frames.
///
/// Child counts and payload lengths are used as native indexes, so they
/// must fit a signed 32-bit value.
pub const MAX_DECLARED_LENGTH: i64 = i32::MAX as i64;

/// Declared length encoding the null bulk string or null array.
const NULL_LENGTH: i64 = -1;

/// Decoding state, together with the scalars each state remembers across
/// suspensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	DecodeType,
	DecodeInline(RespKind),
	DecodeLength(RespKind),
	DecodeBulkString(i64),
}

/// A resumable RESP byte decoder.
///
/// [`decode`](RespDecoder::decode) produces at most one [`Token`] per call
/// and returns `Ok(None)` when the buffer does not yet hold enough bytes.
/// Bytes consumed by completed states stay consumed across suspensions;
/// decoding resumes exactly where it left off once more data has been
/// appended to the same buffer. The whole decoder memory between calls is
/// the current state and the scalars it remembers.
///
/// On a protocol error the state machine resets to its initial state and
/// the error propagates; no resynchronization is attempted. The host is
/// expected to close the connection.
#[derive(Debug)]
pub struct RespDecoder {
	state: State,
}

impl Default for RespDecoder {
	fn default() -> Self {
		Self::new()
	}
}

impl RespDecoder {
	pub fn new() -> Self {
		RespDecoder {
			state: State::DecodeType,
		}
	}

	/// True when no frame is partially decoded.
	pub fn is_idle(&self) -> bool {
		self.state == State::DecodeType
	}

	/// Forget any partially decoded frame.
	pub fn reset(&mut self) {
		self.state = State::DecodeType;
	}

	/// Decode at most one token from `src`.
	///
	/// Call in a loop to drain a buffer holding several frames.
	pub fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Token>, ParseError> {
		match self.try_decode(src) {
			Err(e) => {
				trace!(error = %e, "protocol error, resetting decoder");
				self.state = State::DecodeType;
				Err(e)
			}
			ok => ok,
		}
	}

	fn try_decode(&mut self, src: &mut BytesMut) -> Result<Option<Token>, ParseError> {
		loop {
			let token = match self.state {
				State::DecodeType => {
					if src.is_empty() {
						return Ok(None);
					}
					let marker = src[0];
					let kind = RespKind::from_marker(marker)
						.ok_or(ParseError::UnknownType(marker))?;
					src.advance(1);
					self.state = if kind.is_inline() {
						State::DecodeInline(kind)
					} else {
						State::DecodeLength(kind)
					};
					continue;
				}
				State::DecodeInline(kind) => match decode_inline(kind, src)? {
					Some(message) => Token::Message(message),
					None => return Ok(None),
				},
				State::DecodeLength(kind) => {
					let Some(line) = read_line(src)? else {
						return Ok(None);
					};
					let length = utils::parse_decimal(&line)?;
					// Only `*` and `$` are length-prefixed.
					if kind == RespKind::Array {
						Token::ArrayHeader(ArrayHeader::new(length))
					} else {
						self.state = State::DecodeBulkString(length);
						continue;
					}
				}
				State::DecodeBulkString(length) => match decode_bulk_string(length, src)? {
					Some(message) => Token::Message(message),
					None => return Ok(None),
				},
			};
			self.state = State::DecodeType;
			return Ok(Some(token));
		}
	}
}

/// Split one CRLF-terminated line off the front of `src`.
///
/// The returned bytes exclude the CRLF, which is consumed. Returns `None`
/// while the terminator has not arrived, leaving `src` untouched.
fn read_line(src: &mut BytesMut) -> Result<Option<BytesMut>, ParseError> {
	match utils::find_line(src)? {
		Some(len) => {
			let line = src.split_to(len);
			src.advance(utils::CRLF.len());
			Ok(Some(line))
		}
		None => Ok(None),
	}
}

fn decode_inline(kind: RespKind, src: &mut BytesMut) -> Result<Option<RespMessage>, ParseError> {
	let Some(line) = read_line(src)? else {
		return Ok(None);
	};
	let message = if kind == RespKind::Integer {
		RespMessage::integer(utils::parse_decimal(&line)?)
	} else {
		if memchr(b'\r', &line).is_some() {
			return Err(ParseError::EmbeddedLineBreak);
		}
		let content = line.freeze();
		if kind == RespKind::Error {
			RespMessage::error(content)
		} else {
			RespMessage::simple_string(content)
		}
	};
	Ok(Some(message))
}

fn decode_bulk_string(length: i64, src: &mut BytesMut) -> Result<Option<RespMessage>, ParseError> {
	match length {
		NULL_LENGTH => Ok(Some(RespMessage::null_bulk_string())),
		0 => {
			if src.len() < utils::CRLF.len() {
				return Ok(None);
			}
			consume_crlf(src)?;
			Ok(Some(RespMessage::empty_bulk_string()))
		}
		length if length > MAX_DECLARED_LENGTH => Err(ParseError::LengthOutOfRange(length)),
		length if length > 0 => {
			let length = length as usize;
			if src.len() < length + utils::CRLF.len() {
				return Ok(None);
			}
			// Zero-copy: the payload shares the input buffer's allocation.
			let content = src.split_to(length).freeze();
			consume_crlf(src)?;
			Ok(Some(RespMessage::bulk_string(content)))
		}
		length => Err(ParseError::InvalidBulkStringLength(length)),
	}
}

fn consume_crlf(src: &mut BytesMut) -> Result<(), ParseError> {
	if &src[..utils::CRLF.len()] != utils::CRLF {
		return Err(ParseError::MissingCrlf);
	}
	src.advance(utils::CRLF.len());
	Ok(())
}
