//! Two-phase RESP serialization.

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::message::ArrayHeader;
use crate::message::RespMessage;
use crate::message::Token;
use crate::utils;
use crate::utils::CRLF;

/// Wire rendering of the null marker for bulk strings and arrays.
const NULL_LENGTH: &[u8] = b"-1";

const TYPE_LENGTH: usize = 1;
const CRLF_LENGTH: usize = 2;

/// Serialization of a message tree into RESP wire bytes.
///
/// [`encoded_len`](RespEncode::encoded_len) walks the value once to compute
/// the exact output size; [`encode`](RespEncode::encode) allocates that many
/// bytes up front and walks again to emit them. Predefined simple strings
/// and errors serialize as ordinary string messages; interning has no wire
/// effect.
pub trait RespEncode {
	/// Exact number of bytes [`encode_to`](RespEncode::encode_to) appends.
	fn encoded_len(&self) -> usize;

	/// Append the wire rendering to `buf`.
	fn encode_to(&self, buf: &mut BytesMut);

	/// Serialize into a freshly allocated buffer of exactly the right size.
	fn encode(&self) -> Bytes {
		let mut buf = BytesMut::with_capacity(self.encoded_len());
		self.encode_to(&mut buf);
		buf.freeze()
	}
}

impl RespEncode for RespMessage {
	fn encoded_len(&self) -> usize {
		match self {
			RespMessage::SimpleString(s) | RespMessage::Error(s) => {
				TYPE_LENGTH + s.len() + CRLF_LENGTH
			}
			RespMessage::Integer(i) => TYPE_LENGTH + utils::decimal_len(*i) + CRLF_LENGTH,
			RespMessage::BulkString(None) | RespMessage::Array(None) => {
				TYPE_LENGTH + NULL_LENGTH.len() + CRLF_LENGTH
			}
			RespMessage::BulkString(Some(content)) => {
				TYPE_LENGTH
					+ utils::decimal_len(content.len() as i64)
					+ CRLF_LENGTH + content.len()
					+ CRLF_LENGTH
			}
			RespMessage::Array(Some(children)) => {
				let header = TYPE_LENGTH + utils::decimal_len(children.len() as i64) + CRLF_LENGTH;
				header + children.iter().map(RespEncode::encoded_len).sum::<usize>()
			}
		}
	}

	fn encode_to(&self, buf: &mut BytesMut) {
		match self {
			RespMessage::SimpleString(s) => write_line(buf, utils::SIMPLE_STRING, s),
			RespMessage::Error(e) => write_line(buf, utils::ERROR, e),
			RespMessage::Integer(i) => write_line(buf, utils::INTEGER, i.to_string().as_bytes()),
			RespMessage::BulkString(None) => write_null(buf, utils::BULK_STRING),
			RespMessage::BulkString(Some(content)) => {
				write_length(buf, utils::BULK_STRING, content.len() as i64);
				buf.put_slice(content);
				buf.put_slice(CRLF);
			}
			RespMessage::Array(None) => write_null(buf, utils::ARRAY),
			RespMessage::Array(Some(children)) => {
				write_length(buf, utils::ARRAY, children.len() as i64);
				for child in children {
					child.encode_to(buf);
				}
			}
		}
	}
}

impl RespEncode for ArrayHeader {
	fn encoded_len(&self) -> usize {
		let digits = if self.is_null() {
			NULL_LENGTH.len()
		} else {
			utils::decimal_len(self.length())
		};
		TYPE_LENGTH + digits + CRLF_LENGTH
	}

	/// Write the array prelude only, without children. This is the outbound
	/// half of streaming mode: emit a header, then each child in order.
	fn encode_to(&self, buf: &mut BytesMut) {
		if self.is_null() {
			write_null(buf, utils::ARRAY);
		} else {
			write_length(buf, utils::ARRAY, self.length());
		}
	}
}

impl RespEncode for Token {
	fn encoded_len(&self) -> usize {
		match self {
			Token::Message(message) => message.encoded_len(),
			Token::ArrayHeader(header) => header.encoded_len(),
		}
	}

	fn encode_to(&self, buf: &mut BytesMut) {
		match self {
			Token::Message(message) => message.encode_to(buf),
			Token::ArrayHeader(header) => header.encode_to(buf),
		}
	}
}

#[inline]
fn write_line(buf: &mut BytesMut, marker: u8, content: &[u8]) {
	buf.put_u8(marker);
	buf.put_slice(content);
	buf.put_slice(CRLF);
}

#[inline]
fn write_length(buf: &mut BytesMut, marker: u8, length: i64) {
	write_line(buf, marker, length.to_string().as_bytes());
}

#[inline]
fn write_null(buf: &mut BytesMut, marker: u8) {
	write_line(buf, marker, NULL_LENGTH);
}
