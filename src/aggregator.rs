//! Aggregation of the flat token stream into fully-formed messages.

use bytes::BytesMut;
use tracing::trace;

use crate::decoder::MAX_DECLARED_LENGTH;
use crate::decoder::RespDecoder;
use crate::error::ParseError;
use crate::message::ArrayHeader;
use crate::message::RespMessage;
use crate::message::Token;

/// An array whose children are still arriving.
#[derive(Debug)]
struct OpenArray {
	length: usize,
	children: Vec<RespMessage>,
}

/// Composes the decoder's flat token stream back into nested messages.
///
/// Children handed in already own their payload; wrapping them in an array
/// transfers that ownership, so dropping the finished array releases every
/// payload exactly once.
#[derive(Debug, Default)]
pub struct RespAggregator {
	stack: Vec<OpenArray>,
}

impl RespAggregator {
	pub fn new() -> Self {
		RespAggregator { stack: Vec::new() }
	}

	/// True when no array is mid-aggregation.
	pub fn is_idle(&self) -> bool {
		self.stack.is_empty()
	}

	/// Drop every partially aggregated array and its accumulated children.
	pub fn reset(&mut self) {
		self.stack.clear();
	}

	/// Feed one token downstream.
	///
	/// Returns a message exactly when the token completes a top-level frame:
	/// a leaf outside any array, or the last missing descendant of the
	/// outermost open array.
	pub fn push(&mut self, token: Token) -> Result<Option<RespMessage>, ParseError> {
		let mut message = match token {
			Token::Message(message) => message,
			Token::ArrayHeader(header) => match self.open_array(header)? {
				Some(message) => message,
				// A frame was pushed; nothing to emit yet.
				None => return Ok(None),
			},
		};

		// A finished value closes every enclosing array it completes, so a
		// single leaf can roll up arbitrarily deep nesting in one step.
		while let Some(mut current) = self.stack.pop() {
			current.children.push(message);
			if current.children.len() < current.length {
				self.stack.push(current);
				return Ok(None);
			}
			message = RespMessage::Array(Some(current.children));
		}
		Ok(Some(message))
	}

	fn open_array(&mut self, header: ArrayHeader) -> Result<Option<RespMessage>, ParseError> {
		let length = header.length();
		if header.is_null() {
			if length != -1 {
				return Err(ParseError::InvalidArrayLength(length));
			}
			return Ok(Some(RespMessage::null_array()));
		}
		if length == 0 {
			return Ok(Some(RespMessage::empty_array()));
		}
		if length > MAX_DECLARED_LENGTH {
			return Err(ParseError::LengthOutOfRange(length));
		}
		self.stack.push(OpenArray {
			length: length as usize,
			// Cap the preallocation; a declared count is attacker input.
			children: Vec::with_capacity(length.min(1024) as usize),
		});
		Ok(None)
	}
}

/// Byte decoder and aggregator composed behind a tree-delivery surface.
///
/// One instance holds the entire per-connection transient state. Consumers
/// that want the flat token stream instead use [`RespDecoder`] directly and
/// honor [`ArrayHeader`] child counts themselves.
#[derive(Debug, Default)]
pub struct RespCodec {
	decoder: RespDecoder,
	aggregator: RespAggregator,
}

impl RespCodec {
	pub fn new() -> Self {
		RespCodec {
			decoder: RespDecoder::new(),
			aggregator: RespAggregator::new(),
		}
	}

	/// Decode at most one complete message from `src`.
	///
	/// Returns `Ok(None)` when the buffer holds no complete frame yet; call
	/// again after appending more bytes. Call in a loop to drain a buffer
	/// holding several frames.
	pub fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RespMessage>, ParseError> {
		while let Some(token) = self.decoder.decode(src)? {
			if let Some(message) = self.aggregator.push(token)? {
				return Ok(Some(message));
			}
		}
		Ok(None)
	}

	/// True when no frame is partially decoded or aggregated.
	pub fn is_idle(&self) -> bool {
		self.decoder.is_idle() && self.aggregator.is_idle()
	}

	/// Discard any partially decoded frame and every child accumulated for
	/// unfinished arrays.
	pub fn reset(&mut self) {
		trace!("codec reset, dropping partial frame state");
		self.decoder.reset();
		self.aggregator.reset();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_leaf_passes_straight_through() {
		let mut aggregator = RespAggregator::new();
		let emitted = aggregator
			.push(Token::Message(RespMessage::integer(7)))
			.unwrap();
		assert_eq!(emitted, Some(RespMessage::integer(7)));
		assert!(aggregator.is_idle());
	}

	#[test]
	fn test_array_emitted_exactly_on_last_child() {
		let mut aggregator = RespAggregator::new();
		assert_eq!(
			aggregator.push(Token::ArrayHeader(ArrayHeader::new(3))).unwrap(),
			None
		);
		assert_eq!(
			aggregator.push(Token::Message(RespMessage::integer(1))).unwrap(),
			None
		);
		assert_eq!(
			aggregator.push(Token::Message(RespMessage::integer(2))).unwrap(),
			None
		);

		let emitted = aggregator
			.push(Token::Message(RespMessage::integer(3)))
			.unwrap();
		assert_eq!(
			emitted,
			Some(RespMessage::array(vec![
				RespMessage::integer(1),
				RespMessage::integer(2),
				RespMessage::integer(3),
			]))
		);
		assert!(aggregator.is_idle());
	}

	#[test]
	fn test_one_leaf_closes_nested_arrays() {
		let mut aggregator = RespAggregator::new();
		aggregator.push(Token::ArrayHeader(ArrayHeader::new(2))).unwrap();
		aggregator.push(Token::ArrayHeader(ArrayHeader::new(1))).unwrap();

		// Closes the inner array but only half-fills the outer one.
		assert_eq!(
			aggregator.push(Token::Message(RespMessage::integer(1))).unwrap(),
			None
		);

		let emitted = aggregator
			.push(Token::Message(RespMessage::integer(2)))
			.unwrap();
		assert_eq!(
			emitted,
			Some(RespMessage::array(vec![
				RespMessage::array(vec![RespMessage::integer(1)]),
				RespMessage::integer(2),
			]))
		);
	}

	#[test]
	fn test_null_and_empty_headers_are_leaves() {
		let mut aggregator = RespAggregator::new();
		assert_eq!(
			aggregator.push(Token::ArrayHeader(ArrayHeader::new(-1))).unwrap(),
			Some(RespMessage::null_array())
		);
		assert_eq!(
			aggregator.push(Token::ArrayHeader(ArrayHeader::new(0))).unwrap(),
			Some(RespMessage::empty_array())
		);

		aggregator.push(Token::ArrayHeader(ArrayHeader::new(2))).unwrap();
		aggregator.push(Token::ArrayHeader(ArrayHeader::new(-1))).unwrap();
		let emitted = aggregator
			.push(Token::ArrayHeader(ArrayHeader::new(0)))
			.unwrap();
		assert_eq!(
			emitted,
			Some(RespMessage::array(vec![
				RespMessage::null_array(),
				RespMessage::empty_array(),
			]))
		);
	}

	#[test]
	fn test_header_length_out_of_range() {
		let mut aggregator = RespAggregator::new();
		let length = i64::from(i32::MAX) + 1;
		assert_eq!(
			aggregator.push(Token::ArrayHeader(ArrayHeader::new(length))),
			Err(ParseError::LengthOutOfRange(length))
		);
	}

	#[test]
	fn test_header_bad_negative_length() {
		let mut aggregator = RespAggregator::new();
		assert_eq!(
			aggregator.push(Token::ArrayHeader(ArrayHeader::new(-7))),
			Err(ParseError::InvalidArrayLength(-7))
		);
	}

	#[test]
	fn test_reset_drops_accumulated_children() {
		let mut aggregator = RespAggregator::new();
		aggregator.push(Token::ArrayHeader(ArrayHeader::new(3))).unwrap();
		aggregator.push(Token::Message(RespMessage::bulk_string("x"))).unwrap();
		assert!(!aggregator.is_idle());

		aggregator.reset();
		assert!(aggregator.is_idle());
	}
}
