//! # resp-codec
//!
//! A streaming codec for the REdis Serialization Protocol (RESP v2): a
//! bidirectional translator between a byte stream and a typed tree of
//! protocol messages.
//!
//! ## Features
//!
//! - **Resumable decoding**: the byte decoder suspends on short input and
//!   resumes where it left off, making progress on every fragment without
//!   assuming framing alignment
//! - **Zero-copy payloads**: bulk string contents are [`bytes::Bytes`]
//!   slices sharing the input buffer's allocation
//! - **Two-stage pipeline**: a byte-to-token decoder and a stack-based
//!   aggregator, so large arrays stream through without unbounded buffering
//!   and consumers may process raw tokens directly
//! - **Exact-size encoding**: the encoder pre-computes the output length in
//!   one pass and emits into a single right-sized buffer
//!
//! ## Example
//!
//! ```rust
//! use bytes::BytesMut;
//! use resp_codec::{RespCodec, RespMessage};
//!
//! let mut codec = RespCodec::new();
//! let mut buf = BytesMut::from(&b"*2\r\n$3\r\nfoo\r\n:42\r\n"[..]);
//!
//! let message = codec.decode(&mut buf).unwrap().unwrap();
//! assert_eq!(
//!     message,
//!     RespMessage::array(vec![
//!         RespMessage::bulk_string("foo"),
//!         RespMessage::integer(42),
//!     ])
//! );
//! ```
//!
//! Streaming consumers use [`RespDecoder`] alone and receive
//! [`Token::ArrayHeader`] tokens instead of materialized arrays.

mod aggregator;
mod decoder;
mod encode;
mod error;
mod message;
mod utils;

pub use aggregator::RespAggregator;
pub use aggregator::RespCodec;
pub use decoder::MAX_DECLARED_LENGTH;
pub use decoder::RespDecoder;
pub use encode::RespEncode;
pub use error::ParseError;
pub use message::ArrayHeader;
pub use message::RespKind;
pub use message::RespMessage;
pub use message::Token;
