//! Constants and byte-level helpers for the RESP wire format.

use memchr::memchr;

use crate::error::ParseError;

/// CRLF line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Type markers
pub const SIMPLE_STRING: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';

/// Locate the first complete CRLF-terminated line in `buf`.
///
/// Returns the length of the line content (excluding the CRLF), or `None`
/// when no LF is in the readable window yet. The byte before the LF must be
/// a CR; a bare LF is a framing error.
#[inline]
pub fn find_line(buf: &[u8]) -> Result<Option<usize>, ParseError> {
	match memchr(b'\n', buf) {
		Some(lf) if lf == 0 || buf[lf - 1] != b'\r' => Err(ParseError::MissingCr),
		Some(lf) => Ok(Some(lf - 1)),
		None => Ok(None),
	}
}

/// Parse a signed decimal integer from a line.
///
/// Accumulates a non-positive magnitude and negates at the end, so that
/// `i64::MIN` is representable without overflow. Rejects empty input, a
/// lone or misplaced sign, any non-digit byte and values outside `i64`.
pub fn parse_decimal(line: &[u8]) -> Result<i64, ParseError> {
	let invalid = || ParseError::InvalidInteger(String::from_utf8_lossy(line).into_owned());

	let (negative, digits) = match line.split_first() {
		Some((b'-', rest)) => (true, rest),
		Some(_) => (false, line),
		None => return Err(invalid()),
	};
	if digits.is_empty() {
		return Err(invalid());
	}

	let mut magnitude: i64 = 0;
	for &byte in digits {
		if !byte.is_ascii_digit() {
			return Err(invalid());
		}
		magnitude = magnitude
			.checked_mul(10)
			.and_then(|m| m.checked_sub(i64::from(byte - b'0')))
			.ok_or_else(invalid)?;
	}

	if negative {
		Ok(magnitude)
	} else {
		magnitude.checked_neg().ok_or_else(invalid)
	}
}

/// Number of ASCII bytes needed to render `value` in decimal.
#[inline]
pub fn decimal_len(mut value: i64) -> usize {
	if value == i64::MIN {
		// Has no positive counterpart; renders as 19 digits plus the sign.
		return 20;
	}
	let mut len = if value < 0 {
		value = -value;
		2
	} else {
		1
	};
	while value >= 10 {
		value /= 10;
		len += 1;
	}
	len
}
