//!
//! Memo codec: two 16-byte identifiers packed into one 32-byte ledger memo.
//!
//! Identifiers travel as the usual 36-character hyphenated hex form
//! (8-4-4-4-12). The bytes are treated as opaque; no UUID version or variant
//! bits are checked.
//!

use crate::wire::{DecodingError, Descriptor, EncodingError, FromValue, ToValue, Typed, Value};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

pub const MEMO_LEN: usize = 32;
pub const IDENTIFIER_LEN: usize = 16;

const HYPHEN_POSITIONS: [usize; 4] = [8, 12, 16, 20];

///
/// FormatError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum FormatError {
    #[error("identifier '{input}' has {len} hex digits without hyphens, expected 32")]
    IdentifierLength { input: String, len: usize },

    #[error("identifier '{input}' is not hexadecimal")]
    NotHex { input: String },

    #[error("memo is {0} bytes, expected exactly 32")]
    MemoLength(usize),
}

///
/// Memo
/// Fixed 32-byte memo carrying two identifiers.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Memo([u8; MEMO_LEN]);

impl Memo {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; MEMO_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; MEMO_LEN] {
        &self.0
    }

    /// The two identifiers in hyphenated lowercase form.
    #[must_use]
    pub fn identifiers(&self) -> [String; 2] {
        let (first, second) = self.0.split_at(IDENTIFIER_LEN);

        [hyphenate(first), hyphenate(second)]
    }
}

impl TryFrom<&[u8]> for Memo {
    type Error = FormatError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; MEMO_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| FormatError::MemoLength(bytes.len()))
    }
}

/// Packs two hyphenated identifiers into a memo, first at offset 0, second at 16.
pub fn encode_uuids(first: &str, second: &str) -> Result<Memo, FormatError> {
    let mut memo = [0u8; MEMO_LEN];
    let (head, tail) = memo.split_at_mut(IDENTIFIER_LEN);
    parse_identifier(first, head)?;
    parse_identifier(second, tail)?;

    Ok(Memo(memo))
}

/// Splits a 32-byte memo back into its two identifiers.
pub fn decode_uuids(bytes: &[u8]) -> Result<[String; 2], FormatError> {
    Memo::try_from(bytes).map(|memo| memo.identifiers())
}

fn parse_identifier(input: &str, out: &mut [u8]) -> Result<(), FormatError> {
    let digits: String = input.chars().filter(|c| *c != '-').collect();
    let len = digits.chars().count();
    if len != IDENTIFIER_LEN * 2 {
        return Err(FormatError::IdentifierLength {
            input: input.to_string(),
            len,
        });
    }

    hex::decode_to_slice(&digits, out).map_err(|_| FormatError::NotHex {
        input: input.to_string(),
    })
}

fn hyphenate(bytes: &[u8]) -> String {
    let digits = hex::encode(bytes);
    let mut out = String::with_capacity(36);
    for (i, c) in digits.chars().enumerate() {
        if HYPHEN_POSITIONS.contains(&i) {
            out.push('-');
        }
        out.push(c);
    }

    out
}

///
/// MemoBytes
/// Free-form memo field value, at most 32 bytes.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct MemoBytes(Vec<u8>);

impl MemoBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, EncodingError> {
        let bytes = bytes.into();
        if bytes.len() > MEMO_LEN {
            return Err(EncodingError::InvalidLength {
                field: "memo",
                len: bytes.len(),
                expected: "at most 32",
            });
        }

        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Memo> for MemoBytes {
    fn from(memo: Memo) -> Self {
        Self(memo.0.to_vec())
    }
}

impl Display for MemoBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl Typed for MemoBytes {
    fn descriptor() -> Descriptor {
        Descriptor::Blob
    }
}

impl ToValue for MemoBytes {
    fn to_value(&self) -> Value {
        Value::Blob(self.0.clone())
    }
}

impl FromValue for MemoBytes {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let bytes = value.into_blob()?;

        Self::new(bytes).map_err(|e| DecodingError::InvalidResponse(e.to_string()))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE: &str = "123e4567-e89b-12d3-a456-426614174000";
    const DESTINATION: &str = "00000000-0000-0000-0000-000000000001";

    #[test]
    fn packs_identifiers_at_fixed_offsets() {
        let memo = encode_uuids(QUOTE, DESTINATION).unwrap();
        let bytes = memo.as_bytes();

        assert_eq!(
            bytes[..16],
            [
                0x12, 0x3e, 0x45, 0x67, 0xe8, 0x9b, 0x12, 0xd3, 0xa4, 0x56, 0x42, 0x66, 0x14, 0x17,
                0x40, 0x00
            ]
        );
        assert!(bytes[16..31].iter().all(|b| *b == 0));
        assert_eq!(bytes[31], 0x01);
        assert_eq!(decode_uuids(bytes).unwrap(), [QUOTE, DESTINATION]);
    }

    #[test]
    fn uppercase_input_decodes_lowercase() {
        let memo = encode_uuids(&QUOTE.to_uppercase(), DESTINATION).unwrap();
        assert_eq!(memo.identifiers()[0], QUOTE);
    }

    #[test]
    fn malformed_identifiers_fail() {
        assert!(matches!(
            encode_uuids("123e4567", DESTINATION),
            Err(FormatError::IdentifierLength { len: 8, .. })
        ));
        assert!(matches!(
            encode_uuids(QUOTE, "zzzzzzzz-0000-0000-0000-000000000001"),
            Err(FormatError::NotHex { .. })
        ));
        assert!(matches!(
            encode_uuids("123e4567-e89b-12d3-a456-4266141740000", DESTINATION),
            Err(FormatError::IdentifierLength { len: 33, .. })
        ));
    }

    #[test]
    fn non_ascii_input_is_measured_in_characters() {
        // 16 characters, 32 bytes
        let short = "é".repeat(16);
        assert!(matches!(
            encode_uuids(&short, DESTINATION),
            Err(FormatError::IdentifierLength { len: 16, .. })
        ));

        let right_length = "é".repeat(32);
        assert!(matches!(
            encode_uuids(&right_length, DESTINATION),
            Err(FormatError::NotHex { .. })
        ));
    }

    #[test]
    fn decode_requires_exactly_32_bytes() {
        assert_eq!(decode_uuids(&[0u8; 31]), Err(FormatError::MemoLength(31)));
        assert_eq!(decode_uuids(&[0u8; 33]), Err(FormatError::MemoLength(33)));
    }

    #[test]
    fn memo_bytes_are_bounded() {
        assert!(MemoBytes::new(vec![7u8; 32]).is_ok());
        assert_eq!(
            MemoBytes::new(vec![7u8; 33]),
            Err(EncodingError::InvalidLength {
                field: "memo",
                len: 33,
                expected: "at most 32",
            })
        );

        let memo = encode_uuids(QUOTE, DESTINATION).unwrap();
        assert_eq!(MemoBytes::from(memo).as_slice(), memo.as_bytes());
    }
}
