//! Self-describing binary argument format (Candid binary encoding).
//!
//! A message is `DIDL`, a type table, the list of argument types, and the
//! argument values. Values are encoded against a [`Descriptor`]; decoding
//! walks the *wire* type table and coerces each value onto the expected
//! descriptor, so a reply from a newer interface (extra record fields,
//! missing optional fields) still decodes.

mod decode;
mod descriptor;
mod encode;
mod leb128;
mod typed;
mod value;

pub use decode::{decode, decode_args};
pub use descriptor::{Descriptor, Field, Label};
pub use encode::{EncodedArgument, encode, encode_args};
pub use typed::{FromValue, ToValue, Typed};
pub use value::{Fields, Value};

use thiserror::Error as ThisError;

pub const MAGIC: &[u8; 4] = b"DIDL";

///
/// Type opcodes
/// Negative SLEB128 values used in the type table and argument list.
///

pub(crate) mod opcode {
    pub const NULL: i64 = -1;
    pub const BOOL: i64 = -2;
    pub const NAT: i64 = -3;
    pub const INT: i64 = -4;
    pub const NAT8: i64 = -5;
    pub const NAT16: i64 = -6;
    pub const NAT32: i64 = -7;
    pub const NAT64: i64 = -8;
    pub const INT8: i64 = -9;
    pub const INT16: i64 = -10;
    pub const INT32: i64 = -11;
    pub const INT64: i64 = -12;
    pub const FLOAT32: i64 = -13;
    pub const FLOAT64: i64 = -14;
    pub const TEXT: i64 = -15;
    pub const RESERVED: i64 = -16;
    pub const EMPTY: i64 = -17;
    pub const OPT: i64 = -18;
    pub const VEC: i64 = -19;
    pub const RECORD: i64 = -20;
    pub const VARIANT: i64 = -21;
    pub const FUNC: i64 = -22;
    pub const SERVICE: i64 = -23;
    pub const PRINCIPAL: i64 = -24;
}

///
/// EncodingError
/// A value does not fit the descriptor it is encoded against. Always raised
/// before anything reaches the network.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum EncodingError {
    #[error("expected a value of type {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("record field '{0}' is missing")]
    MissingField(String),

    #[error("record field '{0}' is not part of the descriptor")]
    ExtraField(String),

    #[error("label '{0}' appears more than once")]
    DuplicateField(String),

    #[error("variant tag '{0}' is not part of the descriptor")]
    UnknownVariant(String),

    #[error("{value} is out of range for {ty}")]
    OutOfRange { ty: &'static str, value: String },

    #[error("negative value {value} for unsigned type {ty}")]
    Negative { ty: &'static str, value: String },

    #[error("'{0}' is not an integer")]
    NonIntegral(String),

    #[error("{field} is {len} bytes, expected {expected}")]
    InvalidLength {
        field: &'static str,
        len: usize,
        expected: &'static str,
    },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("write failed: {0}")]
    Write(String),
}

///
/// DecodingError
/// Bytes that are truncated, malformed, or incompatible with the expected
/// descriptor. Decoding never returns partial data.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum DecodingError {
    #[error("unexpected end of input")]
    Truncated,

    #[error("missing DIDL magic header")]
    BadMagic,

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("wire type {found} does not match expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("required record field '{0}' is absent")]
    MissingField(String),

    #[error("variant tag {0} is not part of the expected descriptor")]
    UnknownVariant(String),

    #[error("argument {0} is absent and not optional")]
    MissingArgument(usize),

    #[error("{0} trailing bytes after the last argument")]
    TrailingBytes(usize),

    #[error("values of type {0} are not supported")]
    Unsupported(&'static str),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
