//! Fixed-width (u64 / i64) LEB128 helpers for lengths, counts and type refs.
//! Arbitrary-precision `nat` / `int` values go through `candid::Nat` / `Int`.

use super::DecodingError;

pub fn write_unsigned(out: &mut Vec<u8>, mut value: u64) {
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);

        if value == 0 {
            break;
        }
    }
}

pub fn write_signed(out: &mut Vec<u8>, mut value: i64) {
    loop {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = (value & 0x7f) as u8;
        value >>= 7;

        let sign_clear = byte & 0x40 == 0;
        if (value == 0 && sign_clear) || (value == -1 && !sign_clear) {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

pub fn read_byte(input: &mut &[u8]) -> Result<u8, DecodingError> {
    let (&byte, rest) = input.split_first().ok_or(DecodingError::Truncated)?;
    *input = rest;

    Ok(byte)
}

pub fn read_unsigned(input: &mut &[u8]) -> Result<u64, DecodingError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = read_byte(input)?;
        let low = u64::from(byte & 0x7f);

        if shift > 63 || (shift == 63 && low > 1) {
            return Err(DecodingError::Malformed("leb128 overflows u64".to_string()));
        }
        result |= low << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

pub fn read_signed(input: &mut &[u8]) -> Result<i64, DecodingError> {
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = read_byte(input)?;
        if shift > 63 {
            return Err(DecodingError::Malformed("sleb128 overflows i64".to_string()));
        }
        result |= i64::from(byte & 0x7f) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            if shift < 64 && byte & 0x40 != 0 {
                result |= -1i64 << shift;
            }
            return Ok(result);
        }
    }
}

/// Reads a length prefix and checks it against the bytes still available.
pub fn read_len(input: &mut &[u8]) -> Result<usize, DecodingError> {
    let len = read_unsigned(input)?;
    let len = usize::try_from(len).map_err(|_| DecodingError::Truncated)?;

    if len > input.len() {
        return Err(DecodingError::Truncated);
    }

    Ok(len)
}

///
/// TESTS
///
