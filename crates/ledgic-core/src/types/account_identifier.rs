use crate::types::{Account, ParseError, Subaccount};
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

///
/// AccountIdentifier
///
/// Legacy 32-byte ledger address: a CRC32 checksum followed by
/// `SHA-224("\x0Aaccount-id" || owner || subaccount)`.
///

#[derive(
    CandidType, Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct AccountIdentifier([u8; 32]);

impl AccountIdentifier {
    #[must_use]
    pub fn new(owner: &Principal, subaccount: &Subaccount) -> Self {
        let mut hasher = sha2::Sha224::new();
        hasher.update(b"\x0Aaccount-id");
        hasher.update(owner.as_slice());
        hasher.update(subaccount);
        let hash: [u8; 28] = hasher.finalize().into();

        let mut bytes = [0u8; 32];
        bytes[0..4].copy_from_slice(&checksum(&hash));
        bytes[4..].copy_from_slice(&hash);

        Self(bytes)
    }

    /// Accepts the 32-byte canonical form only; the checksum must verify.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseError::AccountIdLength(bytes.len()))?;

        let expected = checksum(&bytes[4..]);
        if bytes[0..4] != expected {
            return Err(ParseError::Checksum {
                expected: hex::encode(expected),
                found: hex::encode(&bytes[0..4]),
            });
        }

        Ok(Self(bytes))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Account {
    #[must_use]
    pub fn account_identifier(&self) -> AccountIdentifier {
        AccountIdentifier::new(&self.owner, self.effective_subaccount())
    }
}

impl Display for AccountIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AccountIdentifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseError::Hex(e.to_string()))?;

        Self::from_slice(&bytes)
    }
}

fn checksum(hash: &[u8]) -> [u8; 4] {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(hash);
    hasher.finalize().to_be_bytes()
}

///
/// TESTS
///
