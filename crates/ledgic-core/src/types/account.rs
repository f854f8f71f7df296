use crate::{
    types::ParseError,
    wire::{DecodingError, Descriptor, EncodingError, FromValue, ToValue, Typed, Value},
};
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

///
/// Subaccount
///

pub type Subaccount = [u8; 32];

pub const DEFAULT_SUBACCOUNT: &Subaccount = &[0; 32];

/// Checks a raw byte slice is a full 32-byte subaccount.
pub fn subaccount_from_slice(bytes: &[u8]) -> Result<Subaccount, EncodingError> {
    Subaccount::try_from(bytes).map_err(|_| EncodingError::InvalidLength {
        field: "subaccount",
        len: bytes.len(),
        expected: "exactly 32",
    })
}

///
/// Account
///
/// Ledger account: an owner principal plus an optional 32-byte subaccount.
///
/// Equality, hashing and ordering are byte-exact: an absent subaccount and an
/// explicit all-zero subaccount are different values here, even though the
/// ledger credits both to the same balance. Use [`Account::effective_subaccount`]
/// to compare by ledger balance instead.
///

#[derive(
    CandidType, Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Account {
    pub owner: Principal,
    pub subaccount: Option<Subaccount>,
}

impl Account {
    pub fn new<P: Into<Principal>, S: Into<Subaccount>>(owner: P, subaccount: Option<S>) -> Self {
        Self {
            owner: owner.into(),
            subaccount: subaccount.map(Into::into),
        }
    }

    /// The subaccount if it is set, otherwise the default subaccount of all zeroes.
    #[inline]
    #[must_use]
    pub fn effective_subaccount(&self) -> &Subaccount {
        self.subaccount.as_ref().unwrap_or(DEFAULT_SUBACCOUNT)
    }

    /// Whether both accounts name the same ledger balance.
    #[must_use]
    pub fn same_balance(&self, other: &Self) -> bool {
        self.owner == other.owner && self.effective_subaccount() == other.effective_subaccount()
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // textual encoding of ICRC-1 accounts
        match &self.subaccount {
            None => write!(f, "{}", self.owner),
            Some(subaccount) if subaccount == DEFAULT_SUBACCOUNT => write!(f, "{}", self.owner),
            Some(subaccount) => {
                let checksum = account_checksum(self.owner.as_slice(), subaccount);
                let hex_subaccount = hex::encode(subaccount);
                let hex_subaccount = hex_subaccount.trim_start_matches('0');
                write!(f, "{}-{}.{}", self.owner, checksum, hex_subaccount)
            }
        }
    }
}

impl From<Principal> for Account {
    fn from(owner: Principal) -> Self {
        Self {
            owner,
            subaccount: None,
        }
    }
}

impl FromStr for Account {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let principal = |text: &str| {
            Principal::from_text(text).map_err(|e| ParseError::Principal(e.to_string()))
        };

        let Some((head, hex_subaccount)) = s.split_once('.') else {
            return Ok(Self::from(principal(s)?));
        };
        let (owner_text, checksum) = head
            .rsplit_once('-')
            .ok_or_else(|| ParseError::Account("missing checksum".to_string()))?;
        let owner = principal(owner_text)?;

        if hex_subaccount.is_empty() || hex_subaccount.starts_with('0') {
            return Err(ParseError::Account(
                "subaccount must be non-empty with no leading zeroes".to_string(),
            ));
        }
        if hex_subaccount.len() > 64 {
            return Err(ParseError::Account(format!(
                "subaccount has {} hex digits, at most 64 allowed",
                hex_subaccount.len()
            )));
        }

        let padded = format!("{hex_subaccount:0>64}");
        let mut subaccount = [0u8; 32];
        hex::decode_to_slice(&padded, &mut subaccount)
            .map_err(|e| ParseError::Account(e.to_string()))?;

        let expected = account_checksum(owner.as_slice(), &subaccount);
        if checksum != expected {
            return Err(ParseError::Checksum {
                expected,
                found: checksum.to_string(),
            });
        }

        Ok(Self::new(owner, Some(subaccount)))
    }
}

impl Typed for Account {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("owner", Descriptor::Principal),
            ("subaccount", Descriptor::opt(Descriptor::Blob)),
        ])
    }
}

impl ToValue for Account {
    fn to_value(&self) -> Value {
        Value::record([
            ("owner", Value::Principal(self.owner)),
            ("subaccount", Value::opt(self.subaccount.map(|s| s.to_vec()))),
        ])
    }
}

impl FromValue for Account {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut fields = value.into_fields()?;
        let owner = fields.take("owner")?.into_principal()?;
        let subaccount = fields
            .take_opt("subaccount")?
            .map(|v| {
                let bytes = v.into_blob()?;
                Subaccount::try_from(bytes.as_slice()).map_err(|_| {
                    DecodingError::InvalidResponse(format!(
                        "subaccount of {} bytes",
                        bytes.len()
                    ))
                })
            })
            .transpose()?;

        Ok(Self { owner, subaccount })
    }
}

fn account_checksum(owner: &[u8], subaccount: &[u8]) -> String {
    let mut crc32hasher = crc32fast::Hasher::new();
    crc32hasher.update(owner);
    crc32hasher.update(subaccount);
    let checksum = crc32hasher.finalize().to_be_bytes();

    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &checksum).to_lowercase()
}

///
/// TESTS
///
