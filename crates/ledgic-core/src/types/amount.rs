use crate::wire::{DecodingError, Descriptor, EncodingError, FromValue, ToValue, Typed, Value};
use candid::{CandidType, Nat};
use num_bigint::BigUint;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

///
/// Amount
///
/// Unbounded non-negative token quantity in the ledger's smallest unit.
/// Constructing from a signed or fractional source fails instead of
/// truncating.
///

#[derive(
    CandidType,
    Clone,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Amount(Nat);

impl Amount {
    #[must_use]
    pub fn zero() -> Self {
        Self(Nat::from(0u64))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.0.is_zero()
    }

    #[must_use]
    pub const fn as_nat(&self) -> &Nat {
        &self.0
    }

    #[must_use]
    pub fn into_nat(self) -> Nat {
        self.0
    }

    /// `None` when the amount does not fit in 64 bits.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.0.0.to_u64()
    }

    #[must_use]
    pub fn to_u128(&self) -> Option<u128> {
        self.0.0.to_u128()
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // plain digits, no digit grouping
        write!(f, "{}", self.0.0)
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Self(Nat::from(n))
    }
}

impl From<u128> for Amount {
    fn from(n: u128) -> Self {
        Self(Nat::from(n))
    }
}

impl From<Nat> for Amount {
    fn from(n: Nat) -> Self {
        Self(n)
    }
}

impl From<BigUint> for Amount {
    fn from(n: BigUint) -> Self {
        Self(Nat(n))
    }
}

impl From<Amount> for Nat {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = EncodingError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        u64::try_from(n).map(Self::from).map_err(|_| negative(n))
    }
}

impl TryFrom<i128> for Amount {
    type Error = EncodingError;

    fn try_from(n: i128) -> Result<Self, Self::Error> {
        u128::try_from(n).map(Self::from).map_err(|_| negative(n))
    }
}

impl TryFrom<f64> for Amount {
    type Error = EncodingError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if !n.is_finite() || n.fract() != 0.0 {
            return Err(EncodingError::NonIntegral(n.to_string()));
        }
        if n < 0.0 {
            return Err(negative(n));
        }

        BigUint::from_f64(n)
            .map(Self::from)
            .ok_or_else(|| EncodingError::NonIntegral(n.to_string()))
    }
}

impl FromStr for Amount {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().replace('_', "");

        if let Some(rest) = digits.strip_prefix('-')
            && !rest.is_empty()
            && rest.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(negative(s.trim()));
        }
        let digits = digits.strip_prefix('+').unwrap_or(digits.as_str());
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EncodingError::NonIntegral(s.to_string()));
        }

        BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(Self::from)
            .ok_or_else(|| EncodingError::NonIntegral(s.to_string()))
    }
}

impl Typed for Amount {
    fn descriptor() -> Descriptor {
        Descriptor::Nat
    }
}

impl ToValue for Amount {
    fn to_value(&self) -> Value {
        Value::Nat(self.0.clone())
    }
}

impl FromValue for Amount {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_nat().map(Self)
    }
}

fn negative(n: impl Display) -> EncodingError {
    EncodingError::Negative {
        ty: "amount",
        value: n.to_string(),
    }
}

///
/// TESTS
///
