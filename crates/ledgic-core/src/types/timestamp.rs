use crate::{
    cdk::utils::time,
    wire::{DecodingError, Descriptor, EncodingError, FromValue, ToValue, Typed, Value},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    time::Duration,
};

///
/// Timestamp
/// Nanoseconds since the Unix epoch, as the ledger records `created_at_time`.
///

#[derive(
    CandidType,
    Clone,
    Copy,
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
pub struct Timestamp(u64);

impl Timestamp {
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    #[must_use]
    pub fn now() -> Self {
        Self(time::now_nanos())
    }

    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        time::nanos_to_millis(self.0)
    }

    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Self(time::nanos_after(self.0, duration))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(nanos: u64) -> Self {
        Self(nanos)
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = EncodingError;

    fn try_from(nanos: i64) -> Result<Self, Self::Error> {
        u64::try_from(nanos)
            .map(Self)
            .map_err(|_| EncodingError::InvalidTimestamp(format!("{nanos} is before the epoch")))
    }
}

impl TryFrom<f64> for Timestamp {
    type Error = EncodingError;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn try_from(nanos: f64) -> Result<Self, Self::Error> {
        // u64::MAX as f64 rounds up to 2^64, so the bound is exclusive
        if !nanos.is_finite() || nanos.fract() != 0.0 || nanos < 0.0 || nanos >= u64::MAX as f64 {
            return Err(EncodingError::InvalidTimestamp(nanos.to_string()));
        }

        Ok(Self(nanos as u64))
    }
}

impl Typed for Timestamp {
    fn descriptor() -> Descriptor {
        Descriptor::Nat64
    }
}

impl ToValue for Timestamp {
    fn to_value(&self) -> Value {
        Value::Nat64(self.0)
    }
}

impl FromValue for Timestamp {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_nat64().map(Self)
    }
}

///
/// TESTS
///
