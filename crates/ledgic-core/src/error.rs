use crate::{
    config::ConfigError,
    memo::FormatError,
    types::{Nat, Principal},
    wire::{DecodingError, EncodingError},
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure a ledger or index call can end in. Encoding failures are
/// raised before anything is sent; everything else is returned as-is to the
/// caller, who owns the retry policy.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    /// An update whose effect is unknown. Re-query ledger state before
    /// resubmitting.
    #[error("outcome of update '{method}' on {target} is unknown: {message}")]
    OutcomeUnknown {
        target: Principal,
        method: String,
        message: String,
    },

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Rejected(#[from] RejectError),
}

impl Error {
    /// Whether repeating the same call cannot cause a duplicate effect and
    /// may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected(err) => matches!(err.reason, RejectReason::TemporarilyUnavailable),
            _ => false,
        }
    }

    #[must_use]
    pub const fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Rejected(err) => Some(&err.reason),
            _ => None,
        }
    }
}

///
/// NetworkError
/// The call did not reach the target, or a query gave no answer in time.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum NetworkError {
    #[error("query '{method}' on {target} timed out")]
    Timeout { target: Principal, method: String },

    #[error("{target} unreachable: {message}")]
    Unreachable { target: Principal, message: String },
}

///
/// RangeError
/// Block range outside the history the index holds.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("blocks [{start}, {start} + {length}) outside history of {chain_length} blocks")]
pub struct RangeError {
    pub start: u64,
    pub length: u64,
    pub chain_length: u64,
}

///
/// RejectError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("rejected ({}): {message}", .reason.code())]
pub struct RejectError {
    pub reason: RejectReason,
    pub message: String,
}

impl RejectError {
    pub fn new(reason: RejectReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

///
/// RejectReason
/// Why the target refused a call. Ledger-level reasons carry the data the
/// ledger returned alongside them.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RejectReason {
    AllowanceMismatch { current_allowance: Nat },
    BadBurn { min_burn_amount: Nat },
    BadFee { expected_fee: Nat },
    /// System- or canister-level reject before the method produced a result.
    CallRejected { reject_code: u32 },
    CreatedInFuture { ledger_time: u64 },
    Duplicate { duplicate_of: Nat },
    Expired { ledger_time: u64 },
    Generic { error_code: Nat },
    InsufficientAllowance { allowance: Nat },
    InsufficientFunds { balance: Nat },
    TemporarilyUnavailable,
    TooOld,
}

impl RejectReason {
    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AllowanceMismatch { .. } => "allowance_mismatch",
            Self::BadBurn { .. } => "bad_burn",
            Self::BadFee { .. } => "bad_fee",
            Self::CallRejected { .. } => "call_rejected",
            Self::CreatedInFuture { .. } => "created_in_future",
            Self::Duplicate { .. } => "duplicate",
            Self::Expired { .. } => "expired",
            Self::Generic { .. } => "generic",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::TooOld => "too_old",
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_and_temporary_failures_are_retryable() {
        let target = Principal::anonymous();

        let timeout = Error::from(NetworkError::Timeout {
            target,
            method: "icrc1_balance_of".into(),
        });
        assert!(timeout.is_retryable());

        let unknown = Error::OutcomeUnknown {
            target,
            method: "icrc1_transfer".into(),
            message: "deadline expired".into(),
        };
        assert!(!unknown.is_retryable());

        let busy = Error::from(RejectError::new(RejectReason::TemporarilyUnavailable, ""));
        assert!(busy.is_retryable());

        let funds = Error::from(RejectError::new(
            RejectReason::InsufficientFunds {
                balance: Nat::from(3u64),
            },
            "",
        ));
        assert!(!funds.is_retryable());
        assert_eq!(funds.reject_reason().map(RejectReason::code), Some("insufficient_funds"));
    }

    #[test]
    fn messages_carry_the_reason_code() {
        let err = RejectError::new(RejectReason::TooOld, "created_at_time too old");
        assert_eq!(err.to_string(), "rejected (too_old): created_at_time too old");

        let range = RangeError {
            start: 10,
            length: 5,
            chain_length: 12,
        };
        assert_eq!(
            range.to_string(),
            "blocks [10, 10 + 5) outside history of 12 blocks"
        );
    }
}
