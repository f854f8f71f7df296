//!
//! Fixed method signatures of the services this layer talks to: ICRC-1 and
//! ICRC-2 ledgers and the ledger index. Each argument type knows its
//! descriptor and value tree; each reply type decodes from one.
//!

pub mod icrc1;
pub mod icrc2;
pub mod index;

use crate::{
    error::{RejectError, RejectReason},
    types::Nat,
    wire::{DecodingError, Descriptor, Fields, Label, Value},
};

/// Shared imports for spec modules so type definitions stay concise.
pub mod prelude {
    pub use crate::{
        memo::MemoBytes,
        types::{Account, Amount, Nat, Principal, Subaccount, Timestamp},
        wire::{DecodingError, Descriptor, Fields, FromValue, ToValue, Typed, Value},
    };
}

//
// ledger error variants
//
// icrc1_transfer, icrc2_approve and icrc2_transfer_from share most of their
// error tags; each method declares the subset it can return.
//

pub(crate) const COMMON_ERRORS: [&str; 7] = [
    "BadFee",
    "CreatedInFuture",
    "Duplicate",
    "GenericError",
    "InsufficientFunds",
    "TemporarilyUnavailable",
    "TooOld",
];

fn error_payload(tag: &str) -> Descriptor {
    let nat = |name: &'static str| Descriptor::record([(name, Descriptor::Nat)]);

    match tag {
        "AllowanceChanged" => nat("current_allowance"),
        "BadBurn" => nat("min_burn_amount"),
        "BadFee" => nat("expected_fee"),
        "CreatedInFuture" | "Expired" => Descriptor::record([("ledger_time", Descriptor::Nat64)]),
        "Duplicate" => nat("duplicate_of"),
        "GenericError" => Descriptor::record([
            ("error_code", Descriptor::Nat),
            ("message", Descriptor::Text),
        ]),
        "InsufficientAllowance" => nat("allowance"),
        "InsufficientFunds" => nat("balance"),
        _ => Descriptor::Null,
    }
}

/// `variant { Ok : nat; Err : variant { .. } }` for the given error tags.
pub(crate) fn block_index_result(error_tags: &[&str]) -> Descriptor {
    let errors = Descriptor::variant(error_tags.iter().map(|tag| (*tag, error_payload(tag))));

    Descriptor::variant([("Ok", Descriptor::Nat), ("Err", errors)])
}

/// Splits a block-index result into the index or the typed rejection.
pub(crate) fn read_block_index_result(value: Value) -> Result<Result<Nat, RejectError>, DecodingError> {
    let (tag, payload) = value.into_variant()?;

    match tag.to_string().as_str() {
        "Ok" => Ok(Ok(payload.into_nat()?)),
        "Err" => {
            let (tag, payload) = payload.into_variant()?;
            Ok(Err(reject_from_error(&tag, payload)?))
        }
        other => Err(DecodingError::UnknownVariant(other.to_string())),
    }
}

fn reject_from_error(tag: &Label, payload: Value) -> Result<RejectError, DecodingError> {
    let name = tag.to_string();
    if payload == Value::Null {
        let reason = match name.as_str() {
            "TemporarilyUnavailable" => RejectReason::TemporarilyUnavailable,
            "TooOld" => RejectReason::TooOld,
            _ => return Err(DecodingError::UnknownVariant(name)),
        };
        let message = match reason {
            RejectReason::TooOld => "created_at_time is too far in the past",
            _ => "ledger is temporarily unavailable",
        };

        return Ok(RejectError::new(reason, message));
    }

    let mut fields = payload.into_fields()?;

    let (reason, message) = match name.as_str() {
        "AllowanceChanged" => {
            let current_allowance = take_nat(&mut fields, "current_allowance")?;
            let message = format!("current allowance is {current_allowance}");
            (RejectReason::AllowanceMismatch { current_allowance }, message)
        }
        "BadBurn" => {
            let min_burn_amount = take_nat(&mut fields, "min_burn_amount")?;
            let message = format!("burn below minimum {min_burn_amount}");
            (RejectReason::BadBurn { min_burn_amount }, message)
        }
        "BadFee" => {
            let expected_fee = take_nat(&mut fields, "expected_fee")?;
            let message = format!("expected fee {expected_fee}");
            (RejectReason::BadFee { expected_fee }, message)
        }
        "CreatedInFuture" => {
            let ledger_time = fields.take("ledger_time")?.into_nat64()?;
            let message = format!("created_at_time is ahead of ledger time {ledger_time}");
            (RejectReason::CreatedInFuture { ledger_time }, message)
        }
        "Duplicate" => {
            let duplicate_of = take_nat(&mut fields, "duplicate_of")?;
            let message = format!("duplicate of block {duplicate_of}");
            (RejectReason::Duplicate { duplicate_of }, message)
        }
        "Expired" => {
            let ledger_time = fields.take("ledger_time")?.into_nat64()?;
            let message = format!("approval expired at ledger time {ledger_time}");
            (RejectReason::Expired { ledger_time }, message)
        }
        "GenericError" => {
            let error_code = take_nat(&mut fields, "error_code")?;
            let message = fields.take("message")?.into_text()?;
            (RejectReason::Generic { error_code }, message)
        }
        "InsufficientAllowance" => {
            let allowance = take_nat(&mut fields, "allowance")?;
            let message = format!("allowance is {allowance}");
            (RejectReason::InsufficientAllowance { allowance }, message)
        }
        "InsufficientFunds" => {
            let balance = take_nat(&mut fields, "balance")?;
            let message = format!("balance is {balance}");
            (RejectReason::InsufficientFunds { balance }, message)
        }
        _ => return Err(DecodingError::UnknownVariant(name)),
    };

    Ok(RejectError::new(reason, message))
}

fn take_nat(fields: &mut Fields, name: &str) -> Result<Nat, DecodingError> {
    fields.take(name)?.into_nat()
}

/// Optional byte field as `opt blob`.
pub(crate) fn opt_blob(bytes: Option<&[u8]>) -> Value {
    Value::opt(bytes.map(<[u8]>::to_vec))
}

///
/// TESTS
///
