//! Ledger operation builders and the transaction indexer client.
//!
//! Each operation encodes its argument against the method's fixed descriptor,
//! dispatches in the method's mode, and turns the reply into a typed result.
//! Ledger-level rejections come back as `Error::Rejected` with a specific
//! reason; nothing here retries.

pub mod index;
pub mod ledger;

pub use index::{BlockRange, Cursor, IndexOps, TransactionPage, TransactionPager, TransactionQuery};
pub use ledger::LedgerOps;

use crate::{
    Error,
    context::ClientContext,
    infra::CallBuilder,
    wire::{FromValue, ToValue},
};

/// Common imports for ops submodules.
pub mod prelude {
    pub use crate::{
        Error,
        context::ClientContext,
        log,
        log::Topic,
        types::{Account, Amount, Nat, Principal},
        wire::{DecodingError, EncodingError, FromValue, ToValue, Typed},
    };
}

/// Executes the call and decodes the single reply value into `R`.
pub(crate) async fn call_and_decode<R: FromValue>(
    ctx: &ClientContext,
    call: CallBuilder,
) -> Result<R, Error> {
    let value = call.execute(ctx).await?.decode(&R::descriptor())?;

    Ok(R::from_value(value)?)
}

/// Attaches a typed argument, encoded against its own descriptor.
pub(crate) fn with_typed_arg<A: ToValue>(call: CallBuilder, arg: &A) -> Result<CallBuilder, Error> {
    Ok(call.try_with_arg(&A::descriptor(), &arg.to_value())?)
}
