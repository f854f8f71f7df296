//! ICRC-1 / ICRC-2 ledger operations.
//!
//! Reads (`balance_of`, `metadata`, `allowance`) go out as queries. Writes
//! (`transfer`, `approve`, `transfer_from`) go out as updates and are never
//! repeated here; set `created_at_time` and `memo` so the ledger can
//! deduplicate a caller's retry.

use crate::{
    infra::{Call, CallBuilder},
    ops::{call_and_decode, prelude::*, with_typed_arg},
    spec::{
        self,
        icrc1::{self, Metadata, TransferArg},
        icrc2::{self, Allowance, AllowanceArgs, ApproveArgs, TransferFromArgs},
    },
    wire::Descriptor,
};

///
/// LedgerOps
///

pub struct LedgerOps;

impl LedgerOps {
    /// Balance of `account` in the ledger's smallest unit.
    pub async fn balance_of(ctx: &ClientContext, account: &Account) -> Result<Amount, Error> {
        let call = with_typed_arg(Call::query(ctx.ledger_canister(), icrc1::BALANCE_OF), account)?;

        call_and_decode(ctx, call).await
    }

    pub async fn metadata(ctx: &ClientContext) -> Result<Metadata, Error> {
        call_and_decode(ctx, Call::query(ctx.ledger_canister(), icrc1::METADATA)).await
    }

    pub async fn allowance(
        ctx: &ClientContext,
        account: Account,
        spender: Account,
    ) -> Result<Allowance, Error> {
        let args = AllowanceArgs { account, spender };
        let call = with_typed_arg(Call::query(ctx.ledger_canister(), icrc2::ALLOWANCE), &args)?;

        call_and_decode(ctx, call).await
    }

    /// Returns the block index of the transfer.
    pub async fn transfer(ctx: &ClientContext, args: &TransferArg) -> Result<Nat, Error> {
        log!(
            Topic::Ledger,
            Info,
            "transfer {} to {}",
            args.amount,
            args.to
        );

        let call = with_typed_arg(Call::update(ctx.ledger_canister(), icrc1::TRANSFER), args)?;

        Self::submit(ctx, icrc1::TRANSFER, call, &icrc1::transfer_result()).await
    }

    /// Returns the block index of the approval. A set `expected_allowance`
    /// that no longer matches comes back as `RejectReason::AllowanceMismatch`.
    pub async fn approve(ctx: &ClientContext, args: &ApproveArgs) -> Result<Nat, Error> {
        log!(
            Topic::Ledger,
            Info,
            "approve {} for {}",
            args.amount,
            args.spender
        );

        let call = with_typed_arg(Call::update(ctx.ledger_canister(), icrc2::APPROVE), args)?;

        Self::submit(ctx, icrc2::APPROVE, call, &icrc2::approve_result()).await
    }

    /// Returns the block index of the transfer.
    pub async fn transfer_from(ctx: &ClientContext, args: &TransferFromArgs) -> Result<Nat, Error> {
        log!(
            Topic::Ledger,
            Info,
            "transfer_from {} from {} to {}",
            args.amount,
            args.from,
            args.to
        );

        let call = with_typed_arg(Call::update(ctx.ledger_canister(), icrc2::TRANSFER_FROM), args)?;

        Self::submit(ctx, icrc2::TRANSFER_FROM, call, &icrc2::transfer_from_result()).await
    }

    async fn submit(
        ctx: &ClientContext,
        method: &str,
        call: CallBuilder,
        result: &Descriptor,
    ) -> Result<Nat, Error> {
        let value = call.execute(ctx).await?.decode(result)?;

        match spec::read_block_index_result(value)? {
            Ok(block_index) => {
                log!(Topic::Ledger, Ok, "{method} committed at block {block_index}");
                Ok(block_index)
            }
            Err(err) => {
                log!(Topic::Ledger, Warn, "{method} rejected: {err}");
                Err(Error::Rejected(err))
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RejectReason,
        memo::encode_uuids,
        infra::CallMode,
        test::{ledger::FakeLedger, transport::principal},
        types::Timestamp,
    };
    use futures::executor::block_on;

    fn owner(n: u8) -> Account {
        Account::from(principal(n))
    }

    #[test]
    fn balance_is_a_query() {
        let ledger = FakeLedger::new().with_balance(owner(10), 500u64);
        let ctx = ledger.context();

        let balance = block_on(LedgerOps::balance_of(&ctx, &owner(10))).unwrap();
        assert_eq!(balance, Amount::from(500u64));
        assert_eq!(
            block_on(LedgerOps::balance_of(&ctx, &owner(11))).unwrap(),
            Amount::zero()
        );
        assert!(ledger.modes().iter().all(|m| *m == CallMode::Query));
    }

    #[test]
    fn metadata_lists_symbol_decimals_and_fee() {
        let ledger = FakeLedger::new();
        let metadata = block_on(LedgerOps::metadata(&ledger.context())).unwrap();

        assert_eq!(metadata.symbol(), Some("LDG"));
        assert_eq!(metadata.decimals(), Some(8));
        assert_eq!(metadata.fee(), Some(Amount::from(FakeLedger::FEE)));
    }

    #[test]
    fn transfer_moves_funds_and_returns_block_index() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        let ctx = ledger.context_as(principal(1));

        let memo = encode_uuids(
            "123e4567-e89b-12d3-a456-426614174000",
            "00000000-0000-0000-0000-000000000001",
        )
        .unwrap();
        let args = TransferArg::new(owner(2), Amount::from(300u64))
            .with_memo(memo)
            .with_created_at_time(Timestamp::from_nanos(1));

        let block = block_on(LedgerOps::transfer(&ctx, &args)).unwrap();
        assert_eq!(block, Nat::from(0u64));
        assert_eq!(ledger.balance(&owner(1)), Amount::from(1_000u64 - 300 - FakeLedger::FEE));
        assert_eq!(ledger.balance(&owner(2)), Amount::from(300u64));
        assert_eq!(ledger.last_memo(), Some(memo.as_bytes().to_vec()));
    }

    #[test]
    fn insufficient_funds_is_a_typed_rejection() {
        let ledger = FakeLedger::new().with_balance(owner(1), 5u64);
        let ctx = ledger.context_as(principal(1));

        let err = block_on(LedgerOps::transfer(
            &ctx,
            &TransferArg::new(owner(2), Amount::from(300u64)),
        ))
        .unwrap_err();

        assert_eq!(
            err.reject_reason(),
            Some(&RejectReason::InsufficientFunds {
                balance: Nat::from(5u64)
            })
        );
        assert_eq!(ledger.balance(&owner(1)), Amount::from(5u64));
    }

    #[test]
    fn wrong_fee_reports_expected_fee() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        let ctx = ledger.context_as(principal(1));
        let args = TransferArg::new(owner(2), Amount::from(1u64)).with_fee(Amount::from(1u64));

        let err = block_on(LedgerOps::transfer(&ctx, &args)).unwrap_err();
        assert_eq!(
            err.reject_reason(),
            Some(&RejectReason::BadFee {
                expected_fee: Nat::from(FakeLedger::FEE)
            })
        );
    }

    #[test]
    fn resubmitting_the_same_transfer_is_a_duplicate() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        let ctx = ledger.context_as(principal(1));
        let args = TransferArg::new(owner(2), Amount::from(10u64))
            .with_created_at_time(Timestamp::from_nanos(42));

        let first = block_on(LedgerOps::transfer(&ctx, &args)).unwrap();
        let err = block_on(LedgerOps::transfer(&ctx, &args)).unwrap_err();

        assert_eq!(
            err.reject_reason(),
            Some(&RejectReason::Duplicate {
                duplicate_of: first
            })
        );
    }

    #[test]
    fn approve_compare_and_set_mismatch() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        let ctx = ledger.context_as(principal(1));

        let args = ApproveArgs::new(owner(3), Amount::from(100u64));
        block_on(LedgerOps::approve(&ctx, &args)).unwrap();

        let stale = ApproveArgs::new(owner(3), Amount::from(200u64))
            .with_expected_allowance(Amount::from(0u64));
        let err = block_on(LedgerOps::approve(&ctx, &stale)).unwrap_err();
        assert_eq!(
            err.reject_reason(),
            Some(&RejectReason::AllowanceMismatch {
                current_allowance: Nat::from(100u64)
            })
        );

        let fresh = ApproveArgs::new(owner(3), Amount::from(200u64))
            .with_expected_allowance(Amount::from(100u64));
        block_on(LedgerOps::approve(&ctx, &fresh)).unwrap();

        let allowance = block_on(LedgerOps::allowance(&ctx, owner(1), owner(3))).unwrap();
        assert_eq!(allowance.allowance, Amount::from(200u64));
        assert_eq!(allowance.expires_at, None);
    }

    #[test]
    fn expired_approval_is_rejected() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        let ctx = ledger.context_as(principal(1));

        let args = ApproveArgs::new(owner(3), Amount::from(100u64))
            .with_expires_at(Timestamp::from_nanos(1));
        let err = block_on(LedgerOps::approve(&ctx, &args)).unwrap_err();

        assert!(matches!(
            err.reject_reason(),
            Some(RejectReason::Expired { .. })
        ));
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);

        let approve = ApproveArgs::new(owner(3), Amount::from(150u64));
        block_on(LedgerOps::approve(&ledger.context_as(principal(1)), &approve)).unwrap();

        let spender = ledger.context_as(principal(3));
        let args = TransferFromArgs::new(owner(1), owner(4), Amount::from(100u64));
        block_on(LedgerOps::transfer_from(&spender, &args)).unwrap();
        assert_eq!(ledger.balance(&owner(4)), Amount::from(100u64));

        let err = block_on(LedgerOps::transfer_from(&spender, &args)).unwrap_err();
        assert_eq!(
            err.reject_reason(),
            Some(&RejectReason::InsufficientAllowance {
                allowance: Nat::from(150u64 - 100 - FakeLedger::FEE)
            })
        );
    }

    #[test]
    fn negative_amount_fails_before_dispatch() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        assert!(Amount::try_from(-1i64).is_err());

        let mut value = TransferArg::new(owner(2), Amount::zero()).to_value();
        if let crate::wire::Value::Record(fields) = &mut value {
            for (label, field) in fields.iter_mut() {
                if label.to_string() == "amount" {
                    *field = crate::wire::Value::Int(crate::types::Int::from(-1));
                }
            }
        }
        let err = Call::update(ledger.context().ledger_canister(), icrc1::TRANSFER)
            .try_with_arg(&TransferArg::descriptor(), &value)
            .err()
            .unwrap();

        assert!(matches!(err, EncodingError::Negative { ty: "nat", .. }));
        assert!(ledger.modes().is_empty());
    }

    #[test]
    fn update_timeout_is_outcome_unknown() {
        let ledger = FakeLedger::new().with_balance(owner(1), 1_000u64);
        ledger.time_out_next_call();
        let ctx = ledger.context_as(principal(1));

        let err = block_on(LedgerOps::transfer(
            &ctx,
            &TransferArg::new(owner(2), Amount::from(1u64)),
        ))
        .unwrap_err();

        assert!(matches!(err, Error::OutcomeUnknown { .. }));
    }
}
