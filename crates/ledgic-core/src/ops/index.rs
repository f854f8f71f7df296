//! Ledger index client.
//!
//! Account history is paged newest-first. A page's cursor is the id of its
//! oldest entry and the next request returns only strictly older entries,
//! so consecutive pages neither overlap nor leave gaps.

use crate::{
    config::{MAX_RESULTS_LIMIT, defaults},
    error::{RangeError, RejectError, RejectReason},
    infra::Call,
    ops::{call_and_decode, prelude::*, with_typed_arg},
    spec::index::{
        self, GetAccountTransactionsArgs, GetBlocksRequest, GetBlocksResponse, Status,
        TransactionWithId,
    },
};
use futures::stream::{self, Stream};

///
/// Cursor
/// Position in an account's history, as returned by the index. Pass it back
/// unchanged to continue.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cursor(Nat);

impl Cursor {
    #[must_use]
    pub const fn from_nat(id: Nat) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_nat(&self) -> &Nat {
        &self.0
    }

    #[must_use]
    pub fn into_nat(self) -> Nat {
        self.0
    }
}

///
/// TransactionQuery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionQuery {
    pub account: Account,
    pub max_results: u32,
    pub start: Option<Cursor>,
}

impl TransactionQuery {
    /// Newest page, default page size.
    #[must_use]
    pub const fn new(account: Account) -> Self {
        Self {
            account,
            max_results: defaults::max_results(),
            start: None,
        }
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_start(mut self, cursor: Cursor) -> Self {
        self.start = Some(cursor);
        self
    }

    fn validate(&self) -> Result<(), EncodingError> {
        if self.max_results == 0 || self.max_results > MAX_RESULTS_LIMIT {
            return Err(EncodingError::OutOfRange {
                ty: "max_results",
                value: self.max_results.to_string(),
            });
        }

        Ok(())
    }

    fn to_args(&self) -> GetAccountTransactionsArgs {
        GetAccountTransactionsArgs {
            account: self.account,
            start: self.start.as_ref().map(|c| c.as_nat().clone()),
            max_results: Nat::from(self.max_results),
        }
    }
}

///
/// TransactionPage
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionPage {
    pub balance: Amount,
    /// Strictly descending by id.
    pub transactions: Vec<TransactionWithId>,
    pub oldest_tx_id: Option<Nat>,
    /// `None` once the account's oldest transaction has been returned.
    pub next: Option<Cursor>,
}

impl TransactionPage {
    fn from_reply(
        query: &TransactionQuery,
        reply: index::GetTransactions,
    ) -> Result<Self, DecodingError> {
        let ids = reply.transactions.iter().map(|tx| &tx.id);
        let descending = ids
            .clone()
            .zip(ids.skip(1))
            .all(|(newer, older)| newer > older);
        if !descending {
            return Err(DecodingError::InvalidResponse(
                "transaction ids are not strictly descending".to_string(),
            ));
        }

        if let (Some(start), Some(first)) = (&query.start, reply.transactions.first())
            && first.id >= *start.as_nat()
        {
            return Err(DecodingError::InvalidResponse(format!(
                "transaction {} is not older than cursor {}",
                first.id,
                start.as_nat()
            )));
        }

        if reply.transactions.len() > query.max_results as usize {
            return Err(DecodingError::InvalidResponse(format!(
                "{} transactions returned for a page of {}",
                reply.transactions.len(),
                query.max_results
            )));
        }

        let next = match reply.transactions.last() {
            None => None,
            Some(last) if reply.oldest_tx_id.as_ref() == Some(&last.id) => None,
            Some(_) if reply.oldest_tx_id.is_none()
                && reply.transactions.len() < query.max_results as usize =>
            {
                None
            }
            Some(last) => Some(Cursor::from_nat(last.id.clone())),
        };

        Ok(Self {
            balance: reply.balance,
            transactions: reply.transactions,
            oldest_tx_id: reply.oldest_tx_id,
            next,
        })
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

///
/// BlockRange
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockRange {
    pub start: u64,
    pub chain_length: u64,
    /// Raw encoded blocks `start..start + blocks.len()`.
    pub blocks: Vec<Vec<u8>>,
}

///
/// IndexOps
///

pub struct IndexOps;

impl IndexOps {
    /// One page of `query.account`'s history.
    pub async fn get_account_transactions(
        ctx: &ClientContext,
        query: &TransactionQuery,
    ) -> Result<TransactionPage, Error> {
        query.validate()?;
        let target = ctx.index_canister()?;

        let call = with_typed_arg(
            Call::query(target, index::GET_ACCOUNT_TRANSACTIONS),
            &query.to_args(),
        )?;
        let value = call
            .execute(ctx)
            .await?
            .decode(&index::get_transactions_result())?;

        let reply = index::read_get_transactions_result(value)?.map_err(|message| {
            log!(Topic::Index, Warn, "get_account_transactions: {message}");

            RejectError::new(
                RejectReason::Generic {
                    error_code: Nat::from(0u64),
                },
                message,
            )
        })?;

        let page = TransactionPage::from_reply(query, reply)?;
        log!(
            Topic::Index,
            Debug,
            "{} transactions for {} (last page: {})",
            page.transactions.len(),
            query.account,
            page.is_last()
        );

        Ok(page)
    }

    /// Pager from the newest transaction, using the context's page size.
    #[must_use]
    pub fn pager(ctx: &ClientContext, account: Account) -> TransactionPager {
        let query = TransactionQuery::new(account).with_max_results(ctx.max_results());

        TransactionPager::new(ctx.clone(), query)
    }

    /// Blocks `start..start + length`, all of them or an error.
    ///
    /// Follows up while the index caps its replies. A range reaching past
    /// the chain fails with `Error::Range`.
    pub async fn get_blocks(
        ctx: &ClientContext,
        start: u64,
        length: u64,
    ) -> Result<BlockRange, Error> {
        let target = ctx.index_canister()?;
        let end = start.checked_add(length);
        let mut blocks: Vec<Vec<u8>> = Vec::new();

        loop {
            let fetched = blocks.len() as u64;
            let request = GetBlocksRequest {
                start: start + fetched,
                length: length - fetched,
            };
            let call = with_typed_arg(Call::query(target, index::GET_BLOCKS), &request)?;
            let reply: GetBlocksResponse = call_and_decode(ctx, call).await?;

            if end.is_none_or(|end| end > reply.chain_length) {
                log!(
                    Topic::Index,
                    Warn,
                    "get_blocks {start}+{length} past chain length {}",
                    reply.chain_length
                );

                return Err(RangeError {
                    start,
                    length,
                    chain_length: reply.chain_length,
                }
                .into());
            }

            let got = reply.blocks.len() as u64;
            if got > request.length {
                return Err(DecodingError::InvalidResponse(format!(
                    "{got} blocks returned for a request of {}",
                    request.length
                ))
                .into());
            }
            if got == 0 && request.length > 0 {
                return Err(DecodingError::InvalidResponse(format!(
                    "no blocks returned from {} within chain length {}",
                    request.start, reply.chain_length
                ))
                .into());
            }

            blocks.extend(reply.blocks);

            if blocks.len() as u64 == length {
                log!(Topic::Index, Debug, "fetched blocks {start}+{length}");

                return Ok(BlockRange {
                    start,
                    chain_length: reply.chain_length,
                    blocks,
                });
            }
        }
    }

    /// Ledger the index is syncing from.
    pub async fn ledger_id(ctx: &ClientContext) -> Result<Principal, Error> {
        let call = Call::query(ctx.index_canister()?, index::LEDGER_ID);

        call_and_decode(ctx, call).await
    }

    pub async fn status(ctx: &ClientContext) -> Result<Status, Error> {
        let call = Call::query(ctx.index_canister()?, index::STATUS);

        call_and_decode(ctx, call).await
    }
}

///
/// TransactionPager
///
/// Lazy walk over an account's history, newest first. The pager holds only
/// the next cursor; a failed fetch leaves it in place so `next_page` can be
/// called again, and `resume` restarts from a cursor saved earlier.
///

#[derive(Clone, Debug)]
pub struct TransactionPager {
    ctx: ClientContext,
    query: TransactionQuery,
    done: bool,
}

impl TransactionPager {
    #[must_use]
    pub const fn new(ctx: ClientContext, query: TransactionQuery) -> Self {
        Self {
            ctx,
            query,
            done: false,
        }
    }

    #[must_use]
    pub fn resume(ctx: ClientContext, account: Account, cursor: Cursor) -> Self {
        let query = TransactionQuery::new(account)
            .with_max_results(ctx.max_results())
            .with_start(cursor);

        Self::new(ctx, query)
    }

    /// Cursor the next page will start from; `None` before the first page
    /// or after the last.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        if self.done {
            None
        } else {
            self.query.start.as_ref()
        }
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    pub async fn next_page(&mut self) -> Result<Option<TransactionPage>, Error> {
        if self.done {
            return Ok(None);
        }

        let page = IndexOps::get_account_transactions(&self.ctx, &self.query).await?;
        match &page.next {
            Some(cursor) => self.query.start = Some(cursor.clone()),
            None => self.done = true,
        }

        Ok(Some(page))
    }

    /// Pages as a stream. The stream ends after the last page, or right
    /// after yielding an error.
    pub fn into_stream(self) -> impl Stream<Item = Result<TransactionPage, Error>> {
        stream::unfold(Some(self), |pager| async move {
            let mut pager = pager?;

            match pager.next_page().await {
                Ok(Some(page)) => Some((Ok(page), Some(pager))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}

///
/// TESTS
///
