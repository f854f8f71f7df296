//!
//! Ledger index canister signatures: account history, raw blocks and sync
//! status.
//!

use crate::spec::prelude::*;

pub const GET_ACCOUNT_TRANSACTIONS: &str = "get_account_transactions";
pub const GET_BLOCKS: &str = "get_blocks";
pub const LEDGER_ID: &str = "ledger_id";
pub const STATUS: &str = "status";

//
// args
//

///
/// GetAccountTransactionsArgs
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetAccountTransactionsArgs {
    pub account: Account,
    /// Exclusive upper bound on transaction ids; `None` starts at the newest.
    pub start: Option<Nat>,
    pub max_results: Nat,
}

impl Typed for GetAccountTransactionsArgs {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("account", Account::descriptor()),
            ("start", Descriptor::opt(Descriptor::Nat)),
            ("max_results", Descriptor::Nat),
        ])
    }
}

impl ToValue for GetAccountTransactionsArgs {
    fn to_value(&self) -> Value {
        Value::record([
            ("account", self.account.to_value()),
            ("start", self.start.to_value()),
            ("max_results", self.max_results.to_value()),
        ])
    }
}

///
/// GetBlocksRequest
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GetBlocksRequest {
    pub start: u64,
    pub length: u64,
}

impl Typed for GetBlocksRequest {
    fn descriptor() -> Descriptor {
        Descriptor::record([("start", Descriptor::Nat64), ("length", Descriptor::Nat64)])
    }
}

impl ToValue for GetBlocksRequest {
    fn to_value(&self) -> Value {
        Value::record([
            ("start", Value::Nat64(self.start)),
            ("length", Value::Nat64(self.length)),
        ])
    }
}

//
// replies
//

///
/// Transfer
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transfer {
    pub from: Account,
    pub to: Account,
    pub amount: Amount,
    pub fee: Option<Amount>,
    pub memo: Option<Vec<u8>>,
    pub created_at_time: Option<Timestamp>,
    pub spender: Option<Account>,
}

///
/// Mint
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mint {
    pub to: Account,
    pub amount: Amount,
    pub memo: Option<Vec<u8>>,
    pub created_at_time: Option<Timestamp>,
}

///
/// Burn
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Burn {
    pub from: Account,
    pub amount: Amount,
    pub memo: Option<Vec<u8>>,
    pub created_at_time: Option<Timestamp>,
    pub spender: Option<Account>,
}

///
/// Approve
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Approve {
    pub from: Account,
    pub spender: Account,
    pub amount: Amount,
    pub expected_allowance: Option<Amount>,
    pub expires_at: Option<Timestamp>,
    pub fee: Option<Amount>,
    pub memo: Option<Vec<u8>>,
    pub created_at_time: Option<Timestamp>,
}

fn opt<T: Typed>() -> Descriptor {
    Descriptor::opt(T::descriptor())
}

fn memo_field() -> (&'static str, Descriptor) {
    ("memo", Descriptor::opt(Descriptor::Blob))
}

fn take<T: FromValue>(fields: &mut Fields, name: &str) -> Result<T, DecodingError> {
    T::from_value(fields.take(name)?)
}

fn take_opt<T: FromValue>(fields: &mut Fields, name: &str) -> Result<Option<T>, DecodingError> {
    fields.take_opt(name)?.map(T::from_value).transpose()
}

fn take_memo(fields: &mut Fields) -> Result<Option<Vec<u8>>, DecodingError> {
    fields.take_opt("memo")?.map(Value::into_blob).transpose()
}

impl Typed for Transfer {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("from", Account::descriptor()),
            ("to", Account::descriptor()),
            ("amount", Descriptor::Nat),
            ("fee", opt::<Amount>()),
            memo_field(),
            ("created_at_time", opt::<Timestamp>()),
            ("spender", opt::<Account>()),
        ])
    }
}

impl FromValue for Transfer {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            from: take(&mut f, "from")?,
            to: take(&mut f, "to")?,
            amount: take(&mut f, "amount")?,
            fee: take_opt(&mut f, "fee")?,
            memo: take_memo(&mut f)?,
            created_at_time: take_opt(&mut f, "created_at_time")?,
            spender: take_opt(&mut f, "spender")?,
        })
    }
}

impl Typed for Mint {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("to", Account::descriptor()),
            ("amount", Descriptor::Nat),
            memo_field(),
            ("created_at_time", opt::<Timestamp>()),
        ])
    }
}

impl FromValue for Mint {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            to: take(&mut f, "to")?,
            amount: take(&mut f, "amount")?,
            memo: take_memo(&mut f)?,
            created_at_time: take_opt(&mut f, "created_at_time")?,
        })
    }
}

impl Typed for Burn {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("from", Account::descriptor()),
            ("amount", Descriptor::Nat),
            memo_field(),
            ("created_at_time", opt::<Timestamp>()),
            ("spender", opt::<Account>()),
        ])
    }
}

impl FromValue for Burn {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            from: take(&mut f, "from")?,
            amount: take(&mut f, "amount")?,
            memo: take_memo(&mut f)?,
            created_at_time: take_opt(&mut f, "created_at_time")?,
            spender: take_opt(&mut f, "spender")?,
        })
    }
}

impl Typed for Approve {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("from", Account::descriptor()),
            ("spender", Account::descriptor()),
            ("amount", Descriptor::Nat),
            ("expected_allowance", opt::<Amount>()),
            ("expires_at", opt::<Timestamp>()),
            ("fee", opt::<Amount>()),
            memo_field(),
            ("created_at_time", opt::<Timestamp>()),
        ])
    }
}

impl FromValue for Approve {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            from: take(&mut f, "from")?,
            spender: take(&mut f, "spender")?,
            amount: take(&mut f, "amount")?,
            expected_allowance: take_opt(&mut f, "expected_allowance")?,
            expires_at: take_opt(&mut f, "expires_at")?,
            fee: take_opt(&mut f, "fee")?,
            memo: take_memo(&mut f)?,
            created_at_time: take_opt(&mut f, "created_at_time")?,
        })
    }
}

///
/// Transaction
/// One history entry; `kind` names which of the optional bodies is set.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub kind: String,
    pub timestamp: Timestamp,
    pub transfer: Option<Transfer>,
    pub mint: Option<Mint>,
    pub burn: Option<Burn>,
    pub approve: Option<Approve>,
}

impl Typed for Transaction {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("kind", Descriptor::Text),
            ("timestamp", Descriptor::Nat64),
            ("transfer", opt::<Transfer>()),
            ("mint", opt::<Mint>()),
            ("burn", opt::<Burn>()),
            ("approve", opt::<Approve>()),
        ])
    }
}

impl FromValue for Transaction {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            kind: take(&mut f, "kind")?,
            timestamp: take(&mut f, "timestamp")?,
            transfer: take_opt(&mut f, "transfer")?,
            mint: take_opt(&mut f, "mint")?,
            burn: take_opt(&mut f, "burn")?,
            approve: take_opt(&mut f, "approve")?,
        })
    }
}

///
/// TransactionWithId
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionWithId {
    pub id: Nat,
    pub transaction: Transaction,
}

impl Typed for TransactionWithId {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("id", Descriptor::Nat),
            ("transaction", Transaction::descriptor()),
        ])
    }
}

impl FromValue for TransactionWithId {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            id: take(&mut f, "id")?,
            transaction: take(&mut f, "transaction")?,
        })
    }
}

///
/// GetTransactions
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetTransactions {
    pub balance: Amount,
    pub transactions: Vec<TransactionWithId>,
    /// Oldest transaction id the index holds for this account.
    pub oldest_tx_id: Option<Nat>,
}

impl Typed for GetTransactions {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("balance", Descriptor::Nat),
            ("transactions", <Vec<TransactionWithId>>::descriptor()),
            ("oldest_tx_id", opt::<Nat>()),
        ])
    }
}

impl FromValue for GetTransactions {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            balance: take(&mut f, "balance")?,
            transactions: take(&mut f, "transactions")?,
            oldest_tx_id: take_opt(&mut f, "oldest_tx_id")?,
        })
    }
}

/// `variant { Ok : GetTransactions; Err : record { message : text } }`
#[must_use]
pub fn get_transactions_result() -> Descriptor {
    Descriptor::variant([
        ("Ok", GetTransactions::descriptor()),
        ("Err", Descriptor::record([("message", Descriptor::Text)])),
    ])
}

/// Splits the index reply into the page or the index's error message.
pub fn read_get_transactions_result(
    value: Value,
) -> Result<Result<GetTransactions, String>, DecodingError> {
    let (tag, payload) = value.into_variant()?;

    match tag.to_string().as_str() {
        "Ok" => GetTransactions::from_value(payload).map(Ok),
        "Err" => {
            let mut f = payload.into_fields()?;
            Ok(Err(take::<String>(&mut f, "message")?))
        }
        other => Err(DecodingError::UnknownVariant(other.to_string())),
    }
}

///
/// GetBlocksResponse
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetBlocksResponse {
    pub chain_length: u64,
    pub blocks: Vec<Vec<u8>>,
}

impl Typed for GetBlocksResponse {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("chain_length", Descriptor::Nat64),
            ("blocks", Descriptor::vec(Descriptor::Blob)),
        ])
    }
}

impl FromValue for GetBlocksResponse {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            chain_length: take(&mut f, "chain_length")?,
            blocks: f
                .take("blocks")?
                .into_vec()?
                .into_iter()
                .map(Value::into_blob)
                .collect::<Result<_, _>>()?,
        })
    }
}

///
/// Status
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Status {
    pub num_blocks_synced: u64,
}

impl Typed for Status {
    fn descriptor() -> Descriptor {
        Descriptor::record([("num_blocks_synced", Descriptor::Nat64)])
    }
}

impl FromValue for Status {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut f = value.into_fields()?;

        Ok(Self {
            num_blocks_synced: take(&mut f, "num_blocks_synced")?,
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode, encode};

    fn account(byte: u8) -> Account {
        Account::from(Principal::from_slice(&[byte; 10]))
    }

    #[test]
    fn transaction_page_decodes_with_nested_optionals() {
        let transfer = Value::record([
            ("from", account(1).to_value()),
            ("to", account(2).to_value()),
            ("amount", Value::Nat(Nat::from(50u64))),
            ("fee", Value::some(Value::Nat(Nat::from(1u64)))),
            ("memo", Value::none()),
            ("created_at_time", Value::none()),
            ("spender", Value::none()),
        ]);
        let tx = Value::record([
            ("kind", Value::Text("transfer".into())),
            ("timestamp", Value::Nat64(77)),
            ("transfer", Value::some(transfer)),
            ("mint", Value::none()),
            ("burn", Value::none()),
            ("approve", Value::none()),
        ]);
        let page = Value::variant(
            "Ok",
            Value::record([
                ("balance", Value::Nat(Nat::from(10u64))),
                (
                    "transactions",
                    Value::Vec(vec![Value::record([
                        ("id", Value::Nat(Nat::from(4u64))),
                        ("transaction", tx),
                    ])]),
                ),
                ("oldest_tx_id", Value::some(Value::Nat(Nat::from(1u64)))),
            ]),
        );

        let d = get_transactions_result();
        let bytes = encode(&d, &page).unwrap().into_bytes();
        let page = read_get_transactions_result(decode(&d, &bytes).unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(page.balance, Amount::from(10u64));
        let entry = &page.transactions[0];
        assert_eq!(entry.id, Nat::from(4u64));
        assert_eq!(entry.transaction.timestamp, Timestamp::from_nanos(77));
        let transfer = entry.transaction.transfer.as_ref().unwrap();
        assert_eq!(transfer.to, account(2));
        assert_eq!(transfer.fee, Some(Amount::from(1u64)));
        assert_eq!(page.oldest_tx_id, Some(Nat::from(1u64)));
    }

    #[test]
    fn index_error_message_is_surfaced() {
        let d = get_transactions_result();
        let value = Value::variant(
            "Err",
            Value::record([("message", Value::Text("bad account".into()))]),
        );
        let bytes = encode(&d, &value).unwrap().into_bytes();

        assert_eq!(
            read_get_transactions_result(decode(&d, &bytes).unwrap()).unwrap(),
            Err("bad account".to_string())
        );
    }

    #[test]
    fn blocks_decode_as_raw_bytes() {
        let d = GetBlocksResponse::descriptor();
        let sent = Value::record([
            ("chain_length", Value::Nat64(3)),
            (
                "blocks",
                Value::Vec(vec![Value::Blob(vec![1]), Value::Blob(vec![2, 2])]),
            ),
        ]);
        let bytes = encode(&d, &sent).unwrap().into_bytes();
        let reply = GetBlocksResponse::from_value(decode(&d, &bytes).unwrap()).unwrap();

        assert_eq!(reply.chain_length, 3);
        assert_eq!(reply.blocks, vec![vec![1], vec![2, 2]]);
    }
}
