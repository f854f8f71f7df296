use crate::spec::{opt_blob, prelude::*};

pub const ALLOWANCE: &str = "icrc2_allowance";
pub const APPROVE: &str = "icrc2_approve";
pub const TRANSFER_FROM: &str = "icrc2_transfer_from";

pub(crate) fn approve_errors() -> Vec<&'static str> {
    let mut tags = super::COMMON_ERRORS.to_vec();
    tags.extend(["AllowanceChanged", "Expired"]);
    tags
}

pub(crate) fn transfer_from_errors() -> Vec<&'static str> {
    let mut tags = super::COMMON_ERRORS.to_vec();
    tags.extend(["BadBurn", "InsufficientAllowance"]);
    tags
}

///
/// ApproveArgs
///
/// `icrc2_approve` argument. `fee` is declared `opt blob` on this method,
/// unlike the `opt nat` of `icrc1_transfer`; the bytes are sent as given.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApproveArgs {
    pub spender: Account,
    pub amount: Amount,
    pub fee: Option<Vec<u8>>,
    pub memo: Option<MemoBytes>,
    pub from_subaccount: Option<Subaccount>,
    pub created_at_time: Option<Timestamp>,
    pub expected_allowance: Option<Amount>,
    pub expires_at: Option<Timestamp>,
}

impl ApproveArgs {
    #[must_use]
    pub const fn new(spender: Account, amount: Amount) -> Self {
        Self {
            spender,
            amount,
            fee: None,
            memo: None,
            from_subaccount: None,
            created_at_time: None,
            expected_allowance: None,
            expires_at: None,
        }
    }

    /// Compare-and-set: the ledger rejects the approval unless the current
    /// allowance equals `current`.
    #[must_use]
    pub fn with_expected_allowance(mut self, current: Amount) -> Self {
        self.expected_allowance = Some(current);
        self
    }

    #[must_use]
    pub const fn with_expires_at(mut self, at: Timestamp) -> Self {
        self.expires_at = Some(at);
        self
    }

    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<MemoBytes>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub const fn with_created_at_time(mut self, at: Timestamp) -> Self {
        self.created_at_time = Some(at);
        self
    }
}

impl Typed for ApproveArgs {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("spender", Account::descriptor()),
            ("amount", Descriptor::Nat),
            ("fee", Descriptor::opt(Descriptor::Blob)),
            ("memo", Descriptor::opt(Descriptor::Blob)),
            ("from_subaccount", Descriptor::opt(Descriptor::Blob)),
            ("created_at_time", Descriptor::opt(Descriptor::Nat64)),
            ("expected_allowance", Descriptor::opt(Descriptor::Nat)),
            ("expires_at", Descriptor::opt(Descriptor::Nat64)),
        ])
    }
}

impl ToValue for ApproveArgs {
    fn to_value(&self) -> Value {
        Value::record([
            ("spender", self.spender.to_value()),
            ("amount", self.amount.to_value()),
            ("fee", opt_blob(self.fee.as_deref())),
            ("memo", self.memo.to_value()),
            (
                "from_subaccount",
                opt_blob(self.from_subaccount.as_ref().map(<[u8; 32]>::as_slice)),
            ),
            ("created_at_time", self.created_at_time.to_value()),
            ("expected_allowance", self.expected_allowance.to_value()),
            ("expires_at", self.expires_at.to_value()),
        ])
    }
}

///
/// TransferFromArgs
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferFromArgs {
    pub from: Account,
    pub to: Account,
    pub amount: Amount,
    pub fee: Option<Vec<u8>>,
    pub memo: Option<MemoBytes>,
    pub created_at_time: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
}

impl TransferFromArgs {
    #[must_use]
    pub const fn new(from: Account, to: Account, amount: Amount) -> Self {
        Self {
            from,
            to,
            amount,
            fee: None,
            memo: None,
            created_at_time: None,
            expires_at: None,
        }
    }

    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<MemoBytes>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub const fn with_created_at_time(mut self, at: Timestamp) -> Self {
        self.created_at_time = Some(at);
        self
    }
}

impl Typed for TransferFromArgs {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("from", Account::descriptor()),
            ("to", Account::descriptor()),
            ("amount", Descriptor::Nat),
            ("fee", Descriptor::opt(Descriptor::Blob)),
            ("memo", Descriptor::opt(Descriptor::Blob)),
            ("created_at_time", Descriptor::opt(Descriptor::Nat64)),
            ("expires_at", Descriptor::opt(Descriptor::Nat64)),
        ])
    }
}

impl ToValue for TransferFromArgs {
    fn to_value(&self) -> Value {
        Value::record([
            ("from", self.from.to_value()),
            ("to", self.to.to_value()),
            ("amount", self.amount.to_value()),
            ("fee", opt_blob(self.fee.as_deref())),
            ("memo", self.memo.to_value()),
            ("created_at_time", self.created_at_time.to_value()),
            ("expires_at", self.expires_at.to_value()),
        ])
    }
}

///
/// AllowanceArgs
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AllowanceArgs {
    pub account: Account,
    pub spender: Account,
}

impl Typed for AllowanceArgs {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("account", Account::descriptor()),
            ("spender", Account::descriptor()),
        ])
    }
}

impl ToValue for AllowanceArgs {
    fn to_value(&self) -> Value {
        Value::record([
            ("account", self.account.to_value()),
            ("spender", self.spender.to_value()),
        ])
    }
}

///
/// Allowance
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Allowance {
    pub allowance: Amount,
    pub expires_at: Option<Timestamp>,
}

impl Typed for Allowance {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("allowance", Descriptor::Nat),
            ("expires_at", Descriptor::opt(Descriptor::Nat64)),
        ])
    }
}

impl ToValue for Allowance {
    fn to_value(&self) -> Value {
        Value::record([
            ("allowance", self.allowance.to_value()),
            ("expires_at", self.expires_at.to_value()),
        ])
    }
}

impl FromValue for Allowance {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let mut fields = value.into_fields()?;

        Ok(Self {
            allowance: Amount::from_value(fields.take("allowance")?)?,
            expires_at: fields.take_opt("expires_at")?.map(Timestamp::from_value).transpose()?,
        })
    }
}

#[must_use]
pub fn approve_result() -> Descriptor {
    super::block_index_result(&approve_errors())
}

#[must_use]
pub fn transfer_from_result() -> Descriptor {
    super::block_index_result(&transfer_from_errors())
}

///
/// TESTS
///
