use crate::{spec::prelude::*, types::Int};

pub const BALANCE_OF: &str = "icrc1_balance_of";
pub const METADATA: &str = "icrc1_metadata";
pub const TRANSFER: &str = "icrc1_transfer";

pub(crate) fn transfer_errors() -> Vec<&'static str> {
    let mut tags = super::COMMON_ERRORS.to_vec();
    tags.push("BadBurn");
    tags
}

///
/// MetadataValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetadataValue {
    Nat(Nat),
    Int(Int),
    Text(String),
    Blob(Vec<u8>),
}

impl Typed for MetadataValue {
    fn descriptor() -> Descriptor {
        Descriptor::variant([
            ("Nat", Descriptor::Nat),
            ("Int", Descriptor::Int),
            ("Text", Descriptor::Text),
            ("Blob", Descriptor::Blob),
        ])
    }
}

impl FromValue for MetadataValue {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let (tag, payload) = value.into_variant()?;

        match tag.to_string().as_str() {
            "Nat" => payload.into_nat().map(Self::Nat),
            "Int" => payload.into_int().map(Self::Int),
            "Text" => payload.into_text().map(Self::Text),
            "Blob" => payload.into_blob().map(Self::Blob),
            other => Err(DecodingError::UnknownVariant(other.to_string())),
        }
    }
}

///
/// Metadata
/// `icrc1_metadata` entries in ledger order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata(pub Vec<(String, MetadataValue)>);

impl Metadata {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn nat(&self, key: &str) -> Option<&Nat> {
        match self.get(key)? {
            MetadataValue::Nat(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.text("icrc1:symbol")
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.text("icrc1:name")
    }

    /// `None` when absent or not representable as `u8`.
    #[must_use]
    pub fn decimals(&self) -> Option<u8> {
        self.nat("icrc1:decimals")
            .and_then(|n| u8::try_from(&n.0).ok())
    }

    #[must_use]
    pub fn fee(&self) -> Option<Amount> {
        self.nat("icrc1:fee").cloned().map(Amount::from)
    }
}

impl Typed for Metadata {
    fn descriptor() -> Descriptor {
        Descriptor::vec(Descriptor::tuple([
            Descriptor::Text,
            MetadataValue::descriptor(),
        ]))
    }
}

impl FromValue for Metadata {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let entries = value
            .into_vec()?
            .into_iter()
            .map(|entry| {
                let mut pair = entry.into_fields()?;
                let key = pair.take_id(0)?.into_text()?;
                let value = MetadataValue::from_value(pair.take_id(1)?)?;

                Ok((key, value))
            })
            .collect::<Result<_, DecodingError>>()?;

        Ok(Self(entries))
    }
}

///
/// TransferArg
/// `icrc1_transfer` argument.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferArg {
    pub from_subaccount: Option<Subaccount>,
    pub to: Account,
    pub amount: Amount,
    pub fee: Option<Amount>,
    pub memo: Option<MemoBytes>,
    pub created_at_time: Option<Timestamp>,
}

impl TransferArg {
    /// Transfer from the caller's default subaccount with every optional
    /// field absent.
    #[must_use]
    pub const fn new(to: Account, amount: Amount) -> Self {
        Self {
            from_subaccount: None,
            to,
            amount,
            fee: None,
            memo: None,
            created_at_time: None,
        }
    }

    #[must_use]
    pub const fn with_from_subaccount(mut self, subaccount: Subaccount) -> Self {
        self.from_subaccount = Some(subaccount);
        self
    }

    #[must_use]
    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = Some(fee);
        self
    }

    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<MemoBytes>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Sets the deduplication timestamp.
    #[must_use]
    pub const fn with_created_at_time(mut self, at: Timestamp) -> Self {
        self.created_at_time = Some(at);
        self
    }
}

impl Typed for TransferArg {
    fn descriptor() -> Descriptor {
        Descriptor::record([
            ("from_subaccount", Descriptor::opt(Descriptor::Blob)),
            ("to", Account::descriptor()),
            ("amount", Descriptor::Nat),
            ("fee", Descriptor::opt(Descriptor::Nat)),
            ("memo", Descriptor::opt(Descriptor::Blob)),
            ("created_at_time", Descriptor::opt(Descriptor::Nat64)),
        ])
    }
}

impl ToValue for TransferArg {
    fn to_value(&self) -> Value {
        Value::record([
            (
                "from_subaccount",
                super::opt_blob(self.from_subaccount.as_ref().map(<[u8; 32]>::as_slice)),
            ),
            ("to", self.to.to_value()),
            ("amount", self.amount.to_value()),
            ("fee", self.fee.to_value()),
            ("memo", self.memo.to_value()),
            ("created_at_time", self.created_at_time.to_value()),
        ])
    }
}

/// `variant { Ok : nat; Err : TransferError }`
#[must_use]
pub fn transfer_result() -> Descriptor {
    super::block_index_result(&transfer_errors())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode, encode};

    #[test]
    fn metadata_accessors_read_typed_entries() {
        let raw = Value::Vec(vec![
            Value::tuple([
                Value::Text("icrc1:symbol".into()),
                Value::variant("Text", Value::Text("ICP".into())),
            ]),
            Value::tuple([
                Value::Text("icrc1:decimals".into()),
                Value::variant("Nat", Value::Nat(Nat::from(8u64))),
            ]),
            Value::tuple([
                Value::Text("icrc1:fee".into()),
                Value::variant("Nat", Value::Nat(Nat::from(10_000u64))),
            ]),
        ]);
        let d = Metadata::descriptor();
        let bytes = encode(&d, &raw).unwrap().into_bytes();
        let metadata = Metadata::from_value(decode(&d, &bytes).unwrap()).unwrap();

        assert_eq!(metadata.symbol(), Some("ICP"));
        assert_eq!(metadata.decimals(), Some(8));
        assert_eq!(metadata.fee(), Some(Amount::from(10_000u64)));
        assert_eq!(metadata.name(), None);
    }

    #[test]
    fn absent_optionals_encode_as_empty_opt() {
        let arg = TransferArg {
            from_subaccount: None,
            to: Account::from(Principal::anonymous()),
            amount: Amount::from(5u64),
            fee: None,
            memo: None,
            created_at_time: None,
        };

        let value = arg.to_value();
        let mut fields = value.clone().into_fields().unwrap();
        assert_eq!(fields.take("fee").unwrap(), Value::none());
        assert_eq!(fields.take("memo").unwrap(), Value::none());
        assert!(encode(&TransferArg::descriptor(), &value).is_ok());
    }

    #[test]
    fn transfer_result_declares_bad_burn() {
        let text = transfer_result().to_string();
        assert!(text.contains("BadBurn : record { min_burn_amount : nat }"));
        assert!(text.starts_with("variant { Ok : nat; Err : variant {"));
    }
}
