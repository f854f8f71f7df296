use super::{DecodingError, Label};
use candid::{Int, Nat, Principal};
use num_bigint::BigInt;

///
/// Value
/// Untyped value tree encoded against, or decoded from, a `Descriptor`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Nat(Nat),
    Int(Int),
    Nat8(u8),
    Nat16(u16),
    Nat32(u32),
    Nat64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Text(String),
    Blob(Vec<u8>),
    Principal(Principal),
    Reserved,
    Opt(Option<Box<Value>>),
    Vec(Vec<Value>),
    Record(Vec<(Label, Value)>),
    Variant(Label, Box<Value>),
}

impl Value {
    #[must_use]
    pub fn some(inner: Self) -> Self {
        Self::Opt(Some(Box::new(inner)))
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::Opt(None)
    }

    /// Canonical optional: `None` becomes the zero-element encoding.
    pub fn opt<T: Into<Self>>(inner: Option<T>) -> Self {
        Self::Opt(inner.map(|v| Box::new(v.into())))
    }

    pub fn record<L: Into<Label>>(fields: impl IntoIterator<Item = (L, Self)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(label, value)| (label.into(), value))
                .collect(),
        )
    }

    pub fn tuple(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Record((0u32..).zip(items).map(|(id, v)| (Label::Id(id), v)).collect())
    }

    pub fn variant(tag: impl Into<Label>, payload: Self) -> Self {
        Self::Variant(tag.into(), Box::new(payload))
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Nat(_) => "nat",
            Self::Int(_) => "int",
            Self::Nat8(_) => "nat8",
            Self::Nat16(_) => "nat16",
            Self::Nat32(_) => "nat32",
            Self::Nat64(_) => "nat64",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Principal(_) => "principal",
            Self::Reserved => "reserved",
            Self::Opt(_) => "opt",
            Self::Vec(_) => "vec",
            Self::Record(_) => "record",
            Self::Variant(..) => "variant",
        }
    }

    /// Any numeric value as a signed big integer.
    #[must_use]
    pub fn as_bigint(&self) -> Option<BigInt> {
        let n = match self {
            Self::Nat(n) => BigInt::from(n.0.clone()),
            Self::Int(i) => i.0.clone(),
            Self::Nat8(v) => BigInt::from(*v),
            Self::Nat16(v) => BigInt::from(*v),
            Self::Nat32(v) => BigInt::from(*v),
            Self::Nat64(v) => BigInt::from(*v),
            Self::Int8(v) => BigInt::from(*v),
            Self::Int16(v) => BigInt::from(*v),
            Self::Int32(v) => BigInt::from(*v),
            Self::Int64(v) => BigInt::from(*v),
            _ => return None,
        };

        Some(n)
    }

    //
    // typed accessors for decoded replies
    //

    const fn mismatch(&self, expected: &'static str) -> DecodingError {
        DecodingError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn into_nat(self) -> Result<Nat, DecodingError> {
        match self {
            Self::Nat(n) => Ok(n),
            Self::Nat64(v) => Ok(Nat::from(v)),
            other => Err(other.mismatch("nat")),
        }
    }

    pub fn into_int(self) -> Result<Int, DecodingError> {
        match self {
            Self::Int(i) => Ok(i),
            Self::Nat(n) => Ok(Int(BigInt::from(n.0))),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn into_nat64(self) -> Result<u64, DecodingError> {
        match self {
            Self::Nat64(v) => Ok(v),
            other => Err(other.mismatch("nat64")),
        }
    }

    pub fn into_bool(self) -> Result<bool, DecodingError> {
        match self {
            Self::Bool(b) => Ok(b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn into_text(self) -> Result<String, DecodingError> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn into_blob(self) -> Result<Vec<u8>, DecodingError> {
        match self {
            Self::Blob(bytes) => Ok(bytes),
            other => Err(other.mismatch("blob")),
        }
    }

    pub fn into_principal(self) -> Result<Principal, DecodingError> {
        match self {
            Self::Principal(p) => Ok(p),
            other => Err(other.mismatch("principal")),
        }
    }

    pub fn into_opt(self) -> Result<Option<Self>, DecodingError> {
        match self {
            Self::Opt(inner) => Ok(inner.map(|v| *v)),
            other => Err(other.mismatch("opt")),
        }
    }

    pub fn into_vec(self) -> Result<Vec<Self>, DecodingError> {
        match self {
            Self::Vec(items) => Ok(items),
            other => Err(other.mismatch("vec")),
        }
    }

    pub fn into_fields(self) -> Result<Fields, DecodingError> {
        match self {
            Self::Record(fields) => Ok(Fields(fields)),
            other => Err(other.mismatch("record")),
        }
    }

    pub fn into_variant(self) -> Result<(Label, Self), DecodingError> {
        match self {
            Self::Variant(tag, payload) => Ok((tag, *payload)),
            other => Err(other.mismatch("variant")),
        }
    }
}

impl From<Nat> for Value {
    fn from(n: Nat) -> Self {
        Self::Nat(n)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Nat64(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Blob(bytes)
    }
}

impl From<Principal> for Value {
    fn from(p: Principal) -> Self {
        Self::Principal(p)
    }
}

///
/// Fields
/// Decoded record fields, consumed by label.
///

#[derive(Debug)]
pub struct Fields(Vec<(Label, Value)>);

impl Fields {
    /// Removes and returns the field with the given name.
    pub fn take(&mut self, name: &str) -> Result<Value, DecodingError> {
        let label = Label::from(name);
        let pos = self
            .0
            .iter()
            .position(|(l, _)| l.matches(&label))
            .ok_or_else(|| DecodingError::MissingField(name.to_string()))?;

        Ok(self.0.swap_remove(pos).1)
    }

    /// Tuple position accessor.
    pub fn take_id(&mut self, id: u32) -> Result<Value, DecodingError> {
        let label = Label::Id(id);
        let pos = self
            .0
            .iter()
            .position(|(l, _)| l.matches(&label))
            .ok_or_else(|| DecodingError::MissingField(id.to_string()))?;

        Ok(self.0.swap_remove(pos).1)
    }

    /// Optional field; an absent field and a zero-element `opt` both read as `None`.
    pub fn take_opt(&mut self, name: &str) -> Result<Option<Value>, DecodingError> {
        match self.take(name) {
            Ok(value) => value.into_opt(),
            Err(DecodingError::MissingField(_)) => Ok(None),
            Err(err) => Err(err),
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
    fn opt_maps_none_to_empty_sequence() {
        assert_eq!(Value::opt(None::<u64>), Value::Opt(None));
        assert_eq!(Value::opt(Some(5u64)), Value::some(Value::Nat64(5)));
    }

    #[test]
    fn accessors_report_the_found_kind() {
        let err = Value::Text("x".into()).into_nat().unwrap_err();
        assert_eq!(
            err,
            DecodingError::TypeMismatch {
                expected: "nat",
                found: "text"
            }
        );
    }

    #[test]
    fn fields_take_by_name_and_position() {
        let mut record = Value::record([("amount", Value::Nat(Nat::from(3u64)))])
            .into_fields()
            .unwrap();
        assert_eq!(record.take("amount").unwrap(), Value::Nat(Nat::from(3u64)));
        assert!(matches!(
            record.take("amount"),
            Err(DecodingError::MissingField(_))
        ));
        assert_eq!(record.take_opt("memo").unwrap(), None);

        let mut pair = Value::tuple([Value::Text("icrc1:symbol".into()), Value::Null])
            .into_fields()
            .unwrap();
        assert_eq!(pair.take_id(1).unwrap(), Value::Null);
    }

    #[test]
    fn numeric_values_widen_to_bigint() {
        assert_eq!(Value::Int8(-3).as_bigint(), Some(BigInt::from(-3)));
        assert_eq!(
            Value::Nat(Nat::from(u64::MAX)).as_bigint(),
            Some(BigInt::from(u64::MAX))
        );
        assert_eq!(Value::Text(String::new()).as_bigint(), None);
    }
}
