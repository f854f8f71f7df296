//! Bridges between Rust types and descriptor/value trees.

use super::{DecodingError, Descriptor, Value};
use candid::{Nat, Principal};

///
/// Typed
/// Rust type with a fixed wire descriptor.
///

pub trait Typed {
    fn descriptor() -> Descriptor;
}

///
/// ToValue
///

pub trait ToValue: Typed {
    fn to_value(&self) -> Value;
}

///
/// FromValue
///

pub trait FromValue: Typed + Sized {
    fn from_value(value: Value) -> Result<Self, DecodingError>;
}

impl Typed for Nat {
    fn descriptor() -> Descriptor {
        Descriptor::Nat
    }
}

impl ToValue for Nat {
    fn to_value(&self) -> Value {
        Value::Nat(self.clone())
    }
}

impl FromValue for Nat {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_nat()
    }
}

impl Typed for u64 {
    fn descriptor() -> Descriptor {
        Descriptor::Nat64
    }
}

impl ToValue for u64 {
    fn to_value(&self) -> Value {
        Value::Nat64(*self)
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_nat64()
    }
}

impl Typed for String {
    fn descriptor() -> Descriptor {
        Descriptor::Text
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_text()
    }
}

impl Typed for Principal {
    fn descriptor() -> Descriptor {
        Descriptor::Principal
    }
}

impl ToValue for Principal {
    fn to_value(&self) -> Value {
        Value::Principal(*self)
    }
}

impl FromValue for Principal {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_principal()
    }
}

impl<T: Typed> Typed for Option<T> {
    fn descriptor() -> Descriptor {
        Descriptor::opt(T::descriptor())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        Value::Opt(self.as_ref().map(|v| Box::new(v.to_value())))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_opt()?.map(T::from_value).transpose()
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::vec(T::descriptor())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Vec(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.into_vec()?.into_iter().map(T::from_value).collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode, encode};

    #[test]
    fn option_of_vec_round_trips_through_the_codec() {
        let values: Option<Vec<u64>> = Some(vec![3, 1, 2]);
        let d = <Option<Vec<u64>>>::descriptor();
        assert_eq!(d.to_string(), "opt vec nat64");

        let bytes = encode(&d, &values.to_value()).unwrap().into_bytes();
        let back = <Option<Vec<u64>>>::from_value(decode(&d, &bytes).unwrap()).unwrap();
        assert_eq!(back, values);
    }
}
