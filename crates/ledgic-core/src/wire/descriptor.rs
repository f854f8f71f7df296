use super::{EncodingError, opcode};
use std::fmt::{self, Display};

///
/// Label
/// Record field or variant tag. Names hash to their 32-bit wire id; tuple
/// positions use the id directly.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Label {
    Named(String),
    Id(u32),
}

impl Label {
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            Self::Named(name) => candid::idl_hash(name),
            Self::Id(id) => *id,
        }
    }

    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<u32> for Label {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

///
/// Field
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub label: Label,
    pub ty: Descriptor,
}

impl Field {
    pub fn new(label: impl Into<Label>, ty: Descriptor) -> Self {
        Self {
            label: label.into(),
            ty,
        }
    }
}

///
/// Descriptor
/// Declared type of one argument or result value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Descriptor {
    Null,
    Bool,
    Nat,
    Int,
    Nat8,
    Nat16,
    Nat32,
    Nat64,
    Int8,
    Int16,
    Int32,
    Int64,
    Text,
    Blob,
    Principal,
    Reserved,
    Opt(Box<Descriptor>),
    Vec(Box<Descriptor>),
    Record(Vec<Field>),
    Variant(Vec<Field>),
}

impl Descriptor {
    #[must_use]
    pub fn opt(inner: Self) -> Self {
        Self::Opt(Box::new(inner))
    }

    #[must_use]
    pub fn vec(inner: Self) -> Self {
        Self::Vec(Box::new(inner))
    }

    pub fn record<L: Into<Label>>(fields: impl IntoIterator<Item = (L, Self)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(label, ty)| Field::new(label, ty))
                .collect(),
        )
    }

    /// Record with positional fields `0..n`.
    pub fn tuple(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Record(
            (0u32..)
                .zip(items)
                .map(|(id, ty)| Field::new(id, ty))
                .collect(),
        )
    }

    pub fn variant<L: Into<Label>>(tags: impl IntoIterator<Item = (L, Self)>) -> Self {
        Self::Variant(
            tags.into_iter()
                .map(|(label, ty)| Field::new(label, ty))
                .collect(),
        )
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Nat => "nat",
            Self::Int => "int",
            Self::Nat8 => "nat8",
            Self::Nat16 => "nat16",
            Self::Nat32 => "nat32",
            Self::Nat64 => "nat64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Principal => "principal",
            Self::Reserved => "reserved",
            Self::Opt(_) => "opt",
            Self::Vec(_) => "vec",
            Self::Record(_) => "record",
            Self::Variant(_) => "variant",
        }
    }

    /// Opcode for types that live inline in the argument list rather than
    /// in the type table.
    pub(crate) const fn primitive_opcode(&self) -> Option<i64> {
        let op = match self {
            Self::Null => opcode::NULL,
            Self::Bool => opcode::BOOL,
            Self::Nat => opcode::NAT,
            Self::Int => opcode::INT,
            Self::Nat8 => opcode::NAT8,
            Self::Nat16 => opcode::NAT16,
            Self::Nat32 => opcode::NAT32,
            Self::Nat64 => opcode::NAT64,
            Self::Int8 => opcode::INT8,
            Self::Int16 => opcode::INT16,
            Self::Int32 => opcode::INT32,
            Self::Int64 => opcode::INT64,
            Self::Text => opcode::TEXT,
            Self::Principal => opcode::PRINCIPAL,
            Self::Reserved => opcode::RESERVED,
            Self::Blob | Self::Opt(_) | Self::Vec(_) | Self::Record(_) | Self::Variant(_) => {
                return None;
            }
        };

        Some(op)
    }
}

/// Fields in wire order (ascending label id), rejecting duplicate ids.
pub(crate) fn sorted_fields(fields: &[Field]) -> Result<Vec<&Field>, EncodingError> {
    let mut sorted: Vec<&Field> = fields.iter().collect();
    sorted.sort_by_key(|field| field.label.id());

    for pair in sorted.windows(2) {
        if pair[0].label.id() == pair[1].label.id() {
            return Err(EncodingError::DuplicateField(pair[1].label.to_string()));
        }
    }

    Ok(sorted)
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = |f: &mut fmt::Formatter<'_>, keyword: &str, fields: &[Field]| {
            write!(f, "{keyword} {{")?;
            for (i, field) in fields.iter().enumerate() {
                let sep = if i == 0 { " " } else { "; " };
                if field.ty == Self::Null && keyword == "variant" {
                    write!(f, "{sep}{}", field.label)?;
                } else {
                    write!(f, "{sep}{} : {}", field.label, field.ty)?;
                }
            }
            if fields.is_empty() {
                write!(f, "}}")
            } else {
                write!(f, " }}")
            }
        };

        match self {
            Self::Opt(inner) => write!(f, "opt {inner}"),
            Self::Vec(inner) => write!(f, "vec {inner}"),
            Self::Record(items) => fields(f, "record", items),
            Self::Variant(items) => fields(f, "variant", items),
            other => write!(f, "{}", other.kind()),
        }
    }
}

///
/// TESTS
///
