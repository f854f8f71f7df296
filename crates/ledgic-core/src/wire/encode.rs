use super::{
    DecodingError, Descriptor, EncodingError, MAGIC, Value, decode_args,
    descriptor::sorted_fields,
    leb128::{write_signed, write_unsigned},
    opcode,
};
use candid::{Int, Nat, Principal};
use num_bigint::{BigInt, Sign};

///
/// EncodedArgument
/// Wire bytes together with the descriptors that produced them.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedArgument {
    bytes: Vec<u8>,
    descriptors: Vec<Descriptor>,
}

impl EncodedArgument {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decodes the buffer against its own descriptors.
    pub fn decode(&self) -> Result<Vec<Value>, DecodingError> {
        decode_args(&self.descriptors, &self.bytes)
    }
}

/// Encodes a single argument.
pub fn encode(descriptor: &Descriptor, value: &Value) -> Result<EncodedArgument, EncodingError> {
    encode_args(std::slice::from_ref(descriptor), std::slice::from_ref(value))
}

/// Encodes an argument tuple; `descriptors` and `values` pair up by position.
pub fn encode_args(
    descriptors: &[Descriptor],
    values: &[Value],
) -> Result<EncodedArgument, EncodingError> {
    if descriptors.len() != values.len() {
        return Err(EncodingError::ArityMismatch {
            expected: descriptors.len(),
            found: values.len(),
        });
    }

    let mut table = TypeTable::default();
    let refs = descriptors
        .iter()
        .map(|d| table.type_ref(d))
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = Vec::new();
    for (descriptor, value) in descriptors.iter().zip(values) {
        write_value(&mut body, descriptor, value)?;
    }

    let mut bytes = Vec::with_capacity(MAGIC.len() + body.len() + 16);
    bytes.extend_from_slice(MAGIC);
    write_unsigned(&mut bytes, table.entries.len() as u64);
    for entry in &table.entries {
        bytes.extend_from_slice(entry);
    }
    write_unsigned(&mut bytes, refs.len() as u64);
    for r in refs {
        write_signed(&mut bytes, r);
    }
    bytes.extend_from_slice(&body);

    Ok(EncodedArgument {
        bytes,
        descriptors: descriptors.to_vec(),
    })
}

///
/// TypeTable
/// Compound types, structurally de-duplicated.
///

#[derive(Default)]
struct TypeTable {
    seen: Vec<Descriptor>,
    entries: Vec<Vec<u8>>,
}

impl TypeTable {
    #[allow(clippy::cast_possible_wrap)]
    fn type_ref(&mut self, descriptor: &Descriptor) -> Result<i64, EncodingError> {
        if let Some(op) = descriptor.primitive_opcode() {
            return Ok(op);
        }
        if let Some(index) = self.seen.iter().position(|d| d == descriptor) {
            return Ok(index as i64);
        }

        let mut entry = Vec::new();
        match descriptor {
            Descriptor::Blob => {
                write_signed(&mut entry, opcode::VEC);
                write_signed(&mut entry, opcode::NAT8);
            }
            Descriptor::Opt(inner) => {
                let r = self.type_ref(inner)?;
                write_signed(&mut entry, opcode::OPT);
                write_signed(&mut entry, r);
            }
            Descriptor::Vec(inner) => {
                let r = self.type_ref(inner)?;
                write_signed(&mut entry, opcode::VEC);
                write_signed(&mut entry, r);
            }
            Descriptor::Record(fields) | Descriptor::Variant(fields) => {
                let sorted = sorted_fields(fields)?;
                let mut field_refs = Vec::with_capacity(sorted.len());
                for field in &sorted {
                    field_refs.push((field.label.id(), self.type_ref(&field.ty)?));
                }

                let op = if matches!(descriptor, Descriptor::Record(_)) {
                    opcode::RECORD
                } else {
                    opcode::VARIANT
                };
                write_signed(&mut entry, op);
                write_unsigned(&mut entry, field_refs.len() as u64);
                for (id, r) in field_refs {
                    write_unsigned(&mut entry, u64::from(id));
                    write_signed(&mut entry, r);
                }
            }
            _ => unreachable!("primitive descriptors are handled above"),
        }

        self.seen.push(descriptor.clone());
        self.entries.push(entry);

        Ok((self.entries.len() - 1) as i64)
    }
}

fn write_value(out: &mut Vec<u8>, descriptor: &Descriptor, value: &Value) -> Result<(), EncodingError> {
    let mismatch = || EncodingError::Mismatch {
        expected: descriptor.kind(),
        found: value.kind(),
    };

    match descriptor {
        Descriptor::Null => match value {
            Value::Null => Ok(()),
            _ => Err(mismatch()),
        },
        Descriptor::Reserved => match value {
            Value::Reserved | Value::Null => Ok(()),
            _ => Err(mismatch()),
        },
        Descriptor::Bool => match value {
            Value::Bool(b) => {
                out.push(u8::from(*b));
                Ok(())
            }
            _ => Err(mismatch()),
        },
        Descriptor::Nat
        | Descriptor::Int
        | Descriptor::Nat8
        | Descriptor::Nat16
        | Descriptor::Nat32
        | Descriptor::Nat64
        | Descriptor::Int8
        | Descriptor::Int16
        | Descriptor::Int32
        | Descriptor::Int64 => {
            let n = value.as_bigint().ok_or_else(mismatch)?;
            write_number(out, descriptor, n)
        }
        Descriptor::Text => match value {
            Value::Text(s) => {
                write_bytes(out, s.as_bytes());
                Ok(())
            }
            _ => Err(mismatch()),
        },
        Descriptor::Blob => match value {
            Value::Blob(bytes) => {
                write_bytes(out, bytes);
                Ok(())
            }
            Value::Vec(items) => write_items(out, &Descriptor::Nat8, items),
            _ => Err(mismatch()),
        },
        Descriptor::Principal => match value {
            Value::Principal(p) => {
                write_principal(out, p);
                Ok(())
            }
            _ => Err(mismatch()),
        },
        Descriptor::Opt(inner) => match value {
            Value::Opt(None) => {
                out.push(0);
                Ok(())
            }
            Value::Opt(Some(v)) => {
                out.push(1);
                write_value(out, inner, v)
            }
            _ => Err(mismatch()),
        },
        Descriptor::Vec(inner) => match (inner.as_ref(), value) {
            (_, Value::Vec(items)) => write_items(out, inner, items),
            (Descriptor::Nat8, Value::Blob(bytes)) => {
                write_bytes(out, bytes);
                Ok(())
            }
            _ => Err(mismatch()),
        },
        Descriptor::Record(fields) => {
            let Value::Record(values) = value else {
                return Err(mismatch());
            };

            for (i, (label, _)) in values.iter().enumerate() {
                if !fields.iter().any(|f| f.label.matches(label)) {
                    return Err(EncodingError::ExtraField(label.to_string()));
                }
                if values[..i].iter().any(|(l, _)| l.matches(label)) {
                    return Err(EncodingError::DuplicateField(label.to_string()));
                }
            }

            for field in sorted_fields(fields)? {
                let (_, v) = values
                    .iter()
                    .find(|(l, _)| l.matches(&field.label))
                    .ok_or_else(|| EncodingError::MissingField(field.label.to_string()))?;
                write_value(out, &field.ty, v)?;
            }

            Ok(())
        }
        Descriptor::Variant(tags) => {
            let Value::Variant(tag, payload) = value else {
                return Err(mismatch());
            };

            let sorted = sorted_fields(tags)?;
            let index = sorted
                .iter()
                .position(|f| f.label.matches(tag))
                .ok_or_else(|| EncodingError::UnknownVariant(tag.to_string()))?;

            write_unsigned(out, index as u64);
            write_value(out, &sorted[index].ty, payload)
        }
    }
}

fn write_items(out: &mut Vec<u8>, inner: &Descriptor, items: &[Value]) -> Result<(), EncodingError> {
    write_unsigned(out, items.len() as u64);
    for item in items {
        write_value(out, inner, item)?;
    }

    Ok(())
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_unsigned(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn write_principal(out: &mut Vec<u8>, principal: &Principal) {
    // 1 = transparent reference
    out.push(1);
    write_bytes(out, principal.as_slice());
}

fn write_number(out: &mut Vec<u8>, descriptor: &Descriptor, n: BigInt) -> Result<(), EncodingError> {
    let ty = descriptor.kind();
    let out_of_range = |n: &BigInt| EncodingError::OutOfRange {
        ty,
        value: n.to_string(),
    };

    let unsigned = matches!(
        descriptor,
        Descriptor::Nat | Descriptor::Nat8 | Descriptor::Nat16 | Descriptor::Nat32 | Descriptor::Nat64
    );
    if unsigned && n.sign() == Sign::Minus {
        return Err(EncodingError::Negative {
            ty,
            value: n.to_string(),
        });
    }

    match descriptor {
        Descriptor::Nat => {
            Nat(n.magnitude().clone())
                .encode(out)
                .map_err(|e| EncodingError::Write(e.to_string()))
        }
        Descriptor::Int => Int(n)
            .encode(out)
            .map_err(|e| EncodingError::Write(e.to_string())),
        Descriptor::Nat8 => {
            let v = u8::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.push(v);
            Ok(())
        }
        Descriptor::Nat16 => {
            let v = u16::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        Descriptor::Nat32 => {
            let v = u32::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        Descriptor::Nat64 => {
            let v = u64::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        Descriptor::Int8 => {
            let v = i8::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        Descriptor::Int16 => {
            let v = i16::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        Descriptor::Int32 => {
            let v = i32::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        Descriptor::Int64 => {
            let v = i64::try_from(&n).map_err(|_| out_of_range(&n))?;
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        _ => unreachable!("write_number is only called for numeric descriptors"),
    }
}

///
/// TESTS
///
