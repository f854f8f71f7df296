use super::{
    DecodingError, Descriptor, MAGIC, Value,
    leb128::{read_byte, read_len, read_signed, read_unsigned},
    opcode,
};
use candid::{Int, Nat, Principal};
use num_bigint::BigInt;

const MAX_DEPTH: usize = 128;
const MAX_ZERO_SIZED_ITEMS: u64 = 1 << 16;
const STEPS_PER_BYTE: usize = 64;
const MIN_STEPS: usize = 1 << 18;
const PRINCIPAL_MAX_BYTES: usize = 29;

/// Decodes a single value.
pub fn decode(descriptor: &Descriptor, bytes: &[u8]) -> Result<Value, DecodingError> {
    let mut values = decode_args(std::slice::from_ref(descriptor), bytes)?;

    values.pop().ok_or(DecodingError::MissingArgument(0))
}

/// Decodes an argument tuple against the expected descriptors. Extra wire
/// arguments are skipped; absent trailing `opt` arguments decode to `None`.
pub fn decode_args(expected: &[Descriptor], bytes: &[u8]) -> Result<Vec<Value>, DecodingError> {
    let mut input = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or(DecodingError::BadMagic)?;

    let table = read_table(&mut input)?;
    let count = read_len(&mut input)?;
    let mut arg_refs = Vec::with_capacity(count);
    for _ in 0..count {
        let r = read_signed(&mut input)?;
        check_ref(r, table.len())?;
        arg_refs.push(r);
    }

    let mut decoder = Decoder {
        input,
        depth: 0,
        steps: bytes.len().saturating_mul(STEPS_PER_BYTE).max(MIN_STEPS),
        zero_sized: zero_sized_entries(&table),
    };
    let mut values = Vec::with_capacity(expected.len());
    for (i, descriptor) in expected.iter().enumerate() {
        let value = match arg_refs.get(i) {
            Some(&r) => decoder.decode_value(&table, r, descriptor)?,
            None => absent(descriptor).ok_or(DecodingError::MissingArgument(i))?,
        };
        values.push(value);
    }
    for &r in arg_refs.iter().skip(expected.len()) {
        decoder.skip(&table, r)?;
    }

    if !decoder.input.is_empty() {
        return Err(DecodingError::TrailingBytes(decoder.input.len()));
    }

    Ok(values)
}

/// Value for an expected slot the wire does not carry at all.
fn absent(descriptor: &Descriptor) -> Option<Value> {
    match descriptor {
        Descriptor::Opt(_) => Some(Value::none()),
        Descriptor::Reserved => Some(Value::Reserved),
        _ => None,
    }
}

///
/// WireType
/// Compound entry of the received type table.
///

#[derive(Clone, Debug)]
enum WireType {
    Opt(i64),
    Vec(i64),
    Record(Vec<(u32, i64)>),
    Variant(Vec<(u32, i64)>),
    Func,
    Service,
}

const fn is_primitive(op: i64) -> bool {
    matches!(op, opcode::EMPTY..=opcode::NULL | opcode::PRINCIPAL)
}

fn check_ref(r: i64, table_len: usize) -> Result<(), DecodingError> {
    let valid = if r >= 0 {
        usize::try_from(r).is_ok_and(|i| i < table_len)
    } else {
        is_primitive(r)
    };

    if valid {
        Ok(())
    } else {
        Err(DecodingError::Malformed(format!("invalid type reference {r}")))
    }
}

fn read_table(input: &mut &[u8]) -> Result<Vec<WireType>, DecodingError> {
    let len = read_len(input)?;
    let mut table = Vec::with_capacity(len);

    for _ in 0..len {
        let entry = match read_signed(input)? {
            opcode::OPT => WireType::Opt(read_signed(input)?),
            opcode::VEC => WireType::Vec(read_signed(input)?),
            op @ (opcode::RECORD | opcode::VARIANT) => {
                let count = read_len(input)?;
                let mut fields: Vec<(u32, i64)> = Vec::with_capacity(count);
                for _ in 0..count {
                    let id = u32::try_from(read_unsigned(input)?)
                        .map_err(|_| DecodingError::Malformed("field id exceeds u32".into()))?;
                    if fields.last().is_some_and(|&(prev, _)| prev >= id) {
                        return Err(DecodingError::Malformed(
                            "field ids are not strictly increasing".into(),
                        ));
                    }
                    fields.push((id, read_signed(input)?));
                }
                if op == opcode::RECORD {
                    WireType::Record(fields)
                } else {
                    WireType::Variant(fields)
                }
            }
            opcode::FUNC => {
                for _ in 0..2 {
                    let count = read_len(input)?;
                    for _ in 0..count {
                        read_signed(input)?;
                    }
                }
                let annotations = read_len(input)?;
                *input = &input[annotations..];
                WireType::Func
            }
            opcode::SERVICE => {
                let count = read_len(input)?;
                for _ in 0..count {
                    let name_len = read_len(input)?;
                    *input = &input[name_len..];
                    read_signed(input)?;
                }
                WireType::Service
            }
            op => {
                return Err(DecodingError::Malformed(format!(
                    "unknown type opcode {op} in type table"
                )));
            }
        };
        table.push(entry);
    }

    for entry in &table {
        match entry {
            WireType::Opt(r) | WireType::Vec(r) => check_ref(*r, table.len())?,
            WireType::Record(fields) | WireType::Variant(fields) => {
                for &(_, r) in fields {
                    check_ref(r, table.len())?;
                }
            }
            WireType::Func | WireType::Service => {}
        }
    }

    Ok(table)
}

///
/// Wire
/// Resolved view of a type reference.
///

enum Wire<'t> {
    Prim(i64),
    Entry(&'t WireType),
}

fn resolve(table: &[WireType], r: i64) -> Wire<'_> {
    match usize::try_from(r) {
        Ok(index) => Wire::Entry(&table[index]),
        Err(_) => Wire::Prim(r),
    }
}

const fn prim_kind(op: i64) -> &'static str {
    match op {
        opcode::NULL => "null",
        opcode::BOOL => "bool",
        opcode::NAT => "nat",
        opcode::INT => "int",
        opcode::NAT8 => "nat8",
        opcode::NAT16 => "nat16",
        opcode::NAT32 => "nat32",
        opcode::NAT64 => "nat64",
        opcode::INT8 => "int8",
        opcode::INT16 => "int16",
        opcode::INT32 => "int32",
        opcode::INT64 => "int64",
        opcode::FLOAT32 => "float32",
        opcode::FLOAT64 => "float64",
        opcode::TEXT => "text",
        opcode::RESERVED => "reserved",
        opcode::EMPTY => "empty",
        opcode::PRINCIPAL => "principal",
        _ => "unknown",
    }
}

fn wire_kind(table: &[WireType], r: i64) -> &'static str {
    match resolve(table, r) {
        Wire::Prim(op) => prim_kind(op),
        Wire::Entry(WireType::Opt(_)) => "opt",
        Wire::Entry(WireType::Vec(_)) => "vec",
        Wire::Entry(WireType::Record(_)) => "record",
        Wire::Entry(WireType::Variant(_)) => "variant",
        Wire::Entry(WireType::Func) => "func",
        Wire::Entry(WireType::Service) => "service",
    }
}

/// Which table entries encode in zero bytes: records whose fields are all
/// `null`, `reserved` or zero-sized records. Computed once per message as
/// the greatest fixed point, in time linear in the number of fields.
fn zero_sized_entries(table: &[WireType]) -> Vec<bool> {
    let mut zero: Vec<bool> = table
        .iter()
        .map(|entry| matches!(entry, WireType::Record(_)))
        .collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); table.len()];
    let mut pending = Vec::new();

    for (i, entry) in table.iter().enumerate() {
        let WireType::Record(fields) = entry else {
            pending.push(i);
            continue;
        };
        for &(_, r) in fields {
            match usize::try_from(r) {
                Ok(j) => dependents[j].push(i),
                Err(_) if matches!(r, opcode::NULL | opcode::RESERVED) => {}
                Err(_) => zero[i] = false,
            }
        }
        if !zero[i] {
            pending.push(i);
        }
    }

    while let Some(j) = pending.pop() {
        for &i in &dependents[j] {
            if zero[i] {
                zero[i] = false;
                pending.push(i);
            }
        }
    }

    zero
}

///
/// Decoder
///

struct Decoder<'a> {
    input: &'a [u8],
    depth: usize,
    /// Remaining value visits, decoded or skipped.
    steps: usize,
    zero_sized: Vec<bool>,
}

impl<'a> Decoder<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodingError> {
        if self.input.len() < n {
            return Err(DecodingError::Truncated);
        }
        let (head, rest) = self.input.split_at(n);
        self.input = rest;

        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodingError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);

        Ok(out)
    }

    fn flag(&mut self) -> Result<bool, DecodingError> {
        match read_byte(&mut self.input)? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(DecodingError::Malformed(format!("invalid flag byte {b:#04x}"))),
        }
    }

    fn big_error(&self, err: &candid::Error) -> DecodingError {
        if self.input.is_empty() {
            DecodingError::Truncated
        } else {
            DecodingError::Malformed(err.to_string())
        }
    }

    fn nat(&mut self) -> Result<Nat, DecodingError> {
        Nat::decode(&mut self.input).map_err(|e| self.big_error(&e))
    }

    fn int(&mut self) -> Result<Int, DecodingError> {
        Int::decode(&mut self.input).map_err(|e| self.big_error(&e))
    }

    fn bytes(&mut self) -> Result<&'a [u8], DecodingError> {
        let len = read_len(&mut self.input)?;

        self.take(len)
    }

    fn text(&mut self) -> Result<String, DecodingError> {
        let bytes = self.bytes()?;

        String::from_utf8(bytes.to_vec())
            .map_err(|_| DecodingError::Malformed("text is not valid utf-8".into()))
    }

    fn principal(&mut self) -> Result<Principal, DecodingError> {
        if !self.flag()? {
            return Err(DecodingError::Unsupported("opaque principal reference"));
        }
        let bytes = self.bytes()?;
        if bytes.len() > PRINCIPAL_MAX_BYTES {
            return Err(DecodingError::Malformed(format!(
                "principal is {} bytes, at most {PRINCIPAL_MAX_BYTES} allowed",
                bytes.len()
            )));
        }

        Principal::try_from_slice(bytes).map_err(|e| DecodingError::Malformed(e.to_string()))
    }

    fn item_count(&mut self, table: &[WireType], item: i64) -> Result<u64, DecodingError> {
        let count = read_unsigned(&mut self.input)?;

        let zero_sized = match resolve(table, item) {
            Wire::Prim(op) => matches!(op, opcode::NULL | opcode::RESERVED),
            Wire::Entry(_) => usize::try_from(item).is_ok_and(|i| self.zero_sized[i]),
        };
        if zero_sized {
            if count > MAX_ZERO_SIZED_ITEMS {
                return Err(DecodingError::Malformed(format!(
                    "vector of {count} zero-sized items"
                )));
            }
        } else if count > self.input.len() as u64 {
            return Err(DecodingError::Truncated);
        }

        Ok(count)
    }

    fn enter(&mut self) -> Result<(), DecodingError> {
        self.steps = self.steps.checked_sub(1).ok_or_else(|| {
            DecodingError::Malformed("message exceeds the decoding work budget".into())
        })?;
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(DecodingError::Malformed("value nesting too deep".into()));
        }

        Ok(())
    }

    fn decode_value(
        &mut self,
        table: &[WireType],
        r: i64,
        expected: &Descriptor,
    ) -> Result<Value, DecodingError> {
        self.enter()?;
        let value = self.decode_inner(table, r, expected)?;
        self.depth -= 1;

        Ok(value)
    }

    #[allow(clippy::too_many_lines)]
    fn decode_inner(
        &mut self,
        table: &[WireType],
        r: i64,
        expected: &Descriptor,
    ) -> Result<Value, DecodingError> {
        let wire = resolve(table, r);

        let value = match (expected, wire) {
            (Descriptor::Reserved, _) => {
                self.skip(table, r)?;
                Value::Reserved
            }

            (Descriptor::Opt(inner), wire) => match wire {
                Wire::Prim(opcode::NULL | opcode::RESERVED) => Value::none(),
                Wire::Entry(WireType::Opt(inner_ref)) => {
                    if self.flag()? {
                        Value::some(self.decode_value(table, *inner_ref, inner)?)
                    } else {
                        Value::none()
                    }
                }
                _ => Value::some(self.decode_value(table, r, inner)?),
            },

            (Descriptor::Null, Wire::Prim(opcode::NULL)) => Value::Null,
            (Descriptor::Bool, Wire::Prim(opcode::BOOL)) => Value::Bool(self.flag()?),
            (Descriptor::Nat, Wire::Prim(opcode::NAT)) => Value::Nat(self.nat()?),
            (Descriptor::Int, Wire::Prim(opcode::INT)) => Value::Int(self.int()?),
            (Descriptor::Int, Wire::Prim(opcode::NAT)) => {
                Value::Int(Int(BigInt::from(self.nat()?.0)))
            }
            (Descriptor::Nat8, Wire::Prim(opcode::NAT8)) => {
                Value::Nat8(read_byte(&mut self.input)?)
            }
            (Descriptor::Nat16, Wire::Prim(opcode::NAT16)) => {
                Value::Nat16(u16::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Nat32, Wire::Prim(opcode::NAT32)) => {
                Value::Nat32(u32::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Nat64, Wire::Prim(opcode::NAT64)) => {
                Value::Nat64(u64::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Int8, Wire::Prim(opcode::INT8)) => {
                Value::Int8(i8::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Int16, Wire::Prim(opcode::INT16)) => {
                Value::Int16(i16::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Int32, Wire::Prim(opcode::INT32)) => {
                Value::Int32(i32::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Int64, Wire::Prim(opcode::INT64)) => {
                Value::Int64(i64::from_le_bytes(self.take_array()?))
            }
            (Descriptor::Text, Wire::Prim(opcode::TEXT)) => Value::Text(self.text()?),
            (Descriptor::Principal, Wire::Prim(opcode::PRINCIPAL)) => {
                Value::Principal(self.principal()?)
            }

            (Descriptor::Blob, Wire::Entry(WireType::Vec(opcode::NAT8))) => {
                Value::Blob(self.bytes()?.to_vec())
            }

            (Descriptor::Vec(inner), Wire::Entry(WireType::Vec(item))) => {
                let item = *item;
                let count = self.item_count(table, item)?;
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(self.decode_value(table, item, inner)?);
                }
                Value::Vec(items)
            }

            (Descriptor::Record(fields), Wire::Entry(WireType::Record(wire_fields))) => {
                let mut slots: Vec<Option<Value>> = vec![None; fields.len()];
                for &(id, field_ref) in wire_fields {
                    match fields.iter().position(|f| f.label.id() == id) {
                        Some(pos) => {
                            slots[pos] =
                                Some(self.decode_value(table, field_ref, &fields[pos].ty)?);
                        }
                        None => self.skip(table, field_ref)?,
                    }
                }

                let mut out = Vec::with_capacity(fields.len());
                for (field, slot) in fields.iter().zip(slots) {
                    let value = match slot {
                        Some(value) => value,
                        None => absent(&field.ty)
                            .ok_or_else(|| DecodingError::MissingField(field.label.to_string()))?,
                    };
                    out.push((field.label.clone(), value));
                }
                Value::Record(out)
            }

            (Descriptor::Variant(tags), Wire::Entry(WireType::Variant(wire_tags))) => {
                let index = read_unsigned(&mut self.input)?;
                let &(id, tag_ref) = usize::try_from(index)
                    .ok()
                    .and_then(|i| wire_tags.get(i))
                    .ok_or_else(|| {
                        DecodingError::Malformed(format!("variant index {index} out of range"))
                    })?;
                let tag = tags
                    .iter()
                    .find(|t| t.label.id() == id)
                    .ok_or_else(|| DecodingError::UnknownVariant(id.to_string()))?;

                Value::Variant(
                    tag.label.clone(),
                    Box::new(self.decode_value(table, tag_ref, &tag.ty)?),
                )
            }

            (expected, _) => {
                return Err(DecodingError::TypeMismatch {
                    expected: expected.kind(),
                    found: wire_kind(table, r),
                });
            }
        };

        Ok(value)
    }

    /// Consumes a value of wire type `r` without materializing it.
    fn skip(&mut self, table: &[WireType], r: i64) -> Result<(), DecodingError> {
        self.enter()?;

        match resolve(table, r) {
            Wire::Prim(op) => match op {
                opcode::NULL | opcode::RESERVED => {}
                opcode::BOOL => {
                    self.flag()?;
                }
                opcode::NAT8 | opcode::INT8 => {
                    self.take(1)?;
                }
                opcode::NAT16 | opcode::INT16 => {
                    self.take(2)?;
                }
                opcode::NAT32 | opcode::INT32 | opcode::FLOAT32 => {
                    self.take(4)?;
                }
                opcode::NAT64 | opcode::INT64 | opcode::FLOAT64 => {
                    self.take(8)?;
                }
                opcode::NAT => {
                    self.nat()?;
                }
                opcode::INT => {
                    self.int()?;
                }
                opcode::TEXT => {
                    self.text()?;
                }
                opcode::PRINCIPAL => {
                    self.principal()?;
                }
                _ => return Err(DecodingError::Unsupported(prim_kind(op))),
            },
            Wire::Entry(WireType::Opt(inner)) => {
                if self.flag()? {
                    self.skip(table, *inner)?;
                }
            }
            Wire::Entry(WireType::Vec(item)) => {
                let item = *item;
                let count = self.item_count(table, item)?;
                for _ in 0..count {
                    self.skip(table, item)?;
                }
            }
            Wire::Entry(WireType::Record(fields)) => {
                for &(_, field_ref) in fields {
                    self.skip(table, field_ref)?;
                }
            }
            Wire::Entry(WireType::Variant(tags)) => {
                let index = read_unsigned(&mut self.input)?;
                let &(_, tag_ref) = usize::try_from(index)
                    .ok()
                    .and_then(|i| tags.get(i))
                    .ok_or_else(|| {
                        DecodingError::Malformed(format!("variant index {index} out of range"))
                    })?;
                self.skip(table, tag_ref)?;
            }
            Wire::Entry(WireType::Func) => return Err(DecodingError::Unsupported("func")),
            Wire::Entry(WireType::Service) => return Err(DecodingError::Unsupported("service")),
        }

        self.depth -= 1;

        Ok(())
    }
}

///
/// TESTS
///
