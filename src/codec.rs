// SMPP v5.0 base syntax codec - decodes and encodes fields from their syntax
//
// This module is the recursive engine: one decode and one encode entry point,
// dispatching on the Syntax variant. Primitives (constants, integers, C-octet
// strings, octet strings) read or write a single leaf value; composites and
// lists sequence their parts; unions try branches in order and report the
// most informative failure when every branch rejects.
//
// The engine is pure. Nothing here performs I/O, logs, or touches shared
// state; descriptors may be shared freely across threads.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::TypeMismatch;
use crate::syntax::{StrFormat, Syntax};
use crate::value::Value;

/// Decode one field from the front of `input`.
///
/// On success returns the decoded value and the unconsumed remainder as a
/// cheap slice of `input`. On failure nothing is consumed; the caller still
/// holds the original buffer.
pub fn decode(input: &Bytes, spec: &Syntax) -> Result<(Value, Bytes), TypeMismatch> {
    match spec {
        Syntax::Constant { value } => decode_constant(input, spec, value),
        Syntax::Integer { size, .. } => decode_integer(input, spec, *size),
        Syntax::CString {
            fixed,
            size,
            format,
        } => decode_cstring(input, spec, *fixed, *size, *format),
        Syntax::OctetString {
            fixed,
            size,
            format,
        } => decode_octet_string(input, spec, *fixed, *size, *format),
        Syntax::List { inner, size } => decode_list(input, spec, inner, *size),
        Syntax::Composite { name, fields } => decode_composite(input, spec, name.as_deref(), fields),
        Syntax::Union { branches } => decode_union(input, spec, branches),
    }
}

/// Encode `value` against `spec`, producing its wire octets.
pub fn encode(value: &Value, spec: &Syntax) -> Result<Bytes, TypeMismatch> {
    let mut buf = BytesMut::new();
    encode_into(value, spec, &mut buf)?;
    Ok(buf.freeze())
}

// Decode primitives

fn decode_constant(
    input: &Bytes,
    spec: &Syntax,
    literal: &Bytes,
) -> Result<(Value, Bytes), TypeMismatch> {
    let len = literal.len();
    if input.len() >= len {
        if input[..len] == literal[..] {
            return Ok((Value::Bytes(literal.clone()), input.slice(len..)));
        }
        // Same-length mismatch: report the actual prefix. Ranks above a
        // truncation when a union weighs competing branch failures.
        return Err(TypeMismatch::data(spec.clone(), input.slice(..len)));
    }
    Err(TypeMismatch::data(spec.clone(), input.clone()))
}

fn decode_integer(
    input: &Bytes,
    spec: &Syntax,
    size: usize,
) -> Result<(Value, Bytes), TypeMismatch> {
    debug_assert!(size <= 4, "integer fields are 1..=4 octets");
    if input.len() < size {
        return Err(TypeMismatch::data(spec.clone(), input.clone()));
    }
    let mut v: u64 = 0;
    for &octet in &input[..size] {
        v = v << 8 | u64::from(octet);
    }
    Ok((Value::Integer(v as u32), input.slice(size..)))
}

fn decode_cstring(
    input: &Bytes,
    spec: &Syntax,
    fixed: bool,
    size: usize,
    format: StrFormat,
) -> Result<(Value, Bytes), TypeMismatch> {
    let (data, rest) = if fixed {
        decode_cstring_fixed(input, spec, size)?
    } else {
        decode_cstring_var(input, spec, size)?
    };
    // The terminating NUL is part of the value but not of the digit string.
    if !format.accepts(&data[..data.len() - 1]) {
        return Err(TypeMismatch::data(spec.clone(), data));
    }
    Ok((Value::Bytes(data), rest))
}

fn decode_cstring_fixed(
    input: &Bytes,
    spec: &Syntax,
    size: usize,
) -> Result<(Bytes, Bytes), TypeMismatch> {
    // A C-octet string holds at least its NUL; nothing fits in zero octets.
    if size == 0 {
        return Err(TypeMismatch::data(spec.clone(), input.clone()));
    }
    // Two accepting shapes: a lone NUL, or exactly `size` octets with the
    // NUL last and no NUL before it.
    if input.first() == Some(&0) {
        return Ok((input.slice(..1), input.slice(1..)));
    }
    if input.len() >= size
        && input[..size - 1].iter().all(|&octet| octet != 0)
        && input[size - 1] == 0
    {
        return Ok((input.slice(..size), input.slice(size..)));
    }
    let seen = input.len().min(size);
    Err(TypeMismatch::data(spec.clone(), input.slice(..seen)))
}

fn decode_cstring_var(
    input: &Bytes,
    spec: &Syntax,
    size: usize,
) -> Result<(Bytes, Bytes), TypeMismatch> {
    let window = input.len().min(size);
    match input[..window].iter().position(|&octet| octet == 0) {
        Some(at) => Ok((input.slice(..at + 1), input.slice(at + 1..))),
        None => Err(TypeMismatch::not_found(spec.clone(), input.slice(..window))),
    }
}

fn decode_octet_string(
    input: &Bytes,
    spec: &Syntax,
    fixed: bool,
    size: usize,
    format: StrFormat,
) -> Result<(Value, Bytes), TypeMismatch> {
    let (data, rest) = if fixed {
        if input.len() < size {
            return Err(TypeMismatch::data(spec.clone(), input.clone()));
        }
        (input.slice(..size), input.slice(size..))
    } else {
        // Variable octet strings carry no terminator and swallow whatever is
        // there, up to the bound. Only meaningful inside a TLV whose length
        // has already delimited the input.
        let take = input.len().min(size);
        (input.slice(..take), input.slice(take..))
    };
    if !format.accepts(&data) {
        return Err(TypeMismatch::data(spec.clone(), data));
    }
    Ok((Value::Bytes(data), rest))
}

// Recursive decode

fn decode_list(
    input: &Bytes,
    spec: &Syntax,
    inner: &Syntax,
    size: usize,
) -> Result<(Value, Bytes), TypeMismatch> {
    let width = count_prefix_octets(size);
    if input.len() < width {
        return Err(TypeMismatch::data(spec.clone(), input.clone()));
    }
    let count = match read_count(&input[..width], size) {
        Some(count) => count,
        None => return Err(TypeMismatch::data(spec.clone(), input.slice(..width))),
    };

    let mut rest = input.slice(width..);
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        match decode(&rest, inner) {
            Ok((item, remainder)) => {
                items.push(item);
                rest = remainder;
            }
            Err(inner_err) => return Err(TypeMismatch::nested(spec.clone(), inner_err)),
        }
    }
    Ok((Value::List(items), rest))
}

fn decode_composite(
    input: &Bytes,
    spec: &Syntax,
    name: Option<&str>,
    fields: &[Syntax],
) -> Result<(Value, Bytes), TypeMismatch> {
    let mut rest = input.clone();
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        match decode(&rest, field) {
            Ok((value, remainder)) => {
                values.push(value);
                rest = remainder;
            }
            Err(field_err) => return Err(TypeMismatch::nested(spec.clone(), field_err)),
        }
    }
    let value = match name {
        Some(name) => Value::record(name, values),
        None => Value::Tuple(values),
    };
    Ok((value, rest))
}

fn decode_union(
    input: &Bytes,
    spec: &Syntax,
    branches: &[Syntax],
) -> Result<(Value, Bytes), TypeMismatch> {
    let mut best: Option<TypeMismatch> = None;
    for branch in branches {
        match decode(input, branch) {
            Ok(done) => return Ok(done),
            Err(err) => best = Some(keep_best(best, err)),
        }
    }
    match best {
        Some(err) => Err(TypeMismatch::nested(spec.clone(), err)),
        None => Err(TypeMismatch::data(spec.clone(), input.clone())),
    }
}

// Encode

fn encode_into(value: &Value, spec: &Syntax, buf: &mut BytesMut) -> Result<(), TypeMismatch> {
    match spec {
        Syntax::Constant { value: literal } => encode_constant(value, spec, literal, buf),
        Syntax::Integer { size, min, max } => encode_integer(value, spec, *size, *min, *max, buf),
        Syntax::CString {
            fixed,
            size,
            format,
        } => encode_cstring(value, spec, *fixed, *size, *format, buf),
        Syntax::OctetString {
            fixed,
            size,
            format,
        } => encode_octet_string(value, spec, *fixed, *size, *format, buf),
        Syntax::List { inner, size } => encode_list(value, spec, inner, *size, buf),
        Syntax::Composite { name, fields } => {
            encode_composite(value, spec, name.as_deref(), fields, buf)
        }
        Syntax::Union { branches } => encode_union(value, spec, branches, buf),
    }
}

fn encode_constant(
    value: &Value,
    spec: &Syntax,
    literal: &Bytes,
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    match value {
        Value::Bytes(data) if data == literal => {
            buf.put_slice(literal);
            Ok(())
        }
        other => Err(TypeMismatch::value(spec.clone(), other.clone())),
    }
}

fn encode_integer(
    value: &Value,
    spec: &Syntax,
    size: usize,
    min: u32,
    max: u32,
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    match value {
        Value::Integer(v) if (min..=max).contains(v) => {
            buf.put_uint(u64::from(*v), size);
            Ok(())
        }
        other => Err(TypeMismatch::value(spec.clone(), other.clone())),
    }
}

fn encode_cstring(
    value: &Value,
    spec: &Syntax,
    fixed: bool,
    size: usize,
    format: StrFormat,
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    let Value::Bytes(data) = value else {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    };
    let len_ok = if fixed {
        data.len() == size || data.len() == 1
    } else {
        !data.is_empty() && data.len() <= size
    };
    if !len_ok || data.last() != Some(&0) || !format.accepts(&data[..data.len() - 1]) {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    }
    buf.put_slice(data);
    Ok(())
}

fn encode_octet_string(
    value: &Value,
    spec: &Syntax,
    fixed: bool,
    size: usize,
    format: StrFormat,
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    let Value::Bytes(data) = value else {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    };
    let len_ok = if fixed {
        data.len() == size || data.is_empty()
    } else {
        data.len() <= size
    };
    if !len_ok || !format.accepts(data) {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    }
    buf.put_slice(data);
    Ok(())
}

fn encode_list(
    value: &Value,
    spec: &Syntax,
    inner: &Syntax,
    size: usize,
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    let Value::List(items) = value else {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    };
    if items.len() > size {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    }
    put_count(buf, items.len(), count_prefix_octets(size));
    for item in items {
        if let Err(item_err) = encode_into(item, inner, buf) {
            return Err(TypeMismatch::nested(spec.clone(), item_err));
        }
    }
    Ok(())
}

fn encode_composite(
    value: &Value,
    spec: &Syntax,
    name: Option<&str>,
    fields: &[Syntax],
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    let values = match (name, value) {
        (Some(expected), Value::Record { name, fields }) if name == expected => fields,
        (None, Value::Tuple(fields)) => fields,
        _ => return Err(TypeMismatch::value(spec.clone(), value.clone())),
    };
    if values.len() != fields.len() {
        return Err(TypeMismatch::value(spec.clone(), value.clone()));
    }
    for (field_value, field_spec) in values.iter().zip(fields) {
        if let Err(field_err) = encode_into(field_value, field_spec, buf) {
            return Err(TypeMismatch::nested(spec.clone(), field_err));
        }
    }
    Ok(())
}

fn encode_union(
    value: &Value,
    spec: &Syntax,
    branches: &[Syntax],
    buf: &mut BytesMut,
) -> Result<(), TypeMismatch> {
    let mut best: Option<TypeMismatch> = None;
    for branch in branches {
        // Fresh buffer per attempt so a branch that writes before failing
        // leaves no partial output behind.
        match encode(value, branch) {
            Ok(octets) => {
                buf.put_slice(&octets);
                return Ok(());
            }
            Err(err) => best = Some(keep_best(best, err)),
        }
    }
    match best {
        Some(err) => Err(TypeMismatch::nested(spec.clone(), err)),
        None => Err(TypeMismatch::value(spec.clone(), value.clone())),
    }
}

// Shared helpers

/// Octet width of a list's element-count prefix.
fn count_prefix_octets(size: usize) -> usize {
    size / 256 + 1
}

/// Big-endian element count from a list prefix, `None` when it exceeds the
/// declared bound.
fn read_count(prefix: &[u8], size: usize) -> Option<usize> {
    // Only the low eight octets can hold a count that passes the bound
    // check; any set bit above them already exceeds it.
    let (high, low) = prefix.split_at(prefix.len().saturating_sub(8));
    if high.iter().any(|&octet| octet != 0) {
        return None;
    }
    let mut count: u64 = 0;
    for &octet in low {
        count = count << 8 | u64::from(octet);
    }
    if count > size as u64 {
        return None;
    }
    Some(count as usize)
}

fn put_count(buf: &mut BytesMut, count: usize, width: usize) {
    let be = (count as u64).to_be_bytes();
    if width > be.len() {
        buf.put_bytes(0, width - be.len());
        buf.put_slice(&be);
    } else {
        buf.put_slice(&be[be.len() - width..]);
    }
}

/// Union branch arbitration: highest priority wins, earlier branch on ties.
fn keep_best(best: Option<TypeMismatch>, candidate: TypeMismatch) -> TypeMismatch {
    match best {
        Some(current) if candidate.priority() > current.priority() => candidate,
        Some(current) => current,
        None => candidate,
    }
}
