use bytes::Bytes;

/// A decoded SMPP field value, parallel to [`Syntax`](crate::Syntax).
///
/// Strings are raw octet sequences; the codec never interprets character
/// encoding, so a C-octet string value is the wire bytes including the
/// terminating NUL. Composite values are tuples, or records when the
/// descriptor carries a name; the name exists only on the value side and is
/// dropped again when encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Unsigned integer, at most four octets wide on the wire.
    Integer(u32),
    /// Octet contents of a string field. For C-octet strings the trailing
    /// NUL is part of the value.
    Bytes(Bytes),
    /// Elements of a count-prefixed list, in wire order.
    List(Vec<Value>),
    /// Fields of an anonymous composite, in declaration order.
    Tuple(Vec<Value>),
    /// Fields of a named composite.
    Record { name: String, fields: Vec<Value> },
}

impl Value {
    /// String value from anything byte-like.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Value::Bytes(data.into())
    }

    /// Record value tagged with `name`.
    pub fn record(name: impl Into<String>, fields: Vec<Value>) -> Self {
        Value::Record {
            name: name.into(),
            fields,
        }
    }

    /// The integer inside, if this is an integer value.
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The octets inside, if this is a string value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(data) => Some(data),
            _ => None,
        }
    }

    /// The elements inside, if this is a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The fields inside, if this is a tuple or record value.
    pub fn fields(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(fields) | Value::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v)
    }
}
