use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::syntax::Syntax;
use crate::value::Value;

/// The one failure mode of the codec: a field did not match its syntax.
///
/// Mismatches nest. When a composite field or list element fails, the inner
/// mismatch is wrapped with the outer descriptor, so the caller receives a
/// tree whose innermost node points at the field that actually went wrong
/// rather than the enclosing envelope. [`TypeMismatch::trail`] flattens that
/// tree for diagnostics and [`TypeMismatch::priority`] ranks competing
/// failures when a union rejects every branch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("type mismatch: {spec:?} rejected {reason}")]
pub struct TypeMismatch {
    /// The descriptor that rejected its input.
    pub spec: Syntax,
    /// What was seen instead.
    pub reason: Reason,
}

/// Detail carried by a [`TypeMismatch`]: either the offending data itself or
/// the failure of an inner field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Offending wire octets (decode side).
    Data(Bytes),
    /// Offending value (encode side, or an out-of-bound list count).
    Value(Value),
    /// No NUL terminator within bounds; holds the scanned prefix.
    NotFound(Bytes),
    /// A nested field failed.
    Nested(Box<TypeMismatch>),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Data(data) => write!(f, "octets {data:02x?}"),
            Reason::Value(value) => write!(f, "value {value:?}"),
            Reason::NotFound(scanned) => {
                write!(f, "no terminator in {scanned:02x?}")
            }
            Reason::Nested(inner) => write!(f, "inner field: {inner}"),
        }
    }
}

impl TypeMismatch {
    /// Mismatch against raw wire octets.
    pub fn data(spec: Syntax, data: Bytes) -> Self {
        TypeMismatch {
            spec,
            reason: Reason::Data(data),
        }
    }

    /// Mismatch against a value that the descriptor cannot encode.
    pub fn value(spec: Syntax, value: Value) -> Self {
        TypeMismatch {
            spec,
            reason: Reason::Value(value),
        }
    }

    /// Missing NUL terminator; `scanned` is the prefix searched.
    pub fn not_found(spec: Syntax, scanned: Bytes) -> Self {
        TypeMismatch {
            spec,
            reason: Reason::NotFound(scanned),
        }
    }

    /// Wrap an inner field failure with the enclosing descriptor.
    pub fn nested(spec: Syntax, inner: TypeMismatch) -> Self {
        TypeMismatch {
            spec,
            reason: Reason::Nested(Box::new(inner)),
        }
    }

    /// The nested cause, when an inner field failed.
    pub fn cause(&self) -> Option<&TypeMismatch> {
        match &self.reason {
            Reason::Nested(inner) => Some(inner),
            _ => None,
        }
    }

    /// The innermost mismatch: the field that actually went wrong.
    pub fn leaf(&self) -> &TypeMismatch {
        let mut node = self;
        while let Some(inner) = node.cause() {
            node = inner;
        }
        node
    }

    /// The descriptors from the outermost envelope down to the failing
    /// field, for human-readable reports.
    pub fn trail(&self) -> Vec<&Syntax> {
        let mut path = Vec::new();
        let mut node = self;
        loop {
            path.push(&node.spec);
            match node.cause() {
                Some(inner) => node = inner,
                None => return path,
            }
        }
    }

    /// Rank this mismatch by how much structure was validated before it.
    ///
    /// Each level of nesting adds three: deeper failures mean more of the
    /// input matched, so the report is more informative. At equal depth a
    /// structured leaf (union, list, composite) outranks a scalar leaf
    /// (integer, string), and a constant leaf ranks lowest: constants are
    /// the cheap sentinel checks unions reject branches with. Union decode
    /// and encode keep the branch error with the highest rank, earliest
    /// branch winning ties.
    pub fn priority(&self) -> u32 {
        let mut depth = 0;
        let mut node = self;
        loop {
            depth += 1;
            match node.cause() {
                Some(inner) => node = inner,
                None => break,
            }
        }
        3 * depth + class(&node.spec)
    }
}

fn class(spec: &Syntax) -> u32 {
    match spec {
        Syntax::Constant { .. } => 0,
        Syntax::Integer { .. } | Syntax::CString { .. } | Syntax::OctetString { .. } => 1,
        Syntax::List { .. } | Syntax::Composite { .. } | Syntax::Union { .. } => 2,
    }
}
