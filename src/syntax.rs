// ABOUTME: Field syntax descriptors for the SMPP v5.0 base types (Section 3.1)
// ABOUTME: Pure shared data driving both decode and encode, plus TLV refinement

use bytes::Bytes;

/// Lexical class of a string field (SMPP v5.0 Section 3.1.1).
///
/// The base syntax distinguishes free-form strings from strings whose
/// characters must be ASCII hexadecimal or decimal digits, e.g. hex-encoded
/// message ids. A lone terminating NUL is always acceptable: the empty digit
/// string satisfies every class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrFormat {
    /// Any octets.
    #[default]
    Free,
    /// ASCII hexadecimal digits: `0-9`, `A-F`, `a-f`.
    Hex,
    /// ASCII decimal digits: `0-9`.
    Dec,
}

impl StrFormat {
    /// Check every octet of `digits` against this class.
    ///
    /// `digits` is the string content with any terminating NUL already
    /// stripped; an empty slice passes.
    pub fn accepts(&self, digits: &[u8]) -> bool {
        match self {
            StrFormat::Free => true,
            StrFormat::Hex => digits.iter().all(|b| b.is_ascii_hexdigit()),
            StrFormat::Dec => digits.iter().all(|b| b.is_ascii_digit()),
        }
    }
}

/// How [`Syntax::fit_with`] treats the element bound of a `List`.
///
/// Scalar fields are always tightened to the smaller capacity. For lists the
/// ecosystem is split: some deployed gateways instantiate list-valued TLVs
/// with the declared capacity untouched, so both behaviors are exposed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListBound {
    /// Shrink the element bound to the fitted size, like scalar fields.
    #[default]
    Tightened,
    /// Keep the declared element bound. Matches gateways that never shrink
    /// list capacities when instantiating a TLV.
    Declared,
}

/// Recursive descriptor for one SMPP field.
///
/// Every PDU body is a tree of these: scalars at the leaves, `Composite` for
/// the field sequence, `Union` where one of several layouts may appear (the
/// command_id `Constant` at the front of each branch disambiguates).
/// Descriptors are immutable plain data; build them once and share them
/// across calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Syntax {
    /// A fixed literal that must appear verbatim on the wire, such as a
    /// command_id or an interface_version octet.
    Constant { value: Bytes },

    /// Big-endian unsigned integer of `size` octets (1..=4). The `min`/`max`
    /// range is enforced when encoding; on decode the width alone bounds the
    /// value.
    Integer { size: usize, min: u32, max: u32 },

    /// NUL-terminated string (Section 3.1.1 C-Octet String). Fixed fields
    /// occupy exactly one octet (the lone NUL) or exactly `size` octets with
    /// the NUL last; variable fields run up to and including the first NUL,
    /// with `size` the inclusive maximum. Decoded values keep the NUL.
    CString {
        fixed: bool,
        size: usize,
        format: StrFormat,
    },

    /// Raw octets, no terminator (Section 3.1.1 Octet String). The variable
    /// form consumes `min(size, remaining)` octets and is only meaningful
    /// inside a TLV whose length has already bounded the input.
    OctetString {
        fixed: bool,
        size: usize,
        format: StrFormat,
    },

    /// Count-prefixed homogeneous sequence, e.g. the dest_address list of
    /// submit_multi. The count prefix is `size / 256 + 1` octets wide and
    /// `size` is the maximum element count.
    List { inner: Box<Syntax>, size: usize },

    /// Heterogeneous concatenation of fields in declaration order. A named
    /// composite decodes to a tagged record, an anonymous one to a tuple;
    /// the name never reaches the wire.
    Composite {
        name: Option<String>,
        fields: Vec<Syntax>,
    },

    /// Ordered alternatives. The first branch that applies wins; when all
    /// fail, the most informative branch failure is reported (see
    /// [`TypeMismatch::priority`](crate::TypeMismatch::priority)).
    Union { branches: Vec<Syntax> },
}

impl Syntax {
    /// A literal octet sequence.
    pub fn constant(value: impl Into<Bytes>) -> Self {
        Syntax::Constant {
            value: value.into(),
        }
    }

    /// An unsigned big-endian integer of `size` octets.
    pub fn integer(size: usize, min: u32, max: u32) -> Self {
        debug_assert!((1..=4).contains(&size), "integer fields are 1..=4 octets");
        Syntax::Integer { size, min, max }
    }

    /// A C-octet string of at most `size` octets including the NUL.
    pub fn cstring(fixed: bool, size: usize, format: StrFormat) -> Self {
        debug_assert!(size >= 1, "a C-octet string holds at least its NUL");
        Syntax::CString {
            fixed,
            size,
            format,
        }
    }

    /// An octet string of at most `size` octets.
    pub fn octet_string(fixed: bool, size: usize, format: StrFormat) -> Self {
        Syntax::OctetString {
            fixed,
            size,
            format,
        }
    }

    /// A count-prefixed list of at most `size` elements.
    pub fn list(inner: Syntax, size: usize) -> Self {
        Syntax::List {
            inner: Box::new(inner),
            size,
        }
    }

    /// An anonymous composite; decodes to a tuple.
    pub fn composite(fields: Vec<Syntax>) -> Self {
        Syntax::Composite { name: None, fields }
    }

    /// A named composite; decodes to a record tagged with `name`.
    pub fn record(name: impl Into<String>, fields: Vec<Syntax>) -> Self {
        Syntax::Composite {
            name: Some(name.into()),
            fields,
        }
    }

    /// A one-of choice between `branches`, tried in order. `branches` must
    /// not be empty.
    pub fn union(branches: Vec<Syntax>) -> Self {
        debug_assert!(!branches.is_empty(), "a union needs at least one branch");
        Syntax::Union { branches }
    }

    /// Refine this descriptor to a capacity of `size` octets, tightening
    /// list bounds (see [`Syntax::fit_with`]).
    ///
    /// This is how a TLV instantiates a generic descriptor against its
    /// declared length: a variable string bounded at 65 octets fitted to a
    /// 6-octet TLV becomes a fixed 6-octet string.
    pub fn fit(&self, size: usize) -> Syntax {
        self.fit_with(size, ListBound::Tightened)
    }

    /// Refine this descriptor to a capacity of `size` octets.
    ///
    /// - `Integer`: the width shrinks to `size` when smaller.
    /// - `CString` / `OctetString`: when `size` is within the current bound,
    ///   the bound becomes `size` and the field turns fixed, since the TLV
    ///   length states exactly how many octets are present. A `size` of zero
    ///   leaves the field unchanged; string fields hold at least one octet,
    ///   so the mismatch surfaces when the empty payload is decoded.
    /// - `List`: governed by `bound`; see [`ListBound`].
    /// - `Constant`, `Composite`, `Union`: unchanged.
    pub fn fit_with(&self, size: usize, bound: ListBound) -> Syntax {
        match self {
            Syntax::Integer {
                size: width,
                min,
                max,
            } if size < *width => Syntax::Integer {
                size,
                min: *min,
                max: *max,
            },
            Syntax::CString {
                size: cap, format, ..
            } if size >= 1 && size <= *cap => Syntax::CString {
                fixed: true,
                size,
                format: *format,
            },
            Syntax::OctetString {
                size: cap, format, ..
            } if size >= 1 && size <= *cap => Syntax::OctetString {
                fixed: true,
                size,
                format: *format,
            },
            Syntax::List { inner, size: cap } => match bound {
                ListBound::Tightened if size < *cap => Syntax::List {
                    inner: inner.clone(),
                    size,
                },
                _ => self.clone(),
            },
            other => other.clone(),
        }
    }
}
