pub mod codec;
pub mod error;
pub mod syntax;
pub mod tlv;
pub mod value;

#[cfg(test)]
mod tests;

// Re-export the codec surface for direct access
pub use codec::{decode, encode};
pub use error::{Reason, TypeMismatch};
pub use syntax::{ListBound, StrFormat, Syntax};
pub use tlv::Tlv;
pub use value::Value;

/// A specialized `Result` type for base syntax operations.
///
/// The codec has a single failure mode, [`TypeMismatch`], so every fallible
/// operation in this crate returns this alias.
///
/// # Examples
///
/// ## Decoding a PDU-shaped composite
///
/// Every SMPP PDU is a tree of syntax descriptors. A minimal enquire_link
/// is its command_id constant followed by a sequence number:
///
/// ```rust
/// use bytes::Bytes;
/// use smpp_syntax::{decode, encode, Syntax, Value};
///
/// let enquire_link = Syntax::record(
///     "enquire_link",
///     vec![
///         Syntax::constant(&b"\x00\x00\x00\x15"[..]),
///         Syntax::integer(4, 0, u32::MAX),
///     ],
/// );
///
/// let wire = Bytes::from_static(&[0x00, 0x00, 0x00, 0x15, 0x00, 0x00, 0x00, 0x2A]);
/// let (value, rest) = decode(&wire, &enquire_link)?;
///
/// assert_eq!(value.fields().unwrap()[1], Value::Integer(42));
/// assert!(rest.is_empty());
///
/// // Encoding the decoded value reproduces the wire octets.
/// assert_eq!(encode(&value, &enquire_link)?, wire);
/// # Ok::<(), smpp_syntax::TypeMismatch>(())
/// ```
///
/// ## Walking a failure report
///
/// Mismatches nest from the outer envelope down to the field that actually
/// failed; [`TypeMismatch::trail`] flattens the chain for diagnostics:
///
/// ```rust
/// use bytes::Bytes;
/// use smpp_syntax::{decode, Syntax};
///
/// let pdu = Syntax::record(
///     "bind",
///     vec![
///         Syntax::constant(&b"\x00\x00\x00\x02"[..]),
///         Syntax::cstring(false, 16, smpp_syntax::StrFormat::Free),
///     ],
/// );
///
/// // Valid command_id, but the system_id never terminates.
/// let wire = Bytes::from_static(b"\x00\x00\x00\x02ABCDEFGHIJKLMNOP");
/// let err = decode(&wire, &pdu).unwrap_err();
///
/// assert_eq!(err.trail().len(), 2);
/// assert!(matches!(err.leaf().spec, Syntax::CString { .. }));
/// ```
pub type Result<T> = std::result::Result<T, TypeMismatch>;
