use bytes::{BufMut, Bytes, BytesMut};

use crate::codec;
use crate::error::TypeMismatch;
use crate::syntax::{ListBound, Syntax};
use crate::value::Value;

// Optional parameter tag constants per SMPP v3.4 Section 5.3.2 and the
// SMPP v5.0 additions
pub mod tags {
    pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
    pub const SOURCE_PORT: u16 = 0x020A;
    pub const DESTINATION_PORT: u16 = 0x020C;
    pub const SAR_MSG_REF_NUM: u16 = 0x020E;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020F;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x0210;
    pub const MORE_MESSAGES_TO_SEND: u16 = 0x0426;
    pub const PAYLOAD_TYPE: u16 = 0x0019;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const PRIVACY_INDICATOR: u16 = 0x0201;
    pub const CALLBACK_NUM: u16 = 0x0381;
    pub const NUMBER_OF_MESSAGES: u16 = 0x0205;
    pub const LANGUAGE_INDICATOR: u16 = 0x000D;
    pub const NETWORK_ERROR_CODE: u16 = 0x0423;
    pub const ADDITIONAL_STATUS_INFO_TEXT: u16 = 0x001D;
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const MESSAGE_STATE: u16 = 0x0427;

    // SMPP v5.0 tags
    pub const CONGESTION_STATE: u16 = 0x142C;
    pub const BILLING_IDENTIFICATION: u16 = 0x0600;
    pub const SOURCE_NETWORK_ID: u16 = 0x060E;
    pub const DEST_NETWORK_ID: u16 = 0x060F;
    pub const SOURCE_NODE_ID: u16 = 0x060C;
    pub const DEST_NODE_ID: u16 = 0x060D;
}

/// An optional parameter in Tag-Length-Value form.
///
/// The tag identifies the parameter, the length counts the value octets
/// (excluding tag and length themselves), and the value is opaque at this
/// level. Typed access goes through [`Tlv::decode_value`], which instantiates
/// a generic descriptor against the declared length via
/// [`Syntax::fit`]: a variable-length string parameter bounded at 65 octets
/// arrives in a 6-octet TLV as a fixed 6-octet string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    /// Identifies the optional parameter.
    pub tag: u16,

    /// Length of the value field in octets.
    pub length: u16,

    /// The raw parameter octets.
    pub value: Bytes,
}

fn tag_syntax() -> Syntax {
    Syntax::integer(2, 0, 0xFFFF)
}

fn length_syntax() -> Syntax {
    Syntax::integer(2, 0, 0xFFFF)
}

fn read_u16(input: &Bytes, spec: &Syntax) -> Result<(u16, Bytes), TypeMismatch> {
    let (value, rest) = codec::decode(input, spec)?;
    match value {
        Value::Integer(v) => Ok((v as u16, rest)),
        other => Err(TypeMismatch::value(spec.clone(), other)),
    }
}

impl Tlv {
    /// Build a TLV around raw value octets, stamping the length.
    pub fn new(tag: u16, value: impl Into<Bytes>) -> Self {
        let value = value.into();
        Tlv {
            tag,
            length: value.len() as u16,
            value,
        }
    }

    /// Encode a typed value against `spec` and wrap it as a TLV.
    pub fn encode_value(tag: u16, value: &Value, spec: &Syntax) -> Result<Tlv, TypeMismatch> {
        let octets = codec::encode(value, spec)?;
        if octets.len() > usize::from(u16::MAX) {
            return Err(TypeMismatch::value(spec.clone(), value.clone()));
        }
        Ok(Tlv::new(tag, octets))
    }

    /// Decode the value octets against `spec` refined to this TLV's length.
    ///
    /// The payload must be consumed exactly; leftover octets are a mismatch
    /// carrying the leftovers as detail.
    pub fn decode_value(&self, spec: &Syntax) -> Result<Value, TypeMismatch> {
        self.decode_value_with(spec, ListBound::Tightened)
    }

    /// Like [`Tlv::decode_value`] with an explicit list-bound mode, for
    /// traffic from gateways that keep declared list capacities (see
    /// [`ListBound`]).
    pub fn decode_value_with(
        &self,
        spec: &Syntax,
        bound: ListBound,
    ) -> Result<Value, TypeMismatch> {
        let fitted = spec.fit_with(usize::from(self.length), bound);
        let (value, rest) = codec::decode(&self.value, &fitted)?;
        if !rest.is_empty() {
            return Err(TypeMismatch::data(fitted, rest));
        }
        Ok(value)
    }

    /// Convert this TLV to its wire octets.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4 + self.value.len());
        buf.put_u16(self.tag);
        buf.put_u16(self.length);
        buf.put_slice(&self.value);
        buf.freeze()
    }

    /// Decode a TLV from the front of `input`, returning the remainder.
    pub fn decode(input: &Bytes) -> Result<(Tlv, Bytes), TypeMismatch> {
        let (tag, rest) = read_u16(input, &tag_syntax())?;
        let (length, rest) = read_u16(&rest, &length_syntax())?;
        let body = Syntax::octet_string(true, usize::from(length), crate::StrFormat::Free);
        let (value, rest) = codec::decode(&rest, &body)?;
        match value {
            Value::Bytes(value) => Ok((Tlv { tag, length, value }, rest)),
            other => Err(TypeMismatch::value(body, other)),
        }
    }
}
