//! Canonical binary encoding for datums, redeemers, and transactions.
//!
//! The standard bincode configuration is normative: cross-implementation
//! compatibility of policy-record payloads depends on these exact bytes.
//! Implemented per type, never blanket, so method calls stay unambiguous
//! next to the derived bincode traits.

pub use bincode::{Decode, Encode};

use crate::error::EncodingError;

/// Trait for binary encoding/decoding with hex string support.
pub trait Encodable {
    /// Encode to canonical binary bytes.
    ///
    /// # Errors
    /// Returns error if encoding fails.
    fn encode(&self) -> Result<Vec<u8>, EncodingError>
    where
        Self: Encode,
    {
        Ok(bincode::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Decode from canonical binary bytes, failing when trailing bytes remain.
    ///
    /// # Errors
    /// Returns error if decoding fails or the input is longer than one
    /// canonical encoding.
    fn decode(buf: &[u8]) -> Result<Self, EncodingError>
    where
        Self: Sized + Decode<()>,
    {
        let (decoded, consumed) = bincode::decode_from_slice(buf, bincode::config::standard())?;
        if consumed != buf.len() {
            return Err(EncodingError::TrailingBytes {
                consumed,
                total: buf.len(),
            });
        }
        Ok(decoded)
    }

    /// Encode to hex string.
    ///
    /// # Errors
    /// Returns error if encoding fails.
    fn to_hex(&self) -> Result<String, EncodingError>
    where
        Self: Encode,
    {
        Ok(hex::encode(Encodable::encode(self)?))
    }

    /// Decode from hex string.
    ///
    /// # Errors
    /// Returns error if hex decoding or binary decoding fails.
    fn from_hex(hex: &str) -> Result<Self, EncodingError>
    where
        Self: Sized + Decode<()>,
    {
        Encodable::decode(&hex::decode(hex)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Encodable;
    use crate::error::EncodingError;

    #[derive(Debug, PartialEq, bincode::Encode, bincode::Decode)]
    struct Payload {
        value: u32,
    }

    impl Encodable for Payload {}

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut encoded = Payload { value: 7 }.encode().expect("encodes");
        encoded.push(0);

        let err = Payload::decode(&encoded).expect_err("trailing byte");
        assert!(matches!(
            err,
            EncodingError::TrailingBytes { consumed, total } if consumed + 1 == total
        ));
    }

    #[test]
    fn from_hex_rejects_trailing_bytes() {
        let mut encoded = Payload { value: 7 }.to_hex().expect("encodes");
        encoded.push_str("00");

        let err = Payload::from_hex(&encoded).expect_err("trailing byte");
        assert!(matches!(err, EncodingError::TrailingBytes { .. }));
    }

    #[test]
    fn exact_input_round_trips() {
        let payload = Payload { value: 7 };
        let encoded = payload.encode().expect("encodes");
        assert_eq!(Payload::decode(&encoded).expect("decodes"), payload);
    }
}
