// src/core/pdf_payload.rs
//! Hex-encoded PDF payloads returned by the generation endpoints.

use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use hex::FromHexError;

/// Decode a hex string.
///
/// The backend emits lowercase hex, but either letter case is accepted, so re-encoding
/// an uppercase payload does not reproduce it byte for byte.
pub fn decode_hex(payload: &str) -> ClientResult<Bytes> {
    hex::decode(payload).map(Bytes::from).map_err(|e| {
        let reason = match e {
            FromHexError::OddLength => {
                format!("odd-length hex string ({} characters)", payload.len())
            }
            FromHexError::InvalidHexCharacter { c, index } => {
                format!("invalid hex character {:?} at offset {}", c, index)
            }
            other => other.to_string(),
        };
        ClientError::DecodeError(reason)
    })
}

/// Decode the `pdf` field of a generation response.
///
/// A missing or empty field is `PayloadMissing`; an empty document is never produced.
pub fn decode_pdf_field(pdf: Option<&str>) -> ClientResult<Bytes> {
    match pdf.map(str::trim) {
        Some(payload) if !payload.is_empty() => decode_hex(payload),
        _ => Err(ClientError::PayloadMissing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pdf_magic() {
        let bytes = decode_hex("255044462d312e34").expect("valid hex");
        assert_eq!(&bytes[..], b"%PDF-1.4");
    }

    #[test]
    fn test_decode_accepts_uppercase() {
        let bytes = decode_hex("FF00aB").expect("valid hex");
        assert_eq!(&bytes[..], &[0xff, 0x00, 0xab]);
        // Re-encoding normalises to lowercase
        assert_eq!(hex::encode(&bytes), "ff00ab");
    }

    #[test]
    fn test_reencode_reproduces_lowercase_input() {
        for input in ["", "00", "0a1b2c3d4e5f", "255044462d312e340a25e2e3cfd3"] {
            let bytes = decode_hex(input).expect("valid hex");
            assert_eq!(hex::encode(&bytes), input);
        }
    }

    #[test]
    fn test_odd_length_is_decode_error() {
        assert!(matches!(decode_hex("abc"), Err(ClientError::DecodeError(_))));
    }

    #[test]
    fn test_non_hex_is_decode_error() {
        assert!(matches!(decode_hex("zz"), Err(ClientError::DecodeError(_))));
        assert!(matches!(decode_hex("0g"), Err(ClientError::DecodeError(_))));
        assert!(matches!(decode_hex("+f"), Err(ClientError::DecodeError(_))));
        assert!(matches!(decode_hex("é0"), Err(ClientError::DecodeError(_))));
        assert!(matches!(decode_hex("é00"), Err(ClientError::DecodeError(_))));
    }

    #[test]
    fn test_missing_field() {
        assert!(matches!(decode_pdf_field(None), Err(ClientError::PayloadMissing)));
        assert!(matches!(decode_pdf_field(Some("")), Err(ClientError::PayloadMissing)));
        assert!(matches!(decode_pdf_field(Some("  ")), Err(ClientError::PayloadMissing)));
        assert!(decode_pdf_field(Some("2550")).is_ok());
    }
}
