//! LiqPay signing and verification.
//!
//! Every message exchanged with LiqPay travels as a pair of form fields:
//!
//! ```text
//! data      = base64(json_payload)
//! signature = base64(sha1(private_key + data + private_key))
//! ```
//!
//! The same scheme is used for checkout forms, server-to-server API requests
//! and the callbacks LiqPay posts back to us.

use serde::{Serialize, de::DeserializeOwned};

/// Form field carrying the base64 JSON payload.
pub const DATA_FIELD: &str = "data";

/// Form field carrying the base64 SHA-1 signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// Header name for admin API authentication (plaintext secret).
pub const ADMIN_AUTH_HEADER: &str = "Fedportal-Admin-Authorization";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid base64 encoding")]
    InvalidBase64,
    /// The signature checked out but `data` is not base64.
    #[error("invalid base64 in data field")]
    InvalidData,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Serialize `params` to JSON and base64-encode it.
pub fn encode_data<T: Serialize>(params: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(params)?;
    Ok(fast32::base64::RFC4648.encode(&json))
}

/// Decode a base64 `data` field into its JSON payload.
pub fn decode_data<T: DeserializeOwned>(data: &str) -> Result<T, SignatureError> {
    let json = fast32::base64::RFC4648
        .decode_str(data)
        .map_err(|_| SignatureError::InvalidData)?;
    Ok(serde_json::from_slice(&json)?)
}

fn digest(data: &str, private_key: &str) -> ring::digest::Digest {
    let mut ctx = ring::digest::Context::new(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY);
    ctx.update(private_key.as_bytes());
    ctx.update(data.as_bytes());
    ctx.update(private_key.as_bytes());
    ctx.finish()
}

/// Compute `base64(sha1(private_key + data + private_key))`.
pub fn sign(data: &str, private_key: &str) -> String {
    fast32::base64::RFC4648.encode(digest(data, private_key).as_ref())
}

/// Verify a LiqPay signature in constant time.
pub fn verify(data: &str, signature: &str, private_key: &str) -> Result<(), SignatureError> {
    let provided = fast32::base64::RFC4648
        .decode_str(signature.trim())
        .map_err(|_| SignatureError::InvalidBase64)?;
    let expected = digest(data, private_key);
    #[allow(deprecated)]
    ring::constant_time::verify_slices_are_equal(expected.as_ref(), &provided)?;
    Ok(())
}

/// A `data` + `signature` pair as exchanged with LiqPay.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignedPayload {
    pub data: String,
    pub signature: String,
}

impl SignedPayload {
    /// Encode and sign `params` with the merchant private key.
    pub fn new<T: Serialize>(params: &T, private_key: &str) -> Result<Self, serde_json::Error> {
        let data = encode_data(params)?;
        let signature = sign(&data, private_key);
        Ok(Self { data, signature })
    }

    /// Decode the payload without checking the signature.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, SignatureError> {
        decode_data(&self.data)
    }

    /// Check the signature, then decode the payload.
    pub fn verify_and_decode<T: DeserializeOwned>(
        &self,
        private_key: &str,
    ) -> Result<T, SignatureError> {
        verify(&self.data, &self.signature, private_key)?;
        self.decode()
    }

    /// Render as an `application/x-www-form-urlencoded` body.
    pub fn to_form_body(&self) -> String {
        format!(
            "{DATA_FIELD}={}&{SIGNATURE_FIELD}={}",
            urlencoding::encode(&self.data),
            urlencoding::encode(&self.signature)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let data = encode_data(&serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(data, "eyJhIjoxfQ==");
        assert_eq!(sign(&data, "k"), "yazI0qEYmyid7NB10hdEy3qw4R8=");
        assert!(verify(&data, "yazI0qEYmyid7NB10hdEy3qw4R8=", "k").is_ok());
    }

    #[test]
    fn test_tampered_data_is_rejected() {
        let signed = SignedPayload::new(&serde_json::json!({ "order_id": "fp-1" }), "secret").unwrap();
        let forged = SignedPayload {
            data: encode_data(&serde_json::json!({ "order_id": "fp-2" })).unwrap(),
            signature: signed.signature.clone(),
        };
        assert!(matches!(
            forged.verify_and_decode::<serde_json::Value>("secret"),
            Err(SignatureError::SignatureMismatch)
        ));
        assert!(matches!(
            signed.verify_and_decode::<serde_json::Value>("other"),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_round_trip_payload() {
        let signed = SignedPayload::new(&serde_json::json!({ "status": "success" }), "secret").unwrap();
        let value: serde_json::Value = signed.verify_and_decode("secret").unwrap();
        assert_eq!(value["status"], "success");
    }

    #[test]
    fn test_garbage_signature() {
        assert!(matches!(
            verify("eyJhIjoxfQ==", "not base64!!", "k"),
            Err(SignatureError::InvalidBase64)
        ));
    }

    #[test]
    fn test_signed_garbage_data() {
        let data = "not base64 at all";
        let signed = SignedPayload {
            data: data.to_string(),
            signature: sign(data, "k"),
        };
        assert!(matches!(
            signed.verify_and_decode::<serde_json::Value>("k"),
            Err(SignatureError::InvalidData)
        ));
    }

    #[test]
    fn test_form_body_escapes_base64() {
        let payload = SignedPayload {
            data: "ab+c/d==".to_string(),
            signature: "x+y=".to_string(),
        };
        assert_eq!(payload.to_form_body(), "data=ab%2Bc%2Fd%3D%3D&signature=x%2By%3D");
    }
}
