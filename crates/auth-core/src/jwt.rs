//! Compact signed-claims encode/decode (spec §4.3 step 5, §4.4 step 1, §6).
//!
//! Every token is signed with one process-wide HMAC-SHA256 key — never a
//! per-client secret (spec §9.1). Expiry is intentionally *not* checked here;
//! the verifier performs that as its own, separately testable step.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};

use crate::types::Claims;

/// Failures from signing or parsing a compact token.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("failed to sign claims: {0}")]
    Encoding(String),

    #[error("token is malformed or its signature does not verify")]
    InvalidSignature,
}

/// Wraps the process-wide HMAC-SHA256 signing key.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// `signing_key` should be at least 16 bytes; the caller is responsible
    /// for validating that at configuration time (spec §6).
    #[must_use]
    pub fn new(signing_key: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is the verifier's own step 2, not this layer's job.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    /// Signs `claims` into a compact `header.payload.signature` token string.
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = jsonwebtoken::Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, claims, &self.encoding_key)
            .map_err(|err| JwtError::Encoding(err.to_string()))
    }

    /// Verifies structure, algorithm, and signature, returning the decoded
    /// claims. Any failure collapses to [`JwtError::InvalidSignature`] — the
    /// spec treats structural, algorithm, and signature failures identically
    /// as *unauthenticated*.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| JwtError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> Claims {
        Claims {
            client_id: "svc-a".to_string(),
            token_id: "0123456789abcdef0123456789abcdef".to_string(),
            scope: vec!["https://api/users".to_string()],
            iat,
            exp,
            iss: crate::types::ISSUER.to_string(),
        }
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let service = JwtService::new(b"a-sufficiently-long-signing-key");
        let original = claims(1000, 1120);
        let token = service.encode(&original).expect("encode");
        let decoded = service.decode(&token).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn single_bit_mutation_fails_verification() {
        let service = JwtService::new(b"a-sufficiently-long-signing-key");
        let token = service.encode(&claims(1000, 1120)).expect("encode");

        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let mutated = String::from_utf8(bytes).expect("utf8");

        assert!(service.decode(&mutated).is_err());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let signer = JwtService::new(b"a-sufficiently-long-signing-key");
        let verifier = JwtService::new(b"a-totally-different-signing-key");
        let token = signer.encode(&claims(1000, 1120)).expect("encode");
        assert!(verifier.decode(&token).is_err());
    }

    #[test]
    fn decode_rejects_garbage_input() {
        let service = JwtService::new(b"a-sufficiently-long-signing-key");
        assert!(service.decode("not-a-token").is_err());
    }

    #[test]
    fn decode_does_not_enforce_expiry() {
        // The jwt layer leaves expiry to the verifier; an already-expired
        // token still decodes successfully here.
        let service = JwtService::new(b"a-sufficiently-long-signing-key");
        let token = service.encode(&claims(0, 1)).expect("encode");
        let decoded = service.decode(&token).expect("decode");
        assert_eq!(decoded.exp, 1);
    }
}
