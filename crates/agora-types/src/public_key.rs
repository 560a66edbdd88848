use std::fmt::{self, Display};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::ParseError;

/// An ed25519 public key identifying a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decode the base64 form used in transaction envelopes and queries.
    pub fn from_base64(encoded: &str) -> Result<Self, ParseError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| ParseError::PublicKey(encoded.to_string()))?;
        let bytes = <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| ParseError::PublicKey(encoded.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// The uppercase hex form under which users are registered.
    pub fn to_hex_upper(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Verify `signature` (hex) over the exact bytes of `message`.
    pub fn verify(&self, message: &[u8], signature: &str) -> Result<(), ParseError> {
        let signature_bytes = hex::decode(signature)
            .map_err(|_| ParseError::SignatureEncoding(signature.to_string()))?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|_| ParseError::SignatureEncoding(signature.to_string()))?;
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| ParseError::BadSignature)?;
        key.verify(message, &signature)
            .map_err(|_| ParseError::BadSignature)
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_upper())
    }
}
