use std::ops::Deref;

use ed25519_dalek::{Signer as _, SigningKey};

use super::*;

/// A transaction whose signature has been verified.
///
/// This transaction is not necessarily valid, either internally or against the current state.
/// However, it is guaranteed that its body was signed by the claimed public key.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedTx(Transaction);

impl Deref for AuthenticatedTx {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AuthenticatedTx {
    /// Decode a transaction, verify its signature over the raw body bytes, and only then parse
    /// the body into a command.
    pub fn from_bytes(buf: impl AsRef<[u8]>) -> Result<AuthenticatedTx, ParseError> {
        let Envelope {
            public_key,
            signature,
            body,
        } = Envelope::decode(buf)?;

        let public_key = PublicKey::from_base64(&public_key)?;
        public_key.verify(body.as_bytes(), &signature)?;

        let command = Command::from_body(&body)?;
        Ok(AuthenticatedTx(Transaction {
            public_key,
            command,
        }))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SignError {
    #[error("signing key does not match public key in transaction")]
    WrongKey,
}

impl Transaction {
    /// Sign the transaction's body with `key` and wrap it in a wire envelope.
    pub fn sign(&self, key: &SigningKey) -> Result<Envelope, SignError> {
        if PublicKey::from(key.verifying_key()) != self.public_key {
            return Err(SignError::WrongKey);
        }
        let body = self.command.to_body();
        let signature = key.sign(body.as_bytes());
        Ok(Envelope {
            public_key: self.public_key.to_base64(),
            signature: hex::encode(signature.to_bytes()),
            body,
        })
    }

    /// Sign the transaction and encode the envelope as JSON bytes.
    pub fn sign_to_bytes(&self, key: &SigningKey) -> Result<Vec<u8>, SignError> {
        Ok(self.sign(key)?.encode())
    }
}
