mod code;
pub use code::ResponseCode;

mod object_id;
pub use object_id::ObjectId;

mod public_key;
pub use public_key::PublicKey;

pub mod entity;
pub mod query;
pub mod response;
pub mod transaction;

/// Everything that can go wrong turning wire bytes into a typed, authenticated command.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("malformed transaction envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("public key is not base64-encoded ed25519: {0:?}")]
    PublicKey(String),
    #[error("signature is not hex-encoded ed25519: {0:?}")]
    SignatureEncoding(String),
    #[error("signature does not verify against the declared public key")]
    BadSignature,
    #[error("malformed transaction body: {0}")]
    Body(#[source] serde_json::Error),
    #[error("unknown command type {0:?}")]
    UnknownCommand(String),
    #[error("invalid {kind} entity: {source}")]
    Entity {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid object id {0:?}")]
    ObjectId(String),
    #[error("invalid {kind} entity: {reason}")]
    Schema { kind: &'static str, reason: String },
}

impl ParseError {
    /// The response code reported to the consensus engine for this error.
    pub fn code(&self) -> ResponseCode {
        match self {
            ParseError::Envelope(_) | ParseError::Body(_) => ResponseCode::EncodingError,
            ParseError::PublicKey(_) | ParseError::SignatureEncoding(_) | ParseError::BadSignature => {
                ResponseCode::BadSignature
            }
            ParseError::UnknownCommand(_)
            | ParseError::Entity { .. }
            | ParseError::ObjectId(_)
            | ParseError::Schema { .. } => ResponseCode::BadData,
        }
    }
}
