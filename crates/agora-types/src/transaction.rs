use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ObjectId, ParseError, PublicKey};

/// Signature verification over the raw body bytes.
mod authenticated;
pub use authenticated::{AuthenticatedTx, SignError};

mod build;
pub use build::Builder;

/// The outer wire envelope: `{"publicKey", "signature", "body"}`.
///
/// `body` is kept as the exact string that was signed; it is only parsed after (or, at
/// DeliverTx, instead of) signature verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub public_key: String,
    pub signature: String,
    pub body: String,
}

impl Envelope {
    pub fn decode(buf: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        serde_json::from_slice(buf.as_ref()).map_err(ParseError::Envelope)
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("envelope serialization is infallible")
    }
}

/// A decoded transaction: who sent it and what it asks for.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub public_key: PublicKey,
    pub command: Command,
}

impl Transaction {
    /// Decode a transaction without checking its signature.
    ///
    /// Only sound for transactions that already passed admission.
    pub fn from_bytes_unverified(buf: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        let envelope = Envelope::decode(buf)?;
        let public_key = PublicKey::from_base64(&envelope.public_key)?;
        let command = Command::from_body(&envelope.body)?;
        Ok(Transaction {
            public_key,
            command,
        })
    }
}

/// Every command the chain understands, each with its typed payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreatePost(CreatePost),
    CreateUser(CreateUser),
    CreateComment(CreateComment),
    UpvotePost(UpvotePost),
    UpvoteComment(UpvoteComment),
    UpvoteValidator(UpvoteValidator),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePost {
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub id: ObjectId,
    pub username: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub id: ObjectId,
    pub post_id: ObjectId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<ObjectId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvotePost {
    pub post_id: ObjectId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteComment {
    pub comment_id: ObjectId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvoteValidator {
    #[serde(rename = "validatorID")]
    pub validator_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ObjectId>,
}

#[derive(Deserialize)]
struct RawBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    entity: serde_json::Value,
}

impl Command {
    /// The wire name of this command's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreatePost(_) => "createPost",
            Command::CreateUser(_) => "createUser",
            Command::CreateComment(_) => "createComment",
            Command::UpvotePost(_) => "upvotePost",
            Command::UpvoteComment(_) => "upvoteComment",
            Command::UpvoteValidator(_) => "upvoteValidator",
        }
    }

    /// Parse a body string `{"type": .., "entity": ..}` into a command.
    ///
    /// A body that is not JSON or has no `type` is an encoding error; an unknown `type` or an
    /// entity that does not fit its payload is bad data.
    pub fn from_body(body: &str) -> Result<Self, ParseError> {
        let RawBody { kind, entity } = serde_json::from_str(body).map_err(ParseError::Body)?;

        fn payload<T: serde::de::DeserializeOwned>(
            kind: &'static str,
            value: serde_json::Value,
        ) -> Result<T, ParseError> {
            serde_json::from_value(value).map_err(|source| ParseError::Entity { kind, source })
        }

        Ok(match kind.as_str() {
            "createPost" => Command::CreatePost(payload("createPost", entity_value(entity))?),
            "createUser" => Command::CreateUser(payload("createUser", entity_value(entity))?),
            "createComment" => {
                Command::CreateComment(payload("createComment", entity_value(entity))?)
            }
            "upvotePost" => Command::UpvotePost(payload("upvotePost", entity_value(entity))?),
            "upvoteComment" => {
                Command::UpvoteComment(payload("upvoteComment", entity_value(entity))?)
            }
            "upvoteValidator" => {
                Command::UpvoteValidator(payload("upvoteValidator", entity_value(entity))?)
            }
            _ => return Err(ParseError::UnknownCommand(kind)),
        })
    }

    /// Render the body string that gets signed.
    pub fn to_body(&self) -> String {
        let entity = match self {
            Command::CreatePost(e) => serde_json::to_value(e),
            Command::CreateUser(e) => serde_json::to_value(e),
            Command::CreateComment(e) => serde_json::to_value(e),
            Command::UpvotePost(e) => serde_json::to_value(e),
            Command::UpvoteComment(e) => serde_json::to_value(e),
            Command::UpvoteValidator(e) => serde_json::to_value(e),
        }
        .expect("payload serialization is infallible");
        serde_json::json!({ "type": self.kind(), "entity": entity }).to_string()
    }

    /// Check the stateless schema rules for this command's payload.
    pub fn check_schema(&self) -> Result<(), ParseError> {
        let kind = self.kind();
        let reject = |reason: &str| {
            Err(ParseError::Schema {
                kind,
                reason: reason.to_string(),
            })
        };

        match self {
            Command::CreatePost(CreatePost { title, url, .. }) => {
                if title.trim().is_empty() {
                    return reject("title must not be empty");
                }
                if let Some(url) = url
                    && !url.trim().is_empty()
                    && Url::parse(url).is_err()
                {
                    return reject("url must be an absolute URI");
                }
            }
            Command::CreateUser(CreateUser { username, name, .. }) => {
                if username.trim().is_empty() {
                    return reject("username must not be empty");
                }
                if !username
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return reject("username may only contain letters, digits and underscores");
                }
                if name.trim().is_empty() {
                    return reject("name must not be empty");
                }
            }
            Command::CreateComment(CreateComment { content, .. }) => {
                if content.trim().is_empty() {
                    return reject("content must not be empty");
                }
            }
            // Identifiers are already validated by their type:
            Command::UpvotePost(_) | Command::UpvoteComment(_) | Command::UpvoteValidator(_) => {}
        }

        Ok(())
    }
}

// A missing entity decodes as `null`; treat it as an empty object so the error names the
// missing field rather than the type mismatch.
fn entity_value(value: serde_json::Value) -> serde_json::Value {
    if value.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        value
    }
}
