//! Documents stored in the entity collections.
//!
//! Field names follow the JSON layout the discussion front-end already consumes, so these types
//! double as the query wire format.

use serde::{Deserialize, Serialize};
use tendermint::Time;

use crate::ObjectId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub username: String,
    /// Uppercase hex of the user's ed25519 public key.
    pub public_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub author: ObjectId,
    pub upvotes: i64,
    pub score: f64,
    pub num_comments: u64,
    pub ask: bool,
    pub show: bool,
    pub spam: bool,
}

impl Post {
    pub fn created_at(&self) -> Time {
        self.id.created_at()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub author: ObjectId,
    pub post_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<ObjectId>,
    pub upvotes: i64,
    pub score: f64,
}

impl Comment {
    pub fn created_at(&self) -> Time {
        self.id.created_at()
    }
}

/// A single toggle-vote row: its presence means `voter` currently votes for `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub voter: ObjectId,
    pub target: ObjectId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Uppercase hex of the validator's ed25519 consensus key.
    pub public_key: String,
    /// Votes accumulated from users; drives committee selection.
    pub votes: i64,
    /// Consensus power reported while the validator sits on the committee.
    pub power: u64,
    /// Whether the consensus engine was last told this validator is on the committee.
    pub active: bool,
}

/// Classify a post title as "Ask" or "Show" by its `"<Kind> <Tag>:"` prefix.
///
/// The prefix must start the title exactly, and the tag runs up to the first colon. Returns
/// `(ask, show)`; at most one is true.
pub fn classify_title(title: &str) -> (bool, bool) {
    let tagged = |rest: &str| {
        rest.split_once(':')
            .is_some_and(|(tag, _)| !tag.trim().is_empty())
    };
    if let Some(rest) = title.strip_prefix("Ask ") {
        (tagged(rest), false)
    } else if let Some(rest) = title.strip_prefix("Show ") {
        (false, tagged(rest))
    } else {
        (false, false)
    }
}
