//! Query paths and their JSON request payloads.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// The query paths served by the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Path {
    FetchUser,
    GetPosts,
    GetUpvoteStatus,
    GetCommentUpvoteStatus,
    Comment,
    Post,
}

impl Path {
    pub const ALL: [Path; 6] = [
        Path::FetchUser,
        Path::GetPosts,
        Path::GetUpvoteStatus,
        Path::GetCommentUpvoteStatus,
        Path::Comment,
        Path::Post,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Path::FetchUser => "/fetch-user",
            Path::GetPosts => "/get-posts",
            Path::GetUpvoteStatus => "/get-upvote-status",
            Path::GetCommentUpvoteStatus => "/get-comment-upvote-status",
            Path::Comment => "/comment",
            Path::Post => "/post",
        }
    }
}

impl FromStr for Path {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the path with or without its leading slash:
        let trimmed = s.trim_start_matches('/');
        Path::ALL
            .into_iter()
            .find(|path| &path.as_str()[1..] == trimmed)
            .ok_or_else(|| format!("unknown query path {s:?}"))
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchUser {
    /// Base64 ed25519 public key, as in transaction envelopes.
    pub public_key: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostFilter {
    #[default]
    None,
    Ask,
    Show,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Score,
    Date,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPosts {
    #[serde(default)]
    pub filter: Option<PostFilter>,
    #[serde(default)]
    pub sort_by: SortBy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUpvoteStatus {
    pub public_key: String,
    pub post_ids: Vec<ObjectId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCommentUpvoteStatus {
    pub public_key: String,
    pub comment_ids: Vec<ObjectId>,
}

/// Payload of `/post` and `/comment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ById {
    pub id: ObjectId,
}
