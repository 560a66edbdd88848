//! Query response types.
//!
//! These types are used for serializing responses from the query service and deserializing them
//! in clients and tests. Author references are resolved into full [`User`] documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tendermint::Time;

use crate::ObjectId;
use crate::entity::{Comment, Post, User};

/// A post with its author resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub author: User,
    pub upvotes: i64,
    pub score: f64,
    pub num_comments: u64,
    pub ask: bool,
    pub show: bool,
    /// Creation time, recovered from the identifier.
    pub date: Time,
}

impl PostView {
    pub fn new(post: Post, author: User) -> Self {
        let Post {
            id,
            title,
            url,
            text,
            author: _,
            upvotes,
            score,
            num_comments,
            ask,
            show,
            spam: _,
        } = post;
        PostView {
            id,
            title,
            url,
            text,
            author,
            upvotes,
            score,
            num_comments,
            ask,
            show,
            date: id.created_at(),
        }
    }
}

/// A comment with its author resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub author: User,
    pub post_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<ObjectId>,
    pub upvotes: i64,
    pub score: f64,
    pub date: Time,
}

impl CommentView {
    pub fn new(comment: Comment, author: User) -> Self {
        let Comment {
            id,
            content,
            author: _,
            post_id,
            parent_comment_id,
            upvotes,
            score,
        } = comment;
        CommentView {
            id,
            content,
            author,
            post_id,
            parent_comment_id,
            upvotes,
            score,
            date: id.created_at(),
        }
    }
}

/// Response of the `/post` query: a post and its whole comment thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostThread {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Response of the upvote-status queries: whether the user currently votes for each target.
pub type UpvoteStatus = BTreeMap<ObjectId, bool>;
