use ed25519_dalek::SigningKey;

use crate::transaction::{
    Command, CreateComment, CreatePost, CreateUser, SignError, Transaction, UpvoteComment,
    UpvotePost, UpvoteValidator,
};
use crate::{ObjectId, PublicKey};

/// Builds signed transactions for a single signing key.
pub struct Builder {
    key: SigningKey,
}

impl Builder {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.verifying_key().into()
    }

    /// The unsigned transaction for `command` from this builder's key.
    pub fn transaction(&self, command: Command) -> Transaction {
        Transaction {
            public_key: self.public_key(),
            command,
        }
    }

    /// Sign `command` and return the envelope bytes ready for broadcast.
    pub fn sign(&self, command: Command) -> Result<Vec<u8>, SignError> {
        self.transaction(command).sign_to_bytes(&self.key)
    }

    pub fn create_user(&self, id: ObjectId, username: &str, name: &str) -> Command {
        Command::CreateUser(CreateUser {
            id,
            username: username.to_string(),
            name: name.to_string(),
        })
    }

    pub fn create_post(
        &self,
        id: ObjectId,
        title: &str,
        url: Option<&str>,
        text: Option<&str>,
    ) -> Command {
        Command::CreatePost(CreatePost {
            id,
            title: title.to_string(),
            url: url.map(str::to_string),
            text: text.map(str::to_string),
        })
    }

    pub fn create_comment(
        &self,
        id: ObjectId,
        post_id: ObjectId,
        content: &str,
        parent_comment_id: Option<ObjectId>,
    ) -> Command {
        Command::CreateComment(CreateComment {
            id,
            post_id,
            content: content.to_string(),
            parent_comment_id,
        })
    }

    pub fn upvote_post(&self, post_id: ObjectId) -> Command {
        Command::UpvotePost(UpvotePost { post_id })
    }

    pub fn upvote_comment(&self, comment_id: ObjectId) -> Command {
        Command::UpvoteComment(UpvoteComment { comment_id })
    }

    pub fn upvote_validator(&self, validator_id: ObjectId, user: Option<ObjectId>) -> Command {
        Command::UpvoteValidator(UpvoteValidator { validator_id, user })
    }
}
