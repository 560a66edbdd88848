use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Check a decoded transaction against the schema rules and the current state.
    ///
    /// Returns the acting user, or `None` when the transaction registers a new one. Signature
    /// verification is not part of this check; callers decide whether it already happened.
    pub(crate) async fn admit(&self, tx: &Transaction) -> Result<Option<User>, TxError> {
        let Transaction {
            public_key,
            command,
        } = tx;

        command.check_schema()?;

        // Registration is the one command that must come from an unknown key:
        if let Command::CreateUser(CreateUser { id, .. }) = command {
            if self.user_by_public_key(public_key).await?.is_some() {
                reject!(
                    ResponseCode::BadData,
                    "public key {public_key} already belongs to a user"
                );
            }
            if self.contains(Collection::Users, id).await? {
                reject!(ResponseCode::BadData, "user id {id} is already taken");
            }
            return Ok(None);
        }

        let Some(user) = self.user_by_public_key(public_key).await? else {
            reject!(
                ResponseCode::BadData,
                "no user is registered for public key {public_key}"
            );
        };

        match command {
            // Handled above:
            Command::CreateUser(_) => {}
            Command::CreatePost(CreatePost { id, .. }) => {
                if self.contains(Collection::Posts, id).await? {
                    reject!(ResponseCode::BadData, "post id {id} is already taken");
                }
            }
            Command::CreateComment(CreateComment {
                id,
                post_id,
                parent_comment_id,
                ..
            }) => {
                if self.contains(Collection::Comments, id).await? {
                    reject!(ResponseCode::BadData, "comment id {id} is already taken");
                }
                if !self.contains(Collection::Posts, post_id).await? {
                    reject!(ResponseCode::BadData, "post {post_id} does not exist");
                }
                if let Some(parent_id) = parent_comment_id {
                    match self.comment(parent_id).await? {
                        None => {
                            reject!(
                                ResponseCode::BadData,
                                "parent comment {parent_id} does not exist"
                            );
                        }
                        Some(parent) if parent.post_id != *post_id => {
                            reject!(
                                ResponseCode::BadData,
                                "parent comment {parent_id} belongs to post {}, not {post_id}",
                                parent.post_id
                            );
                        }
                        Some(_) => {}
                    }
                }
            }
            Command::UpvotePost(UpvotePost { post_id }) => {
                if !self.contains(Collection::Posts, post_id).await? {
                    reject!(ResponseCode::BadData, "post {post_id} does not exist");
                }
            }
            Command::UpvoteComment(UpvoteComment { comment_id }) => {
                if !self.contains(Collection::Comments, comment_id).await? {
                    reject!(ResponseCode::BadData, "comment {comment_id} does not exist");
                }
            }
            Command::UpvoteValidator(UpvoteValidator {
                validator_id,
                user: claimed,
            }) => {
                if !self.contains(Collection::Validators, validator_id).await? {
                    reject!(
                        ResponseCode::BadData,
                        "validator {validator_id} does not exist"
                    );
                }
                if let Some(claimed) = claimed
                    && *claimed != user.id
                {
                    reject!(
                        ResponseCode::BadData,
                        "vote claims to be from user {claimed} but is signed by user {}",
                        user.id
                    );
                }
            }
        }

        Ok(Some(user))
    }
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
