use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Deliver transaction bytes to the state.
    ///
    /// The signature was verified at admission and is not checked again, but every state
    /// precondition is, since earlier transactions in the block may have changed the state.
    pub async fn deliver_tx(&mut self, tx_bytes: &[u8]) -> Result<(), TxError> {
        let tx = Transaction::from_bytes_unverified(tx_bytes)?;
        let actor = self.admit(&tx).await?;
        self.execute(tx, actor).await?;
        Ok(())
    }

    /// Apply an admitted command, without committing the results yet.
    async fn execute(
        &mut self,
        Transaction {
            public_key,
            command,
        }: Transaction,
        actor: Option<User>,
    ) -> Result<(), Report> {
        if let Command::CreateUser(create_user) = &command {
            return self.create_user(create_user, &public_key).await;
        }

        let user = actor.ok_or_eyre("admitted command has no acting user")?;
        match &command {
            Command::CreateUser(_) => Ok(()),
            Command::CreatePost(create_post) => self.create_post(create_post, &user).await,
            Command::CreateComment(create_comment) => {
                self.create_comment(create_comment, &user).await
            }
            Command::UpvotePost(upvote_post) => self.upvote_post(upvote_post, &user).await,
            Command::UpvoteComment(upvote_comment) => {
                self.upvote_comment(upvote_comment, &user).await
            }
            Command::UpvoteValidator(upvote_validator) => {
                self.upvote_validator(upvote_validator, &user).await
            }
        }
    }
}
