use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Toggle the voter's vote on a post and re-rank it.
    #[instrument(skip(self, voter), fields(voter = %voter.id))]
    pub(crate) async fn upvote_post(
        &mut self,
        UpvotePost { post_id }: &UpvotePost,
        voter: &User,
    ) -> Result<(), Report> {
        let toggle = VoteLedger::POSTS.toggle(self, &voter.id, post_id).await?;

        let mut post = self
            .post(post_id)
            .await?
            .ok_or_else(|| eyre!("post {post_id} does not exist"))?;
        post.upvotes += toggle.delta();
        post.score = ranking::score(post.upvotes, post.created_at(), self.block_time().await?);
        self.update_document(Collection::Posts, post_id, &post)
            .await?;

        debug!(?toggle, upvotes = post.upvotes, score = post.score);
        Ok(())
    }

    /// Toggle the voter's vote on a comment and re-rank it.
    #[instrument(skip(self, voter), fields(voter = %voter.id))]
    pub(crate) async fn upvote_comment(
        &mut self,
        UpvoteComment { comment_id }: &UpvoteComment,
        voter: &User,
    ) -> Result<(), Report> {
        let toggle = VoteLedger::COMMENTS
            .toggle(self, &voter.id, comment_id)
            .await?;

        let mut comment = self
            .comment(comment_id)
            .await?
            .ok_or_else(|| eyre!("comment {comment_id} does not exist"))?;
        comment.upvotes += toggle.delta();
        comment.score = ranking::score(
            comment.upvotes,
            comment.created_at(),
            self.block_time().await?,
        );
        self.update_document(Collection::Comments, comment_id, &comment)
            .await?;

        debug!(?toggle, upvotes = comment.upvotes, score = comment.score);
        Ok(())
    }

    /// Toggle the voter's vote on a validator; standings take effect at the end of the block.
    #[instrument(skip(self, upvote_validator, voter), fields(validator = %upvote_validator.validator_id, voter = %voter.id))]
    pub(crate) async fn upvote_validator(
        &mut self,
        upvote_validator: &UpvoteValidator,
        voter: &User,
    ) -> Result<(), Report> {
        let validator_id = &upvote_validator.validator_id;
        let toggle = VoteLedger::VALIDATORS
            .toggle(self, &voter.id, validator_id)
            .await?;

        let mut validator = self
            .validator(validator_id)
            .await?
            .ok_or_else(|| eyre!("validator {validator_id} does not exist"))?;
        validator.votes += toggle.delta();
        self.update_document(Collection::Validators, validator_id, &validator)
            .await?;

        debug!(?toggle, votes = validator.votes);
        Ok(())
    }
}
