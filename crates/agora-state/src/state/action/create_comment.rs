use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Create a comment on a post, with the author's automatic vote already counted.
    #[instrument(
        skip(self, create_comment, author),
        fields(id = %create_comment.id, post = %create_comment.post_id, author = %author.id),
    )]
    pub(crate) async fn create_comment(
        &mut self,
        create_comment: &CreateComment,
        author: &User,
    ) -> Result<(), Report> {
        let CreateComment {
            id,
            post_id,
            content,
            parent_comment_id,
        } = create_comment;

        let upvotes = 1;
        let comment = Comment {
            id: *id,
            content: content.clone(),
            author: author.id,
            post_id: *post_id,
            parent_comment_id: *parent_comment_id,
            upvotes,
            score: ranking::score(upvotes, id.created_at(), self.block_time().await?),
        };

        self.insert_document(Collection::Comments, id, &comment)
            .await?;
        self.index_comment(post_id, id)?;
        VoteLedger::COMMENTS.cast(self, &author.id, id).await?;

        let mut post = self
            .post(post_id)
            .await?
            .ok_or_else(|| eyre!("post {post_id} does not exist"))?;
        post.num_comments += 1;
        self.update_document(Collection::Posts, post_id, &post)
            .await?;

        info!("comment created");
        Ok(())
    }
}
