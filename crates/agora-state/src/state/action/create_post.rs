use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Create a post, with the author's automatic vote already counted.
    #[instrument(skip(self, create_post, author), fields(id = %create_post.id, author = %author.id))]
    pub(crate) async fn create_post(
        &mut self,
        create_post: &CreatePost,
        author: &User,
    ) -> Result<(), Report> {
        let CreatePost {
            id,
            title,
            url,
            text,
        } = create_post;

        let (ask, show) = classify_title(title);
        let spam = self.is_flagged_spam(id).await?;
        if spam {
            info!("post is flagged as spam");
        }

        let upvotes = 1;
        let post = Post {
            id: *id,
            title: title.clone(),
            url: url.clone(),
            text: text.clone(),
            author: author.id,
            upvotes,
            score: ranking::score(upvotes, id.created_at(), self.block_time().await?),
            num_comments: 0,
            ask,
            show,
            spam,
        };

        self.insert_document(Collection::Posts, id, &post).await?;
        VoteLedger::POSTS.cast(self, &author.id, id).await?;

        info!(ask, show, "post created");
        Ok(())
    }
}
