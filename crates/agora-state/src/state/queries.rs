use std::num::NonZero;

use futures::stream;
use tendermint::abci::Code;

use super::*;

fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, Report> {
    // An empty payload is read as an empty object, so requests with only optional fields can
    // omit it entirely:
    let data = if data.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        data
    };
    serde_json::from_slice(data).map_err(|e| eyre!("malformed query payload: {e}"))
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Answer a query as an ABCI response. Failures of any kind, including store reads, are
    /// reported in `log` with code 1.
    pub async fn answer_query(
        &self,
        path: &str,
        data: &[u8],
        concurrency: usize,
    ) -> response::Query {
        let result = async {
            let value = self.query(path, data, concurrency).await?;
            let height = self.block_height().await?;
            Ok::<_, Report>((value, height))
        }
        .await;

        match result {
            Ok((value, height)) => response::Query {
                value: value.into(),
                height,
                ..Default::default()
            },
            Err(e) => {
                debug!(%path, "query failed: {e}");
                response::Query {
                    code: Code::Err(NonZero::new(1).expect("1 != 0")),
                    log: e.to_string(),
                    height: self.block_height().await.unwrap_or(Height::from(0u32)),
                    ..Default::default()
                }
            }
        }
    }

    /// Answer a read-only query on `path` with the JSON request `data`, returning the JSON
    /// response.
    ///
    /// Independent lookups are fanned out at most `concurrency` at a time.
    #[instrument(skip(self, data))]
    pub async fn query(
        &self,
        path: &str,
        data: &[u8],
        concurrency: usize,
    ) -> Result<Vec<u8>, Report> {
        let path: query::Path = path.parse().map_err(|e: String| eyre!(e))?;
        let concurrency = concurrency.max(1);

        let response = match path {
            query::Path::FetchUser => {
                let query::FetchUser { public_key } = decode(data)?;
                let user = self.fetch_user(&PublicKey::from_base64(&public_key)?).await?;
                serde_json::to_vec(&user)?
            }
            query::Path::GetPosts => {
                let query::GetPosts { filter, sort_by } = decode(data)?;
                let posts = self.posts(filter, sort_by, concurrency).await?;
                serde_json::to_vec(&posts)?
            }
            query::Path::GetUpvoteStatus => {
                let query::GetUpvoteStatus {
                    public_key,
                    post_ids,
                } = decode(data)?;
                let status = self
                    .upvote_status(
                        VoteLedger::POSTS,
                        &PublicKey::from_base64(&public_key)?,
                        &post_ids,
                        concurrency,
                    )
                    .await?;
                serde_json::to_vec(&status)?
            }
            query::Path::GetCommentUpvoteStatus => {
                let query::GetCommentUpvoteStatus {
                    public_key,
                    comment_ids,
                } = decode(data)?;
                let status = self
                    .upvote_status(
                        VoteLedger::COMMENTS,
                        &PublicKey::from_base64(&public_key)?,
                        &comment_ids,
                        concurrency,
                    )
                    .await?;
                serde_json::to_vec(&status)?
            }
            query::Path::Post => {
                let query::ById { id } = decode(data)?;
                serde_json::to_vec(&self.post_thread(&id, concurrency).await?)?
            }
            query::Path::Comment => {
                let query::ById { id } = decode(data)?;
                serde_json::to_vec(&self.comment_view(&id).await?)?
            }
        };

        Ok(response)
    }

    /// The user registered under a public key.
    pub async fn fetch_user(&self, public_key: &PublicKey) -> Result<User, Report> {
        self.user_by_public_key(public_key)
            .await?
            .ok_or_else(|| eyre!("no user is registered for public key {public_key}"))
    }

    async fn author(&self, id: &ObjectId) -> Result<User, Report> {
        self.user(id)
            .await?
            .ok_or_else(|| eyre!("author {id} does not exist"))
    }

    /// Every post not flagged as spam, filtered and sorted in descending order.
    pub async fn posts(
        &self,
        filter: Option<PostFilter>,
        sort_by: SortBy,
        concurrency: usize,
    ) -> Result<Vec<PostView>, Report> {
        let mut posts: Vec<Post> = self
            .documents::<Post>(Collection::Posts)
            .await?
            .into_iter()
            .filter(|post| !post.spam)
            .filter(|post| match filter {
                Some(PostFilter::Ask) => post.ask,
                Some(PostFilter::Show) => post.show,
                Some(PostFilter::None) | None => true,
            })
            .collect();

        match sort_by {
            SortBy::Score => posts.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            SortBy::Date => posts.sort_by(|a, b| {
                b.id.timestamp()
                    .cmp(&a.id.timestamp())
                    .then_with(|| b.id.cmp(&a.id))
            }),
        }

        stream::iter(posts)
            .map(|post| async move {
                let author = self.author(&post.author).await?;
                Ok::<_, Report>(PostView::new(post, author))
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// Whether the user behind `public_key` currently votes for each of `targets`.
    ///
    /// An unregistered key votes for nothing.
    pub async fn upvote_status(
        &self,
        ledger: VoteLedger,
        public_key: &PublicKey,
        targets: &[ObjectId],
        concurrency: usize,
    ) -> Result<UpvoteStatus, Report> {
        let Some(user) = self.user_by_public_key(public_key).await? else {
            return Ok(targets.iter().map(|target| (*target, false)).collect());
        };

        let voter = user.id;
        stream::iter(targets.iter().copied())
            .map(|target| async move {
                let voted = ledger.has_voted(self, &voter, &target).await?;
                Ok::<_, Report>((target, voted))
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// A post with its whole comment thread, authors resolved.
    pub async fn post_thread(
        &self,
        id: &ObjectId,
        concurrency: usize,
    ) -> Result<PostThread, Report> {
        let post = self
            .post(id)
            .await?
            .ok_or_else(|| eyre!("post {id} does not exist"))?;
        let author = self.author(&post.author).await?;

        let comments = stream::iter(self.comments_on(id).await?)
            .map(|comment| async move {
                let author = self.author(&comment.author).await?;
                Ok::<_, Report>(CommentView::new(comment, author))
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        Ok(PostThread {
            post: PostView::new(post, author),
            comments,
        })
    }

    /// A single comment, author resolved.
    pub async fn comment_view(&self, id: &ObjectId) -> Result<CommentView, Report> {
        let comment = self
            .comment(id)
            .await?
            .ok_or_else(|| eyre!("comment {id} does not exist"))?;
        let author = self.author(&comment.author).await?;
        Ok(CommentView::new(comment, author))
    }
}

#[cfg(test)]
#[path = "queries_tests.rs"]
mod tests;
