use serde_json::json;

use super::*;
use crate::test::{CHAIN_ID, GENESIS, TestChain, at, oid, signer};

async fn ask<T: DeserializeOwned>(
    chain: &TestChain,
    path: &str,
    request: serde_json::Value,
) -> Result<T, Report> {
    let data = serde_json::to_vec(&request)?;
    let response = chain
        .store
        .committed()
        .query(path, &data, chain.store.query_concurrency())
        .await?;
    Ok(serde_json::from_slice(&response)?)
}

fn ids(posts: &[PostView]) -> Vec<ObjectId> {
    posts.iter().map(|post| post.id).collect()
}

/// Alice posts a plain, a show and an ask post, in that order; Bob upvotes the plain one.
struct Board {
    chain: TestChain,
    plain: ObjectId,
    show: ObjectId,
    ask: ObjectId,
}

async fn board() -> Board {
    let mut chain = TestChain::new().await;
    let alice = signer(1);
    let bob = signer(2);
    chain.register(&alice, 1, "alice").await;
    chain.register(&bob, 2, "bob").await;

    let plain = chain.post(&alice, 3, "Plain news").await;
    let show = chain.post(&alice, 4, "Show X: my project").await;
    let ask = chain.post(&alice, 5, "Ask X: anyone?").await;
    chain
        .block_ok(&[bob.sign(bob.upvote_post(plain)).unwrap()])
        .await;

    Board {
        chain,
        plain,
        show,
        ask,
    }
}

#[tokio::test]
async fn get_posts_sorts_by_score_then_identifier() {
    let Board {
        chain,
        plain,
        show,
        ask,
    } = board().await;

    let posts: Vec<PostView> = ask_posts(&chain, json!({})).await;
    assert_eq!(ids(&posts), vec![plain, ask, show]);
    assert!(posts[0].score > 0.0);
    assert_eq!(posts[0].upvotes, 2);
    assert_eq!(posts[0].author.username, "alice");

    let posts: Vec<PostView> = ask_posts(&chain, json!({"sortBy": "date"})).await;
    assert_eq!(ids(&posts), vec![ask, show, plain]);
    assert!(posts.windows(2).all(|pair| pair[0].date >= pair[1].date));
}

async fn ask_posts(chain: &TestChain, request: serde_json::Value) -> Vec<PostView> {
    ask(chain, "/get-posts", request).await.unwrap()
}

#[tokio::test]
async fn get_posts_filters_by_kind() {
    let Board {
        chain,
        plain,
        show,
        ask: ask_id,
    } = board().await;

    let shown = ask_posts(&chain, json!({"filter": "show"})).await;
    assert_eq!(ids(&shown), vec![show]);
    assert!(shown[0].show && !shown[0].ask);

    let asked = ask_posts(&chain, json!({"filter": "ask"})).await;
    assert_eq!(ids(&asked), vec![ask_id]);

    let everything = ask_posts(&chain, json!({"filter": "none", "sortBy": "date"})).await;
    assert_eq!(ids(&everything), vec![ask_id, show, plain]);

    // An empty payload is the same as an empty request:
    let response = chain
        .store
        .committed()
        .query("get-posts", b"", 1)
        .await
        .unwrap();
    let posts: Vec<PostView> = serde_json::from_slice(&response).unwrap();
    assert_eq!(posts.len(), 3);
}

#[tokio::test]
async fn spam_is_hidden_from_listings_but_not_from_direct_lookup() {
    let spam_id = oid(GENESIS + 20, 3);
    let mut chain =
        TestChain::with_genesis(&format!(r#"{{"spam": ["{spam_id}"]}}"#), &[]).await;
    let alice = signer(1);
    chain.register(&alice, 1, "alice").await;
    assert_eq!(chain.post(&alice, 3, "Cheap watches").await, spam_id);
    let honest = chain.post(&alice, 4, "Real news").await;

    let posts = ask_posts(&chain, json!({})).await;
    assert_eq!(ids(&posts), vec![honest]);

    let thread: PostThread = ask(&chain, "/post", json!({"id": spam_id})).await.unwrap();
    assert_eq!(thread.post.id, spam_id);
}

#[tokio::test]
async fn fetch_user_by_public_key() {
    let mut chain = TestChain::new().await;
    let alice = signer(1);
    let alice_id = chain.register(&alice, 1, "alice").await;

    let user: User = ask(
        &chain,
        "/fetch-user",
        json!({"publicKey": alice.public_key().to_base64()}),
    )
    .await
    .unwrap();
    assert_eq!(user.id, alice_id);
    assert_eq!(user.username, "alice");
    assert_eq!(user.public_key, alice.public_key().to_hex_upper());

    let stranger = signer(2).public_key().to_base64();
    assert!(
        ask::<User>(&chain, "/fetch-user", json!({"publicKey": stranger}))
            .await
            .is_err()
    );
    assert!(
        ask::<User>(&chain, "/fetch-user", json!({"publicKey": "%%%"}))
            .await
            .is_err()
    );
    assert!(ask::<User>(&chain, "/fetch-user", json!({})).await.is_err());
}

#[tokio::test]
async fn upvote_status_reflects_current_votes() {
    let Board {
        chain, plain, show, ..
    } = board().await;
    let alice = signer(1).public_key().to_base64();
    let bob = signer(2).public_key().to_base64();
    let stranger = signer(3).public_key().to_base64();

    let status: UpvoteStatus = ask(
        &chain,
        "/get-upvote-status",
        json!({"publicKey": bob, "postIds": [plain, show]}),
    )
    .await
    .unwrap();
    assert_eq!(status, UpvoteStatus::from([(plain, true), (show, false)]));

    // Authors start out voting for their own posts:
    let status: UpvoteStatus = ask(
        &chain,
        "/get-upvote-status",
        json!({"publicKey": alice, "postIds": [plain, show]}),
    )
    .await
    .unwrap();
    assert_eq!(status, UpvoteStatus::from([(plain, true), (show, true)]));

    let status: UpvoteStatus = ask(
        &chain,
        "/get-upvote-status",
        json!({"publicKey": stranger, "postIds": [plain, show]}),
    )
    .await
    .unwrap();
    assert_eq!(status, UpvoteStatus::from([(plain, false), (show, false)]));
}

#[tokio::test]
async fn post_thread_and_comment_lookup() {
    let mut chain = TestChain::new().await;
    let alice = signer(1);
    let bob = signer(2);
    let alice_id = chain.register(&alice, 1, "alice").await;
    let bob_id = chain.register(&bob, 2, "bob").await;
    let post_id = chain.post(&alice, 3, "Discuss").await;

    let first = oid(chain.next_time(), 4);
    let reply = oid(chain.next_time(), 5);
    chain
        .block_ok(&[
            bob.sign(bob.create_comment(first, post_id, "First!", None))
                .unwrap(),
            alice
                .sign(alice.create_comment(reply, post_id, "Welcome", Some(first)))
                .unwrap(),
        ])
        .await;
    chain
        .block_ok(&[alice.sign(alice.upvote_comment(first)).unwrap()])
        .await;

    let thread: PostThread = ask(&chain, "/post", json!({"id": post_id})).await.unwrap();
    assert_eq!(thread.post.author.id, alice_id);
    assert_eq!(thread.post.num_comments, 2);
    let comments: Vec<_> = thread
        .comments
        .iter()
        .map(|comment| (comment.id, comment.author.id, comment.parent_comment_id))
        .collect();
    assert_eq!(
        comments,
        vec![(first, bob_id, None), (reply, alice_id, Some(first))]
    );

    let comment: CommentView = ask(&chain, "/comment", json!({"id": first})).await.unwrap();
    assert_eq!(comment.content, "First!");
    assert_eq!(comment.upvotes, 2);
    assert_eq!(comment.post_id, post_id);

    let status: UpvoteStatus = ask(
        &chain,
        "/get-comment-upvote-status",
        json!({"publicKey": alice.public_key().to_base64(), "commentIds": [first, reply]}),
    )
    .await
    .unwrap();
    assert_eq!(status, UpvoteStatus::from([(first, true), (reply, true)]));
}

#[tokio::test]
async fn lookups_of_missing_documents_fail() {
    let chain = TestChain::new().await;
    let missing = oid(GENESIS, 404);

    assert!(
        ask::<PostThread>(&chain, "/post", json!({"id": missing}))
            .await
            .is_err()
    );
    assert!(
        ask::<CommentView>(&chain, "/comment", json!({"id": missing}))
            .await
            .is_err()
    );
    assert!(
        ask::<CommentView>(&chain, "/comment", json!({"id": "nope"}))
            .await
            .is_err()
    );
    assert!(
        ask::<serde_json::Value>(&chain, "/delete-post", json!({}))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn queries_only_see_committed_state() {
    let mut chain = TestChain::new().await;
    let alice = signer(1);
    chain.register(&alice, 1, "alice").await;

    let pending = oid(chain.next_time(), 2);
    {
        let mut state = chain.store.state.write().await;
        state
            .begin(
                CHAIN_ID,
                Height::try_from(2u64).unwrap(),
                at(chain.next_time()),
            )
            .await
            .unwrap();
        state
            .deliver_tx(
                &alice
                    .sign(alice.create_post(pending, "Not yet", None, None))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(state.post(&pending).await.unwrap().is_some());
    }

    assert!(ask_posts(&chain, json!({})).await.is_empty());
    assert!(
        ask::<PostThread>(&chain, "/post", json!({"id": pending}))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn query_failures_are_answered_not_raised() {
    let mut chain = TestChain::new().await;
    let alice = signer(1);
    chain.register(&alice, 1, "alice").await;
    let request = serde_json::to_vec(&json!({"publicKey": alice.public_key().to_base64()}))
        .unwrap();

    let response = chain
        .store
        .committed()
        .answer_query("/fetch-user", &request, 4)
        .await;
    assert!(response.code.is_ok());
    assert_eq!(response.height.value(), 1);

    let response = chain
        .store
        .committed()
        .answer_query("/delete-post", b"", 4)
        .await;
    assert!(response.code.is_err());
    assert!(response.log.contains("unknown query path"));

    // An unreadable block height still yields a response rather than an error:
    let mut state = chain.store.state.write().await;
    state
        .store
        .put(Internal, "current/block_height", &"not a height")
        .unwrap();
    let response = state.answer_query("/fetch-user", &request, 4).await;
    assert!(response.code.is_err());
    assert!(!response.log.is_empty());
    assert_eq!(response.height.value(), 0);
}
