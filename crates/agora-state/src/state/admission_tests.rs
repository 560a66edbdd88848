use agora_types::transaction::{Builder, Envelope};

use super::*;
use crate::test::{
    GENESIS, TestChain, assert_rejected, genesis_validator, oid, sign_raw, signer,
};

/// A chain with one registered user, one post with a comment, and one validator.
struct World {
    chain: TestChain,
    alice: Builder,
    alice_id: ObjectId,
    post_id: ObjectId,
    comment_id: ObjectId,
    validator_id: ObjectId,
}

async fn world() -> World {
    let mut chain = TestChain::with_genesis("", &[genesis_validator(9, 10)]).await;
    let alice = signer(1);
    let alice_id = chain.register(&alice, 1, "alice").await;
    let post_id = chain.post(&alice, 2, "A post").await;
    let comment_id = oid(chain.next_time(), 3);
    chain
        .block_ok(&[alice
            .sign(alice.create_comment(comment_id, post_id, "hi", None))
            .unwrap()])
        .await;
    let validator_id = chain.state().await.validators().await.unwrap()[0].id;

    World {
        chain,
        alice,
        alice_id,
        post_id,
        comment_id,
        validator_id,
    }
}

/// One well-formed command of every kind, valid for `signer` in `world` if registered.
fn every_command(world: &World, signer: &Builder) -> Vec<Command> {
    let fresh = oid(world.chain.next_time(), 100);
    vec![
        signer.create_user(fresh, "newcomer", "Newcomer"),
        signer.create_post(fresh, "Another post", None, Some("body")),
        signer.create_comment(fresh, world.post_id, "reply", Some(world.comment_id)),
        signer.upvote_post(world.post_id),
        signer.upvote_comment(world.comment_id),
        signer.upvote_validator(world.validator_id, None),
    ]
}

#[tokio::test]
async fn signature_gate_covers_every_command() {
    let world = world().await;
    let alice = &world.alice;

    for command in every_command(&world, alice) {
        let kind = command.kind();
        let tx = alice.sign(command).unwrap();

        let mut envelope = Envelope::decode(&tx).unwrap();
        let mut signature = hex::decode(&envelope.signature).unwrap();
        signature[10] ^= 0x01;
        envelope.signature = hex::encode(signature);
        assert_rejected(
            world.chain.check(&envelope.encode()).await,
            ResponseCode::BadSignature,
        );

        let mut envelope = Envelope::decode(&tx).unwrap();
        envelope.body.push(' ');
        assert_rejected(
            world.chain.check(&envelope.encode()).await,
            ResponseCode::BadSignature,
        );

        let mut envelope = Envelope::decode(&tx).unwrap();
        envelope.signature = "not hex".to_string();
        assert_rejected(
            world.chain.check(&envelope.encode()).await,
            ResponseCode::BadSignature,
        );

        // Everything but registration is admissible as signed (alice already has a user):
        let result = world.chain.check(&tx).await;
        if kind == "createUser" {
            assert_rejected(result, ResponseCode::BadData);
        } else {
            assert!(result.is_ok(), "{kind}: {result:?}");
        }
    }
}

#[tokio::test]
async fn identity_gate_applies_to_everything_but_registration() {
    let world = world().await;
    let mallory = signer(66);

    for command in every_command(&world, &mallory) {
        let kind = command.kind();
        let result = world.chain.check(&mallory.sign(command).unwrap()).await;
        if kind == "createUser" {
            assert!(result.is_ok(), "{kind}: {result:?}");
        } else {
            assert_rejected(result, ResponseCode::BadData);
        }
    }
}

#[tokio::test]
async fn one_user_per_key_and_per_id() {
    let world = world().await;

    let again = world
        .alice
        .sign(world.alice.create_user(oid(GENESIS, 50), "alice2", "Alice"))
        .unwrap();
    assert_rejected(world.chain.check(&again).await, ResponseCode::BadData);

    let bob = signer(2);
    let stolen_id = bob
        .sign(bob.create_user(world.alice_id, "bob", "Bob"))
        .unwrap();
    assert_rejected(world.chain.check(&stolen_id).await, ResponseCode::BadData);
}

#[tokio::test]
async fn identifiers_cannot_be_reused() {
    let world = world().await;
    let alice = &world.alice;

    let post = alice
        .sign(alice.create_post(world.post_id, "Again", None, None))
        .unwrap();
    assert_rejected(world.chain.check(&post).await, ResponseCode::BadData);

    let comment = alice
        .sign(alice.create_comment(world.comment_id, world.post_id, "Again", None))
        .unwrap();
    assert_rejected(world.chain.check(&comment).await, ResponseCode::BadData);
}

#[tokio::test]
async fn references_must_exist() {
    let world = world().await;
    let alice = &world.alice;
    let missing = oid(GENESIS, 999);
    let fresh = oid(world.chain.next_time(), 100);

    for command in [
        alice.upvote_post(missing),
        alice.upvote_comment(missing),
        alice.upvote_validator(missing, None),
        alice.create_comment(fresh, missing, "orphan", None),
        alice.create_comment(fresh, world.post_id, "orphan", Some(missing)),
    ] {
        let kind = command.kind();
        let result = world.chain.check(&alice.sign(command).unwrap()).await;
        assert!(
            matches!(result, Err(TxError::Rejected { code: ResponseCode::BadData, .. })),
            "{kind}: {result:?}"
        );
    }
}

#[tokio::test]
async fn reply_must_stay_on_the_same_post() {
    let mut world = world().await;
    let other_post = world.chain.post(&world.alice, 4, "Other post").await;
    let alice = &world.alice;

    let reply = alice
        .sign(alice.create_comment(
            oid(world.chain.next_time(), 5),
            other_post,
            "wrong thread",
            Some(world.comment_id),
        ))
        .unwrap();
    assert_rejected(world.chain.check(&reply).await, ResponseCode::BadData);
}

#[tokio::test]
async fn validator_vote_must_come_from_the_claimed_user() {
    let world = world().await;
    let alice = &world.alice;

    let honest = alice
        .sign(alice.upvote_validator(world.validator_id, Some(world.alice_id)))
        .unwrap();
    world.chain.check(&honest).await.unwrap();

    let forged = alice
        .sign(alice.upvote_validator(world.validator_id, Some(oid(GENESIS, 2))))
        .unwrap();
    assert_rejected(world.chain.check(&forged).await, ResponseCode::BadData);
}

#[tokio::test]
async fn schema_violations_are_bad_data() {
    let world = world().await;
    let alice = &world.alice;
    let fresh = oid(world.chain.next_time(), 100);

    for command in [
        alice.create_post(fresh, "  ", None, None),
        alice.create_post(fresh, "Title", Some("not a uri"), None),
        alice.create_comment(fresh, world.post_id, "", None),
    ] {
        assert_rejected(
            world.chain.check(&alice.sign(command).unwrap()).await,
            ResponseCode::BadData,
        );
    }

    let bob = signer(2);
    assert_rejected(
        world
            .chain
            .check(&bob.sign(bob.create_user(fresh, "bob!", "Bob")).unwrap())
            .await,
        ResponseCode::BadData,
    );
}

#[tokio::test]
async fn malformed_transactions_are_encoding_errors() {
    let world = world().await;

    assert_rejected(world.chain.check(b"{").await, ResponseCode::EncodingError);
    assert_rejected(
        world.chain.check(&sign_raw(1, "not json")).await,
        ResponseCode::EncodingError,
    );
    assert_rejected(
        world
            .chain
            .check(&sign_raw(1, r#"{"type": "deletePost"}"#))
            .await,
        ResponseCode::BadData,
    );
}

#[tokio::test]
async fn admission_never_writes() {
    let world = world().await;
    let bob = signer(2);
    let bob_id = oid(GENESIS, 2);
    let before = world.chain.state().await.total_documents().await.unwrap();

    let register = bob.sign(bob.create_user(bob_id, "bob", "Bob")).unwrap();
    world.chain.check(&register).await.unwrap();
    world.chain.check(&register).await.unwrap();

    let state = world.chain.state().await;
    assert!(state.user(&bob_id).await.unwrap().is_none());
    assert_eq!(state.total_documents().await.unwrap(), before);
}
