use std::collections::BTreeSet;

use super::*;
use crate::test::{CHAIN_ID, GENESIS, TestChain, at, genesis_validator, signer};

/// The recorded committee is exactly the top `k` validators by votes, ties by id.
async fn assert_committee_invariant(chain: &TestChain, k: usize) {
    let state = chain.state().await;
    let mut validators = state.validators().await.unwrap();

    let active: BTreeSet<ObjectId> = validators
        .iter()
        .filter(|validator| validator.active)
        .map(|validator| validator.id)
        .collect();

    validators.sort_by(committee_order);
    let expected: BTreeSet<ObjectId> = validators
        .iter()
        .take(k)
        .map(|validator| validator.id)
        .collect();

    assert_eq!(active, expected);
}

fn reported_key(update: &Update) -> String {
    hex::encode_upper(update.pub_key.to_bytes())
}

#[tokio::test]
async fn genesis_declares_active_validators() {
    let chain = TestChain::with_genesis("", &[genesis_validator(1, 10), genesis_validator(2, 20)])
        .await;

    let validators = chain.state().await.validators().await.unwrap();
    assert_eq!(validators.len(), 2);
    for validator in &validators {
        assert!(validator.active);
        assert_eq!(validator.votes, 0);
        assert_eq!(validator.name.len(), 40);
        assert_eq!(validator.id.timestamp() as i64, GENESIS);
    }

    let mut powers: Vec<u64> = validators.iter().map(|validator| validator.power).collect();
    powers.sort();
    assert_eq!(powers, vec![10, 20]);

    let keys: BTreeSet<String> = validators
        .iter()
        .map(|validator| validator.public_key.clone())
        .collect();
    let expected: BTreeSet<String> = [genesis_validator(1, 10), genesis_validator(2, 20)]
        .iter()
        .map(reported_key)
        .collect();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn empty_genesis_validator_set_is_fine() {
    let mut chain = TestChain::new().await;
    assert!(chain.state().await.validators().await.unwrap().is_empty());
    assert!(chain.block_ok(&[]).await.updates.is_empty());
}

#[tokio::test]
async fn duplicate_genesis_validator_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Store::init(dir.path().to_path_buf()).await.unwrap();
    let result = store
        .state
        .write()
        .await
        .genesis(
            CHAIN_ID,
            at(GENESIS),
            b"",
            &[genesis_validator(1, 10), genesis_validator(1, 10)],
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn surplus_genesis_validators_leave_at_first_block() {
    let mut chain = TestChain::with_genesis(
        r#"{"committeeSize": 2}"#,
        &[
            genesis_validator(1, 10),
            genesis_validator(2, 10),
            genesis_validator(3, 10),
            genesis_validator(4, 10),
        ],
    )
    .await;

    let block = chain.block_ok(&[]).await;
    assert_eq!(block.updates.len(), 2);
    assert!(block.updates.iter().all(|update| update.power.value() == 0));

    // With no votes yet, the two lowest identifiers keep their seats:
    let validators = chain.state().await.validators().await.unwrap();
    let leavers: BTreeSet<String> = block.updates.iter().map(reported_key).collect();
    let expected: BTreeSet<String> = validators[2..]
        .iter()
        .map(|validator| validator.public_key.clone())
        .collect();
    assert_eq!(leavers, expected);
    assert_committee_invariant(&chain, 2).await;

    // Nothing changed, so nothing is reported:
    assert!(chain.block_ok(&[]).await.updates.is_empty());
    assert_committee_invariant(&chain, 2).await;
}

#[tokio::test]
async fn votes_move_validators_between_seats() {
    let mut chain = TestChain::with_genesis(
        r#"{"committeeSize": 1}"#,
        &[genesis_validator(1, 10), genesis_validator(2, 20)],
    )
    .await;
    chain.block_ok(&[]).await;
    assert_committee_invariant(&chain, 1).await;

    let validators = chain.state().await.validators().await.unwrap();
    let (seated, benched) = (validators[0].clone(), validators[1].clone());
    assert!(seated.active && !benched.active);

    let alice = signer(7);
    chain.register(&alice, 1, "alice").await;

    // A single vote lifts the benched validator over the seated one:
    let block = chain
        .block_ok(&[alice
            .sign(alice.upvote_validator(benched.id, None))
            .unwrap()])
        .await;
    assert_eq!(block.updates.len(), 2);
    for update in &block.updates {
        if reported_key(update) == benched.public_key {
            assert_eq!(update.power.value(), benched.power);
        } else {
            assert_eq!(reported_key(update), seated.public_key);
            assert_eq!(update.power.value(), 0);
        }
    }
    assert_committee_invariant(&chain, 1).await;
    assert_eq!(
        chain
            .state()
            .await
            .validator(&benched.id)
            .await
            .unwrap()
            .unwrap()
            .votes,
        1
    );

    // Withdrawing the vote ties them again, and the tie goes back to the lower identifier:
    let block = chain
        .block_ok(&[alice
            .sign(alice.upvote_validator(benched.id, None))
            .unwrap()])
        .await;
    assert_eq!(block.updates.len(), 2);
    assert_committee_invariant(&chain, 1).await;
    assert!(
        chain
            .state()
            .await
            .validator(&seated.id)
            .await
            .unwrap()
            .unwrap()
            .active
    );
}

#[tokio::test]
async fn committee_never_exceeds_its_size() {
    let mut chain = TestChain::with_genesis(
        r#"{"committeeSize": 3}"#,
        &(1..=6).map(|seed| genesis_validator(seed, 5)).collect::<Vec<_>>(),
    )
    .await;
    chain.block_ok(&[]).await;

    let voters: Vec<_> = (20..24).map(signer).collect();
    for (n, voter) in voters.iter().enumerate() {
        chain
            .register(voter, 20 + n as u64, &format!("voter{n}"))
            .await;
    }

    let validators = chain.state().await.validators().await.unwrap();
    for (n, voter) in voters.iter().enumerate() {
        // Each voter backs two validators from the back of the list:
        let txs = [validators[5 - n % 3].id, validators[4 - n % 2].id]
            .into_iter()
            .map(|id| voter.sign(voter.upvote_validator(id, None)).unwrap())
            .collect::<Vec<_>>();
        chain.block_ok(&txs).await;
        assert_committee_invariant(&chain, 3).await;

        let active = chain
            .state()
            .await
            .validators()
            .await
            .unwrap()
            .into_iter()
            .filter(|validator| validator.active)
            .count();
        assert_eq!(active, 3);
    }
}
