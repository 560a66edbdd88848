use super::*;

/// A toggle-vote ledger: at most one vote per (voter, target), where voting again withdraws.
///
/// The vote rows live in their own collection; two secondary indexes map (voter, target) to the
/// row and (target, voter) back to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteLedger {
    collection: Collection,
}

/// The outcome of toggling a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Cast,
    Withdrawn,
}

impl Toggle {
    /// The change this toggle makes to the target's vote count.
    pub fn delta(self) -> i64 {
        match self {
            Toggle::Cast => 1,
            Toggle::Withdrawn => -1,
        }
    }
}

impl VoteLedger {
    pub const POSTS: VoteLedger = VoteLedger {
        collection: Collection::PostVotes,
    };
    pub const COMMENTS: VoteLedger = VoteLedger {
        collection: Collection::CommentVotes,
    };
    pub const VALIDATORS: VoteLedger = VoteLedger {
        collection: Collection::ValidatorVotes,
    };

    fn by_voter(&self, voter: &ObjectId, target: &ObjectId) -> Vec<u8> {
        format!("{}/by_voter/{voter}/{target}", self.collection).into_bytes()
    }

    fn by_target(&self, target: &ObjectId, voter: &ObjectId) -> Vec<u8> {
        format!("{}/by_target/{target}/{voter}", self.collection).into_bytes()
    }

    /// The vote `voter` currently casts for `target`, if any.
    pub async fn vote<S: StateReadExt + StateWriteExt + 'static>(
        &self,
        state: &State<S>,
        voter: &ObjectId,
        target: &ObjectId,
    ) -> Result<Option<Vote>, Report> {
        let Some(id) = state
            .store
            .index_get::<ObjectId>(Documents, &self.by_voter(voter, target))
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(
            state
                .document::<Vote>(self.collection, &id)
                .await?
                .ok_or_else(|| eyre!("{} row {id} is indexed but does not exist", self.collection))?,
        ))
    }

    pub async fn has_voted<S: StateReadExt + StateWriteExt + 'static>(
        &self,
        state: &State<S>,
        voter: &ObjectId,
        target: &ObjectId,
    ) -> Result<bool, Report> {
        Ok(state
            .store
            .index_get::<ObjectId>(Documents, &self.by_voter(voter, target))
            .await?
            .is_some())
    }

    /// The number of vote rows for `target`.
    pub async fn votes_for<S: StateReadExt + StateWriteExt + 'static>(
        &self,
        state: &State<S>,
        target: &ObjectId,
    ) -> Result<u64, Report> {
        let prefix = format!("{}/by_target/{target}/", self.collection);
        let mut stream = Box::pin(
            state
                .store
                .index_prefix::<ObjectId>(Documents, prefix.as_bytes()),
        );
        let mut count = 0;
        while let Some(entry) = stream.next().await {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Record a vote, which must not already exist.
    pub(crate) async fn cast<S: StateReadExt + StateWriteExt + 'static>(
        &self,
        state: &mut State<S>,
        voter: &ObjectId,
        target: &ObjectId,
    ) -> Result<Vote, Report> {
        if self.has_voted(state, voter, target).await? {
            bail!("{voter} already votes for {target} in {}", self.collection);
        }

        let now = state.block_time().await?;
        let id = state
            .mint_id(
                self.collection,
                now,
                &[voter.as_bytes(), target.as_bytes()],
            )
            .await?;
        let vote = Vote {
            id,
            voter: *voter,
            target: *target,
        };

        state.insert_document(self.collection, &id, &vote).await?;
        state
            .store
            .index_put(Documents, &self.by_voter(voter, target), &id)?;
        state
            .store
            .index_put(Documents, &self.by_target(target, voter), &id)?;

        Ok(vote)
    }

    /// Withdraw an existing vote.
    pub(crate) async fn withdraw<S: StateReadExt + StateWriteExt + 'static>(
        &self,
        state: &mut State<S>,
        voter: &ObjectId,
        target: &ObjectId,
    ) -> Result<Vote, Report> {
        let vote = self
            .vote(state, voter, target)
            .await?
            .ok_or_else(|| eyre!("{voter} does not vote for {target} in {}", self.collection))?;

        state.remove_document(self.collection, &vote.id).await?;
        state
            .store
            .index_remove(Documents, &self.by_voter(voter, target));
        state
            .store
            .index_remove(Documents, &self.by_target(target, voter));

        Ok(vote)
    }

    /// Cast the vote if absent, withdraw it if present.
    #[instrument(skip(self, state), fields(collection = %self.collection))]
    pub(crate) async fn toggle<S: StateReadExt + StateWriteExt + 'static>(
        &self,
        state: &mut State<S>,
        voter: &ObjectId,
        target: &ObjectId,
    ) -> Result<Toggle, Report> {
        if self.has_voted(state, voter, target).await? {
            self.withdraw(state, voter, target).await?;
            debug!("vote withdrawn");
            Ok(Toggle::Withdrawn)
        } else {
            self.cast(state, voter, target).await?;
            debug!("vote cast");
            Ok(Toggle::Cast)
        }
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
