use std::cmp::Ordering;

use super::*;

fn validator_key_index(public_key: &str) -> Vec<u8> {
    format!("validators/by_public_key/{public_key}").into_bytes()
}

/// The consensus address of a key: the first 20 bytes of its SHA-256 hash, in uppercase hex.
fn address(public_key: &[u8]) -> String {
    hex::encode_upper(&Sha256::digest(public_key)[..20])
}

/// Committee order: most votes first, ties broken by identifier.
fn committee_order(a: &Validator, b: &Validator) -> Ordering {
    b.votes.cmp(&a.votes).then_with(|| a.id.cmp(&b.id))
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Declare a genesis validator, which starts out on the committee.
    #[instrument(skip(self, update), fields(power = update.power.value()))]
    pub(crate) async fn declare_validator(
        &mut self,
        update: &Update,
        genesis_time: Time,
    ) -> Result<Validator, Report> {
        let key_bytes = update.pub_key.to_bytes();
        let public_key = hex::encode_upper(&key_bytes);

        // Each consensus key may only be declared once:
        if self
            .store
            .index_get::<ObjectId>(Documents, &validator_key_index(&public_key))
            .await?
            .is_some()
        {
            bail!("validator {public_key} is declared twice");
        }

        let id = self
            .mint_id(Collection::Validators, genesis_time, &[&key_bytes])
            .await?;
        let validator = Validator {
            id,
            name: address(&key_bytes),
            public_key,
            votes: 0,
            power: update.power.value(),
            active: true,
        };

        self.insert_document(Collection::Validators, &id, &validator)
            .await?;
        self.store.index_put(
            Documents,
            &validator_key_index(&validator.public_key),
            &id,
        )?;

        info!(%id, name = validator.name, "declared validator");
        Ok(validator)
    }

    /// Every validator row, in identifier order.
    pub async fn validators(&self) -> Result<Vec<Validator>, Report> {
        let mut validators: Vec<Validator> = self.documents(Collection::Validators).await?;
        validators.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(validators)
    }

    /// The validators that currently earn a committee seat, in committee order.
    ///
    /// Validators with zero power can never hold a seat.
    pub async fn committee(&self) -> Result<Vec<Validator>, Report> {
        let committee_size = usize::try_from(self.parameters().await?.committee_size)?;
        let mut eligible: Vec<Validator> = self
            .validators()
            .await?
            .into_iter()
            .filter(|validator| validator.power > 0)
            .collect();
        eligible.sort_by(committee_order);
        eligible.truncate(committee_size);
        Ok(eligible)
    }

    /// Reconcile recorded committee membership with the current vote standings, returning the
    /// updates to report to the consensus engine.
    ///
    /// Only membership changes are reported: entrants with their power, leavers with zero.
    pub(crate) async fn committee_updates(&mut self) -> Result<Vec<Update>, Report> {
        let seated: Vec<ObjectId> = self
            .committee()
            .await?
            .into_iter()
            .map(|validator| validator.id)
            .collect();

        let mut updates = vec![];
        for mut validator in self.validators().await? {
            let selected = seated.contains(&validator.id);
            if selected == validator.active {
                continue;
            }

            let pub_key = tendermint::PublicKey::from_raw_ed25519(&hex::decode(
                &validator.public_key,
            )?)
            .ok_or_eyre("invalid ed25519 public key")?;
            let power = if selected {
                Power::try_from(validator.power)?
            } else {
                Power::from(0u32)
            };

            info!(
                id = %validator.id,
                name = validator.name,
                votes = validator.votes,
                power = power.value(),
                "committee membership changed",
            );
            updates.push(Update { pub_key, power });

            validator.active = selected;
            self.update_document(Collection::Validators, &validator.id, &validator)
                .await?;
        }

        Ok(updates)
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
