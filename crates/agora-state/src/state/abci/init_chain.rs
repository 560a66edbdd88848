use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Initialize the chain state from genesis.
    #[instrument(skip(self, request), fields(chain_id = request.chain_id))]
    pub async fn init_chain(
        &mut self,
        request: request::InitChain,
    ) -> Result<response::InitChain, Report> {
        // Ensure that the initial height is 1:
        if request.initial_height.value() != 1 {
            bail!("initial height must be 1");
        }

        let app_hash = self
            .genesis(
                &request.chain_id,
                request.time,
                &request.app_state_bytes,
                &request.validators,
            )
            .await?;

        Ok(response::InitChain {
            consensus_params: Some(request.consensus_params),
            validators: request.validators,
            app_hash,
        })
    }

    /// Write the genesis state, returning its checkpoint digest.
    pub(crate) async fn genesis(
        &mut self,
        chain_id: &str,
        genesis_time: Time,
        app_state_bytes: &[u8],
        validators: &[Update],
    ) -> Result<AppHash, Report> {
        // Set the chain ID in the state:
        self.set_chain_id(chain_id).await?;

        // Genesis time stands in for the block time until the first block begins:
        self.set_block_time(genesis_time)?;

        // Set the genesis parameters in the state:
        let parameters = Parameters::from_genesis(app_state_bytes)?;
        info!(
            committee_size = parameters.committee_size,
            spam = parameters.spam.len(),
            "genesis parameters"
        );
        self.set_parameters(&parameters).await?;

        // Declare the initial validator set:
        for validator in validators {
            self.declare_validator(validator, genesis_time).await?;
        }

        Ok(AppHash::try_from(
            encode_checkpoint(self.total_documents().await?).to_vec(),
        )?)
    }
}
