use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Begin a block, without committing yet.
    pub async fn begin_block(
        &mut self,
        request::BeginBlock {
            header:
                Header {
                    chain_id,
                    height,
                    time,
                    ..
                },
            ..
        }: request::BeginBlock,
    ) -> Result<response::BeginBlock, Report> {
        self.begin(chain_id.as_str(), height, time).await?;
        Ok(response::BeginBlock { events: vec![] })
    }

    /// Check the block belongs to this chain and record its height and time.
    pub(crate) async fn begin(
        &mut self,
        chain_id: &str,
        height: Height,
        time: Time,
    ) -> Result<(), Report> {
        // Ensure chain ID matches the current chain ID:
        let current_chain_id = self.chain_id().await?;
        if chain_id != current_chain_id {
            bail!(
                "begin-block chain ID {} does not match current chain ID {}",
                chain_id,
                current_chain_id,
            );
        }

        // Record the current block height and time:
        self.set_block_height(height)?;
        self.set_block_time(time)?;

        debug!(%height, %time, "block begun");
        Ok(())
    }
}
