use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// End a block, without committing yet.
    pub async fn end_block(
        &mut self,
        request::EndBlock { height }: request::EndBlock,
    ) -> Result<response::EndBlock, Report> {
        // Ensure the height matches the current height:
        let current_height = self.block_height().await?;
        if Height::try_from(u64::try_from(height)?)? != current_height {
            bail!(
                "end-block height {} does not match current height {}",
                height,
                current_height
            );
        }

        Ok(response::EndBlock {
            validator_updates: self.committee_updates().await?,
            events: vec![],
            consensus_param_updates: None,
        })
    }
}
