use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Prepare the block for commit, returning the checkpoint digest to report.
    ///
    /// The caller is responsible for persisting the state afterwards.
    pub(crate) async fn prepare_commit(&mut self) -> Result<[u8; 8], Report> {
        let digest = self.record_checkpoint().await?;
        info!(
            height = %self.block_height().await?,
            digest = hex::encode(digest),
            "committing block"
        );
        Ok(digest)
    }
}
