use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Get the time of the block being processed.
    ///
    /// This is the only clock the state machine reads: ranking ages and minted identifiers are
    /// both measured against it.
    pub async fn block_time(&self) -> Result<Time, Report> {
        self.store
            .get::<Time>(Internal, "current/block_time")
            .await?
            .ok_or_eyre("block time not found in state; is the state initialized?")
    }

    /// Set the time of the block being processed.
    pub(crate) fn set_block_time(&mut self, time: Time) -> Result<(), Report> {
        self.store.put(Internal, "current/block_time", &time)
    }
}
