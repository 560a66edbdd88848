use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Decide whether a transaction may enter the mempool.
    ///
    /// Nothing is written; the transaction is checked against the state as it stands.
    pub async fn check_tx(&self, tx_bytes: &[u8]) -> Result<(), TxError> {
        let tx = AuthenticatedTx::from_bytes(tx_bytes)?;
        debug!(kind = tx.command.kind(), public_key = %tx.public_key, "checking transaction");
        self.admit(&tx).await?;
        Ok(())
    }
}
