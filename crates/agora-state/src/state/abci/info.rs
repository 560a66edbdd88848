use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Report the last committed height and digest, so the consensus engine knows where to resume.
    pub async fn info(&self) -> Result<response::Info, Report> {
        let size = self.total_documents().await?;
        let last_block_app_hash = match self.last_checkpoint().await? {
            Some(digest) => AppHash::try_from(digest.to_vec())?,
            None => AppHash::default(),
        };

        Ok(response::Info {
            data: serde_json::json!({ "size": size }).to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            app_version: 1,
            last_block_height: self.block_height().await?,
            last_block_app_hash,
        })
    }
}
