use super::*;

/// Encode a document count as the 8-byte checkpoint digest.
///
/// The count is written as a zig-zag signed varint at the front of a zero-filled 8-byte buffer.
/// Eight bytes hold any count below 2^55; larger counts are truncated to the first eight bytes.
pub fn encode_checkpoint(count: u64) -> [u8; 8] {
    let signed = i64::try_from(count).unwrap_or(i64::MAX);
    let mut zigzag = ((signed << 1) ^ (signed >> 63)) as u64;

    let mut digest = [0u8; 8];
    let mut i = 0;
    while zigzag >= 0x80 && i < digest.len() - 1 {
        digest[i] = zigzag as u8 | 0x80;
        zigzag >>= 7;
        i += 1;
    }
    digest[i] = zigzag as u8;
    digest
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// The total number of documents across every collection.
    pub async fn total_documents(&self) -> Result<u64, Report> {
        let mut total = 0u64;
        for collection in Collection::ALL {
            total = total
                .checked_add(self.count(collection).await?)
                .ok_or_eyre("document count overflow")?;
        }
        Ok(total)
    }

    /// Compute the checkpoint digest of the current state and record it as the latest one.
    pub(crate) async fn record_checkpoint(&mut self) -> Result<[u8; 8], Report> {
        let total = self.total_documents().await?;
        let digest = encode_checkpoint(total);
        debug!(total, digest = hex::encode(digest), "recording checkpoint");
        self.store
            .put(Internal, "current/checkpoint", &hex::encode(digest))?;
        Ok(digest)
    }

    /// The digest recorded at the last checkpoint, if any.
    pub async fn last_checkpoint(&self) -> Result<Option<[u8; 8]>, Report> {
        let Some(digest) = self
            .store
            .get::<String>(Internal, "current/checkpoint")
            .await?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 8];
        hex::decode_to_slice(&digest, &mut bytes)?;
        Ok(Some(bytes))
    }
}
