use super::*;

fn document_key(collection: Collection, id: &ObjectId) -> String {
    format!("{collection}/{id}")
}

fn count_key(collection: Collection) -> String {
    format!("counts/{collection}")
}

/// Index of users by the uppercase hex of their public key.
fn user_key_index(public_key: &PublicKey) -> Vec<u8> {
    format!("users/by_public_key/{}", public_key.to_hex_upper()).into_bytes()
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Get a document from a collection by its identifier.
    pub async fn document<V: DeserializeOwned + Send>(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<Option<V>, Report> {
        self.store
            .get::<V>(Documents, &document_key(collection, id))
            .await
    }

    /// Check whether a document with the given identifier exists in a collection.
    pub async fn contains(&self, collection: Collection, id: &ObjectId) -> Result<bool, Report> {
        Ok(self
            .document::<serde_json::Value>(collection, id)
            .await?
            .is_some())
    }

    /// Get every document in a collection.
    pub async fn documents<V: DeserializeOwned + Send>(
        &self,
        collection: Collection,
    ) -> Result<Vec<V>, Report> {
        self.store
            .prefix::<V>(Documents, &format!("{collection}/"))
            .map_ok(|(_, document)| document)
            .try_collect()
            .await
    }

    /// The number of documents currently in a collection.
    pub async fn count(&self, collection: Collection) -> Result<u64, Report> {
        Ok(self
            .store
            .get::<u64>(Internal, &count_key(collection))
            .await?
            .unwrap_or(0))
    }

    /// Insert a new document, failing if the identifier is already taken.
    pub(crate) async fn insert_document<V: Serialize>(
        &mut self,
        collection: Collection,
        id: &ObjectId,
        document: &V,
    ) -> Result<(), Report> {
        if self.contains(collection, id).await? {
            bail!("{collection} document {id} already exists");
        }

        self.store
            .put(Documents, &document_key(collection, id), document)?;

        let count = self.count(collection).await?;
        self.store
            .put(Internal, &count_key(collection), &(count + 1))?;

        Ok(())
    }

    /// Overwrite an existing document, failing if it does not exist.
    pub(crate) async fn update_document<V: Serialize>(
        &mut self,
        collection: Collection,
        id: &ObjectId,
        document: &V,
    ) -> Result<(), Report> {
        if !self.contains(collection, id).await? {
            bail!("{collection} document {id} does not exist");
        }

        self.store
            .put(Documents, &document_key(collection, id), document)
    }

    /// Remove an existing document, failing if it does not exist.
    pub(crate) async fn remove_document(
        &mut self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<(), Report> {
        if !self.contains(collection, id).await? {
            bail!("{collection} document {id} does not exist");
        }

        self.store.remove(Documents, &document_key(collection, id));

        let count = self
            .count(collection)
            .await?
            .checked_sub(1)
            .ok_or_eyre("document count underflow")?;
        self.store.put(Internal, &count_key(collection), &count)?;

        Ok(())
    }

    /// Mint a fresh identifier for a document the application creates itself.
    ///
    /// The identifier is stamped with `time` and derived from the collection, the given `parts`
    /// and a per-collection sequence number, so every replica mints the same one.
    pub(crate) async fn mint_id(
        &mut self,
        collection: Collection,
        time: Time,
        parts: &[&[u8]],
    ) -> Result<ObjectId, Report> {
        let key = format!("sequence/{collection}");
        let sequence: u64 = self.store.get(Internal, &key).await?.unwrap_or(0);
        self.store.put(Internal, &key, &(sequence + 1))?;

        let sequence = sequence.to_be_bytes();
        let mut all: Vec<&[u8]> = Vec::with_capacity(parts.len() + 2);
        all.push(collection.name().as_bytes());
        all.extend_from_slice(parts);
        all.push(&sequence);

        Ok(ObjectId::derive(time, &all))
    }

    pub async fn user(&self, id: &ObjectId) -> Result<Option<User>, Report> {
        self.document(Collection::Users, id).await
    }

    pub async fn post(&self, id: &ObjectId) -> Result<Option<Post>, Report> {
        self.document(Collection::Posts, id).await
    }

    pub async fn comment(&self, id: &ObjectId) -> Result<Option<Comment>, Report> {
        self.document(Collection::Comments, id).await
    }

    pub async fn validator(&self, id: &ObjectId) -> Result<Option<Validator>, Report> {
        self.document(Collection::Validators, id).await
    }

    /// Look up the user registered under a public key.
    pub async fn user_by_public_key(&self, public_key: &PublicKey) -> Result<Option<User>, Report> {
        let Some(id) = self
            .store
            .index_get::<ObjectId>(Documents, &user_key_index(public_key))
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(self.user(&id).await?.ok_or_else(|| {
            eyre!("user {id} is indexed under {public_key} but does not exist")
        })?))
    }

    /// Index a user under their public key.
    pub(crate) fn index_user(&mut self, public_key: &PublicKey, id: &ObjectId) -> Result<(), Report> {
        self.store
            .index_put(Documents, &user_key_index(public_key), id)
    }

    /// Index a comment under the post it belongs to.
    pub(crate) fn index_comment(&mut self, post_id: &ObjectId, id: &ObjectId) -> Result<(), Report> {
        self.store.index_put(
            Documents,
            format!("comments/by_post/{post_id}/{id}").as_bytes(),
            id,
        )
    }

    /// Every comment on a post, in identifier order.
    pub async fn comments_on(&self, post_id: &ObjectId) -> Result<Vec<Comment>, Report> {
        let mut ids: Vec<ObjectId> = self
            .store
            .index_prefix::<ObjectId>(Documents, format!("comments/by_post/{post_id}/").as_bytes())
            .map_ok(|(_, id)| id)
            .try_collect()
            .await?;
        ids.sort();

        let mut comments = Vec::with_capacity(ids.len());
        for id in ids {
            comments.push(
                self.comment(&id)
                    .await?
                    .ok_or_else(|| eyre!("comment {id} is indexed but does not exist"))?,
            );
        }
        Ok(comments)
    }
}
