use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Register a new user under the signing key.
    #[instrument(skip(self, create_user), fields(id = %create_user.id, username = create_user.username))]
    pub(crate) async fn create_user(
        &mut self,
        create_user: &CreateUser,
        public_key: &PublicKey,
    ) -> Result<(), Report> {
        let CreateUser { id, username, name } = create_user;

        let user = User {
            id: *id,
            name: name.clone(),
            username: username.clone(),
            public_key: public_key.to_hex_upper(),
        };

        self.insert_document(Collection::Users, id, &user).await?;
        self.index_user(public_key, id)?;

        info!("user registered");
        Ok(())
    }
}
