use agora_types::transaction::{Builder, Command};
use color_eyre::eyre::eyre;
use ed25519_dalek::SigningKey;

use super::Run;

#[derive(clap::Parser)]
pub struct Sign {
    /// The 32-byte ed25519 seed to sign with, hex-encoded.
    #[clap(long)]
    key: String,
    /// The command type, e.g. `createPost` or `upvoteComment`.
    #[clap(long = "type")]
    kind: String,
    /// The command's entity, as JSON.
    #[clap(long)]
    entity: String,
}

impl Run for Sign {
    async fn run(self) -> color_eyre::Result<()> {
        let Self { key, kind, entity } = self;

        let seed: [u8; 32] = hex::decode(key.trim())?
            .try_into()
            .map_err(|seed: Vec<u8>| eyre!("signing key must be 32 bytes, got {}", seed.len()))?;
        let entity: serde_json::Value = serde_json::from_str(&entity)?;

        // Parse through the same path the chain uses, so malformed commands fail here:
        let body = serde_json::json!({ "type": kind, "entity": entity }).to_string();
        let command = Command::from_body(&body)?;
        command.check_schema()?;

        let builder = Builder::new(SigningKey::from_bytes(&seed));
        let envelope = builder.sign(command)?;
        println!("{}", String::from_utf8(envelope)?);

        Ok(())
    }
}
