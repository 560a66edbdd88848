use std::path::PathBuf;

use super::{Run, storage_dir};

#[derive(clap::Parser)]
pub struct Reset {
    /// The storage directory to remove [default: the platform data directory].
    #[clap(long)]
    home: Option<PathBuf>,
}

impl Run for Reset {
    async fn run(self) -> Result<(), color_eyre::Report> {
        let storage_dir = storage_dir(self.home)?;

        if storage_dir.exists() {
            println!("Removing storage directory: {}", storage_dir.display());
            tokio::fs::remove_dir_all(&storage_dir).await?;
        } else {
            println!(
                "Storage directory does not exist: {}",
                storage_dir.display()
            );
        }

        Ok(())
    }
}
