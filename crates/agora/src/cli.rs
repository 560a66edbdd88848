use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::OptionExt;

#[derive(Parser)]
#[clap(version, about)]
pub enum Options {
    /// Run the node: ABCI server plus HTTP query mirror.
    Start(start::Start),
    /// Remove the node's storage directory.
    Reset(reset::Reset),
    /// Sign a transaction and print its envelope.
    Sign(sign::Sign),
}

// One module per top-level subcommand
mod reset;
mod sign;
mod start;

pub trait Run {
    fn run(self) -> impl Future<Output = color_eyre::Result<()>> + Send;
}

impl Run for Options {
    async fn run(self) -> color_eyre::Result<()> {
        match self {
            Self::Start(start) => start.run().await,
            Self::Reset(reset) => reset.run().await,
            Self::Sign(sign) => sign.run().await,
        }
    }
}

/// The storage directory: `home` if given, otherwise the platform's local data directory.
fn storage_dir(home: Option<PathBuf>) -> color_eyre::Result<PathBuf> {
    if let Some(home) = home {
        return Ok(home);
    }
    let directories = directories::ProjectDirs::from("org", "agora", "agora")
        .ok_or_eyre("could not determine storage directory")?;
    Ok(directories.data_local_dir().to_path_buf())
}
