use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

use agora_state::{DEFAULT_QUERY_CONCURRENCY, Store};
use clap::Parser;
use color_eyre::eyre::{OptionExt, bail};

use super::{Run, storage_dir};

mod query;

#[derive(Parser)]
pub struct Start {
    /// Which port should the ABCI server listen on?
    #[clap(long, default_value = "26658")]
    abci: u16,
    /// Which port should the HTTP query server listen on? Zero disables it.
    #[clap(long, default_value = "1371")]
    query: u16,
    /// Where is the node's state stored? [default: the platform data directory]
    #[clap(long)]
    home: Option<PathBuf>,
    /// How many lookups may a single query run at once?
    #[clap(long, default_value_t = DEFAULT_QUERY_CONCURRENCY)]
    query_concurrency: usize,
}

impl Run for Start {
    async fn run(self) -> color_eyre::Result<()> {
        let Self {
            abci,
            query: query_port,
            home,
            query_concurrency,
        } = self;

        let storage_dir = storage_dir(home)?;
        info!(path = %storage_dir.display(), "opening storage");
        let store = Store::init(storage_dir)
            .await?
            .with_query_concurrency(query_concurrency);

        // The HTTP query mirror reads committed state only, so it runs alongside consensus:
        if query_port != 0 {
            let app = query::app(store.clone());
            let listener =
                tokio::net::TcpListener::bind((IpAddr::V4(Ipv4Addr::LOCALHOST), query_port))
                    .await
                    .or_else(|e| {
                        bail!("could not bind query server to port {query_port}: {e}");
                    })?;
            info!(port = query_port, "starting query server");
            tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app).await {
                    error!("query server failed: {e}");
                }
            });
        }

        // All the ABCI connections share one store, and the lifecycle lock inside it:
        let (consensus, mempool, snapshot, info) = tower_abci::v034::split::service(store, 1);

        info!(port = abci, "starting ABCI server");
        tower_abci::v034::ServerBuilder::default()
            .consensus(consensus)
            .mempool(mempool)
            .info(info)
            .snapshot(snapshot)
            .finish()
            .ok_or_eyre("could not construct ABCI server")?
            .listen_tcp((IpAddr::V4(Ipv4Addr::LOCALHOST), abci))
            .await
            .or_else(|e| {
                bail!("could not start ABCI server on port {abci}: {e}");
            })?;

        Ok(())
    }
}
