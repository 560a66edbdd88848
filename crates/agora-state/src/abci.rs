use std::{
    num::NonZero,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::future::BoxFuture;
use tendermint::{abci::Code, v0_34::abci};
use tower::{BoxError, Service};
use tracing::Instrument;

use crate::TxError;

impl Service<tendermint::v0_34::abci::Request> for crate::Store {
    type Response = tendermint::v0_34::abci::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    #[instrument(name = "abci", skip(self, req))]
    fn call(&mut self, req: tendermint::v0_34::abci::Request) -> Self::Future {
        debug!(?req);

        let mut store: crate::Store = self.clone();

        Box::pin(async move {
            match req {
                abci::Request::Echo(echo) => Ok(abci::Response::Echo(abci::response::Echo {
                    message: echo.message,
                })),
                abci::Request::Flush => Ok(abci::Response::Flush),
                abci::Request::Info(_info) => {
                    let response = store
                        .committed()
                        .info()
                        .instrument(info_span!("Info"))
                        .await?;
                    Ok(abci::Response::Info(response))
                }
                abci::Request::InitChain(init_chain) => {
                    let response = store
                        .state
                        .write()
                        .await
                        .init_chain(init_chain)
                        .instrument(info_span!("InitChain"))
                        .await?;
                    Ok(abci::Response::InitChain(response))
                }
                abci::Request::BeginBlock(begin_block) => {
                    let response = store
                        .state
                        .write()
                        .await
                        .begin_block(begin_block)
                        .instrument(info_span!("BeginBlock"))
                        .await?;
                    Ok(abci::Response::BeginBlock(response))
                }
                abci::Request::CheckTx(check_tx) => {
                    // Admission reads the state as it stands, without writing to it:
                    let result = store
                        .state
                        .read()
                        .await
                        .check_tx(&check_tx.tx)
                        .instrument(info_span!("CheckTx"))
                        .await;

                    match result {
                        Ok(()) => Ok(abci::Response::CheckTx(abci::response::CheckTx::default())),
                        Err(TxError::Rejected { code, reason }) => {
                            debug!(%code, %reason, "transaction rejected");
                            Ok(abci::Response::CheckTx(abci::response::CheckTx {
                                code: code.into(),
                                log: reason,
                                ..Default::default()
                            }))
                        }
                        Err(TxError::Fault(report)) => Err(report.into()),
                    }
                }
                abci::Request::DeliverTx(abci::request::DeliverTx { tx: tx_bytes }) => {
                    let result = store
                        .state
                        .write()
                        .await
                        .deliver_tx(&tx_bytes)
                        .instrument(info_span!("DeliverTx"))
                        .await;

                    match result {
                        Ok(()) => Ok(abci::Response::DeliverTx(
                            abci::response::DeliverTx::default(),
                        )),
                        // A transaction that no longer applies is skipped, never fatal:
                        Err(TxError::Rejected { code, reason }) => {
                            warn!(%code, %reason, "transaction not applied");
                            Ok(abci::Response::DeliverTx(abci::response::DeliverTx {
                                code: code.into(),
                                log: reason,
                                ..Default::default()
                            }))
                        }
                        Err(TxError::Fault(report)) => Err(report.into()),
                    }
                }
                abci::Request::EndBlock(end_block) => {
                    let response = store
                        .state
                        .write()
                        .await
                        .end_block(end_block)
                        .instrument(info_span!("EndBlock"))
                        .await?;
                    Ok(abci::Response::EndBlock(response))
                }
                abci::Request::Commit => {
                    let checkpoint = store.commit().instrument(info_span!("Commit")).await?;

                    Ok(abci::Response::Commit(abci::response::Commit {
                        data: Bytes::copy_from_slice(&checkpoint),
                        ..Default::default()
                    }))
                }
                abci::Request::Query(abci::request::Query { data, path, .. }) => {
                    // Queries read the last committed state and never wait on the block in
                    // progress:
                    let response = store
                        .committed()
                        .answer_query(&path, &data, store.query_concurrency())
                        .instrument(info_span!("Query"))
                        .await;
                    Ok(abci::Response::Query(response))
                }
                // Unimplemented ABCI methods:
                abci::Request::SetOption(_set_option) => {
                    Ok(abci::Response::SetOption(abci::response::SetOption {
                        code: Code::Err(NonZero::new(1).expect("1 != 0")),
                        log: "set option is not implemented".to_string(),
                        info: "".to_string(),
                    }))
                }
                abci::Request::ListSnapshots => Err("snapshots are not implemented".into()),
                abci::Request::OfferSnapshot(_offer_snapshot) => {
                    Err("snapshots are not implemented".into())
                }
                abci::Request::LoadSnapshotChunk(_load_snapshot_chunk) => {
                    Err("snapshots are not implemented".into())
                }
                abci::Request::ApplySnapshotChunk(_apply_snapshot_chunk) => {
                    Err("snapshots are not implemented".into())
                }
            }
        })
    }
}
