use agora_state::Store;
use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};

/// The query service over HTTP: `POST /<path>` with the JSON request as the body.
pub fn app(store: Store) -> Router {
    Router::new()
        .route("/{*path}", post(query))
        .route("/health", axum::routing::get(|| async { "OK" }))
        .with_state(store)
}

async fn query(
    State(store): State<Store>,
    Path(path): Path<String>,
    body: Bytes,
) -> (StatusCode, [(&'static str, &'static str); 1], Body) {
    let result = store
        .committed()
        .query(&path, &body, store.query_concurrency())
        .await;

    match result {
        Ok(response) => (
            StatusCode::OK,
            [("Content-Type", "application/json")],
            Body::from(response),
        ),
        Err(e) => {
            debug!(%path, "query failed: {e}");
            (
                StatusCode::BAD_REQUEST,
                [("Content-Type", "text/plain")],
                Body::from(e.to_string()),
            )
        }
    }
}
