use spin_sdk::http::{IntoResponse, Request};
use spin_sdk::http_component;

use crate::config::redis_address;
use crate::handlers::handle_request;
use crate::store::RedisStore;

/// Spin entrypoint. Each request gets its own Redis connection, dropped
/// when the handler returns.
#[http_component]
fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    let store = RedisStore::open(&redis_address())?;
    handle_request(&store, req)
}
