pub mod v1;

use crate::server::Server;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// The whole HTTP surface: `/healthz` plus `/api/v1`, with rejections
/// rendered into the response envelope.
pub fn app(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let healthz = warp::path!("healthz")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "status": "OK" })));

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(server));

    healthz
        .or(api_v1)
        .recover(v1::recover_error)
        .with(warp::trace::request())
}
