//! HTTP route table.

mod seed;
mod tasks;
mod users;

use crate::state::AppState;
use axum::Router;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(tasks::router())
        .merge(users::router())
        .merge(seed::router())
}
