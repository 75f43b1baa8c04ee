mod create;
mod delete;
mod details;
mod list;
mod update;

use std::sync::Arc;

use axum::{routing::get, Router};
use db::DatabaseConnection;

/// Create a router that provides an API server with agent management
/// routes. Every route here is organisor-only; the role gate is applied
/// by the caller.
pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/", get(list::list).post(create::create))
        .route(
            "/:id",
            get(details::details)
                .put(update::update)
                .delete(delete::delete),
        )
}
