mod assign_agent;
mod category_update;
mod create;
mod delete;
mod details;
mod list;
mod update;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use db::DatabaseConnection;

use crate::auth;

/// Create a router that provides an API server with lead management routes.
///
/// Listing, details and category updates are open to every authenticated
/// user (subject to scoping); all mutating routes require the organisor
/// role.
pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    let shared_routes = Router::new()
        .route("/", get(list::list))
        .route("/:id", get(details::details))
        .route("/:id/category", put(category_update::category_update))
        .route_layer(from_fn_with_state(
            database.clone(),
            auth::require_authentication::<false, _>,
        ));

    let organisor_routes = Router::new()
        .route("/create", post(create::create))
        .route("/:id/update", put(update::update))
        .route("/:id/delete", delete(delete::delete))
        .route("/:id/assign-agent", post(assign_agent::assign_agent))
        .route_layer(from_fn_with_state(
            database,
            auth::require_authentication::<true, _>,
        ));

    Router::new().merge(shared_routes).merge(organisor_routes)
}
