mod auth;
mod handlers;
mod pagination;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router, Server};
use common::{config::Config, logging};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::new()?;

    logging::init(&config);

    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    info!("connecting to database");
    let database = Arc::new(Database::connect(&config.database.url).await?);
    let server = Server::bind(&server_config.address);

    server
        .serve(app_router(database).into_make_service())
        .await?;

    Ok(())
}

fn app_router(database: Arc<DatabaseConnection>) -> Router {
    let mixed_routes = Router::new()
        .nest("/leads", handlers::leads::routes(database.clone()))
        .nest(
            "/categories",
            handlers::categories::routes(database.clone()),
        );

    let organisor_routes = Router::new()
        .nest("/agents", handlers::agents::routes())
        .route_layer(from_fn_with_state(
            database.clone(),
            auth::require_authentication::<true, _>,
        ));

    Router::new()
        .merge(mixed_routes)
        .merge(organisor_routes)
        .nest("/auth", handlers::auth::routes())
        .with_state(database)
}
