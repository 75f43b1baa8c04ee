use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use db::{
    agent, lead,
    scope::{Scope, ScopeError},
    sea_query::{Expr, Value},
    user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

/// Errors that may occur during the agent deletion process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AgentDeletionError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No agent with the requested identifier within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "agent not found")]
    AgentNotFound,
}

/// Agent deletion handler.
///
/// Leads assigned to the agent are detached, never deleted; the backing
/// user goes down with the agent row.
pub(super) async fn delete(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
) -> Result<(), AgentDeletionError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let user_id: i64 = scope
                .agents()
                .select_only()
                .column(agent::Column::UserId)
                .filter(agent::Column::Id.eq(id))
                .into_tuple()
                .one(txn)
                .await?
                .ok_or(AgentDeletionError::AgentNotFound)?;

            lead::Entity::update_many()
                .col_expr(lead::Column::AgentId, Expr::value(Value::BigInt(None)))
                .filter(lead::Column::AgentId.eq(id))
                .exec(txn)
                .await?;

            agent::Entity::delete_by_id(id).exec(txn).await?;

            user::Entity::delete_by_id(user_id).exec(txn).await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}
