use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    agent,
    scope::{Scope, ScopeError},
    user, ColumnTrait, DatabaseConnection, DbErr, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

/// Errors that may occur during the agent details request.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AgentDetailsError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No agent with the requested identifier within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "agent not found")]
    AgentNotFound,
}

/// Agent details handler.
pub(super) async fn details(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
) -> Result<Json<agent::AgentInfo>, AgentDetailsError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let agent = scope
        .agents()
        .select_only()
        .column(agent::Column::Id)
        .columns([
            user::Column::Username,
            user::Column::FirstName,
            user::Column::LastName,
            user::Column::Email,
        ])
        .join(JoinType::InnerJoin, agent::Relation::User.def())
        .filter(agent::Column::Id.eq(id))
        .into_model::<agent::AgentInfo>()
        .one(&*db)
        .await?
        .ok_or(AgentDetailsError::AgentNotFound)?;

    Ok(Json(agent))
}
