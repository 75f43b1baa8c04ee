use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    agent,
    scope::{Scope, ScopeError},
    user, DatabaseConnection, DbErr, JoinType, QueryOrder, QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::{auth::CurrentUser, pagination::Pagination};

/// Errors that may occur during the agent list request.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AgentListError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),
}

/// List agents of the current organisor's organisation.
pub(super) async fn list(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<agent::AgentInfo>>, AgentListError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let agents = scope
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
        .limit(pagination.limit())
        .offset(pagination.offset())
        .order_by_asc(agent::Column::Id)
        .into_model::<agent::AgentInfo>()
        .all(&*db)
        .await?;

    Ok(Json(agents))
}
