use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use db::{
    agent,
    scope::{Scope, ScopeError},
    user, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    validation::{ValidatedJson, USERNAME_REGEX},
};

/// Errors that may occur during the agent update process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AgentUpdateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No agent with the requested identifier within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "agent not found")]
    AgentNotFound,

    /// Requested username is already registered.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "username is already taken")]
    UsernameTaken,
}

/// JSON request body.
#[derive(Deserialize, Validate)]
pub(super) struct AgentUpdateRequest {
    #[validate(regex = "USERNAME_REGEX")]
    username: String,

    #[validate(email)]
    email: String,

    #[validate(length(max = 150))]
    first_name: String,

    #[validate(length(max = 150))]
    last_name: String,
}

/// Agent update handler.
///
/// The agent row itself is immutable; the update is rewritten to target
/// the identity fields of the linked user instead.
pub(super) async fn update(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<AgentUpdateRequest>,
) -> Result<(), AgentUpdateError> {
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
                .ok_or(AgentUpdateError::AgentNotFound)?;

            let username_taken = user::Entity::find()
                .select_only()
                .filter(user::Column::Username.eq(&request.username))
                .filter(user::Column::Id.ne(user_id))
                .exists(txn)
                .await?;

            if username_taken {
                return Err(AgentUpdateError::UsernameTaken);
            }

            user::ActiveModel {
                id: ActiveValue::Unchanged(user_id),
                username: ActiveValue::Set(request.username),
                first_name: ActiveValue::Set(request.first_name),
                last_name: ActiveValue::Set(request.last_name),
                email: ActiveValue::Set(request.email),
                ..Default::default()
            }
            .update(txn)
            .await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}
