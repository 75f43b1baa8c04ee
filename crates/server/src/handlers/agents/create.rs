use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_derive_error::ErrorResponse;
use common::password;
use db::{
    agent,
    scope::{Scope, ScopeError},
    user, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::CurrentUser,
    validation::{ValidatedJson, USERNAME_REGEX},
};

/// Errors that may occur during the agent creation process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AgentCreateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// Unable to hash the generated initial password.
    PasswordHashError(password::Error),

    /// Requested username is already registered.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "username is already taken")]
    UsernameTaken,
}

/// JSON request body.
#[derive(Deserialize, Validate)]
pub(super) struct AgentCreateRequest {
    /// Login name for the backing user.
    #[validate(regex = "USERNAME_REGEX")]
    username: String,

    #[validate(email)]
    email: String,

    #[validate(length(max = 150))]
    first_name: String,

    #[validate(length(max = 150))]
    last_name: String,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct AgentCreateResponse {
    /// Created agent identifier.
    id: i64,
}

/// Agent creation handler.
///
/// Provisions a backing user with the agent role and a random initial
/// password, then binds it to the requesting organisor's organisation.
/// The password hash is stored but the password itself is discarded, so
/// the account cannot log in until it is reset out-of-band.
pub(super) async fn create(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<AgentCreateRequest>,
) -> Result<Json<AgentCreateResponse>, AgentCreateError> {
    let password_hash = password::hash(&password::generate_initial())?;

    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let username_taken = user::Entity::find()
                .select_only()
                .filter(user::Column::Username.eq(&request.username))
                .exists(txn)
                .await?;

            if username_taken {
                return Err(AgentCreateError::UsernameTaken);
            }

            let (user, _) = user::create_with_profile(
                txn,
                user::ActiveModel {
                    username: ActiveValue::Set(request.username),
                    first_name: ActiveValue::Set(request.first_name),
                    last_name: ActiveValue::Set(request.last_name),
                    email: ActiveValue::Set(request.email),
                    password_hash: ActiveValue::Set(password_hash),
                    is_organisor: ActiveValue::Set(false),
                    is_agent: ActiveValue::Set(true),
                    ..Default::default()
                },
            )
            .await?;

            let model = agent::Entity::insert(agent::ActiveModel {
                user_id: ActiveValue::Set(user.id),
                organisation_id: ActiveValue::Set(scope.organisation()),
                ..Default::default()
            })
            .exec_with_returning(txn)
            .await?;

            Ok(Json(AgentCreateResponse { id: model.id }))
        })
    })
    .await
    .into_raw_result()
}
