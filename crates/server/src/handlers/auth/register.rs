use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use common::password;
use db::{
    user, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{ValidatedJson, USERNAME_REGEX};

/// Errors that may occur during the user registration process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum UserRegistrationError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to hash the provided password.
    PasswordHashError(password::Error),

    /// Requested username is already registered.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "username is already taken")]
    UsernameTaken,
}

/// JSON request body.
#[derive(Deserialize, Validate)]
pub(super) struct UserRegistrationRequest {
    /// Unique login name.
    #[validate(regex = "USERNAME_REGEX")]
    username: String,

    /// Plain-text password, stored as an Argon2id hash.
    #[validate(length(min = 8, max = 128))]
    password: String,

    #[validate(email)]
    email: String,

    #[validate(length(max = 150))]
    first_name: String,

    #[validate(length(max = 150))]
    last_name: String,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct UserRegistrationResponse {
    /// Registered user identifier.
    id: i64,
}

/// User registration handler.
///
/// Signup always produces an organisor account owning a fresh
/// organisation; agent accounts are provisioned by an organisor instead.
pub(super) async fn register(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<UserRegistrationRequest>,
) -> Result<Json<UserRegistrationResponse>, UserRegistrationError> {
    let password_hash = password::hash(&request.password)?;

    db.transaction(|txn| {
        Box::pin(async move {
            let username_taken = user::Entity::find()
                .select_only()
                .filter(user::Column::Username.eq(&request.username))
                .exists(txn)
                .await?;

            if username_taken {
                return Err(UserRegistrationError::UsernameTaken);
            }

            let (user, _) = user::create_with_profile(
                txn,
                user::ActiveModel {
                    username: ActiveValue::Set(request.username),
                    first_name: ActiveValue::Set(request.first_name),
                    last_name: ActiveValue::Set(request.last_name),
                    email: ActiveValue::Set(request.email),
                    password_hash: ActiveValue::Set(password_hash),
                    is_organisor: ActiveValue::Set(true),
                    is_agent: ActiveValue::Set(false),
                    ..Default::default()
                },
            )
            .await?;

            Ok(Json(UserRegistrationResponse { id: user.id }))
        })
    })
    .await
    .into_raw_result()
}
