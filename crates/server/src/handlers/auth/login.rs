use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use common::password;
use db::{
    token, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum UserAuthenticationError {
    DatabaseError(DbErr),

    /// Stored password hash could not be parsed.
    PasswordHashError(password::Error),

    // Unknown username and wrong password are indistinguishable on purpose.
    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "invalid credentials")]
    InvalidCredentials,
}

#[derive(Deserialize)]
pub(super) struct UserAuthenticationRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub(super) struct UserAuthenticationResponse {
    token: String,
}

/// User authentication handler.
///
/// Issues a fresh bearer token on every successful login. Agent accounts
/// keep their random provisioning password until it is replaced
/// out-of-band, so they cannot authenticate before that.
pub(super) async fn login(
    State(db): State<Arc<DatabaseConnection>>,
    Json(request): Json<UserAuthenticationRequest>,
) -> Result<Json<UserAuthenticationResponse>, UserAuthenticationError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let user: Option<(i64, String)> = user::Entity::find()
                .select_only()
                .columns([user::Column::Id, user::Column::PasswordHash])
                .filter(user::Column::Username.eq(&request.username))
                .into_tuple()
                .one(txn)
                .await?;

            let Some((user_id, password_hash)) = user else {
                return Err(UserAuthenticationError::InvalidCredentials);
            };

            if !password::verify(&request.password, &password_hash)? {
                return Err(UserAuthenticationError::InvalidCredentials);
            }

            let (model, token) = token::generate_token(user_id);

            token::Entity::insert(model)
                .exec_without_returning(txn)
                .await?;

            Ok(Json(UserAuthenticationResponse { token }))
        })
    })
    .await
    .into_raw_result()
}
