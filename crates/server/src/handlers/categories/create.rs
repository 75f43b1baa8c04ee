use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{
    category,
    scope::{Scope, ScopeError},
    ActiveValue, DatabaseConnection, DbErr, EntityTrait, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedJson};

/// Errors that may occur during the category creation process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CategoryCreateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),
}

/// JSON request body.
#[derive(Deserialize, Validate)]
pub(super) struct CategoryCreateRequest {
    #[validate(length(min = 1, max = 30))]
    name: String,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct CategoryCreateResponse {
    /// Created category identifier.
    id: i64,
}

/// Category creation handler.
pub(super) async fn create(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<CategoryCreateRequest>,
) -> Result<Json<CategoryCreateResponse>, CategoryCreateError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let model = category::Entity::insert(category::ActiveModel {
                name: ActiveValue::Set(request.name),
                organisation_id: ActiveValue::Set(scope.organisation()),
                ..Default::default()
            })
            .exec_with_returning(txn)
            .await?;

            Ok(Json(CategoryCreateResponse { id: model.id }))
        })
    })
    .await
    .into_raw_result()
}
