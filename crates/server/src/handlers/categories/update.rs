use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use db::{
    category,
    scope::{Scope, ScopeError},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, QueryFilter,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedJson};

/// Errors that may occur during the category update process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CategoryUpdateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No category with the requested identifier within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "category not found")]
    CategoryNotFound,
}

/// JSON request body.
#[derive(Deserialize, Validate)]
pub(super) struct CategoryUpdateRequest {
    #[validate(length(min = 1, max = 30))]
    name: String,
}

/// Category rename handler.
pub(super) async fn update(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<CategoryUpdateRequest>,
) -> Result<(), CategoryUpdateError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let category = scope
                .categories()
                .filter(category::Column::Id.eq(id))
                .one(txn)
                .await?
                .ok_or(CategoryUpdateError::CategoryNotFound)?;

            let mut category: category::ActiveModel = category.into();

            category.name = ActiveValue::Set(request.name);

            category.update(txn).await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}
