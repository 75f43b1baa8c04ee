use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    category, lead,
    scope::{Scope, ScopeError},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;

use crate::auth::CurrentUser;

/// Errors that may occur during the lead category update.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CategoryUpdateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No visible lead with the requested identifier.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "lead not found")]
    LeadNotFound,

    /// Provided category does not exist within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "category not found")]
    CategoryNotFound,
}

/// JSON request body.
#[derive(Deserialize)]
pub(super) struct CategoryUpdateRequest {
    /// Category to file the lead under; null clears it.
    category_id: Option<i64>,
}

/// Lead category update handler.
///
/// Open to agents as well, but only for leads assigned to them; the
/// chosen category must belong to the requester's organisation.
pub(super) async fn category_update(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
    Json(request): Json<CategoryUpdateRequest>,
) -> Result<(), CategoryUpdateError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let lead = scope
                .leads()
                .filter(lead::Column::Id.eq(id))
                .one(txn)
                .await?
                .ok_or(CategoryUpdateError::LeadNotFound)?;

            if let Some(category_id) = request.category_id {
                let category_exists = scope
                    .categories()
                    .filter(category::Column::Id.eq(category_id))
                    .select_only()
                    .exists(txn)
                    .await?;

                if !category_exists {
                    return Err(CategoryUpdateError::CategoryNotFound);
                }
            }

            let mut lead: lead::ActiveModel = lead.into();

            lead.category_id = ActiveValue::Set(request.category_id);

            lead.update(txn).await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}
