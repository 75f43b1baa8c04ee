use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use db::{
    category, lead,
    scope::{Scope, ScopeError},
    sea_query::{Expr, Value},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, SelectExt,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

/// Errors that may occur during the category deletion process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CategoryDeletionError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No category with the requested identifier within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "category not found")]
    CategoryNotFound,
}

/// Category deletion handler.
///
/// Leads filed under the category are unfiled, never deleted.
pub(super) async fn delete(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
) -> Result<(), CategoryDeletionError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let category_exists = scope
                .categories()
                .filter(category::Column::Id.eq(id))
                .select_only()
                .exists(txn)
                .await?;

            if !category_exists {
                return Err(CategoryDeletionError::CategoryNotFound);
            }

            lead::Entity::update_many()
                .col_expr(lead::Column::CategoryId, Expr::value(Value::BigInt(None)))
                .filter(lead::Column::CategoryId.eq(id))
                .exec(txn)
                .await?;

            category::Entity::delete_by_id(id).exec(txn).await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}
