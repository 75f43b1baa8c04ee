use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use db::{
    lead,
    scope::{Scope, ScopeError},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

/// Errors that may occur during the lead deletion process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LeadDeletionError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No visible lead with the requested identifier.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "lead not found")]
    LeadNotFound,
}

/// Lead deletion handler. Hard-deletes the lead itself; nothing else
/// references leads, so no detaching is necessary.
pub(super) async fn delete(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
) -> Result<(), LeadDeletionError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let result = lead::Entity::delete_many()
        .filter(lead::Column::OrganisationId.eq(scope.organisation()))
        .filter(lead::Column::Id.eq(id))
        .exec(&*db)
        .await?;

    if result.rows_affected == 0 {
        return Err(LeadDeletionError::LeadNotFound);
    }

    Ok(())
}
