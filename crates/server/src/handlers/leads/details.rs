use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    lead,
    scope::{Scope, ScopeError},
    ColumnTrait, DatabaseConnection, DbErr, QueryFilter,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::auth::CurrentUser;

/// Errors that may occur during the lead details request.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LeadDetailsError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No visible lead with the requested identifier.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "lead not found")]
    LeadNotFound,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct LeadData {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub agent_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub phone_number: String,
    pub email: String,

    /// Lead creation time.
    pub timestamp: i64,
}

/// Lead details handler.
///
/// A lead of another organisation, or one assigned to a different agent
/// when the requester is an agent, is indistinguishable from a missing
/// one.
pub(super) async fn details(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
) -> Result<Json<LeadData>, LeadDetailsError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let lead = scope
        .leads()
        .filter(lead::Column::Id.eq(id))
        .one(&*db)
        .await?
        .ok_or(LeadDetailsError::LeadNotFound)?;

    Ok(Json(LeadData {
        id: lead.id,
        first_name: lead.first_name,
        last_name: lead.last_name,
        age: lead.age,
        agent_id: lead.agent_id,
        category_id: lead.category_id,
        description: lead.description,
        phone_number: lead.phone_number,
        email: lead.email,
        timestamp: lead.created_at.assume_utc().unix_timestamp(),
    }))
}
