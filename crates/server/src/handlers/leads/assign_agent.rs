use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    agent, lead,
    scope::{Scope, ScopeError},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;

use crate::auth::CurrentUser;

/// Errors that may occur during the agent assignment process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AgentAssignmentError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No visible lead with the requested identifier.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "lead not found")]
    LeadNotFound,

    /// Provided agent identifier does not exist within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "agent not found")]
    AgentNotFound,
}

/// JSON request body.
#[derive(Deserialize)]
pub(super) struct AgentAssignmentRequest {
    /// Agent taking over the lead.
    agent_id: i64,
}

/// Agent assignment handler.
///
/// Both the lead and the agent are looked up within the requesting
/// organisor's own organisation, so a lead can never end up assigned
/// across organisations.
pub(super) async fn assign_agent(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
    Json(request): Json<AgentAssignmentRequest>,
) -> Result<(), AgentAssignmentError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let agent_exists = scope
                .agents()
                .filter(agent::Column::Id.eq(request.agent_id))
                .select_only()
                .exists(txn)
                .await?;

            if !agent_exists {
                return Err(AgentAssignmentError::AgentNotFound);
            }

            let lead = scope
                .leads()
                .filter(lead::Column::Id.eq(id))
                .one(txn)
                .await?
                .ok_or(AgentAssignmentError::LeadNotFound)?;

            let mut lead: lead::ActiveModel = lead.into();

            lead.agent_id = ActiveValue::Set(Some(request.agent_id));

            lead.update(txn).await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}
