use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{
    agent, lead,
    scope::{Scope, ScopeError},
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedJson};

/// Errors that may occur during the lead creation process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LeadCreateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// Provided agent identifier does not exist within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "agent not found")]
    AgentNotFound,
}

/// JSON request body.
#[derive(Deserialize, Validate)]
pub(super) struct LeadCreateRequest {
    #[validate(length(min = 1, max = 20))]
    first_name: String,

    #[validate(length(min = 1, max = 20))]
    last_name: String,

    #[validate(range(min = 0))]
    age: i32,

    /// Agent to assign immediately, if any.
    #[serde(default)]
    agent_id: Option<i64>,

    #[serde(default)]
    description: Option<String>,

    #[validate(length(min = 1, max = 20))]
    phone_number: String,

    #[validate(email)]
    email: String,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct LeadCreateResponse {
    /// Created lead identifier.
    id: i64,
}

/// Lead creation handler.
///
/// The new lead is stamped with the requesting organisor's own
/// organisation; an immediately assigned agent must belong to the same
/// organisation.
pub(super) async fn create(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<LeadCreateRequest>,
) -> Result<Json<LeadCreateResponse>, LeadCreateError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            if let Some(agent_id) = request.agent_id {
                let agent_exists = scope
                    .agents()
                    .filter(agent::Column::Id.eq(agent_id))
                    .select_only()
                    .exists(txn)
                    .await?;

                if !agent_exists {
                    return Err(LeadCreateError::AgentNotFound);
                }
            }

            let model = lead::Entity::insert(lead::ActiveModel {
                first_name: ActiveValue::Set(request.first_name),
                last_name: ActiveValue::Set(request.last_name),
                age: ActiveValue::Set(request.age),
                organisation_id: ActiveValue::Set(scope.organisation()),
                agent_id: ActiveValue::Set(request.agent_id),
                description: ActiveValue::Set(request.description),
                phone_number: ActiveValue::Set(request.phone_number),
                email: ActiveValue::Set(request.email),
                ..Default::default()
            })
            .exec_with_returning(txn)
            .await?;

            Ok(Json(LeadCreateResponse { id: model.id }))
        })
    })
    .await
    .into_raw_result()
}
