use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
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
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedJson};

/// Errors that may occur during the lead update process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LeadUpdateError {
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
///
/// Carries the full set of mutable fields; the owning organisation and
/// the creation timestamp never change.
#[derive(Deserialize, Validate)]
pub(super) struct LeadUpdateRequest {
    #[validate(length(min = 1, max = 20))]
    first_name: String,

    #[validate(length(min = 1, max = 20))]
    last_name: String,

    #[validate(range(min = 0))]
    age: i32,

    #[serde(default)]
    agent_id: Option<i64>,

    #[serde(default)]
    description: Option<String>,

    #[validate(length(min = 1, max = 20))]
    phone_number: String,

    #[validate(email)]
    email: String,
}

/// Lead update handler.
pub(super) async fn update(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<LeadUpdateRequest>,
) -> Result<(), LeadUpdateError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let scope = Scope::resolve(txn, current_user.id(), current_user.is_organisor()).await?;

            let lead = scope
                .leads()
                .filter(lead::Column::Id.eq(id))
                .one(txn)
                .await?
                .ok_or(LeadUpdateError::LeadNotFound)?;

            if let Some(agent_id) = request.agent_id {
                let agent_exists = scope
                    .agents()
                    .filter(agent::Column::Id.eq(agent_id))
                    .select_only()
                    .exists(txn)
                    .await?;

                if !agent_exists {
                    return Err(LeadUpdateError::AgentNotFound);
                }
            }

            let mut lead: lead::ActiveModel = lead.into();

            lead.first_name = ActiveValue::Set(request.first_name);
            lead.last_name = ActiveValue::Set(request.last_name);
            lead.age = ActiveValue::Set(request.age);
            lead.agent_id = ActiveValue::Set(request.agent_id);
            lead.description = ActiveValue::Set(request.description);
            lead.phone_number = ActiveValue::Set(request.phone_number);
            lead.email = ActiveValue::Set(request.email);

            lead.update(txn).await?;

            Ok(())
        })
    })
    .await
    .into_raw_result()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{
        create_agent, create_database, create_lead, create_organisor, RequestBodyExt,
        ResponseBodyExt,
    };

    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::Service;

    fn update_request(token: &str, id: i64, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(format!("/leads/{id}/update"))
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .body(Body::from_json(body))
            .unwrap()
    }

    #[tokio::test]
    async fn update_and_read_back() {
        let db = Arc::new(create_database().await);

        let (_, organisation, token) = create_organisor(&db, "alice").await;
        let (_, carol, _) = create_agent(&db, organisation, "carol").await;

        let bob = create_lead(&db, organisation, None, "Bob").await;

        let mut service = crate::app_router(db.clone());

        let response = service
            .call(update_request(
                &token,
                bob,
                json!({
                    "first_name": "Robert",
                    "last_name": "Smith",
                    "age": 31,
                    "agent_id": carol,
                    "description": "warm lead",
                    "phone_number": "555-1234",
                    "email": "bob@x.com"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let response = service
            .call(
                Request::builder()
                    .method("GET")
                    .uri(format!("/leads/{bob}"))
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "id": bob,
            "first_name": "Robert",
            "last_name": "Smith",
            "age": 31,
            "agent_id": carol,
            "category_id": validators::null(),
            "description": "warm lead",
            "phone_number": "555-1234",
            "email": "bob@x.com",
            "timestamp": validators::i64(|_| Ok(())),
        });
    }

    #[tokio::test]
    async fn agents_may_not_update_leads() {
        let db = Arc::new(create_database().await);

        let (_, organisation, _) = create_organisor(&db, "alice").await;
        let (_, carol, carol_token) = create_agent(&db, organisation, "carol").await;

        // Even a lead assigned to the agent itself stays read-only.
        let own = create_lead(&db, organisation, Some(carol), "Bob").await;

        let mut service = crate::app_router(db.clone());

        let response = service
            .call(update_request(
                &carol_token,
                own,
                json!({
                    "first_name": "Hijacked",
                    "last_name": "Smith",
                    "age": 30,
                    "phone_number": "555-1234",
                    "email": "bob@x.com"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn foreign_organisation_lead_looks_missing() {
        let db = Arc::new(create_database().await);

        let (_, organisation, _) = create_organisor(&db, "alice").await;
        let (_, _, other_token) = create_organisor(&db, "eve").await;

        let bob = create_lead(&db, organisation, None, "Bob").await;

        let mut service = crate::app_router(db.clone());

        let response = service
            .call(update_request(
                &other_token,
                bob,
                json!({
                    "first_name": "Stolen",
                    "last_name": "Smith",
                    "age": 30,
                    "phone_number": "555-1234",
                    "email": "bob@x.com"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
