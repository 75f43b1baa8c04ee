use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    lead,
    scope::{Scope, ScopeError},
    ColumnTrait, DatabaseConnection, DbErr, QueryFilter, QueryOrder, QuerySelect, Select,
};
use derive_more::{Display, Error, From};
use futures_util::TryStreamExt;
use serde::Serialize;

use crate::{auth::CurrentUser, pagination::Pagination};

/// Information about a single lead in a listing.
#[derive(Serialize)]
pub(super) struct LeadData {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub agent_id: Option<i64>,
    pub category_id: Option<i64>,

    /// Lead creation time.
    pub timestamp: i64,
}

/// Errors that may occur during the lead list request.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LeadListError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct LeadListResponse {
    /// Leads visible to the requester that have an agent assigned.
    leads: Vec<LeadData>,

    /// Organisation leads with no agent; organisors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    unassigned_leads: Option<Vec<LeadData>>,
}

async fn load(
    db: &DatabaseConnection,
    select: Select<lead::Entity>,
) -> Result<Vec<LeadData>, DbErr> {
    select
        .select_only()
        .columns([
            lead::Column::Id,
            lead::Column::FirstName,
            lead::Column::LastName,
            lead::Column::Age,
            lead::Column::AgentId,
            lead::Column::CategoryId,
            lead::Column::CreatedAt,
        ])
        .order_by_asc(lead::Column::Id)
        .into_model::<lead::LeadInfo>()
        .stream(db)
        .await?
        .map_ok(|lead| LeadData {
            id: lead.id,
            first_name: lead.first_name,
            last_name: lead.last_name,
            age: lead.age,
            agent_id: lead.agent_id,
            category_id: lead.category_id,
            timestamp: lead.created_at.assume_utc().unix_timestamp(),
        })
        .try_collect()
        .await
}

/// List leads visible to the current requester.
///
/// The main listing only contains leads with an agent assigned; leads
/// still waiting for an assignment are reported separately, and only to
/// organisors.
pub(super) async fn list(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<LeadListResponse>, LeadListError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let leads = load(
        &db,
        scope
            .leads()
            .filter(lead::Column::AgentId.is_not_null())
            .limit(pagination.limit())
            .offset(pagination.offset()),
    )
    .await?;

    let unassigned_leads = match scope {
        Scope::Organisor { .. } => {
            Some(load(&db, scope.leads().filter(lead::Column::AgentId.is_null())).await?)
        }
        Scope::Agent { .. } => None,
    };

    Ok(Json(LeadListResponse {
        leads,
        unassigned_leads,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_agent, create_database, create_lead, create_organisor, ResponseBodyExt};

    use assert_json::{assert_json, validators};
    use axum::{body::Body, http::Request};
    use tower::Service;

    fn list_request(token: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri("/leads")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn unassigned_leads_reported_separately() {
        let db = Arc::new(create_database().await);

        let (_, organisation, token) = create_organisor(&db, "alice").await;

        let bob = create_lead(&db, organisation, None, "Bob").await;

        let mut service = crate::app_router(db.clone());

        let response = service.call(list_request(&token)).await.unwrap();

        assert_json!(response.json().await, {
            "leads": [],
            "unassigned_leads": [
                {
                    "id": bob,
                    "first_name": "Bob",
                    "last_name": "Smith",
                    "age": 30,
                    "agent_id": validators::null(),
                    "category_id": validators::null(),
                    "timestamp": validators::i64(|_| Ok(())),
                }
            ]
        });
    }

    #[tokio::test]
    async fn agent_sees_only_own_assigned_leads() {
        let db = Arc::new(create_database().await);

        let (_, organisation, _) = create_organisor(&db, "alice").await;
        let (_, carol, carol_token) = create_agent(&db, organisation, "carol").await;
        let (_, dave, _) = create_agent(&db, organisation, "dave").await;

        let own = create_lead(&db, organisation, Some(carol), "Bob").await;
        create_lead(&db, organisation, Some(dave), "Other").await;
        create_lead(&db, organisation, None, "Unassigned").await;

        let mut service = crate::app_router(db.clone());

        let response = service.call(list_request(&carol_token)).await.unwrap();

        assert_json!(response.json().await, {
            "leads": [
                {
                    "id": own,
                    "first_name": "Bob",
                    "last_name": "Smith",
                    "age": 30,
                    "agent_id": carol,
                    "category_id": validators::null(),
                    "timestamp": validators::i64(|_| Ok(())),
                }
            ]
        });
    }

    #[tokio::test]
    async fn organisations_are_isolated() {
        let db = Arc::new(create_database().await);

        let (_, first_org, _) = create_organisor(&db, "alice").await;
        let (_, _, other_token) = create_organisor(&db, "eve").await;

        create_lead(&db, first_org, None, "Bob").await;

        let mut service = crate::app_router(db.clone());

        let response = service.call(list_request(&other_token)).await.unwrap();

        assert_json!(response.json().await, {
            "leads": [],
            "unassigned_leads": []
        });
    }
}
