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
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::auth::CurrentUser;

/// Errors that may occur during the category details request.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CategoryDetailsError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),

    /// No category with the requested identifier within the organisation.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "category not found")]
    CategoryNotFound,
}

/// A single lead filed under the requested category.
#[derive(Serialize)]
pub(super) struct CategoryLeadData {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub agent_id: Option<i64>,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct CategoryDetailsResponse {
    pub id: i64,
    pub name: String,

    /// Every organisation lead currently filed under this category.
    pub leads: Vec<CategoryLeadData>,
}

/// Category details handler.
///
/// The lead listing follows the category relation, so an agent sees all
/// organisation leads filed here, not only its own assignments.
pub(super) async fn details(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryDetailsResponse>, CategoryDetailsError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let category = scope
        .categories()
        .filter(category::Column::Id.eq(id))
        .one(&*db)
        .await?
        .ok_or(CategoryDetailsError::CategoryNotFound)?;

    let leads = lead::Entity::find()
        .select_only()
        .columns([
            lead::Column::Id,
            lead::Column::FirstName,
            lead::Column::LastName,
            lead::Column::AgentId,
        ])
        .filter(lead::Column::CategoryId.eq(category.id))
        .order_by_asc(lead::Column::Id)
        .into_tuple::<(i64, String, String, Option<i64>)>()
        .all(&*db)
        .await?
        .into_iter()
        .map(|(id, first_name, last_name, agent_id)| CategoryLeadData {
            id,
            first_name,
            last_name,
            agent_id,
        })
        .collect();

    Ok(Json(CategoryDetailsResponse {
        id: category.id,
        name: category.name,
        leads,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_database, create_lead, create_organisor, ResponseBodyExt};

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use db::{category, lead, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
    use tower::Service;

    async fn create_category(db: &db::DatabaseConnection, organisation_id: i64, name: &str) -> i64 {
        category::Entity::insert(category::ActiveModel {
            name: ActiveValue::Set(String::from(name)),
            organisation_id: ActiveValue::Set(organisation_id),
            ..Default::default()
        })
        .exec_with_returning(db)
        .await
        .expect("unable to create category")
        .id
    }

    fn details_request(token: &str, id: i64) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(format!("/categories/{id}"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn lists_member_leads() {
        let db = Arc::new(create_database().await);

        let (_, organisation, token) = create_organisor(&db, "alice").await;

        let new = create_category(&db, organisation, "New").await;
        let bob = create_lead(&db, organisation, None, "Bob").await;
        create_lead(&db, organisation, None, "Unfiled").await;

        lead::Entity::update_many()
            .col_expr(lead::Column::CategoryId, db::sea_query::Expr::value(new))
            .filter(lead::Column::Id.eq(bob))
            .exec(&*db)
            .await
            .unwrap();

        let mut service = crate::app_router(db.clone());

        let response = service.call(details_request(&token, new)).await.unwrap();

        assert_json!(response.json().await, {
            "id": new,
            "name": "New",
            "leads": [
                {
                    "id": bob,
                    "first_name": "Bob",
                    "last_name": "Smith",
                    "agent_id": assert_json::validators::null(),
                }
            ]
        });
    }

    #[tokio::test]
    async fn foreign_organisation_category_looks_missing() {
        let db = Arc::new(create_database().await);

        let (_, organisation, _) = create_organisor(&db, "alice").await;
        let (_, _, other_token) = create_organisor(&db, "eve").await;

        let new = create_category(&db, organisation, "New").await;

        let mut service = crate::app_router(db.clone());

        let response = service
            .call(details_request(&other_token, new))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
