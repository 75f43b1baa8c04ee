use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    category, lead,
    scope::{Scope, ScopeError},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::{auth::CurrentUser, pagination::Pagination};

/// Errors that may occur during the category list request.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CategoryListError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Unable to resolve the requester's organisation.
    ScopeError(ScopeError),
}

/// A single category in a listing.
#[derive(Serialize)]
pub(super) struct CategoryData {
    pub id: i64,
    pub name: String,
}

/// JSON response body.
#[derive(Serialize)]
pub(super) struct CategoryListResponse {
    categories: Vec<CategoryData>,

    /// Organisation leads that are not filed under any category.
    unassigned_lead_count: u64,
}

/// List categories of the requester's organisation.
///
/// Agents see the same listing as their organisor: categories are
/// organisation-wide, not per-agent.
pub(super) async fn list(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<CategoryListResponse>, CategoryListError> {
    let scope = Scope::resolve(&*db, current_user.id(), current_user.is_organisor()).await?;

    let categories = scope
        .categories()
        .select_only()
        .columns([category::Column::Id, category::Column::Name])
        .limit(pagination.limit())
        .offset(pagination.offset())
        .order_by_asc(category::Column::Id)
        .into_tuple::<(i64, String)>()
        .all(&*db)
        .await?
        .into_iter()
        .map(|(id, name)| CategoryData { id, name })
        .collect();

    // The count spans the whole organisation for agents as well, matching
    // the organisation-wide listing above.
    let unassigned_lead_count = lead::Entity::find()
        .filter(lead::Column::OrganisationId.eq(scope.organisation()))
        .filter(lead::Column::CategoryId.is_null())
        .count(&*db)
        .await? as u64;

    Ok(Json(CategoryListResponse {
        categories,
        unassigned_lead_count,
    }))
}
