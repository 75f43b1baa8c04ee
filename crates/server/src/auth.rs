use std::sync::Arc;

use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    TypedHeader,
};
use axum_derive_error::ErrorResponse;
use db::{
    token, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, OffsetDateTime,
    PrimitiveDateTime, QueryFilter, QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

/// Identity of an authenticated requester.
///
/// Attached to request extensions by [`require_authentication`]; handlers
/// resolve it into an organisation scope before touching any entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    id: i64,
    is_organisor: bool,
}

impl CurrentUser {
    /// Get raw user identifier value.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether the requester owns an organisation.
    pub fn is_organisor(&self) -> bool {
        self.is_organisor
    }
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AuthenticationError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "invalid authentication token was provided")]
    InvalidAuthenticationToken,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "organisor role is required to access")]
    OrganisorRequired,
}

pub(super) async fn require_authentication<const REQUIRE_ORGANISOR: bool, B>(
    State(db): State<Arc<DatabaseConnection>>,
    TypedHeader(authorization): TypedHeader<Authorization<Bearer>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, AuthenticationError> {
    let bearer = authorization.token();

    // Tokens past their lifespan stay in the table but no longer match.
    let expiry = OffsetDateTime::now_utc() - token::TOKEN_LIFESPAN;
    let expiry = PrimitiveDateTime::new(expiry.date(), expiry.time());

    let (id, is_organisor) = token::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::IsOrganisor)
        .join(JoinType::InnerJoin, token::Relation::User.def())
        .filter(token::Column::Token.eq(bearer))
        .filter(token::Column::CreatedAt.gte(expiry))
        .into_tuple::<(i64, bool)>()
        .one(&*db)
        .await?
        .ok_or(AuthenticationError::InvalidAuthenticationToken)?;

    if REQUIRE_ORGANISOR && !is_organisor {
        return Err(AuthenticationError::OrganisorRequired);
    }

    req.extensions_mut().insert(CurrentUser { id, is_organisor });

    Ok(next.run(req).await)
}
