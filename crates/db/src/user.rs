//! Registered login account.
//!
//! Two kinds of accounts exist: organisors, who sign up themselves and own
//! an organisation, and agents, whose accounts are provisioned by an
//! organisor. The two role flags mirror that split; they are not mutually
//! exclusive at the schema level but every account created by this crate
//! sets exactly one of them.

use sea_orm::{entity::prelude::*, ActiveValue, ConnectionTrait};
use time::{OffsetDateTime, PrimitiveDateTime};

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Unique login name.
    #[sea_orm(unique)]
    pub username: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Argon2id PHC string of the account password.
    pub password_hash: String,

    pub is_organisor: bool,
    pub is_agent: bool,

    pub created_at: TimeDateTime,
}

/// User model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_profile::Entity")]
    Profile,

    #[sea_orm(has_one = "super::agent::Entity")]
    Agent,

    #[sea_orm(has_many = "super::token::Entity")]
    Tokens,
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl Related<super::token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Create a user together with its profile.
///
/// Every user owns exactly one profile row, inserted here and nowhere else,
/// so an account without a profile (or with two of them) cannot be produced
/// by this codebase. Both inserts run on the provided connection; combine
/// with other writes inside a transaction.
///
/// The creation timestamp is stamped unconditionally, overriding whatever
/// the caller put into the active model.
pub async fn create_with_profile<C: ConnectionTrait>(
    conn: &C,
    mut user: ActiveModel,
) -> Result<(Model, super::user_profile::Model), DbErr> {
    let now = OffsetDateTime::now_utc();

    user.created_at = ActiveValue::Set(PrimitiveDateTime::new(now.date(), now.time()));

    let user = Entity::insert(user).exec_with_returning(conn).await?;

    let profile = super::user_profile::Entity::insert(super::user_profile::ActiveModel {
        user_id: ActiveValue::Set(user.id),
        ..Default::default()
    })
    .exec_with_returning(conn)
    .await?;

    Ok((user, profile))
}
