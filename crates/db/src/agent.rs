//! Sales agent.
//!
//! An agent pairs a login account with the organisation that provisioned
//! it. The pairing is immutable: identity changes go through the linked
//! user, and removing the agent removes the backing user as well.

use sea_orm::{entity::prelude::*, FromQueryResult};
use serde::Serialize;

/// Agent model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "agents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Related user identifier.
    #[sea_orm(unique)]
    pub user_id: i64,

    /// Owning organisation profile identifier.
    pub organisation_id: i64,
}

/// Agent model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::OrganisationId",
        to = "super::user_profile::Column::Id"
    )]
    Organisation,

    #[sea_orm(has_many = "super::lead::Entity")]
    Leads,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organisation.def()
    }
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Agent row joined with the identity fields of its user.
#[derive(Serialize, FromQueryResult)]
pub struct AgentInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
