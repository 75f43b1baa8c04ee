//! Organisation profile.
//!
//! The profile is the tenancy root: every agent, lead and category belongs
//! to exactly one profile, and all scoping resolves to a profile
//! identifier. A profile is only ever created together with its user, see
//! [`user::create_with_profile`].
//!
//! [`user::create_with_profile`]: super::user::create_with_profile

use sea_orm::entity::prelude::*;

/// User profile model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Related user identifier.
    #[sea_orm(unique)]
    pub user_id: i64,
}

/// User profile model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::agent::Entity")]
    Agents,

    #[sea_orm(has_many = "super::lead::Entity")]
    Leads,

    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agents.def()
    }
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
