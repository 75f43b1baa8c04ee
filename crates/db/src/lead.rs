//! Sales lead.
//!
//! A lead always belongs to an organisation; assignment to an agent and
//! categorization are both optional and both survive removal of their
//! target, with the reference cleared rather than the lead deleted.

use sea_orm::{entity::prelude::*, FromQueryResult};

/// Lead model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub first_name: String,
    pub last_name: String,
    pub age: i32,

    /// Owning organisation profile identifier.
    pub organisation_id: i64,

    /// Assigned agent, if any.
    pub agent_id: Option<i64>,

    /// Category the lead is filed under, if any.
    pub category_id: Option<i64>,

    pub description: Option<String>,
    pub phone_number: String,
    pub email: String,

    /// Creation timestamp, immutable once set.
    pub created_at: TimeDateTime,
}

/// Lead model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::OrganisationId",
        to = "super::user_profile::Column::Id"
    )]
    Organisation,

    #[sea_orm(
        belongs_to = "super::agent::Entity",
        from = "Column::AgentId",
        to = "super::agent::Column::Id"
    )]
    Agent,

    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organisation.def()
    }
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Listing projection of a lead row.
#[derive(FromQueryResult)]
pub struct LeadInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub agent_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: TimeDateTime,
}

