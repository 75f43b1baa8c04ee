//! Lead category.
//!
//! A per-organisation label ("New", "Contacted", "Converted", ...) that
//! leads may be filed under.

use sea_orm::entity::prelude::*;

/// Category model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    /// Owning organisation profile identifier.
    pub organisation_id: i64,
}

/// Category model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::OrganisationId",
        to = "super::user_profile::Column::Id"
    )]
    Organisation,

    #[sea_orm(has_many = "super::lead::Entity")]
    Leads,
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
