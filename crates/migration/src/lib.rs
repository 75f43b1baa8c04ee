pub use sea_orm_migration::prelude::*;
pub use sea_orm_migration::{cli, sea_orm};

mod m20230101_000001_create_users_table;
mod m20230101_000002_create_user_profiles_table;
mod m20230101_000003_create_authentication_tokens_table;
mod m20230101_000004_create_agents_table;
mod m20230101_000005_create_categories_table;
mod m20230101_000006_create_leads_table;

pub(crate) use m20230101_000001_create_users_table::Users;
pub(crate) use m20230101_000002_create_user_profiles_table::UserProfiles;
pub(crate) use m20230101_000004_create_agents_table::Agents;
pub(crate) use m20230101_000005_create_categories_table::Categories;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230101_000001_create_users_table::Migration),
            Box::new(m20230101_000002_create_user_profiles_table::Migration),
            Box::new(m20230101_000003_create_authentication_tokens_table::Migration),
            Box::new(m20230101_000004_create_agents_table::Migration),
            Box::new(m20230101_000005_create_categories_table::Migration),
            Box::new(m20230101_000006_create_leads_table::Migration),
        ]
    }
}
