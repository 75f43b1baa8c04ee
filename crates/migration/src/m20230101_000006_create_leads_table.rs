use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .col(
                        ColumnDef::new(Leads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Leads::FirstName).string_len(20).not_null())
                    .col(ColumnDef::new(Leads::LastName).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Leads::Age)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Leads::OrganisationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Leads::AgentId).big_integer())
                    .col(ColumnDef::new(Leads::CategoryId).big_integer())
                    .col(ColumnDef::new(Leads::Description).text())
                    .col(
                        ColumnDef::new(Leads::PhoneNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Leads::Email).string().not_null())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::OrganisationId)
                            .to(crate::UserProfiles::Table, crate::UserProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::AgentId)
                            .to(crate::Agents::Table, crate::Agents::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::CategoryId)
                            .to(crate::Categories::Table, crate::Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub(crate) enum Leads {
    Table,
    Id,
    FirstName,
    LastName,
    Age,
    OrganisationId,
    AgentId,
    CategoryId,
    Description,
    PhoneNumber,
    Email,
    CreatedAt,
}
