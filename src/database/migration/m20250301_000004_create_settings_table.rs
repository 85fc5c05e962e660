use super::{Settings, Users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::UserId).integer().not_null())
                    .col(ColumnDef::new(Settings::Home).string().null())
                    .col(ColumnDef::new(Settings::Logo).string().null())
                    .col(ColumnDef::new(Settings::Language).string().null())
                    .col(ColumnDef::new(Settings::Country).string().null())
                    .col(ColumnDef::new(Settings::Address).string().null())
                    .col(ColumnDef::new(Settings::BusinessName).string().null())
                    .col(
                        ColumnDef::new(Settings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        if manager.get_database_backend() == sea_orm::DatabaseBackend::Postgres {
            manager
                .create_foreign_key(
                    ForeignKey::create()
                        .name("fk_settings_user_id")
                        .from(Settings::Table, Settings::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .to_owned(),
                )
                .await?;
        }

        // One settings row per user
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_settings_user_id")
                    .table(Settings::Table)
                    .col(Settings::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}
