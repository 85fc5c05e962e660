use super::{Customers, Invoices, Users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::UserId).integer().not_null())
                    .col(ColumnDef::new(Invoices::CustomerId).integer().not_null())
                    .col(ColumnDef::new(Invoices::BillingAddress).string().null())
                    .col(ColumnDef::new(Invoices::ShippingAddress).string().null())
                    .col(ColumnDef::new(Invoices::Email).string().null())
                    .col(ColumnDef::new(Invoices::Phone).string().null())
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string_len(16)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Invoices::Items).json().not_null())
                    .col(
                        ColumnDef::new(Invoices::TotalAmount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::AmountPaid)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Invoices::PaymentInfo).json().null())
                    .col(
                        ColumnDef::new(Invoices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create foreign key constraints only for PostgreSQL (SQLite doesn't support adding FK after table creation)
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Postgres {
            manager
                .create_foreign_key(
                    ForeignKey::create()
                        .name("fk_invoices_user_id")
                        .from(Invoices::Table, Invoices::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .to_owned(),
                )
                .await?;

            manager
                .create_foreign_key(
                    ForeignKey::create()
                        .name("fk_invoices_customer_id")
                        .from(Invoices::Table, Invoices::CustomerId)
                        .to(Customers::Table, Customers::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .to_owned(),
                )
                .await?;
        }

        // Dashboard queries scan one owner's invoices by creation time
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_invoices_user_created")
                    .table(Invoices::Table)
                    .col(Invoices::UserId)
                    .col(Invoices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_invoices_customer_id")
                    .table(Invoices::Table)
                    .col(Invoices::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}
