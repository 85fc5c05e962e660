use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_customers_table;
mod m20250301_000003_create_invoices_table;
mod m20250301_000004_create_settings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_customers_table::Migration),
            Box::new(m20250301_000003_create_invoices_table::Migration),
            Box::new(m20250301_000004_create_settings_table::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    PhoneNumber,
    Address,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Customers {
    Table,
    Id,
    UserId,
    Name,
    Email,
    PhoneNumber,
    BillingAddress,
    ShippingAddress,
    BalanceDue,
    AmountPaid,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Invoices {
    Table,
    Id,
    UserId,
    CustomerId,
    BillingAddress,
    ShippingAddress,
    Email,
    Phone,
    Status,
    Items,
    TotalAmount,
    AmountPaid,
    PaymentInfo,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Settings {
    Table,
    Id,
    UserId,
    Home,
    Logo,
    Language,
    Country,
    Address,
    BusinessName,
    CreatedAt,
    UpdatedAt,
}
