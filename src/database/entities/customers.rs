use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "customers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_due: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn new(user_id: i32, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            name: name.into(),
            email: None,
            phone_number: None,
            billing_address: None,
            shipping_address: None,
            balance_due: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method to set timestamps (for backfills and tests)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }
}
