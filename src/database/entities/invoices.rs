use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{FromJsonQueryResult, entity::prelude::*, sea_query::StringLen};
use serde::{Deserialize, Serialize};

/// Payment state of an invoice
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "unpaid")]
    #[default]
    Unpaid,
    #[sea_orm(string_value = "partial")]
    Partial,
}

impl InvoiceStatus {
    /// Unpaid and partially paid invoices still expect money
    pub fn is_pending(&self) -> bool {
        matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Partial)
    }
}

/// Line item embedded in an invoice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    #[serde(default)]
    pub item_id: Option<i32>,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Invoice line items, stored as a JSON column
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct InvoiceItems(pub Vec<InvoiceItem>);

impl InvoiceItems {
    pub fn total(&self) -> Decimal {
        self.0.iter().map(|item| item.total).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub method: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "invoices")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub customer_id: i32,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(16))", default_value = "unpaid")]
    pub status: InvoiceStatus,
    #[sea_orm(column_type = "Json")]
    pub items: InvoiceItems,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    #[sea_orm(column_type = "Json", nullable)]
    pub payment_info: Option<PaymentInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Create an unpaid invoice whose total is the sum of its items
    pub fn new(user_id: i32, customer_id: i32, items: Vec<InvoiceItem>) -> Self {
        let now = Utc::now();
        let items = InvoiceItems(items);
        Self {
            id: 0,
            user_id,
            customer_id,
            billing_address: None,
            shipping_address: None,
            email: None,
            phone: None,
            status: InvoiceStatus::Unpaid,
            total_amount: items.total(),
            items,
            amount_paid: Decimal::ZERO,
            payment_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_total_amount(mut self, total_amount: Decimal) -> Self {
        self.total_amount = total_amount;
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to set timestamps (for backfills and tests)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }
}
