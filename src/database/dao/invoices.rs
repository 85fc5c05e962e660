use crate::database::entities::{
    InvoiceItems, InvoiceRecord, InvoiceStatus, PaymentInfo, invoices,
};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

/// Stands in for "no limit" when only an offset is given
const UNBOUNDED_LIMIT: u32 = u32::MAX;

/// Invoice query parameters.
/// `start_date` is inclusive and `end_date` exclusive.
#[derive(Debug, Default, Clone)]
pub struct InvoiceQuery {
    pub user_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub statuses: Option<Vec<InvoiceStatus>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl InvoiceQuery {
    /// Invoices of one owner created in `[start, end)`
    pub fn for_owner_between(user_id: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id),
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    fn apply(&self, mut select: Select<invoices::Entity>) -> Select<invoices::Entity> {
        if let Some(user_id) = self.user_id {
            select = select.filter(invoices::Column::UserId.eq(user_id));
        }
        if let Some(customer_id) = self.customer_id {
            select = select.filter(invoices::Column::CustomerId.eq(customer_id));
        }
        if let Some(start_date) = self.start_date {
            select = select.filter(invoices::Column::CreatedAt.gte(start_date));
        }
        if let Some(end_date) = self.end_date {
            select = select.filter(invoices::Column::CreatedAt.lt(end_date));
        }
        if let Some(ref statuses) = self.statuses {
            select = select.filter(invoices::Column::Status.is_in(statuses.iter().copied()));
        }
        select
    }
}

/// Partial update for an invoice
#[derive(Debug, Default, Clone)]
pub struct InvoiceChanges {
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub items: Option<InvoiceItems>,
    pub total_amount: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub payment_info: Option<PaymentInfo>,
}

/// Invoices DAO for database operations
#[derive(Clone)]
pub struct InvoicesDao {
    db: DatabaseConnection,
}

impl InvoicesDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store a new invoice
    pub async fn create(&self, invoice: &InvoiceRecord) -> DatabaseResult<InvoiceRecord> {
        let active_model = invoices::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: Set(invoice.user_id),
            customer_id: Set(invoice.customer_id),
            billing_address: Set(invoice.billing_address.clone()),
            shipping_address: Set(invoice.shipping_address.clone()),
            email: Set(invoice.email.clone()),
            phone: Set(invoice.phone.clone()),
            status: Set(invoice.status),
            items: Set(invoice.items.clone()),
            total_amount: Set(invoice.total_amount),
            amount_paid: Set(invoice.amount_paid),
            payment_info: Set(invoice.payment_info.clone()),
            created_at: Set(invoice.created_at),
            updated_at: Set(invoice.updated_at),
        };

        let stored = active_model.insert(&self.db).await?;
        Ok(stored)
    }

    /// Get invoices with filtering, newest first
    pub async fn get_records(&self, query: &InvoiceQuery) -> DatabaseResult<Vec<InvoiceRecord>> {
        let mut select = query
            .apply(invoices::Entity::find())
            .order_by_desc(invoices::Column::CreatedAt);

        // SQLite rejects OFFSET without LIMIT
        let limit = query
            .limit
            .or(query.offset.map(|_| UNBOUNDED_LIMIT));
        if let Some(limit) = limit {
            select = select.limit(Some(limit as u64));
        }
        if let Some(offset) = query.offset {
            select = select.offset(Some(offset as u64));
        }

        let records = select.all(&self.db).await?;
        Ok(records)
    }

    /// Find an invoice, but only if it belongs to the owner
    pub async fn find_for_owner(
        &self,
        user_id: i32,
        invoice_id: i32,
    ) -> DatabaseResult<Option<InvoiceRecord>> {
        let record = invoices::Entity::find_by_id(invoice_id)
            .filter(invoices::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(record)
    }

    pub async fn update(
        &self,
        user_id: i32,
        invoice_id: i32,
        changes: InvoiceChanges,
    ) -> DatabaseResult<InvoiceRecord> {
        let existing = self
            .find_for_owner(user_id, invoice_id)
            .await?
            .ok_or(DatabaseError::NotFound)?;

        let mut active_model: invoices::ActiveModel = existing.into();

        if let Some(billing_address) = changes.billing_address {
            active_model.billing_address = Set(Some(billing_address));
        }
        if let Some(shipping_address) = changes.shipping_address {
            active_model.shipping_address = Set(Some(shipping_address));
        }
        if let Some(email) = changes.email {
            active_model.email = Set(Some(email));
        }
        if let Some(phone) = changes.phone {
            active_model.phone = Set(Some(phone));
        }
        if let Some(status) = changes.status {
            active_model.status = Set(status);
        }
        if let Some(items) = changes.items {
            active_model.items = Set(items);
        }
        if let Some(total_amount) = changes.total_amount {
            active_model.total_amount = Set(total_amount);
        }
        if let Some(amount_paid) = changes.amount_paid {
            active_model.amount_paid = Set(amount_paid);
        }
        if let Some(payment_info) = changes.payment_info {
            active_model.payment_info = Set(Some(payment_info));
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete an invoice; returns false when the owner has no such invoice
    pub async fn delete(&self, user_id: i32, invoice_id: i32) -> DatabaseResult<bool> {
        let result = invoices::Entity::delete_many()
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
