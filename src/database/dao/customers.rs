use crate::database::entities::{CustomerRecord, customers};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

/// Partial update for a customer
#[derive(Debug, Default, Clone)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub balance_due: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
}

/// Customers DAO for database operations
#[derive(Clone)]
pub struct CustomersDao {
    db: DatabaseConnection,
}

impl CustomersDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store a new customer
    pub async fn create(&self, customer: &CustomerRecord) -> DatabaseResult<CustomerRecord> {
        let active_model = customers::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: Set(customer.user_id),
            name: Set(customer.name.clone()),
            email: Set(customer.email.clone()),
            phone_number: Set(customer.phone_number.clone()),
            billing_address: Set(customer.billing_address.clone()),
            shipping_address: Set(customer.shipping_address.clone()),
            balance_due: Set(customer.balance_due),
            amount_paid: Set(customer.amount_paid),
            created_at: Set(customer.created_at),
            updated_at: Set(customer.updated_at),
        };

        let stored = active_model.insert(&self.db).await?;
        Ok(stored)
    }

    /// All customers of one owner, oldest first
    pub async fn list_for_owner(&self, user_id: i32) -> DatabaseResult<Vec<CustomerRecord>> {
        let records = customers::Entity::find()
            .filter(customers::Column::UserId.eq(user_id))
            .order_by_asc(customers::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(records)
    }

    /// Find a customer, but only if it belongs to the owner
    pub async fn find_for_owner(
        &self,
        user_id: i32,
        customer_id: i32,
    ) -> DatabaseResult<Option<CustomerRecord>> {
        let record = customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(record)
    }

    pub async fn update(
        &self,
        user_id: i32,
        customer_id: i32,
        changes: CustomerChanges,
    ) -> DatabaseResult<CustomerRecord> {
        let existing = self
            .find_for_owner(user_id, customer_id)
            .await?
            .ok_or(DatabaseError::NotFound)?;

        let mut active_model: customers::ActiveModel = existing.into();

        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(email) = changes.email {
            active_model.email = Set(Some(email));
        }
        if let Some(phone_number) = changes.phone_number {
            active_model.phone_number = Set(Some(phone_number));
        }
        if let Some(billing_address) = changes.billing_address {
            active_model.billing_address = Set(Some(billing_address));
        }
        if let Some(shipping_address) = changes.shipping_address {
            active_model.shipping_address = Set(Some(shipping_address));
        }
        if let Some(balance_due) = changes.balance_due {
            active_model.balance_due = Set(balance_due);
        }
        if let Some(amount_paid) = changes.amount_paid {
            active_model.amount_paid = Set(amount_paid);
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a customer; returns false when the owner has no such customer
    pub async fn delete(&self, user_id: i32, customer_id: i32) -> DatabaseResult<bool> {
        let result = customers::Entity::delete_many()
            .filter(customers::Column::Id.eq(customer_id))
            .filter(customers::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Count customers the owner created in `[start, end)`
    pub async fn count_created_between(
        &self,
        user_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DatabaseResult<u64> {
        let count = customers::Entity::find()
            .filter(customers::Column::UserId.eq(user_id))
            .filter(customers::Column::CreatedAt.gte(start))
            .filter(customers::Column::CreatedAt.lt(end))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
