use crate::database::entities::{UserRecord, users};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// Profile fields a user may change about themselves
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Users DAO for database operations
#[derive(Clone)]
pub struct UsersDao {
    db: DatabaseConnection,
}

impl UsersDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new user, returning the stored record.
    /// A duplicate email surfaces as `DatabaseError::Constraint`.
    pub async fn create(&self, user: &UserRecord) -> DatabaseResult<UserRecord> {
        let active_model = users::ActiveModel {
            id: ActiveValue::NotSet,
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            phone_number: Set(user.phone_number.clone()),
            address: Set(user.address.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };

        let stored = active_model.insert(&self.db).await?;
        Ok(stored)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, user_id: i32) -> DatabaseResult<Option<UserRecord>> {
        let user = users::Entity::find_by_id(user_id).one(&self.db).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<UserRecord>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(user)
    }

    /// Apply profile changes, leaving unspecified fields untouched
    pub async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> DatabaseResult<UserRecord> {
        let mut active_model = users::ActiveModel {
            id: Set(user_id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(phone_number) = changes.phone_number {
            active_model.phone_number = Set(Some(phone_number));
        }
        if let Some(address) = changes.address {
            active_model.address = Set(Some(address));
        }

        active_model.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DatabaseError::NotFound,
            other => other.into(),
        })
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, user_id: i32, password_hash: String) -> DatabaseResult<()> {
        let active_model = users::ActiveModel {
            id: Set(user_id),
            password_hash: Set(password_hash),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        active_model.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DatabaseError::NotFound,
            other => other.into(),
        })?;

        Ok(())
    }
}
