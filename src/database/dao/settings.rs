use crate::database::entities::{SettingsRecord, settings};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::debug;

/// Settings fields to write; `None` leaves the stored value alone
#[derive(Debug, Default, Clone)]
pub struct SettingsChanges {
    pub home: Option<String>,
    pub logo: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub business_name: Option<String>,
}

impl SettingsChanges {
    fn apply(self, active_model: &mut settings::ActiveModel) {
        if let Some(home) = self.home {
            active_model.home = Set(Some(home));
        }
        if let Some(logo) = self.logo {
            active_model.logo = Set(Some(logo));
        }
        if let Some(language) = self.language {
            active_model.language = Set(Some(language));
        }
        if let Some(country) = self.country {
            active_model.country = Set(Some(country));
        }
        if let Some(address) = self.address {
            active_model.address = Set(Some(address));
        }
        if let Some(business_name) = self.business_name {
            active_model.business_name = Set(Some(business_name));
        }
    }
}

#[derive(Clone)]
pub struct SettingsDao {
    db: DatabaseConnection,
}

impl SettingsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_user(&self, user_id: i32) -> DatabaseResult<Option<SettingsRecord>> {
        let record = settings::Entity::find()
            .filter(settings::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(record)
    }

    /// Create the user's settings row on first write, otherwise merge into it
    pub async fn upsert(
        &self,
        user_id: i32,
        changes: SettingsChanges,
    ) -> DatabaseResult<SettingsRecord> {
        if let Some(existing) = self.find_by_user(user_id).await? {
            return self.merge(existing, changes).await;
        }

        let now = Utc::now();
        let mut active_model = settings::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: Set(user_id),
            home: Set(None),
            logo: Set(None),
            language: Set(None),
            country: Set(None),
            address: Set(None),
            business_name: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        changes.clone().apply(&mut active_model);

        match active_model.insert(&self.db).await.map_err(DatabaseError::from) {
            Ok(stored) => Ok(stored),
            // A concurrent first write won the unique index
            Err(DatabaseError::Constraint(_)) => {
                debug!(user_id, "Settings row appeared during insert, merging");
                let existing = self
                    .find_by_user(user_id)
                    .await?
                    .ok_or(DatabaseError::NotFound)?;
                self.merge(existing, changes).await
            }
            Err(err) => Err(err),
        }
    }

    async fn merge(
        &self,
        existing: SettingsRecord,
        changes: SettingsChanges,
    ) -> DatabaseResult<SettingsRecord> {
        let mut active_model: settings::ActiveModel = existing.into();
        changes.apply(&mut active_model);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(&self.db).await?;
        Ok(updated)
    }
}
