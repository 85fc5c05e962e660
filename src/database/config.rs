use serde::{Deserialize, Serialize};

/// Connection settings for the invoice store (SQLite or PostgreSQL URL)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_database_max_connections")]
    pub max_connections: u32,
    /// Apply pending migrations before the server starts listening
    #[serde(default = "default_database_migration_on_startup")]
    pub migration_on_startup: bool,
}

fn default_database_url() -> String {
    "sqlite://invoice_desk.db?mode=rwc".to_string()
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_database_migration_on_startup() -> bool {
    true
}

impl DatabaseConfig {
    /// In-memory SQLite lives and dies with a single connection
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:") && self.url.contains(":memory:")
    }

    /// Pool size to use, clamped to one for in-memory databases
    pub fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_database_max_connections(),
            migration_on_startup: default_database_migration_on_startup(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size() {
        let file = DatabaseConfig::default();
        assert!(!file.is_in_memory());
        assert_eq!(file.pool_size(), 5);

        let memory = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 8,
            ..Default::default()
        };
        assert!(memory.is_in_memory());
        assert_eq!(memory.pool_size(), 1);

        let postgres = DatabaseConfig {
            url: "postgres://localhost/invoices".to_string(),
            max_connections: 0,
            ..Default::default()
        };
        assert_eq!(postgres.pool_size(), 1);
    }
}
