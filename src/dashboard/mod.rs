//! Dashboard reporting
//!
//! Sales charts bucket an owner's invoices by day, week or month over a fixed
//! lookback window. Stats compare the current calendar month with the previous
//! one. Both are read-only and take `now` explicitly.

pub mod aggregator;
pub mod period;
pub mod stats;

pub use aggregator::{SalesAggregator, SalesPoint, SalesWindow};
pub use period::SalesPeriod;
pub use stats::{DashboardStats, StatsCalculator, growth};

use crate::database::DatabaseManager;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Entry point used by the dashboard routes
pub struct DashboardService {
    aggregator: SalesAggregator,
    stats: StatsCalculator,
}

impl DashboardService {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self {
            aggregator: SalesAggregator::new(database.clone()),
            stats: StatsCalculator::new(database),
        }
    }

    pub async fn sales(
        &self,
        owner_id: i32,
        period: SalesPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<SalesPoint>, AppError> {
        self.aggregator.sales(owner_id, period, now).await
    }

    pub async fn stats(&self, owner_id: i32, now: DateTime<Utc>) -> Result<DashboardStats, AppError> {
        self.stats.stats(owner_id, now).await
    }
}
