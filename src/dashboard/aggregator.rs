use crate::dashboard::period::SalesPeriod;
use crate::database::{DatabaseManager, InvoiceQuery};
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One chart point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPoint {
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Zero-initialized buckets covering one lookback window, keyed by bucket
/// start date so iteration order is chronological.
#[derive(Debug, Clone)]
pub struct SalesWindow {
    period: SalesPeriod,
    buckets: BTreeMap<NaiveDate, Decimal>,
    end: NaiveDate,
}

impl SalesWindow {
    /// Window of `period.bucket_count()` buckets ending with the bucket that contains `today`
    pub fn new(period: SalesPeriod, today: NaiveDate) -> Option<Self> {
        let start = period.window_start(today)?;

        let mut buckets = BTreeMap::new();
        let mut cursor = start;
        for _ in 0..period.bucket_count() {
            buckets.insert(cursor, Decimal::ZERO);
            cursor = period.next_bucket_start(cursor)?;
        }

        Some(Self {
            period,
            buckets,
            end: cursor,
        })
    }

    /// Inclusive lower bound of the window
    pub fn start(&self) -> DateTime<Utc> {
        let first = self.buckets.keys().next().copied().unwrap_or(self.end);
        midnight(first)
    }

    /// Exclusive upper bound of the window
    pub fn end(&self) -> DateTime<Utc> {
        midnight(self.end)
    }

    /// Add an amount to the bucket containing `created_at`.
    /// Returns false when the timestamp falls outside the window.
    pub fn add(&mut self, created_at: DateTime<Utc>, amount: Decimal) -> bool {
        let key = self.period.bucket_start(created_at.date_naive());
        match self.buckets.get_mut(&key) {
            Some(total) => {
                *total += amount;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> Decimal {
        self.buckets.values().copied().sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn into_points(self) -> Vec<SalesPoint> {
        let period = self.period;
        self.buckets
            .into_iter()
            .map(|(start, amount)| SalesPoint {
                date: period.label(start),
                amount,
            })
            .collect()
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Builds sales charts from the invoice store
pub struct SalesAggregator {
    database: Arc<dyn DatabaseManager>,
}

impl SalesAggregator {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    /// Sales of one owner bucketed by `period`, oldest bucket first
    pub async fn sales(
        &self,
        owner_id: i32,
        period: SalesPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<SalesPoint>, AppError> {
        let mut window = SalesWindow::new(period, now.date_naive()).ok_or_else(|| {
            AppError::Internal(format!("Cannot build {} window around {}", period, now))
        })?;

        let query = InvoiceQuery::for_owner_between(owner_id, window.start(), window.end());
        let invoices = self.database.invoices().get_records(&query).await?;

        let mut skipped = 0usize;
        for invoice in &invoices {
            if !window.add(invoice.created_at, invoice.total_amount) {
                skipped += 1;
            }
        }

        if skipped > 0 {
            debug!(owner_id, skipped, "Invoices outside every bucket were ignored");
        }

        info!(
            owner_id,
            period = %period,
            invoices = invoices.len(),
            buckets = window.len(),
            "Aggregated sales"
        );

        Ok(window.into_points())
    }
}
