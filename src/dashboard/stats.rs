use crate::database::{DatabaseManager, DatabaseResult, InvoiceQuery};
use crate::error::AppError;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Percentage change from `previous` to `current`, one decimal place.
///
/// A rise from zero counts as 100% and no activity at all as 0%.
pub fn growth(previous: Decimal, current: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED
        };
    }

    ((current - previous) / previous * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Half-open `[start, end)` ranges of the current and previous calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindows {
    pub previous_start: DateTime<Utc>,
    pub current_start: DateTime<Utc>,
    pub next_start: DateTime<Utc>,
}

impl MonthWindows {
    pub fn around(now: DateTime<Utc>) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?;
        let previous = first.checked_sub_months(Months::new(1))?;
        let next = first.checked_add_months(Months::new(1))?;

        Some(Self {
            previous_start: previous.and_time(NaiveTime::MIN).and_utc(),
            current_start: first.and_time(NaiveTime::MIN).and_utc(),
            next_start: next.and_time(NaiveTime::MIN).and_utc(),
        })
    }
}

/// Totals of one owner over one month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthTotals {
    pub sales: Decimal,
    pub orders: u64,
    pub pending: u64,
    pub new_customers: u64,
}

/// Dashboard header cards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    pub new_customers: u64,
    pub total_orders: u64,
    pub pending_invoices: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub sales_growth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub customer_growth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_growth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_growth: Decimal,
}

impl DashboardStats {
    pub fn compare(previous: &MonthTotals, current: &MonthTotals) -> Self {
        Self {
            total_sales: current.sales,
            new_customers: current.new_customers,
            total_orders: current.orders,
            pending_invoices: current.pending,
            sales_growth: growth(previous.sales, current.sales),
            customer_growth: growth(
                Decimal::from(previous.new_customers),
                Decimal::from(current.new_customers),
            ),
            order_growth: growth(
                Decimal::from(previous.orders),
                Decimal::from(current.orders),
            ),
            pending_growth: growth(
                Decimal::from(previous.pending),
                Decimal::from(current.pending),
            ),
        }
    }
}

/// Month-over-month comparison of an owner's activity
pub struct StatsCalculator {
    database: Arc<dyn DatabaseManager>,
}

impl StatsCalculator {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    pub async fn stats(&self, owner_id: i32, now: DateTime<Utc>) -> Result<DashboardStats, AppError> {
        let windows = MonthWindows::around(now)
            .ok_or_else(|| AppError::Internal(format!("Cannot build month windows around {}", now)))?;

        let current = self
            .month_totals(owner_id, windows.current_start, windows.next_start)
            .await?;
        let previous = self
            .month_totals(owner_id, windows.previous_start, windows.current_start)
            .await?;

        info!(
            owner_id,
            current_orders = current.orders,
            previous_orders = previous.orders,
            "Computed dashboard stats"
        );

        Ok(DashboardStats::compare(&previous, &current))
    }

    async fn month_totals(
        &self,
        owner_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DatabaseResult<MonthTotals> {
        let query = InvoiceQuery::for_owner_between(owner_id, start, end);

        let invoices = self.database.invoices().get_records(&query).await?;
        let new_customers = self
            .database
            .customers()
            .count_created_between(owner_id, start, end)
            .await?;

        Ok(MonthTotals {
            sales: invoices.iter().map(|invoice| invoice.total_amount).sum(),
            orders: invoices.len() as u64,
            pending: invoices
                .iter()
                .filter(|invoice| invoice.status.is_pending())
                .count() as u64,
            new_customers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_growth_edge_cases() {
        assert_eq!(growth(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(growth(Decimal::ZERO, dec("5")), dec("100"));
        assert_eq!(growth(dec("50"), dec("100")), dec("100"));
        assert_eq!(growth(dec("100"), dec("50")), dec("-50"));
        assert_eq!(growth(dec("100"), dec("200")), dec("100"));
        assert_eq!(growth(dec("10"), Decimal::ZERO), dec("-100"));
    }

    #[test]
    fn test_growth_rounds_to_one_decimal() {
        // 1/3 -> 33.333...
        assert_eq!(growth(dec("3"), dec("4")), dec("33.3"));
        // 2/3 -> 66.666...
        assert_eq!(growth(dec("3"), dec("5")), dec("66.7"));
        // 6.25 and -6.25 round away from zero
        assert_eq!(growth(dec("16"), dec("17")), dec("6.3"));
        assert_eq!(growth(dec("16"), dec("15")), dec("-6.3"));
    }

    #[test]
    fn test_month_windows() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        let windows = MonthWindows::around(now).unwrap();

        assert_eq!(
            windows.previous_start,
            Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            windows.current_start,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            windows.next_start,
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_compare_and_serialize() {
        let previous = MonthTotals {
            sales: dec("100"),
            orders: 2,
            pending: 0,
            new_customers: 4,
        };
        let current = MonthTotals {
            sales: dec("200"),
            orders: 3,
            pending: 1,
            new_customers: 2,
        };

        let stats = DashboardStats::compare(&previous, &current);
        assert_eq!(stats.sales_growth, dec("100"));
        assert_eq!(stats.order_growth, dec("50"));
        assert_eq!(stats.pending_growth, dec("100"));
        assert_eq!(stats.customer_growth, dec("-50"));

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "totalSales": 200.0,
                "newCustomers": 2,
                "totalOrders": 3,
                "pendingInvoices": 1,
                "salesGrowth": 100.0,
                "customerGrowth": -50.0,
                "orderGrowth": 50.0,
                "pendingGrowth": 100.0
            })
        );
    }
}
