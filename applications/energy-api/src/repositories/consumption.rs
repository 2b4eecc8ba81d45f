use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{
    DailyConsumption, HourlyConsumption, MonthlyConsumption, MonthlyQueryParams, RangeQueryParams,
    Stats,
};
use chrono::NaiveDate;

pub const DEFAULT_HOURLY_LIMIT: i64 = 100;
pub const DEFAULT_DAILY_LIMIT: i64 = 365;
pub const DEFAULT_MONTHLY_LIMIT: i64 = 24;

#[derive(Clone)]
pub struct ConsumptionRepository {
    pool: DbPool,
}

impl ConsumptionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_hourly(&self, params: &RangeQueryParams) -> Result<Vec<HourlyConsumption>> {
        let mut query = String::from(
            "SELECT from_time, to_time, consumption, consumption_unit, cost,
                    unit_price, unit_price_vat, currency
             FROM hourly_consumption WHERE 1=1",
        );

        if params.start_date.is_some() {
            query.push_str(" AND DATE(from_time) >= ?");
        }
        if params.end_date.is_some() {
            query.push_str(" AND DATE(from_time) <= ?");
        }
        query.push_str(" ORDER BY from_time DESC LIMIT ?");

        let mut sql_query = sqlx::query_as::<_, HourlyConsumption>(&query);
        if let Some(start) = params.start_date {
            sql_query = sql_query.bind(start);
        }
        if let Some(end) = params.end_date {
            sql_query = sql_query.bind(end);
        }
        sql_query = sql_query.bind(params.limit.unwrap_or(DEFAULT_HOURLY_LIMIT));

        Ok(sql_query.fetch_all(&self.pool).await?)
    }

    pub async fn find_daily(&self, params: &RangeQueryParams) -> Result<Vec<DailyConsumption>> {
        let mut query = String::from(
            "SELECT date, total_consumption, total_cost, avg_unit_price, currency
             FROM daily_consumption WHERE 1=1",
        );

        if params.start_date.is_some() {
            query.push_str(" AND date >= ?");
        }
        if params.end_date.is_some() {
            query.push_str(" AND date <= ?");
        }
        query.push_str(" ORDER BY date DESC LIMIT ?");

        let mut sql_query = sqlx::query_as::<_, DailyConsumption>(&query);
        if let Some(start) = params.start_date {
            sql_query = sql_query.bind(start);
        }
        if let Some(end) = params.end_date {
            sql_query = sql_query.bind(end);
        }
        sql_query = sql_query.bind(params.limit.unwrap_or(DEFAULT_DAILY_LIMIT));

        Ok(sql_query.fetch_all(&self.pool).await?)
    }

    pub async fn find_daily_by_date(&self, date: NaiveDate) -> Result<DailyConsumption> {
        let row = sqlx::query_as::<_, DailyConsumption>(
            "SELECT date, total_consumption, total_cost, avg_unit_price, currency
             FROM daily_consumption WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("No data found for {}", date)))
    }

    pub async fn find_monthly(
        &self,
        params: &MonthlyQueryParams,
    ) -> Result<Vec<MonthlyConsumption>> {
        let mut query = String::from(
            "SELECT year, month, total_consumption, total_cost, avg_unit_price, currency
             FROM monthly_consumption WHERE 1=1",
        );

        if params.year.is_some() {
            query.push_str(" AND year = ?");
        }
        query.push_str(" ORDER BY year DESC, month DESC LIMIT ?");

        let mut sql_query = sqlx::query_as::<_, MonthlyConsumption>(&query);
        if let Some(year) = params.year {
            sql_query = sql_query.bind(year);
        }
        sql_query = sql_query.bind(params.limit.unwrap_or(DEFAULT_MONTHLY_LIMIT));

        Ok(sql_query.fetch_all(&self.pool).await?)
    }

    pub async fn find_monthly_by_month(&self, year: i64, month: i64) -> Result<MonthlyConsumption> {
        let row = sqlx::query_as::<_, MonthlyConsumption>(
            "SELECT year, month, total_consumption, total_cost, avg_unit_price, currency
             FROM monthly_consumption WHERE year = ? AND month = ?",
        )
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("No data found for {}-{:02}", year, month)))
    }

    pub async fn find_latest(&self) -> Result<HourlyConsumption> {
        let row = sqlx::query_as::<_, HourlyConsumption>(
            "SELECT from_time, to_time, consumption, consumption_unit, cost,
                    unit_price, unit_price_vat, currency
             FROM hourly_consumption
             ORDER BY from_time DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound("No data found".to_string()))
    }

    pub async fn stats(&self) -> Result<Stats> {
        let stats = sqlx::query_as::<_, Stats>(
            "SELECT
                COUNT(*) AS total_records,
                MIN(from_time) AS date_range_start,
                MAX(from_time) AS date_range_end,
                SUM(consumption) AS total_consumption_kwh,
                SUM(cost) AS total_cost,
                MAX(currency) AS currency
             FROM hourly_consumption",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
