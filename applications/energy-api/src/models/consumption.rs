use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw hourly reading as stored by the collector. Timestamps keep the
/// UTC offset the upstream provider reported.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HourlyConsumption {
    pub from_time: DateTime<FixedOffset>,
    pub to_time: DateTime<FixedOffset>,
    pub consumption: Option<f64>,
    pub consumption_unit: Option<String>,
    pub cost: Option<f64>,
    pub unit_price: Option<f64>,
    pub unit_price_vat: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyConsumption {
    pub date: NaiveDate,
    pub total_consumption: f64,
    pub total_cost: Option<f64>,
    pub avg_unit_price: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyConsumption {
    pub year: i64,
    pub month: i64,
    pub total_consumption: f64,
    pub total_cost: Option<f64>,
    pub avg_unit_price: Option<f64>,
    pub currency: Option<String>,
}

/// Overall statistics across the whole hourly table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stats {
    pub total_records: i64,
    pub date_range_start: Option<DateTime<FixedOffset>>,
    pub date_range_end: Option<DateTime<FixedOffset>>,
    pub total_consumption_kwh: Option<f64>,
    pub total_cost: Option<f64>,
    pub currency: Option<String>,
}

/// Filters shared by /api/hourly and /api/daily. Dates compare against the
/// UTC date of each record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeQueryParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyQueryParams {
    pub year: Option<i64>,
    pub limit: Option<i64>,
}
