use crate::error::{AppError, Result};
use crate::models::{
    DailyConsumption, HourlyConsumption, MonthlyConsumption, MonthlyQueryParams, RangeQueryParams,
    Stats,
};
use crate::repositories::ConsumptionRepository;
use chrono::NaiveDate;

const MAX_RANGE_LIMIT: i64 = 10_000;
const MAX_MONTHLY_LIMIT: i64 = 1_000;

#[derive(Clone)]
pub struct ConsumptionService {
    repository: ConsumptionRepository,
}

impl ConsumptionService {
    pub fn new(repository: ConsumptionRepository) -> Self {
        Self { repository }
    }

    pub async fn hourly(&self, params: RangeQueryParams) -> Result<Vec<HourlyConsumption>> {
        validate_range_params(&params, MAX_RANGE_LIMIT)?;
        self.repository.find_hourly(&params).await
    }

    pub async fn daily(&self, params: RangeQueryParams) -> Result<Vec<DailyConsumption>> {
        validate_range_params(&params, MAX_RANGE_LIMIT)?;
        self.repository.find_daily(&params).await
    }

    pub async fn daily_by_date(&self, date: NaiveDate) -> Result<DailyConsumption> {
        self.repository.find_daily_by_date(date).await
    }

    pub async fn monthly(&self, params: MonthlyQueryParams) -> Result<Vec<MonthlyConsumption>> {
        validate_limit(params.limit, MAX_MONTHLY_LIMIT)?;
        self.repository.find_monthly(&params).await
    }

    pub async fn monthly_by_month(&self, year: i64, month: i64) -> Result<MonthlyConsumption> {
        validate_month(month)?;
        self.repository.find_monthly_by_month(year, month).await
    }

    pub async fn latest(&self) -> Result<HourlyConsumption> {
        self.repository.find_latest().await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.repository.stats().await
    }

    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }
}

fn validate_limit(limit: Option<i64>, max_limit: i64) -> Result<()> {
    if let Some(limit) = limit {
        if limit <= 0 || limit > max_limit {
            return Err(AppError::Validation(format!(
                "Limit must be between 1 and {}",
                max_limit
            )));
        }
    }
    Ok(())
}

fn validate_range_params(params: &RangeQueryParams, max_limit: i64) -> Result<()> {
    validate_limit(params.limit, max_limit)?;

    if let (Some(start), Some(end)) = (params.start_date, params.end_date) {
        if start > end {
            return Err(AppError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_month(month: i64) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(
            "Month must be between 1 and 12".to_string(),
        ));
    }
    Ok(())
}
