use crate::db::DbPool;
use crate::error::Result;
use crate::tibber::{ConsumptionRecord, TibberClient};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::info;

/// Timestamp of the most recent stored hourly record, if any.
pub async fn last_recorded_time(pool: &DbPool) -> Result<Option<DateTime<FixedOffset>>> {
    let last = sqlx::query_scalar::<_, Option<DateTime<FixedOffset>>>(
        "SELECT MAX(from_time) FROM hourly_consumption",
    )
    .fetch_one(pool)
    .await?;

    Ok(last)
}

/// Upserts a batch of hourly records and refreshes both aggregate tables,
/// all inside one transaction. A fetch that failed never reaches this point,
/// and a failed store leaves the aggregates untouched.
pub async fn store_records(pool: &DbPool, records: &[ConsumptionRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO hourly_consumption
                (from_time, to_time, consumption, consumption_unit, cost, unit_price, unit_price_vat, currency)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (from_time, to_time) DO UPDATE SET
                consumption = excluded.consumption,
                consumption_unit = excluded.consumption_unit,
                cost = excluded.cost,
                unit_price = excluded.unit_price,
                unit_price_vat = excluded.unit_price_vat,
                currency = excluded.currency
            "#,
        )
        .bind(record.from)
        .bind(record.to)
        .bind(record.consumption)
        .bind(&record.consumption_unit)
        .bind(record.cost)
        .bind(record.unit_price)
        .bind(record.unit_price_vat)
        .bind(&record.currency)
        .execute(&mut *tx)
        .await?;
    }

    rebuild_aggregates(&mut tx).await?;

    tx.commit().await?;
    info!(count = records.len(), "Stored records and refreshed aggregates");
    Ok(())
}

/// Aggregates are a pure function of the hourly table, so they are rebuilt
/// from scratch rather than patched incrementally. Rows with NULL consumption
/// (hours Tibber has not metered yet) are left out.
async fn rebuild_aggregates(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query("DELETE FROM daily_consumption")
        .execute(&mut **tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO daily_consumption (date, total_consumption, total_cost, avg_unit_price, currency)
        SELECT
            DATE(from_time),
            SUM(consumption),
            SUM(cost),
            AVG(unit_price),
            MAX(currency)
        FROM hourly_consumption
        WHERE consumption IS NOT NULL
        GROUP BY DATE(from_time)
        "#,
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM monthly_consumption")
        .execute(&mut **tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO monthly_consumption (year, month, total_consumption, total_cost, avg_unit_price, currency)
        SELECT
            CAST(strftime('%Y', from_time) AS INTEGER),
            CAST(strftime('%m', from_time) AS INTEGER),
            SUM(consumption),
            SUM(cost),
            AVG(unit_price),
            MAX(currency)
        FROM hourly_consumption
        WHERE consumption IS NOT NULL
        GROUP BY strftime('%Y', from_time), strftime('%m', from_time)
        "#,
    )
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// One collection run: pick the fetch window, pull new records, store them.
/// Returns the number of records stored.
pub async fn run_once(
    client: &TibberClient,
    pool: &DbPool,
    home_id: &str,
    lookback_days: i64,
    page_size: i64,
) -> Result<usize> {
    let until = Utc::now();
    let since = match last_recorded_time(pool).await? {
        Some(last) => {
            let since = last.with_timezone(&Utc) + Duration::hours(1);
            info!(%since, "Fetching since last stored record");
            since
        }
        None => {
            let since = until - Duration::days(lookback_days);
            info!(%since, lookback_days, "Empty database, fetching full lookback window");
            since
        }
    };

    let records = client
        .fetch_consumption(home_id, since, until, page_size)
        .await?;

    if records.is_empty() {
        info!("No new consumption data");
        return Ok(0);
    }

    store_records(pool, &records).await?;
    Ok(records.len())
}
