// Integration tests for the upsert + aggregate-refresh logic.
// Everything runs against an in-memory SQLite database.

use chrono::{DateTime, Duration, FixedOffset};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::FromRow;
use tibber_collector::collector::{last_recorded_time, store_records};
use tibber_collector::db::{self, DbPool};
use tibber_collector::tibber::ConsumptionRecord;

async fn test_pool() -> DbPool {
    // One connection, never recycled: each pooled connection would otherwise
    // get its own private in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    db::init_schema(&pool).await.expect("Failed to init schema");
    pool
}

fn record(from: &str, consumption: Option<f64>, cost: Option<f64>) -> ConsumptionRecord {
    let from: DateTime<FixedOffset> = from.parse().expect("bad timestamp in test");
    ConsumptionRecord {
        from,
        to: from + Duration::hours(1),
        consumption,
        consumption_unit: consumption.map(|_| "kWh".to_string()),
        cost,
        unit_price: Some(0.5),
        unit_price_vat: Some(0.125),
        currency: Some("SEK".to_string()),
    }
}

async fn hourly_count(pool: &DbPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM hourly_consumption")
        .fetch_one(pool)
        .await
        .expect("count query failed")
}

#[derive(Debug, FromRow)]
struct DailyRow {
    date: String,
    total_consumption: f64,
    total_cost: Option<f64>,
}

#[derive(Debug, FromRow)]
struct MonthlyRow {
    year: i64,
    month: i64,
    total_consumption: f64,
}

async fn daily_rows(pool: &DbPool) -> Vec<DailyRow> {
    sqlx::query_as("SELECT date, total_consumption, total_cost FROM daily_consumption ORDER BY date")
        .fetch_all(pool)
        .await
        .expect("daily query failed")
}

async fn monthly_rows(pool: &DbPool) -> Vec<MonthlyRow> {
    sqlx::query_as(
        "SELECT year, month, total_consumption FROM monthly_consumption ORDER BY year, month",
    )
    .fetch_all(pool)
    .await
    .expect("monthly query failed")
}

#[tokio::test]
async fn store_is_idempotent_over_overlapping_windows() {
    let pool = test_pool().await;

    let first_batch = vec![
        record("2024-10-15T00:00:00+00:00", Some(1.0), Some(0.5)),
        record("2024-10-15T01:00:00+00:00", Some(2.0), Some(1.0)),
        record("2024-10-15T02:00:00+00:00", Some(3.0), Some(1.5)),
    ];
    store_records(&pool, &first_batch).await.unwrap();
    assert_eq!(hourly_count(&pool).await, 3);

    // Replay the same window plus one new hour.
    let mut second_batch = first_batch.clone();
    second_batch.push(record("2024-10-15T03:00:00+00:00", Some(4.0), Some(2.0)));
    store_records(&pool, &second_batch).await.unwrap();

    assert_eq!(hourly_count(&pool).await, 4);
}

#[tokio::test]
async fn latest_write_wins_per_hour() {
    let pool = test_pool().await;

    store_records(&pool, &[record("2024-10-15T00:00:00+00:00", Some(1.0), Some(0.5))])
        .await
        .unwrap();
    store_records(&pool, &[record("2024-10-15T00:00:00+00:00", Some(2.5), Some(1.25))])
        .await
        .unwrap();

    assert_eq!(hourly_count(&pool).await, 1);

    let consumption: Option<f64> =
        sqlx::query_scalar("SELECT consumption FROM hourly_consumption")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(consumption, Some(2.5));

    // The daily aggregate reflects the replaced value, not the original.
    let daily = daily_rows(&pool).await;
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].total_consumption, 2.5);
    assert_eq!(daily[0].total_cost, Some(1.25));
}

#[tokio::test]
async fn daily_totals_equal_sum_of_hourly_per_date() {
    let pool = test_pool().await;

    store_records(
        &pool,
        &[
            record("2024-10-15T00:00:00+00:00", Some(1.0), Some(0.5)),
            record("2024-10-15T01:00:00+00:00", Some(2.0), Some(1.0)),
            record("2024-10-15T02:00:00+00:00", Some(3.0), Some(1.5)),
            record("2024-10-16T00:00:00+00:00", Some(5.0), Some(2.5)),
        ],
    )
    .await
    .unwrap();

    let daily = daily_rows(&pool).await;
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].date, "2024-10-15");
    assert_eq!(daily[0].total_consumption, 6.0);
    assert_eq!(daily[0].total_cost, Some(3.0));
    assert_eq!(daily[1].date, "2024-10-16");
    assert_eq!(daily[1].total_consumption, 5.0);
}

#[tokio::test]
async fn monthly_totals_group_by_year_and_month() {
    let pool = test_pool().await;

    store_records(
        &pool,
        &[
            record("2024-09-30T22:00:00+00:00", Some(1.0), Some(0.5)),
            record("2024-10-01T00:00:00+00:00", Some(2.0), Some(1.0)),
            record("2024-10-02T00:00:00+00:00", Some(3.0), Some(1.5)),
        ],
    )
    .await
    .unwrap();

    let monthly = monthly_rows(&pool).await;
    assert_eq!(monthly.len(), 2);
    assert_eq!((monthly[0].year, monthly[0].month), (2024, 9));
    assert_eq!(monthly[0].total_consumption, 1.0);
    assert_eq!((monthly[1].year, monthly[1].month), (2024, 10));
    assert_eq!(monthly[1].total_consumption, 5.0);
}

#[tokio::test]
async fn aggregation_uses_utc_date_of_from_time() {
    let pool = test_pool().await;

    // Midnight local time at +02:00 is still the previous day in UTC.
    store_records(&pool, &[record("2024-10-15T00:00:00+02:00", Some(1.0), Some(0.5))])
        .await
        .unwrap();

    let daily = daily_rows(&pool).await;
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].date, "2024-10-14");
}

#[tokio::test]
async fn null_consumption_rows_are_stored_but_not_aggregated() {
    let pool = test_pool().await;

    store_records(
        &pool,
        &[
            record("2024-10-15T00:00:00+00:00", Some(1.5), Some(0.75)),
            // Hour not metered yet: kept in the hourly table, excluded from sums.
            record("2024-10-15T01:00:00+00:00", None, None),
            record("2024-10-16T00:00:00+00:00", None, None),
        ],
    )
    .await
    .unwrap();

    assert_eq!(hourly_count(&pool).await, 3);

    let daily = daily_rows(&pool).await;
    assert_eq!(daily.len(), 1, "day with only NULL hours gets no aggregate row");
    assert_eq!(daily[0].date, "2024-10-15");
    assert_eq!(daily[0].total_consumption, 1.5);
}

#[tokio::test]
async fn last_recorded_time_tracks_newest_row() {
    let pool = test_pool().await;

    assert_eq!(last_recorded_time(&pool).await.unwrap(), None);

    store_records(
        &pool,
        &[
            record("2024-10-15T00:00:00+00:00", Some(1.0), Some(0.5)),
            record("2024-10-15T05:00:00+00:00", Some(2.0), Some(1.0)),
        ],
    )
    .await
    .unwrap();

    let last = last_recorded_time(&pool).await.unwrap().expect("no max");
    let expected: DateTime<FixedOffset> = "2024-10-15T05:00:00+00:00".parse().unwrap();
    assert_eq!(last, expected);
}

#[tokio::test]
async fn storing_empty_batch_is_a_no_op() {
    let pool = test_pool().await;
    store_records(&pool, &[]).await.unwrap();
    assert_eq!(hourly_count(&pool).await, 0);
    assert!(daily_rows(&pool).await.is_empty());
}
