use std::time::Duration;
use tibber_collector::config::Config;
use tibber_collector::tibber::TibberClient;
use tibber_collector::{collector, db};
use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting tibber-collector");

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let pool = db::connect(&config.database_path).await?;
    db::init_schema(&pool).await?;
    info!("Database ready at {}", config.database_path);

    let client = TibberClient::new(&config.api_url, &config.tibber_token)?;

    let home_id = match &config.tibber_home_id {
        Some(id) => id.clone(),
        None => client.discover_home_id().await?,
    };

    match config.collect_interval_secs {
        // One-shot mode for cron/systemd-timer triggers.
        None => {
            let stored = collector::run_once(
                &client,
                &pool,
                &home_id,
                config.lookback_days,
                config.page_size,
            )
            .await?;
            info!(stored, "Collection run complete");
        }
        Some(secs) => loop {
            match collector::run_once(
                &client,
                &pool,
                &home_id,
                config.lookback_days,
                config.page_size,
            )
            .await
            {
                Ok(stored) => info!(stored, "Collection run complete"),
                Err(e) => error!("Collection run failed: {}", e),
            }
            sleep(Duration::from_secs(secs)).await;
        },
    }

    Ok(())
}
