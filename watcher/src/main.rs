use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as AWSClient;
use config::{Config, StateConfig};
use flagwatch_store::{DynamoDbStateStore, FileStateStore, StateBackend};
use notifier::Notifier;
use pushover::Pushover;
use reqwest::Client as HTTPClient;
use scheduler::Scheduler;
use tracing_subscriber::EnvFilter;
use weather::FeedWeather;

mod config;
mod flag;
mod logging;
mod notifier;
mod pushover;
mod scheduler;
mod weather;

type FlagNotifier = Notifier<StateBackend, FeedWeather, Pushover>;

/// One flag check: fetch, then notify on change. Never fails the caller.
async fn check_flag(http_client: &HTTPClient, flag_url: &str, notifier: &FlagNotifier) {
    let Some(color) = flag::fetch_flag_status(http_client, flag_url).await else {
        return;
    };

    if let Err(err) = notifier.notify(&color).await {
        logging::Logger::new()
            .color(color.label())
            .error("tick.failed", &err, "Flag check failed");
    }
}

async fn open_state_store(state: &StateConfig) -> Result<StateBackend> {
    let store = match state {
        StateConfig::File(path) => {
            let store = FileStateStore::open(path).await?;
            logging::Logger::new().info(
                "startup.store",
                &format!("Using state file {}", store.path().display()),
            );
            StateBackend::File(store)
        }
        StateConfig::DynamoDb { table_name } => {
            let client =
                AWSClient::new(&aws_config::defaults(BehaviorVersion::latest()).load().await);
            let store = DynamoDbStateStore::new(client, table_name.as_str())?;
            logging::Logger::new().info(
                "startup.store",
                &format!("Using DynamoDB table {}", store.table_name()),
            );
            StateBackend::DynamoDb(store)
        }
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        ) // Enable log level filtering via `RUST_LOG` env var
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    let scheduler = Scheduler::new(&config.schedule, config.timezone)?;

    let http_client = HTTPClient::builder()
        .timeout(config.http_timeout)
        .build()?;
    let store = open_state_store(&config.state).await?;

    let notifier = Notifier::new(
        store,
        FeedWeather::new(http_client.clone(), &config.weather_feed_url),
        Pushover::new(
            http_client.clone(),
            &config.pushover_api_url,
            &config.pushover_user,
            &config.pushover_token,
        ),
    );

    // Cold-start check, then the recurring schedule.
    scheduler::run_guarded(check_flag(&http_client, &config.flag_url, &notifier)).await;

    tokio::select! {
        _ = scheduler.run(|| check_flag(&http_client, &config.flag_url, &notifier)) => {}
        _ = tokio::signal::ctrl_c() => {
            logging::Logger::new().info("shutdown", "Interrupted, shutting down");
        }
    }
    Ok(())
}
