//! Post command runner entry point.

use std::process::ExitCode;

use domain::{CommandDispatcher, PostCommand, post_dispatcher};
use event_store::{EventLogStore, InMemoryEventStore, PostgresEventRepository};
use post_cmd::{Config, RunError, Summary};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the outcomes, so logs go to stderr
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn build_dispatcher(config: &Config) -> Result<CommandDispatcher<PostCommand>, RunError> {
    match &config.store {
        Some(store_config) => {
            let repository = PostgresEventRepository::connect(store_config).await?;
            repository.run_migrations().await?;
            tracing::info!(
                max_connections = store_config.max_connections,
                "using PostgreSQL event store"
            );
            Ok(post_dispatcher(EventLogStore::new(repository))?)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory event store");
            Ok(post_dispatcher(InMemoryEventStore::in_memory())?)
        }
    }
}

async fn run(config: Config) -> Result<Summary, RunError> {
    let dispatcher = build_dispatcher(&config).await?;

    let input = BufReader::new(tokio::io::stdin());
    post_cmd::process(&dispatcher, input, tokio::io::stdout()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    init_tracing(&config);

    match run(config).await {
        Ok(summary) => {
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                "input exhausted"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "runner failed");
            ExitCode::FAILURE
        }
    }
}
