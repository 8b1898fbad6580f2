//! Smart Home Lambda - Handles smart home directives from the voice service.

use aws_config::{BehaviorVersion, Region};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::{AlexaResponse, Config, Dispatcher, DynamoStateStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

type AppDispatcher = Dispatcher<DynamoStateStore>;

async fn handler(
    dispatcher: Arc<AppDispatcher>,
    event: LambdaEvent<Value>,
) -> Result<AlexaResponse, Error> {
    Ok(dispatcher.handle_event(event.payload).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;
    let store = DynamoStateStore::new(aws_sdk_dynamodb::Client::new(&aws_config), &config.table_name);

    info!(table = %config.table_name, region = %config.aws_region, "Starting smart home handler");

    let dispatcher = Arc::new(Dispatcher::new(store, config.discovery));

    run(service_fn(move |event| {
        let dispatcher = dispatcher.clone();
        async move { handler(dispatcher, event).await }
    }))
    .await
}
