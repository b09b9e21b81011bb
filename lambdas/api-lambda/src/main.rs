use std::sync::Arc;

use lambda_http::{run, service_fn, Error};
use taskboard_shared::{logging, AppConfig, AppState};

mod http_handler;
use http_handler::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = AppConfig::from_env()?;
    logging::init(config.log_format);

    let state = Arc::new(AppState::from_config(config).await?);

    run(service_fn(move |event| {
        let state = state.clone();
        async move { function_handler(event, state).await }
    }))
    .await
}
