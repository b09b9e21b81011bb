use board_block::{Board, MutationGateway, TaskApiClient};
use taskboard_atoms::tasks::{self, TaskError, TaskStore};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError, StoreBackend};
use board_block::AdapterMode;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("templates: {0}")]
    Templates(#[from] tera::Error),
    #[error("internal API client: {0}")]
    ApiClient(#[from] reqwest::Error),
    #[error("seeding demo tasks: {0}")]
    Seed(#[from] TaskError),
}

/// Shared across invocations of one Lambda container
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub store: TaskStore,
    pub board: Board,
}

impl AppState {
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let store = match config.store_backend {
            StoreBackend::Dynamo => {
                let aws_config = aws_config::load_from_env().await;
                let client = aws_sdk_dynamodb::Client::new(&aws_config);
                TaskStore::dynamo(client, config.table_name.clone())
            }
            StoreBackend::Memory => TaskStore::memory(),
        };

        if config.seed_demo_tasks {
            tasks::seed_demo_tasks(&store).await?;
        }

        Self::with_store(config, store)
    }

    /// Wire everything around an existing store
    pub fn with_store(config: AppConfig, store: TaskStore) -> Result<Self, StartupError> {
        let gateway = match config.adapter_mode {
            AdapterMode::Direct => MutationGateway::Direct(store.clone()),
            AdapterMode::Proxied => MutationGateway::Proxied {
                store: store.clone(),
                api: TaskApiClient::new(
                    &config.internal_api_base_url,
                    config.internal_api_timeout,
                )?,
            },
        };
        let board = Board::new(store.clone(), gateway, config.failure_policy)?;

        tracing::info!(
            backend = store.backend_name(),
            mode = ?config.adapter_mode,
            policy = ?config.failure_policy,
            allow_purge = config.allow_purge,
            "task board ready"
        );

        Ok(Self { config, store, board })
    }
}
