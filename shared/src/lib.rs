pub mod config;
pub mod logging;
pub mod state;

pub use config::{AppConfig, ConfigError, LogFormat, StoreBackend};
pub use state::{AppState, StartupError};
