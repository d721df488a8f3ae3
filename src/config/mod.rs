//! Application configuration

mod app_config;

pub use app_config::{
    ApiKeysConfig, AppConfig, EventsConfig, LogFormat, LoggingConfig, ServerConfig, StorageSettings,
};
