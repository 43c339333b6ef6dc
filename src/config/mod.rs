/// Application settings loaded from `task-buddy.toml` and the environment
pub mod app;

pub use app::{AppConfig, load_app_configuration, load_config};
