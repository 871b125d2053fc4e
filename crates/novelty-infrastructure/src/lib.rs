//! Infrastructure layer: file locations, configuration and secrets.

pub mod config_service;
pub mod paths;
pub mod secret_service;
pub mod user_service;

pub use config_service::ConfigService;
pub use paths::NoveltyPaths;
pub use secret_service::SecretServiceImpl;
pub use user_service::ConfigBasedUserService;
