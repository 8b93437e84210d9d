//! Imagegen engine: remote services and effect execution.
mod auth;
mod download;
mod engine;
mod generate;
mod persist;
mod rest_store;
mod settings;
mod store;

pub use auth::{validate_credentials, AuthClient, AuthError, AuthSession, Identity};
pub use download::{DownloadError, ImageDownloader};
pub use engine::{EngineConfig, EngineHandle, EngineServices};
pub use generate::{HttpImageGenerator, ImageGenerator};
pub use persist::{create_unique, replace_file, PersistError};
pub use rest_store::RestHistoryStore;
pub use settings::ServiceSettings;
pub use store::{HistoryStore, InMemoryHistoryStore, StoreError};
