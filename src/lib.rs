pub mod api;
pub mod config;
pub mod database;
pub mod db;
pub mod error;
pub mod extract;
pub mod file_store;
pub mod notifier;
pub mod scanner;
pub mod schedule;
pub mod storage;
pub mod types;

pub use api::{RedditClient, RedditCredentials, Source};
pub use config::{Config, ScanSettings, StorageBackend};
pub use error::{Result, ScannerError};
pub use extract::extract_tokens;
pub use file_store::FileStore;
pub use notifier::{DiscordWebhook, Notifier};
pub use scanner::{CodeScanner, CycleReport};
pub use schedule::Schedule;
pub use storage::SeenStore;
pub use types::{Post, TokenSet, WebhookPayload};
