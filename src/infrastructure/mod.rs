pub mod adapters;
pub mod config;

pub use adapters::{HmacWebhookVerifier, InMemoryOrderStore, MySqlOrderStore, PostgrestOrderStore};
pub use config::{AppConfig, ProviderConfig, StoreConfig};
