pub mod hmac_webhook_verifier;
pub mod in_memory_order_store;
pub mod mysql_order_store;
pub mod postgrest_order_store;

pub use hmac_webhook_verifier::HmacWebhookVerifier;
pub use in_memory_order_store::InMemoryOrderStore;
pub use mysql_order_store::MySqlOrderStore;
pub use postgrest_order_store::PostgrestOrderStore;
