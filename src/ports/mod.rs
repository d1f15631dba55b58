pub mod order_store_port;
pub mod webhook_verifier_port;

pub use order_store_port::OrderStorePort;
pub use webhook_verifier_port::WebhookVerifierPort;
