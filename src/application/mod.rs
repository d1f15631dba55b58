pub mod dto;
pub mod reconciliation_service;

pub use dto::{AckResponse, ErrorResponse, HealthResponse, ServiceInfo, WebhookPayload};
pub use reconciliation_service::ReconciliationService;
