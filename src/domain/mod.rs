pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{NewOrder, OrderRecord, OrderUpdate, PaymentNotification, Resolution};
pub use errors::{DomainError, DomainResult};
pub use value_objects::{OrderColumn, OrderStatus};
