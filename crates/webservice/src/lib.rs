use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod mock;
pub mod order;

pub use order::{ShipmentOrder, ShipmentOrderBuilder};

/// Failure of a whole web service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("The request was rejected: {0}")]
    Client(String),
    #[error("The web service reported an error: {0}")]
    Server(String),
    #[error("The web service could not be reached: {0}")]
    Transport(String),
}

/// Per-shipment result of a successful create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentResult {
    /// Echo of [`ShipmentOrder::sequence_number`].
    pub sequence_number: String,
    pub shipment_number: String,
    pub return_shipment_number: Option<String>,
    /// Base64 encoded PDF documents: label, return label, export documents, COD label.
    pub labels: Vec<String>,
}

/// The carrier's shipment web service.
///
/// Both operations take a whole batch. A returned `Err` means the call failed
/// as a whole; shipments missing from an `Ok` result were not processed.
#[async_trait]
pub trait ShipmentService: Send + Sync {
    async fn create_shipments(
        &self,
        orders: &[ShipmentOrder],
    ) -> Result<Vec<ShipmentResult>, ServiceError>;

    /// Returns the shipment numbers the carrier confirmed as cancelled.
    async fn cancel_shipments(
        &self,
        shipment_numbers: &[String],
    ) -> Result<Vec<String>, ServiceError>;
}

/// Provides a service instance bound to one store's credentials.
pub trait ServiceFactory: Send + Sync {
    fn create_shipment_service(
        &self,
        store_id: u32,
    ) -> Result<Arc<dyn ShipmentService>, ServiceError>;
}
