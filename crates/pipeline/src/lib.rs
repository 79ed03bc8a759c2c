//! Label creation and cancellation pipelines.
//!
//! [`create::CreateShipmentsPipeline`] runs a batch of shipment requests
//! through validate, map, send and map-response stages;
//! [`delete::DeleteShipmentsPipeline`] does the same for cancellations without
//! the validate stage. Every request ends up with exactly one outcome, and a
//! failing request never affects its siblings.

pub mod artifacts;
pub mod create;
pub mod delete;
pub mod label;
pub mod management;
pub mod request_mapper;
pub mod response_mapper;
pub mod responses;

pub use create::CreateShipmentsPipeline;
pub use delete::DeleteShipmentsPipeline;
pub use management::ShipmentManagement;
pub use request_mapper::{MappingError, RequestDataMapper};
pub use responses::{
    CancelRequest, CancelShipmentsOutcome, CreateShipmentsOutcome, ErrorResponse, LabelResponse,
    TrackErrorResponse, TrackResponse,
};
