use dhlpaket_core::SalesShipmentRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A label was created for the request at `request_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelResponse {
    pub request_index: usize,
    pub sales_shipment: SalesShipmentRef,
    pub tracking_number: String,
    pub return_tracking_number: Option<String>,
    /// PDF document, empty if the label documents could not be combined.
    #[serde(skip)]
    pub label_content: Vec<u8>,
}

/// No label could be created for the request at `request_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub request_index: usize,
    pub sales_shipment: SalesShipmentRef,
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn message(&self) -> String {
        self.errors.join(" ")
    }
}

/// Cancellation request for one shipment number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub store_id: u32,
    pub tracking_number: String,
    pub sales_shipment: SalesShipmentRef,
}

impl CancelRequest {
    /// Key of this request in a cancellation outcome: the trimmed tracking
    /// number, or the sales shipment when the tracking number is blank.
    pub fn key(&self) -> String {
        match self.tracking_number.trim() {
            "" => format!("shipment-{}", self.sales_shipment.shipment_id),
            tracking_number => tracking_number.to_string(),
        }
    }
}

/// The shipment was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackResponse {
    pub tracking_number: String,
    pub sales_shipment: SalesShipmentRef,
}

/// The shipment could not be cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackErrorResponse {
    pub tracking_number: String,
    pub sales_shipment: SalesShipmentRef,
    pub errors: Vec<String>,
}

impl TrackErrorResponse {
    pub fn message(&self) -> String {
        self.errors.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateShipmentsOutcome {
    pub labels: BTreeMap<usize, LabelResponse>,
    pub errors: BTreeMap<usize, ErrorResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CancelShipmentsOutcome {
    pub tracks: BTreeMap<String, TrackResponse>,
    pub errors: BTreeMap<String, TrackErrorResponse>,
}
