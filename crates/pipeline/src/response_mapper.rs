use crate::label::LabelCombinator;
use crate::responses::{ErrorResponse, LabelResponse, TrackErrorResponse, TrackResponse};
use dhlpaket_core::SalesShipmentRef;
use std::sync::Arc;
use webservice::ShipmentResult;

/// Builds label creation responses.
pub struct CreateResponseMapper {
    combinator: Arc<dyn LabelCombinator>,
}

impl CreateResponseMapper {
    pub fn new(combinator: Arc<dyn LabelCombinator>) -> Self {
        Self { combinator }
    }

    /// A label response for `result`. Label documents that cannot be
    /// combined leave the label content empty; the shipment still counts as created.
    pub fn create_label_response(
        &self,
        request_index: usize,
        sales_shipment: &SalesShipmentRef,
        result: &ShipmentResult,
    ) -> LabelResponse {
        let label_content = match self.combinator.combine(&result.labels) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(
                    request_index,
                    tracking_number = %result.shipment_number,
                    error = %err,
                    "label documents could not be combined"
                );
                Vec::new()
            }
        };

        LabelResponse {
            request_index,
            sales_shipment: sales_shipment.clone(),
            tracking_number: result.shipment_number.clone(),
            return_tracking_number: result.return_shipment_number.clone(),
            label_content,
        }
    }

    pub fn create_error_response(
        &self,
        request_index: usize,
        sales_shipment: &SalesShipmentRef,
        errors: Vec<String>,
    ) -> ErrorResponse {
        ErrorResponse {
            request_index,
            sales_shipment: sales_shipment.clone(),
            errors,
        }
    }
}

/// Builds cancellation responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteResponseMapper;

impl DeleteResponseMapper {
    pub fn create_track_response(
        &self,
        tracking_number: &str,
        sales_shipment: &SalesShipmentRef,
    ) -> TrackResponse {
        TrackResponse {
            tracking_number: tracking_number.to_string(),
            sales_shipment: sales_shipment.clone(),
        }
    }

    pub fn create_error_response(
        &self,
        tracking_number: &str,
        sales_shipment: &SalesShipmentRef,
        errors: Vec<String>,
    ) -> TrackErrorResponse {
        TrackErrorResponse {
            tracking_number: tracking_number.to_string(),
            sales_shipment: sales_shipment.clone(),
            errors,
        }
    }
}
