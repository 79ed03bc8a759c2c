//! Per-run scratch space of the pipelines.
//!
//! An artifacts container is created with its pipeline and dropped with it.
//! Creation artifacts are keyed by request index, cancellation artifacts by
//! [`CancelRequest::key`](crate::CancelRequest::key).

use crate::responses::{ErrorResponse, LabelResponse, TrackErrorResponse, TrackResponse};
use dhlpaket_core::SalesShipmentRef;
use std::collections::{BTreeMap, HashMap};
use webservice::{ShipmentOrder, ShipmentResult};

/// A request that dropped out of the pipeline before a label was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub sales_shipment: SalesShipmentRef,
    pub messages: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CreateArtifacts {
    store_id: u32,
    errors: BTreeMap<usize, StageError>,
    sequence_numbers: BTreeMap<usize, String>,
    api_requests: BTreeMap<usize, ShipmentOrder>,
    api_responses: HashMap<String, ShipmentResult>,
    label_responses: BTreeMap<usize, LabelResponse>,
    error_responses: BTreeMap<usize, ErrorResponse>,
}

impl CreateArtifacts {
    pub fn new(store_id: u32) -> Self {
        Self {
            store_id,
            ..Default::default()
        }
    }

    pub fn store_id(&self) -> u32 {
        self.store_id
    }

    /// Record a failure. A request that already failed keeps its first error.
    pub fn add_error(
        &mut self,
        index: usize,
        sales_shipment: &SalesShipmentRef,
        messages: Vec<String>,
    ) {
        self.errors.entry(index).or_insert_with(|| StageError {
            sales_shipment: sales_shipment.clone(),
            messages,
        });
    }

    pub fn error(&self, index: usize) -> Option<&StageError> {
        self.errors.get(&index)
    }

    pub fn has_error(&self, index: usize) -> bool {
        self.errors.contains_key(&index)
    }

    pub fn errors(&self) -> &BTreeMap<usize, StageError> {
        &self.errors
    }

    /// Record a mapped order together with the sequence number it carries.
    pub fn add_api_request(&mut self, index: usize, order: ShipmentOrder) {
        self.sequence_numbers
            .insert(index, order.sequence_number.clone());
        self.api_requests.insert(index, order);
    }

    pub fn api_requests(&self) -> &BTreeMap<usize, ShipmentOrder> {
        &self.api_requests
    }

    pub fn sequence_number(&self, index: usize) -> Option<&str> {
        self.sequence_numbers.get(&index).map(String::as_str)
    }

    /// Index of the request an order with `sequence_number` was mapped from.
    pub fn request_index(&self, sequence_number: &str) -> Option<usize> {
        self.sequence_numbers
            .iter()
            .find(|(_, seq)| seq.as_str() == sequence_number)
            .map(|(index, _)| *index)
    }

    /// Index a result by its sequence number. Returns the result back if one
    /// with the same sequence number is already present.
    pub fn add_api_response(&mut self, result: ShipmentResult) -> Result<(), ShipmentResult> {
        if self.api_responses.contains_key(&result.sequence_number) {
            return Err(result);
        }
        self.api_responses
            .insert(result.sequence_number.clone(), result);
        Ok(())
    }

    pub fn remove_api_response(&mut self, sequence_number: &str) -> Option<ShipmentResult> {
        self.api_responses.remove(sequence_number)
    }

    pub fn api_response(&self, sequence_number: &str) -> Option<&ShipmentResult> {
        self.api_responses.get(sequence_number)
    }

    pub fn add_label_response(&mut self, response: LabelResponse) {
        self.label_responses.insert(response.request_index, response);
    }

    pub fn add_error_response(&mut self, response: ErrorResponse) {
        self.error_responses.insert(response.request_index, response);
    }

    pub fn label_responses(&self) -> &BTreeMap<usize, LabelResponse> {
        &self.label_responses
    }

    pub fn error_responses(&self) -> &BTreeMap<usize, ErrorResponse> {
        &self.error_responses
    }

    pub(crate) fn into_responses(
        self,
    ) -> (BTreeMap<usize, LabelResponse>, BTreeMap<usize, ErrorResponse>) {
        (self.label_responses, self.error_responses)
    }
}

#[derive(Debug, Default)]
pub struct DeleteArtifacts {
    store_id: u32,
    errors: BTreeMap<String, String>,
    api_requests: BTreeMap<String, String>,
    api_responses: BTreeMap<String, String>,
    track_responses: BTreeMap<String, TrackResponse>,
    error_responses: BTreeMap<String, TrackErrorResponse>,
}

impl DeleteArtifacts {
    pub fn new(store_id: u32) -> Self {
        Self {
            store_id,
            ..Default::default()
        }
    }

    pub fn store_id(&self) -> u32 {
        self.store_id
    }

    pub fn add_error(&mut self, key: &str, message: String) {
        self.errors.entry(key.to_string()).or_insert(message);
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Map a tracking number to the shipment number the web service expects.
    pub fn add_api_request(&mut self, tracking_number: &str, shipment_number: &str) {
        self.api_requests
            .insert(tracking_number.to_string(), shipment_number.to_string());
    }

    pub fn api_requests(&self) -> &BTreeMap<String, String> {
        &self.api_requests
    }

    pub fn add_api_response(&mut self, shipment_number: &str) {
        self.api_responses
            .insert(shipment_number.to_string(), shipment_number.to_string());
    }

    pub fn has_api_response(&self, shipment_number: &str) -> bool {
        self.api_responses.contains_key(shipment_number)
    }

    pub fn add_track_response(&mut self, response: TrackResponse) {
        self.track_responses
            .insert(response.tracking_number.clone(), response);
    }

    pub fn add_error_response(&mut self, key: String, response: TrackErrorResponse) {
        self.error_responses.insert(key, response);
    }

    pub fn track_responses(&self) -> &BTreeMap<String, TrackResponse> {
        &self.track_responses
    }

    pub fn error_responses(&self) -> &BTreeMap<String, TrackErrorResponse> {
        &self.error_responses
    }

    pub(crate) fn into_responses(
        self,
    ) -> (
        BTreeMap<String, TrackResponse>,
        BTreeMap<String, TrackErrorResponse>,
    ) {
        (self.track_responses, self.error_responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment(id: u64) -> SalesShipmentRef {
        SalesShipmentRef {
            shipment_id: id,
            order_increment_id: format!("10000000{id}"),
        }
    }

    fn result(sequence_number: &str) -> ShipmentResult {
        ShipmentResult {
            sequence_number: sequence_number.to_string(),
            shipment_number: format!("S{sequence_number}"),
            return_shipment_number: None,
            labels: vec![],
        }
    }

    #[test]
    fn test_first_error_wins() {
        let mut artifacts = CreateArtifacts::new(1);
        artifacts.add_error(0, &shipment(1), vec!["validation".to_string()]);
        artifacts.add_error(0, &shipment(1), vec!["remote".to_string()]);

        assert_eq!(artifacts.error(0).unwrap().messages, vec!["validation".to_string()]);
        assert!(!artifacts.has_error(1));
        assert_eq!(artifacts.store_id(), 1);
    }

    #[test]
    fn test_duplicate_api_response_is_returned() {
        let mut artifacts = CreateArtifacts::new(0);
        assert!(artifacts.add_api_response(result("0")).is_ok());
        let duplicate = artifacts.add_api_response(result("0")).unwrap_err();
        assert_eq!(duplicate.sequence_number, "0");
        assert!(artifacts.api_response("0").is_some());
        assert!(artifacts.remove_api_response("0").is_some());
        assert!(artifacts.api_response("0").is_none());
    }

    #[test]
    fn test_delete_artifacts_keep_first_error() {
        let mut artifacts = DeleteArtifacts::new(0);
        artifacts.add_api_request("A", "A");
        artifacts.add_error("A", "first".to_string());
        artifacts.add_error("A", "second".to_string());
        artifacts.add_api_response("A");

        assert_eq!(artifacts.error("A"), Some("first"));
        assert!(artifacts.has_api_response("A"));
        assert!(!artifacts.has_api_response("B"));
    }
}
