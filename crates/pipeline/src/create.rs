use crate::artifacts::CreateArtifacts;
use crate::request_mapper::RequestDataMapper;
use crate::response_mapper::CreateResponseMapper;
use crate::responses::{CreateShipmentsOutcome, ErrorResponse, LabelResponse};
use dhlpaket_core::validation;
use dhlpaket_core::ShipmentRequest;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use webservice::{ShipmentOrder, ShipmentService};

/// Creates shipment orders and labels for a batch of requests of one store.
///
/// The stages must run in order: [`validate`](Self::validate),
/// [`map`](Self::map), [`send`](Self::send) and
/// [`map_response`](Self::map_response), or all of them via [`run`](Self::run).
/// Requests are addressed by their position in the batch. After
/// `map_response` every position has either a label or an error.
pub struct CreateShipmentsPipeline {
    requests: Vec<ShipmentRequest>,
    mapper: RequestDataMapper,
    service: Arc<dyn ShipmentService>,
    response_mapper: CreateResponseMapper,
    artifacts: CreateArtifacts,
}

impl CreateShipmentsPipeline {
    pub fn new(
        store_id: u32,
        requests: Vec<ShipmentRequest>,
        mapper: RequestDataMapper,
        service: Arc<dyn ShipmentService>,
        response_mapper: CreateResponseMapper,
    ) -> Self {
        Self {
            requests,
            mapper,
            service,
            response_mapper,
            artifacts: CreateArtifacts::new(store_id),
        }
    }

    pub fn artifacts(&self) -> &CreateArtifacts {
        &self.artifacts
    }

    /// Record structurally invalid requests as failed.
    pub fn validate(mut self) -> Self {
        for (index, request) in self.requests.iter().enumerate() {
            if let Err(violations) = validation::validate(request) {
                tracing::warn!(
                    store_id = self.artifacts.store_id(),
                    request_index = index,
                    shipment = %request.sales_shipment,
                    violations = violations.len(),
                    "shipment request failed validation"
                );
                self.artifacts
                    .add_error(index, &request.sales_shipment, violations);
            }
        }
        self
    }

    /// Turn every request that is still pending into a shipment order.
    ///
    /// The request's position in the batch serves as its sequence number.
    pub fn map(mut self) -> Self {
        for (index, request) in self.requests.iter().enumerate() {
            if self.artifacts.has_error(index) {
                continue;
            }
            let sequence_number = index.to_string();
            match self.mapper.map_request(&sequence_number, request) {
                Ok(order) => self.artifacts.add_api_request(index, order),
                Err(err) => {
                    tracing::warn!(
                        store_id = self.artifacts.store_id(),
                        request_index = index,
                        shipment = %request.sales_shipment,
                        error = %err,
                        "shipment request could not be mapped"
                    );
                    self.artifacts
                        .add_error(index, &request.sales_shipment, vec![err.to_string()]);
                }
            }
        }
        self
    }

    /// Submit all mapped orders in a single call.
    pub async fn send(mut self) -> Self {
        let orders: Vec<ShipmentOrder> = self.artifacts.api_requests().values().cloned().collect();
        if orders.is_empty() {
            tracing::debug!(store_id = self.artifacts.store_id(), "no shipment orders to submit");
            return self;
        }

        tracing::info!(
            store_id = self.artifacts.store_id(),
            orders = orders.len(),
            "submitting shipment orders"
        );

        match self.service.create_shipments(&orders).await {
            Ok(results) => {
                let mut duplicates = HashSet::new();
                for result in results {
                    let sequence_number = result.sequence_number.clone();
                    if self.artifacts.request_index(&sequence_number).is_none() {
                        tracing::warn!(
                            store_id = self.artifacts.store_id(),
                            sequence_number = %sequence_number,
                            "ignoring result for unknown sequence number"
                        );
                        continue;
                    }
                    if duplicates.contains(&sequence_number) {
                        continue;
                    }
                    if self.artifacts.add_api_response(result).is_err() {
                        duplicates.insert(sequence_number);
                    }
                }

                for sequence_number in duplicates {
                    self.artifacts.remove_api_response(&sequence_number);
                    let Some(index) = self.artifacts.request_index(&sequence_number) else {
                        continue;
                    };
                    let request = &self.requests[index];
                    tracing::error!(
                        store_id = self.artifacts.store_id(),
                        request_index = index,
                        sequence_number = %sequence_number,
                        "web service returned more than one result for a shipment order"
                    );
                    self.artifacts.add_error(
                        index,
                        &request.sales_shipment,
                        vec![format!(
                            "Label for order {}, package {} could not be created: the web service returned more than one result.",
                            request.order.increment_id, sequence_number
                        )],
                    );
                }
            }
            Err(err) => {
                tracing::error!(
                    store_id = self.artifacts.store_id(),
                    orders = orders.len(),
                    error = %err,
                    "shipment order submission failed"
                );
                let indices: Vec<usize> = self.artifacts.api_requests().keys().copied().collect();
                for index in indices {
                    let request = &self.requests[index];
                    self.artifacts
                        .add_error(index, &request.sales_shipment, vec![err.to_string()]);
                }
            }
        }
        self
    }

    /// Resolve every request to a label or an error response.
    pub fn map_response(mut self) -> Self {
        for (index, request) in self.requests.iter().enumerate() {
            if let Some(error) = self.artifacts.error(index) {
                let response = self.response_mapper.create_error_response(
                    index,
                    &error.sales_shipment,
                    error.messages.clone(),
                );
                self.artifacts.add_error_response(response);
                continue;
            }

            let result = self
                .artifacts
                .sequence_number(index)
                .and_then(|sequence_number| self.artifacts.api_response(sequence_number));
            match result {
                Some(result) => {
                    let response = self.response_mapper.create_label_response(
                        index,
                        &request.sales_shipment,
                        result,
                    );
                    self.artifacts.add_label_response(response);
                }
                None => {
                    let sequence_number = self
                        .artifacts
                        .sequence_number(index)
                        .unwrap_or_default()
                        .to_string();
                    tracing::warn!(
                        store_id = self.artifacts.store_id(),
                        request_index = index,
                        sequence_number = %sequence_number,
                        "shipment order was not confirmed"
                    );
                    let message = format!(
                        "Label for order {}, package {} could not be created: the web service did not confirm the shipment order.",
                        request.order.increment_id, sequence_number
                    );
                    let response = self.response_mapper.create_error_response(
                        index,
                        &request.sales_shipment,
                        vec![message],
                    );
                    self.artifacts.add_error_response(response);
                }
            }
        }

        tracing::info!(
            store_id = self.artifacts.store_id(),
            labels = self.artifacts.label_responses().len(),
            errors = self.artifacts.error_responses().len(),
            "shipment requests processed"
        );
        self
    }

    /// Run all stages.
    pub async fn run(self) -> Self {
        self.validate().map().send().await.map_response()
    }

    pub fn labels(&self) -> &BTreeMap<usize, LabelResponse> {
        self.artifacts.label_responses()
    }

    pub fn errors(&self) -> &BTreeMap<usize, ErrorResponse> {
        self.artifacts.error_responses()
    }

    pub fn into_outcome(self) -> CreateShipmentsOutcome {
        let (labels, errors) = self.artifacts.into_responses();
        CreateShipmentsOutcome { labels, errors }
    }
}
