use crate::artifacts::DeleteArtifacts;
use crate::response_mapper::DeleteResponseMapper;
use crate::responses::{CancelRequest, CancelShipmentsOutcome, TrackErrorResponse, TrackResponse};
use std::collections::BTreeMap;
use std::sync::Arc;
use webservice::ShipmentService;

/// Cancels shipments of one store.
///
/// Stages: [`map`](Self::map), [`send`](Self::send) and
/// [`map_response`](Self::map_response). Results are keyed by tracking number.
pub struct DeleteShipmentsPipeline {
    requests: Vec<CancelRequest>,
    service: Arc<dyn ShipmentService>,
    response_mapper: DeleteResponseMapper,
    artifacts: DeleteArtifacts,
}

impl DeleteShipmentsPipeline {
    pub fn new(
        store_id: u32,
        requests: Vec<CancelRequest>,
        service: Arc<dyn ShipmentService>,
    ) -> Self {
        Self {
            requests,
            service,
            response_mapper: DeleteResponseMapper,
            artifacts: DeleteArtifacts::new(store_id),
        }
    }

    pub fn artifacts(&self) -> &DeleteArtifacts {
        &self.artifacts
    }

    /// Tracking numbers are the web service's shipment numbers. Requests
    /// without one fail here, each under its own sales shipment key.
    pub fn map(mut self) -> Self {
        let mut missing = 0;
        for request in &self.requests {
            let tracking_number = request.tracking_number.trim();
            if tracking_number.is_empty() {
                missing += 1;
                self.artifacts.add_error(
                    &request.key(),
                    format!(
                        "Shipment {} cannot be cancelled: the tracking number is missing.",
                        request.sales_shipment
                    ),
                );
                continue;
            }
            self.artifacts.add_api_request(tracking_number, tracking_number);
        }
        if missing > 0 {
            tracing::warn!(
                store_id = self.artifacts.store_id(),
                requests = missing,
                "cancellation requests without tracking number"
            );
        }
        self
    }

    pub async fn send(mut self) -> Self {
        let shipment_numbers: Vec<String> = self
            .artifacts
            .api_requests()
            .iter()
            .filter(|(tracking_number, _)| self.artifacts.error(tracking_number).is_none())
            .map(|(_, shipment_number)| shipment_number.clone())
            .collect();
        if shipment_numbers.is_empty() {
            return self;
        }

        tracing::info!(
            store_id = self.artifacts.store_id(),
            shipments = shipment_numbers.len(),
            "cancelling shipments"
        );

        match self.service.cancel_shipments(&shipment_numbers).await {
            Ok(confirmed) => {
                for shipment_number in confirmed {
                    if shipment_numbers.contains(&shipment_number) {
                        self.artifacts.add_api_response(&shipment_number);
                    } else {
                        tracing::warn!(
                            store_id = self.artifacts.store_id(),
                            shipment_number = %shipment_number,
                            "ignoring confirmation for unknown shipment"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::error!(
                    store_id = self.artifacts.store_id(),
                    shipments = shipment_numbers.len(),
                    error = %err,
                    "shipment cancellation failed"
                );
                for shipment_number in &shipment_numbers {
                    self.artifacts.add_error(shipment_number, err.to_string());
                }
            }
        }
        self
    }

    pub fn map_response(mut self) -> Self {
        for request in &self.requests {
            let key = request.key();
            let tracking_number = request.tracking_number.trim();
            if let Some(message) = self.artifacts.error(&key) {
                let response = self.response_mapper.create_error_response(
                    tracking_number,
                    &request.sales_shipment,
                    vec![message.to_string()],
                );
                self.artifacts.add_error_response(key, response);
                continue;
            }

            let confirmed = self
                .artifacts
                .api_requests()
                .get(tracking_number)
                .is_some_and(|shipment_number| self.artifacts.has_api_response(shipment_number));
            if confirmed {
                let response = self
                    .response_mapper
                    .create_track_response(tracking_number, &request.sales_shipment);
                self.artifacts.add_track_response(response);
            } else {
                tracing::warn!(
                    store_id = self.artifacts.store_id(),
                    tracking_number = %tracking_number,
                    "cancellation was not confirmed"
                );
                let response = self.response_mapper.create_error_response(
                    tracking_number,
                    &request.sales_shipment,
                    vec![format!(
                        "Cancellation of shipment {tracking_number} was not confirmed by the web service."
                    )],
                );
                self.artifacts.add_error_response(key, response);
            }
        }

        tracing::info!(
            store_id = self.artifacts.store_id(),
            cancelled = self.artifacts.track_responses().len(),
            errors = self.artifacts.error_responses().len(),
            "cancellation requests processed"
        );
        self
    }

    pub async fn run(self) -> Self {
        self.map().send().await.map_response()
    }

    pub fn tracks(&self) -> &BTreeMap<String, TrackResponse> {
        self.artifacts.track_responses()
    }

    pub fn errors(&self) -> &BTreeMap<String, TrackErrorResponse> {
        self.artifacts.error_responses()
    }

    pub fn into_outcome(self) -> CancelShipmentsOutcome {
        let (tracks, errors) = self.artifacts.into_responses();
        CancelShipmentsOutcome { tracks, errors }
    }
}
