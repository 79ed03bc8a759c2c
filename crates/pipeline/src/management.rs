use crate::create::CreateShipmentsPipeline;
use crate::delete::DeleteShipmentsPipeline;
use crate::label::{LabelCombinator, PdfDocumentCombinator};
use crate::request_mapper::RequestDataMapper;
use crate::response_mapper::{CreateResponseMapper, DeleteResponseMapper};
use crate::responses::{CancelRequest, CancelShipmentsOutcome, CreateShipmentsOutcome};
use config::{AppConfig, StoreConfig};
use dhlpaket_core::{
    DefaultUnitConverter, ProcedureResolver, ShipmentRequest, StaticProcedureResolver,
    UnitConverter,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use webservice::{ServiceFactory, ShipmentService};

/// Entry point for label creation and cancellation across stores.
///
/// Batches are split by store, each part runs through its own pipeline with
/// the store's account and web service, and results are reported under the
/// caller's positions (creation) or tracking numbers (cancellation).
pub struct ShipmentManagement {
    config: AppConfig,
    services: Arc<dyn ServiceFactory>,
    procedures: Arc<dyn ProcedureResolver>,
    units: Arc<dyn UnitConverter>,
    combinator: Arc<dyn LabelCombinator>,
}

impl ShipmentManagement {
    pub fn new(config: AppConfig, services: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config,
            services,
            procedures: Arc::new(StaticProcedureResolver::default()),
            units: Arc::new(DefaultUnitConverter),
            combinator: Arc::new(PdfDocumentCombinator),
        }
    }

    pub fn with_procedures(mut self, procedures: Arc<dyn ProcedureResolver>) -> Self {
        self.procedures = procedures;
        self
    }

    pub fn with_units(mut self, units: Arc<dyn UnitConverter>) -> Self {
        self.units = units;
        self
    }

    pub fn with_combinator(mut self, combinator: Arc<dyn LabelCombinator>) -> Self {
        self.combinator = combinator;
        self
    }

    fn store(&self, store_id: u32) -> Result<(&StoreConfig, Arc<dyn ShipmentService>), String> {
        let store = self
            .config
            .store_config(store_id)
            .ok_or_else(|| format!("No shipping account is configured for store {store_id}."))?;
        let service = self
            .services
            .create_shipment_service(store_id)
            .map_err(|e| e.to_string())?;
        Ok((store, service))
    }

    /// Create labels for `requests`. The outcome is keyed by position in `requests`.
    pub async fn create_labels(&self, requests: Vec<ShipmentRequest>) -> CreateShipmentsOutcome {
        let total = requests.len();
        let mut partitions: BTreeMap<u32, Vec<(usize, ShipmentRequest)>> = BTreeMap::new();
        for (index, request) in requests.into_iter().enumerate() {
            partitions
                .entry(request.store_id)
                .or_default()
                .push((index, request));
        }

        let response_mapper = CreateResponseMapper::new(Arc::clone(&self.combinator));
        let mut outcome = CreateShipmentsOutcome::default();

        for (store_id, batch) in partitions {
            let (indices, mut store_requests): (Vec<usize>, Vec<ShipmentRequest>) =
                batch.into_iter().unzip();

            let (store, service) = match self.store(store_id) {
                Ok(found) => found,
                Err(message) => {
                    tracing::error!(
                        store_id,
                        requests = indices.len(),
                        error = %message,
                        "store is not available"
                    );
                    for (index, request) in indices.iter().zip(&store_requests) {
                        let response = response_mapper.create_error_response(
                            *index,
                            &request.sales_shipment,
                            vec![message.clone()],
                        );
                        outcome.errors.insert(*index, response);
                    }
                    continue;
                }
            };

            if let Some(product) = store.default_product.as_deref() {
                apply_default_product(&mut store_requests, product);
            }

            let mapper = RequestDataMapper::new(
                store.account.clone(),
                Arc::clone(&self.procedures),
                Arc::clone(&self.units),
            );
            let pipeline = CreateShipmentsPipeline::new(
                store_id,
                store_requests,
                mapper,
                service,
                CreateResponseMapper::new(Arc::clone(&self.combinator)),
            )
            .run()
            .await;

            let store_outcome = pipeline.into_outcome();
            for (local, mut label) in store_outcome.labels {
                label.request_index = indices[local];
                outcome.labels.insert(label.request_index, label);
            }
            for (local, mut error) in store_outcome.errors {
                error.request_index = indices[local];
                outcome.errors.insert(error.request_index, error);
            }
        }

        tracing::info!(
            requests = total,
            labels = outcome.labels.len(),
            errors = outcome.errors.len(),
            "label creation finished"
        );
        outcome
    }

    /// Cancel the shipments of `requests`. The outcome is keyed by
    /// [`CancelRequest::key`].
    pub async fn cancel_labels(&self, requests: Vec<CancelRequest>) -> CancelShipmentsOutcome {
        let total = requests.len();
        let mut partitions: BTreeMap<u32, Vec<CancelRequest>> = BTreeMap::new();
        for request in requests {
            partitions.entry(request.store_id).or_default().push(request);
        }

        let mut outcome = CancelShipmentsOutcome::default();

        for (store_id, batch) in partitions {
            let service = match self.store(store_id) {
                Ok((_, service)) => service,
                Err(message) => {
                    tracing::error!(
                        store_id,
                        requests = batch.len(),
                        error = %message,
                        "store is not available"
                    );
                    for request in &batch {
                        let response = DeleteResponseMapper.create_error_response(
                            request.tracking_number.trim(),
                            &request.sales_shipment,
                            vec![message.clone()],
                        );
                        outcome.errors.insert(request.key(), response);
                    }
                    continue;
                }
            };

            let store_outcome = DeleteShipmentsPipeline::new(store_id, batch, service)
                .run()
                .await
                .into_outcome();
            outcome.tracks.extend(store_outcome.tracks);
            outcome.errors.extend(store_outcome.errors);
        }

        tracing::info!(
            requests = total,
            cancelled = outcome.tracks.len(),
            errors = outcome.errors.len(),
            "label cancellation finished"
        );
        outcome
    }
}

/// Requests without a product code ship with the store's default product.
fn apply_default_product(requests: &mut [ShipmentRequest], product: &str) {
    for package in requests.iter_mut().flat_map(|r| r.packages.iter_mut()) {
        if package.params.product_code.trim().is_empty() {
            package.params.product_code = product.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhlpaket_core::models::{PackageParams, RawPackage};

    #[test]
    fn test_default_product_fills_only_empty_codes() {
        let mut requests: Vec<ShipmentRequest> = serde_json::from_value(serde_json::json!([
            {"sales_shipment": {"shipment_id": 1, "order_increment_id": "1"}},
            {"sales_shipment": {"shipment_id": 2, "order_increment_id": "2"}}
        ]))
        .unwrap();
        requests[0].packages.push(RawPackage::default());
        requests[1].packages.push(RawPackage {
            params: PackageParams {
                product_code: "V53WPAK".to_string(),
                ..Default::default()
            },
            items: vec![],
        });

        apply_default_product(&mut requests, "V01PAK");

        assert_eq!(requests[0].packages[0].params.product_code, "V01PAK");
        assert_eq!(requests[1].packages[0].params.product_code, "V53WPAK");
    }
}
