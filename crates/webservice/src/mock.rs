use super::{ServiceError, ServiceFactory, ShipmentOrder, ShipmentResult, ShipmentService};
use async_trait::async_trait;
use base64::prelude::*;
use lopdf::{Dictionary, Document, Object, Stream};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

/// A call received by [`MockShipmentService`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Create(Vec<ShipmentOrder>),
    Cancel(Vec<String>),
}

/// In-memory stand-in for the shipment web service.
///
/// Creates a shipment number and a one page label per order, plus a return
/// label document when a return shipment is booked. Failure modes of the
/// real service can be switched on per instance.
#[derive(Default)]
pub struct MockShipmentService {
    failure: Option<ServiceError>,
    omitted: HashSet<String>,
    duplicated: HashSet<String>,
    unconfirmed: HashSet<String>,
    latency: Duration,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockShipmentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with the given error.
    pub fn failing(mut self, error: ServiceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Leave the order with this sequence number out of the create response.
    pub fn omitting(mut self, sequence_number: &str) -> Self {
        self.omitted.insert(sequence_number.to_string());
        self
    }

    /// Answer the order with this sequence number twice.
    pub fn duplicating(mut self, sequence_number: &str) -> Self {
        self.duplicated.insert(sequence_number.to_string());
        self
    }

    /// Do not confirm cancellation of this shipment number.
    pub fn not_confirming(mut self, shipment_number: &str) -> Self {
        self.unconfirmed.insert(shipment_number.to_string());
        self
    }

    /// Simulate network latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    fn shipment_number() -> String {
        let serial: u64 = rand::thread_rng().gen_range(0..10_000_000_000_000);
        format!("0034043{serial:013}")
    }

}

#[async_trait]
impl ShipmentService for MockShipmentService {
    async fn create_shipments(
        &self,
        orders: &[ShipmentOrder],
    ) -> Result<Vec<ShipmentResult>, ServiceError> {
        self.record(RecordedCall::Create(orders.to_vec()));
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let mut results = Vec::with_capacity(orders.len());
        for order in orders {
            if self.omitted.contains(&order.sequence_number) {
                continue;
            }
            let shipment_number = Self::shipment_number();
            let mut labels = vec![label_document(&format!("label {shipment_number}"))];
            let return_shipment_number = match &order.services.return_shipment {
                Some(_) => {
                    let number = Self::shipment_number();
                    labels.push(label_document(&format!("return label {number}")));
                    Some(number)
                }
                None => None,
            };
            let result = ShipmentResult {
                sequence_number: order.sequence_number.clone(),
                shipment_number,
                return_shipment_number,
                labels,
            };
            if self.duplicated.contains(&order.sequence_number) {
                results.push(result.clone());
            }
            results.push(result);
        }
        tracing::debug!(
            requested = orders.len(),
            returned = results.len(),
            "mock created shipments"
        );
        Ok(results)
    }

    async fn cancel_shipments(
        &self,
        shipment_numbers: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        self.record(RecordedCall::Cancel(shipment_numbers.to_vec()));
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(shipment_numbers
            .iter()
            .filter(|n| !self.unconfirmed.contains(*n))
            .cloned()
            .collect())
    }
}

/// A base64 encoded one page PDF document showing `text`.
pub fn label_document(text: &str) -> String {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(font);
    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let content = format!("BT /F1 12 Tf 20 380 Td ({text}) Tj ET");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("Contents", Object::Reference(content_id));
    page.set("Resources", Object::Dictionary(resources));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(298),
            Object::Integer(420),
        ]),
    );
    let page_id = doc.add_object(page);

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut out = Vec::new();
    // writing into memory cannot fail
    let _ = doc.save_to(&mut out);
    BASE64_STANDARD.encode(out)
}

/// Hands out mock services per store.
pub struct MockServiceFactory {
    fallback: Option<Arc<MockShipmentService>>,
    stores: HashMap<u32, Arc<MockShipmentService>>,
}

impl MockServiceFactory {
    /// Every store gets the same service.
    pub fn new(service: Arc<MockShipmentService>) -> Self {
        Self {
            fallback: Some(service),
            stores: HashMap::new(),
        }
    }

    /// Only stores registered with [`Self::with_store`] get a service.
    pub fn per_store() -> Self {
        Self {
            fallback: None,
            stores: HashMap::new(),
        }
    }

    pub fn with_store(mut self, store_id: u32, service: Arc<MockShipmentService>) -> Self {
        self.stores.insert(store_id, service);
        self
    }
}

impl ServiceFactory for MockServiceFactory {
    fn create_shipment_service(
        &self,
        store_id: u32,
    ) -> Result<Arc<dyn ShipmentService>, ServiceError> {
        match self.stores.get(&store_id).or(self.fallback.as_ref()) {
            Some(service) => Ok(Arc::clone(service) as Arc<dyn ShipmentService>),
            None => Err(ServiceError::Authentication(format!(
                "no credentials configured for store {store_id}"
            ))),
        }
    }
}
