mod common;

use common::{assert_partition, request, request_with};
use config::{AppConfig, StoreConfig};
use dhlpaket_core::{AccountSettings, SalesShipmentRef};
use pipeline::{CancelRequest, ShipmentManagement};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use webservice::mock::{MockServiceFactory, MockShipmentService, RecordedCall};

fn two_stores() -> AppConfig {
    let mut config = AppConfig::default();
    config.upsert_store(StoreConfig {
        store_id: 2,
        default_product: None,
        account: AccountSettings::sandbox(),
    });
    config
}

fn create_calls(service: &MockShipmentService) -> Vec<Vec<String>> {
    service
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RecordedCall::Create(orders) => Some(
                orders
                    .into_iter()
                    .map(|o| o.reference.unwrap_or_default())
                    .collect(),
            ),
            RecordedCall::Cancel(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_batch_is_split_by_store() {
    let store_0 = Arc::new(MockShipmentService::new());
    let store_2 = Arc::new(MockShipmentService::new());
    let factory = MockServiceFactory::per_store()
        .with_store(0, store_0.clone())
        .with_store(2, store_2.clone());
    let management = ShipmentManagement::new(two_stores(), Arc::new(factory));

    let requests = vec![
        request(1),
        request_with(2, |value| value["store_id"] = json!(2)),
        request(3),
        request_with(4, |value| value["store_id"] = json!(9)),
    ];

    let outcome = management.create_labels(requests).await;

    assert_partition(&outcome, 4);
    assert_eq!(outcome.labels.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(outcome.labels[&1].sales_shipment.shipment_id, 2);
    assert_eq!(outcome.labels[&2].sales_shipment.shipment_id, 3);
    assert_eq!(
        outcome.errors[&3].message(),
        "No shipping account is configured for store 9."
    );

    assert_eq!(create_calls(&store_0), vec![vec!["100000001", "100000003"]]);
    assert_eq!(create_calls(&store_2), vec![vec!["100000002"]]);
}

#[tokio::test]
async fn test_store_without_service_fails_its_requests() {
    let store_0 = Arc::new(MockShipmentService::new());
    let factory = MockServiceFactory::per_store().with_store(0, store_0);
    let management = ShipmentManagement::new(two_stores(), Arc::new(factory));

    let outcome = management
        .create_labels(vec![
            request_with(1, |value| value["store_id"] = json!(2)),
            request(2),
        ])
        .await;

    assert_partition(&outcome, 2);
    assert!(outcome.errors[&0].message().contains("no credentials configured for store 2"));
    assert!(outcome.labels.contains_key(&1));
}

#[tokio::test]
async fn test_default_product_is_applied() {
    let service = Arc::new(MockShipmentService::new());
    let management = ShipmentManagement::new(
        AppConfig::default(),
        Arc::new(MockServiceFactory::new(service.clone())),
    );

    let outcome = management
        .create_labels(vec![request_with(1, |value| {
            value["packages"][0]["params"]["product_code"] = json!("")
        })])
        .await;

    assert_partition(&outcome, 1);
    let products: Vec<String> = service
        .calls()
        .into_iter()
        .flat_map(|call| match call {
            RecordedCall::Create(orders) => orders.into_iter().map(|o| o.product).collect(),
            RecordedCall::Cancel(_) => vec![],
        })
        .collect();
    assert_eq!(products, vec!["V01PAK".to_string()]);
}

#[tokio::test]
async fn test_cancellation_is_split_by_store() {
    let store_0 = Arc::new(MockShipmentService::new().not_confirming("B"));
    let store_2 = Arc::new(MockShipmentService::new());
    let factory = MockServiceFactory::per_store()
        .with_store(0, store_0.clone())
        .with_store(2, store_2.clone());
    let management = ShipmentManagement::new(two_stores(), Arc::new(factory));

    let cancel = |store_id: u32, tracking_number: &str, shipment_id: u64| CancelRequest {
        store_id,
        tracking_number: tracking_number.to_string(),
        sales_shipment: SalesShipmentRef {
            shipment_id,
            order_increment_id: shipment_id.to_string(),
        },
    };

    let outcome = management
        .cancel_labels(vec![
            cancel(0, "A", 1),
            cancel(2, "B2", 2),
            cancel(0, "B", 3),
            cancel(5, "Z", 4),
        ])
        .await;

    assert_eq!(
        outcome.tracks.keys().cloned().collect::<Vec<_>>(),
        vec!["A".to_string(), "B2".to_string()]
    );
    assert!(outcome.errors["B"].message().contains("not confirmed"));
    assert!(outcome.errors["Z"].message().contains("store 5"));
    assert_eq!(store_2.calls(), vec![RecordedCall::Cancel(vec!["B2".to_string()])]);
}
