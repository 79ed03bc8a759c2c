#![allow(dead_code)]

use dhlpaket_core::{
    AccountSettings, DefaultUnitConverter, ShipmentRequest, StaticProcedureResolver,
};
use pipeline::label::PdfDocumentCombinator;
use pipeline::response_mapper::CreateResponseMapper;
use pipeline::{CreateShipmentsOutcome, RequestDataMapper};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

pub fn mapper() -> RequestDataMapper {
    RequestDataMapper::new(
        AccountSettings::sandbox(),
        Arc::new(StaticProcedureResolver::default()),
        Arc::new(DefaultUnitConverter),
    )
}

pub fn response_mapper() -> CreateResponseMapper {
    CreateResponseMapper::new(Arc::new(PdfDocumentCombinator))
}

pub fn request_json(id: u64) -> Value {
    json!({
        "store_id": 0,
        "sales_shipment": {"shipment_id": id, "order_increment_id": format!("1000000{id:02}")},
        "order": {"increment_id": format!("1000000{id:02}"), "grand_total": "29.90", "currency_code": "EUR"},
        "shipment_date": "2026-10-19",
        "shipper": {
            "company_name": "Versandhaus Nord GmbH",
            "street": ["Hafenstraße 5"],
            "city": "Hamburg",
            "postal_code": "20457",
            "country_code": "DE"
        },
        "recipient": {
            "person_name": "Max Mustermann",
            "email": "max@example.com",
            "street": ["Lindenallee 12b"],
            "city": "Berlin",
            "postal_code": "10115",
            "country_code": "DE"
        },
        "packages": [{
            "params": {"product_code": "V01PAK", "weight": 2.0, "weight_units": "KILOGRAM"},
            "items": [{"order_item_id": id, "name": "Mug", "sku": "MUG-1", "qty": 1.0, "price": "29.90", "weight": 2.0}]
        }]
    })
}

pub fn request(id: u64) -> ShipmentRequest {
    serde_json::from_value(request_json(id)).unwrap()
}

pub fn request_with(id: u64, patch: impl FnOnce(&mut Value)) -> ShipmentRequest {
    let mut value = request_json(id);
    patch(&mut value);
    serde_json::from_value(value).unwrap()
}

/// Every position of a batch of `n` has exactly one outcome.
pub fn assert_partition(outcome: &CreateShipmentsOutcome, n: usize) {
    let labels: BTreeSet<usize> = outcome.labels.keys().copied().collect();
    let errors: BTreeSet<usize> = outcome.errors.keys().copied().collect();
    assert!(labels.is_disjoint(&errors), "labels {labels:?} and errors {errors:?} overlap");
    let all: BTreeSet<usize> = labels.union(&errors).copied().collect();
    assert_eq!(all, (0..n).collect::<BTreeSet<usize>>());
    for (index, label) in &outcome.labels {
        assert_eq!(label.request_index, *index);
    }
    for (index, error) in &outcome.errors {
        assert_eq!(error.request_index, *index);
    }
}
