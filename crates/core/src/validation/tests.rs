use super::validate;
use crate::models::ShipmentRequest;
use serde_json::{json, Value};

fn request_with(services: Value, packages: Value) -> ShipmentRequest {
    serde_json::from_value(json!({
        "sales_shipment": {"shipment_id": 1, "order_increment_id": "100000001"},
        "shipper": {
            "person_name": "Versand",
            "street": ["Charles-de-Gaulle-Str. 20"],
            "city": "Bonn",
            "postal_code": "53113",
            "country_code": "DE"
        },
        "recipient": {
            "person_name": "Max Muster",
            "street": ["Hauptstr. 5"],
            "city": "Berlin",
            "postal_code": "10115",
            "country_code": "DE"
        },
        "packages": packages,
        "services": services
    }))
    .unwrap()
}

fn one_package() -> Value {
    json!([{"params": {"product_code": "V01PAK", "weight": 1.2, "weight_units": "KILOGRAM"}}])
}

#[test]
fn test_valid_request_passes() {
    assert_eq!(validate(&request_with(json!({}), one_package())), Ok(()));
}

#[test]
fn test_multi_package_is_rejected() {
    let packages = json!([
        {"params": {"product_code": "V01PAK", "weight": 1.0, "weight_units": "KILOGRAM"}},
        {"params": {"product_code": "V01PAK", "weight": 1.0, "weight_units": "KILOGRAM"}}
    ]);
    let errs = validate(&request_with(json!({}), packages)).unwrap_err();
    assert!(errs.iter().any(|e| e.contains("Multi-package")));
}

#[test]
fn test_all_violations_are_collected() {
    let mut request = request_with(
        json!({}),
        json!([{"params": {"product_code": "", "weight": 0.0, "weight_units": "STONE"}}]),
    );
    request.recipient.city.clear();
    request.recipient.country_code = "DEU".to_string();

    let errs = validate(&request).unwrap_err();
    assert!(errs.contains(&"Package: shipping product is mandatory".to_string()));
    assert!(errs.contains(&"Package: weight must be greater than zero".to_string()));
    assert!(errs.contains(&"Recipient: city is mandatory".to_string()));
    assert!(errs.iter().any(|e| e.starts_with("Recipient: country must be")));
    assert!(errs.iter().any(|e| e.contains("STONE")));
}

#[test]
fn test_pickup_location_conflicts() {
    let services = json!({
        "parcelshopFinder": {"enabled": true, "locationType": "locker", "locationNumber": "118"},
        "preferredNeighbour": {"enabled": true, "details": "Nachbar links"},
        "noNeighbourDelivery": true
    });
    let errs = validate(&request_with(services, one_package())).unwrap_err();
    assert_eq!(errs.len(), 3);
    assert!(errs.iter().any(|e| e.contains("post number")));
}

#[test]
fn test_malformed_service_is_reported() {
    let services = json!({"visualCheckOfAge": {"enabled": true, "details": "A21"}});
    let errs = validate(&request_with(services, one_package())).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("visualCheckOfAge"));
}
