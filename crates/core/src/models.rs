use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to the sales shipment a request was created for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesShipmentRef {
    pub shipment_id: u64,
    pub order_increment_id: String,
}

impl std::fmt::Display for SalesShipmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} (order {})", self.shipment_id, self.order_increment_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderInfo {
    pub increment_id: String,
    pub grand_total: Decimal,
    pub currency_code: String,
}

/// Shipper or recipient contact data as supplied by the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactBag {
    pub person_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Vec<String>,
    pub city: String,
    pub state_code: Option<String>,
    pub postal_code: String,
    pub country_code: String,
}

/// Carrier-specific export data attached to a package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomsParams {
    pub terms_of_trade: Option<String>,
    pub export_description: Option<String>,
    pub additional_fee: Option<Decimal>,
    pub place_of_committal: Option<String>,
    pub permit_number: Option<String>,
    pub attestation_number: Option<String>,
    pub electronic_export_notification: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageParams {
    pub product_code: String,
    pub container: Option<String>,
    pub weight: f64,
    pub weight_units: String,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dimension_units: Option<String>,
    pub customs_value: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub content_type: Option<String>,
    pub content_type_other: Option<String>,
    pub customs: CustomsParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCustomsParams {
    pub hs_code: Option<String>,
    pub country_of_origin: Option<String>,
    pub export_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageItemParams {
    pub order_item_id: u64,
    pub name: String,
    pub sku: String,
    pub qty: f64,
    pub price: Decimal,
    pub weight: f64,
    pub customs_value: Option<Decimal>,
    pub customs: ItemCustomsParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPackage {
    pub params: PackageParams,
    pub items: Vec<PackageItemParams>,
}

/// A shipment request as handed over by the shipment creation workflow.
///
/// Service options stay loosely typed (`code -> details`) until
/// [`crate::services::ServiceSet::decode`] turns them into known variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRequest {
    #[serde(default)]
    pub store_id: u32,
    pub sales_shipment: SalesShipmentRef,
    #[serde(default)]
    pub order: OrderInfo,
    #[serde(default)]
    pub shipper: ContactBag,
    #[serde(default)]
    pub recipient: ContactBag,
    #[serde(default)]
    pub shipment_date: Option<NaiveDate>,
    #[serde(default)]
    pub packages: Vec<RawPackage>,
    #[serde(default)]
    pub services: BTreeMap<String, serde_json::Value>,
}
