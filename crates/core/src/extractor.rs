use crate::address::split_street;
use crate::billing::AccountSettings;
use crate::error::ExtractionError;
use crate::models::{ContactBag, OrderInfo, RawPackage, SalesShipmentRef, ShipmentRequest};
use crate::procedure::ProcedureResolver;
use crate::services::{AgeCheck, PickupLocation, ServiceSet};
use crate::services::{
    ADDITIONAL_INSURANCE, BULKY_GOODS, NAMED_PERSON_ONLY, NO_NEIGHBOUR_DELIVERY,
    PARCEL_ANNOUNCEMENT, PRINT_ONLY_IF_CODEABLE, RETURN_SHIPMENT, SIGNED_FOR_BY_RECIPIENT,
};
use crate::units::{DimensionUnit, WeightUnit};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street_name: String,
    pub street_number: String,
    pub address_addition: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub state: Option<String>,
    pub country_code: String,
}

impl From<&ContactBag> for Address {
    fn from(bag: &ContactBag) -> Self {
        let street = split_street(&bag.street);
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Address {
            name: bag.person_name.trim().to_string(),
            company: non_empty(&bag.company_name),
            email: non_empty(&bag.email),
            phone: non_empty(&bag.phone),
            street_name: street.name,
            street_number: street.number,
            address_addition: street.supplement,
            postal_code: bag.postal_code.trim().to_string(),
            city: bag.city.trim().to_string(),
            state: non_empty(&bag.state_code),
            country_code: bag.country_code.trim().to_ascii_uppercase(),
        }
    }
}

/// Export data the carrier needs in addition to the customs value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageAdditional {
    pub additional_fee: Option<Decimal>,
    pub place_of_committal: Option<String>,
    pub permit_number: Option<String>,
    pub attestation_number: Option<String>,
    pub electronic_export_notification: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub product_code: String,
    pub container_type: Option<String>,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dimension_unit: DimensionUnit,
    pub customs_value: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub export_type: Option<String>,
    pub export_type_description: Option<String>,
    pub terms_of_trade: Option<String>,
    pub content_description: Option<String>,
    pub additional: PackageAdditional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageItem {
    pub order_item_id: u64,
    pub name: String,
    pub sku: String,
    pub qty: f64,
    pub price: Decimal,
    pub customs_value: Option<Decimal>,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub hs_code: Option<String>,
    pub country_of_origin: Option<String>,
    pub export_description: Option<String>,
}

/// Typed read-only view over one [`ShipmentRequest`].
///
/// Service options are decoded on construction. Packages, addresses and
/// account numbers are derived on demand; the underlying request is never
/// modified.
pub struct RequestExtractor<'a> {
    request: &'a ShipmentRequest,
    account: &'a AccountSettings,
    procedures: &'a dyn ProcedureResolver,
    services: ServiceSet,
}

impl<'a> RequestExtractor<'a> {
    pub fn new(
        request: &'a ShipmentRequest,
        account: &'a AccountSettings,
        procedures: &'a dyn ProcedureResolver,
    ) -> Result<Self, ExtractionError> {
        let services = ServiceSet::decode(&request.services)?;
        Ok(Self {
            request,
            account,
            procedures,
            services,
        })
    }

    pub fn request(&self) -> &ShipmentRequest {
        self.request
    }

    pub fn store_id(&self) -> u32 {
        self.request.store_id
    }

    pub fn sales_shipment(&self) -> &SalesShipmentRef {
        &self.request.sales_shipment
    }

    pub fn order(&self) -> &OrderInfo {
        &self.request.order
    }

    /// Requested shipment date, today if the caller did not set one.
    pub fn shipment_date(&self) -> NaiveDate {
        self.request
            .shipment_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn shipper(&self) -> Address {
        Address::from(&self.request.shipper)
    }

    pub fn recipient(&self) -> Address {
        Address::from(&self.request.recipient)
    }

    fn raw_package(&self) -> Result<&RawPackage, ExtractionError> {
        match self.request.packages.as_slice() {
            [package] => Ok(package),
            [] => Err(ExtractionError::NoPackage),
            _ => Err(ExtractionError::MultiPackage),
        }
    }

    /// All packages of the request. This carrier flow supports exactly one.
    pub fn packages(&self) -> Result<Vec<Package>, ExtractionError> {
        let raw = self.raw_package()?;
        let params = &raw.params;
        let customs = &params.customs;
        let text = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        let package = Package {
            product_code: params.product_code.trim().to_string(),
            container_type: text(&params.container),
            weight: params.weight,
            weight_unit: params.weight_units.parse()?,
            length: params.length,
            width: params.width,
            height: params.height,
            dimension_unit: match params.dimension_units.as_deref() {
                Some(unit) => unit.parse()?,
                None => DimensionUnit::Centimeter,
            },
            customs_value: params.customs_value,
            declared_value: params.declared_value,
            export_type: text(&params.content_type),
            export_type_description: text(&params.content_type_other),
            terms_of_trade: text(&customs.terms_of_trade),
            content_description: text(&customs.export_description),
            additional: PackageAdditional {
                additional_fee: customs.additional_fee,
                place_of_committal: text(&customs.place_of_committal),
                permit_number: text(&customs.permit_number),
                attestation_number: text(&customs.attestation_number),
                electronic_export_notification: customs.electronic_export_notification,
            },
        };
        Ok(vec![package])
    }

    /// The single package of the request.
    pub fn package(&self) -> Result<Package, ExtractionError> {
        let mut packages = self.packages()?;
        packages.pop().ok_or(ExtractionError::NoPackage)
    }

    pub fn package_items(&self) -> Result<Vec<PackageItem>, ExtractionError> {
        let raw = self.raw_package()?;
        let weight_unit: WeightUnit = raw.params.weight_units.parse()?;
        Ok(raw
            .items
            .iter()
            .map(|item| PackageItem {
                order_item_id: item.order_item_id,
                name: item.name.clone(),
                sku: item.sku.clone(),
                qty: item.qty,
                price: item.price,
                customs_value: item.customs_value,
                weight: item.weight,
                weight_unit,
                hs_code: item.customs.hs_code.clone(),
                country_of_origin: item.customs.country_of_origin.clone(),
                export_description: item.customs.export_description.clone(),
            })
            .collect())
    }

    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    pub fn is_cash_on_delivery(&self) -> bool {
        self.services.cash_on_delivery().is_some()
    }

    pub fn cod_reason_for_payment(&self) -> Option<&str> {
        self.services.cash_on_delivery().flatten()
    }

    pub fn is_additional_insurance(&self) -> bool {
        self.services.contains(ADDITIONAL_INSURANCE)
    }

    pub fn visual_check_of_age(&self) -> Option<AgeCheck> {
        self.services.visual_check_of_age()
    }

    pub fn is_bulky_goods(&self) -> bool {
        self.services.contains(BULKY_GOODS)
    }

    pub fn has_preferred_day(&self) -> bool {
        self.services.preferred_day().is_some()
    }

    pub fn preferred_day(&self) -> Option<NaiveDate> {
        self.services.preferred_day()
    }

    pub fn preferred_time(&self) -> Option<&str> {
        self.services.preferred_time()
    }

    pub fn preferred_neighbour(&self) -> Option<&str> {
        self.services.preferred_neighbour()
    }

    pub fn preferred_location(&self) -> Option<&str> {
        self.services.preferred_location()
    }

    pub fn is_parcel_outlet_routing(&self) -> bool {
        self.services.parcel_outlet_routing().is_some()
    }

    /// Notification address for parcel outlet routing, the recipient's e-mail if none was given.
    pub fn parcel_outlet_routing_email(&self) -> Option<String> {
        self.services
            .parcel_outlet_routing()
            .and_then(|email| email.map(str::to_string).or_else(|| self.recipient().email))
    }

    pub fn is_return_shipment(&self) -> bool {
        self.services.contains(RETURN_SHIPMENT)
    }

    pub fn is_print_only_if_codeable(&self) -> bool {
        self.services.contains(PRINT_ONLY_IF_CODEABLE)
    }

    pub fn is_parcel_announcement(&self) -> bool {
        self.services.contains(PARCEL_ANNOUNCEMENT)
    }

    pub fn is_no_neighbour_delivery(&self) -> bool {
        self.services.contains(NO_NEIGHBOUR_DELIVERY)
    }

    pub fn is_named_person_only(&self) -> bool {
        self.services.contains(NAMED_PERSON_ONLY)
    }

    pub fn is_signed_for_by_recipient(&self) -> bool {
        self.services.contains(SIGNED_FOR_BY_RECIPIENT)
    }

    pub fn is_pickup_location_delivery(&self) -> bool {
        self.services.pickup_location().is_some()
    }

    pub fn pickup_location_details(&self) -> Option<&PickupLocation> {
        self.services.pickup_location()
    }

    fn product_code(&self) -> Result<String, ExtractionError> {
        Ok(self.raw_package()?.params.product_code.trim().to_string())
    }

    /// EKP + procedure + participation for the package's product.
    pub fn billing_number(&self) -> Result<String, ExtractionError> {
        let product = self.product_code()?;
        let procedure = self
            .procedures
            .procedure(&product)
            .ok_or(ExtractionError::UnknownProcedure(product))?;
        Ok(self.account.billing_number(&procedure))
    }

    /// Billing number for return labels, empty if the product offers no returns.
    pub fn return_shipment_account_number(&self) -> Result<String, ExtractionError> {
        let product = self.product_code()?;
        Ok(self
            .procedures
            .return_procedure(&product)
            .map(|procedure| self.account.billing_number(&procedure))
            .unwrap_or_default())
    }
}
