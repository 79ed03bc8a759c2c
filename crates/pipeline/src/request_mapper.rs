use dhlpaket_core::extractor::{Address, Package, PackageItem};
use dhlpaket_core::services::PickupLocationType;
use dhlpaket_core::{
    AccountSettings, DimensionUnit, ExtractionError, ProcedureResolver, RequestExtractor,
    ShipmentRequest, UnitConverter, WeightUnit,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use webservice::order::{
    ContactAddress, Customs, ExportItem, Locker, Money, OrderValidationError, PostOffice,
};
use webservice::{ShipmentOrder, ShipmentOrderBuilder};

const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    #[error("The shipment order is invalid: {0}")]
    Order(#[from] OrderValidationError),
}

fn contact_address(address: &Address) -> ContactAddress {
    let (name1, name2) = match (&address.company, address.name.is_empty()) {
        (Some(company), true) => (company.clone(), None),
        (company, _) => (address.name.clone(), company.clone()),
    };
    ContactAddress {
        name1,
        name2,
        street_name: address.street_name.clone(),
        street_number: address.street_number.clone(),
        address_addition: address.address_addition.clone(),
        postal_code: address.postal_code.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        country_code: address.country_code.clone(),
        email: address.email.clone(),
        phone: address.phone.clone(),
    }
}

/// Translates shipment requests into web service orders for one store account.
pub struct RequestDataMapper {
    account: AccountSettings,
    procedures: Arc<dyn ProcedureResolver>,
    units: Arc<dyn UnitConverter>,
}

impl RequestDataMapper {
    pub fn new(
        account: AccountSettings,
        procedures: Arc<dyn ProcedureResolver>,
        units: Arc<dyn UnitConverter>,
    ) -> Self {
        Self {
            account,
            procedures,
            units,
        }
    }

    /// Build the order for `request`, tagged with `sequence_number`.
    ///
    /// The request itself is left untouched; correlating the order's result
    /// back to the request is up to the caller.
    pub fn map_request(
        &self,
        sequence_number: &str,
        request: &ShipmentRequest,
    ) -> Result<ShipmentOrder, MappingError> {
        let extractor = RequestExtractor::new(request, &self.account, self.procedures.as_ref())?;
        let package = extractor.package()?;
        let recipient = extractor.recipient();
        let currency = match extractor.order().currency_code.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            code => code.to_ascii_uppercase(),
        };
        let money = |value: Decimal| Money {
            value,
            currency: currency.clone(),
        };

        let mut builder = ShipmentOrderBuilder::new()
            .with_sequence_number(sequence_number)
            .with_shipper_account(extractor.billing_number()?)
            .with_product(package.product_code.as_str())
            .with_shipment_date(extractor.shipment_date())
            .with_shipper(contact_address(&extractor.shipper()))
            .with_weight(self.units.convert_weight(
                package.weight,
                package.weight_unit,
                WeightUnit::Kilogram,
            ));

        let reference = extractor.order().increment_id.trim();
        if !reference.is_empty() {
            builder = builder.with_reference(reference);
        }

        if let (Some(length), Some(width), Some(height)) =
            (package.length, package.width, package.height)
        {
            let cm = |v: f64| {
                self.units
                    .convert_dimension(v, package.dimension_unit, DimensionUnit::Centimeter)
            };
            builder = builder.with_dimensions(cm(length), cm(width), cm(height));
        }

        builder = match extractor.pickup_location_details() {
            Some(location) => {
                let postal_code = location
                    .postal_code
                    .clone()
                    .unwrap_or_else(|| recipient.postal_code.clone());
                let city = location.city.clone().unwrap_or_else(|| recipient.city.clone());
                let country_code = location
                    .country_code
                    .clone()
                    .unwrap_or_else(|| recipient.country_code.clone());
                match location.kind {
                    PickupLocationType::Locker => builder.with_locker(Locker {
                        name: recipient.name.clone(),
                        locker_id: location.number.clone(),
                        post_number: location.customer_post_number.clone().unwrap_or_default(),
                        postal_code,
                        city,
                        country_code,
                    }),
                    PickupLocationType::PostOffice | PickupLocationType::ServicePoint => builder
                        .with_post_office(PostOffice {
                            name: recipient.name.clone(),
                            retail_id: location.number.clone(),
                            post_number: location.customer_post_number.clone(),
                            email: recipient.email.clone(),
                            postal_code,
                            city,
                            country_code,
                        }),
                }
            }
            None => builder.with_recipient(contact_address(&recipient)),
        };

        if extractor.is_cash_on_delivery() {
            builder = builder.with_cod_amount(
                money(extractor.order().grand_total),
                extractor.cod_reason_for_payment().map(str::to_string),
            );
        }
        if extractor.is_additional_insurance() {
            let insured = package
                .declared_value
                .unwrap_or(extractor.order().grand_total);
            builder = builder.with_insured_value(money(insured));
        }
        if let Some(age) = extractor.visual_check_of_age() {
            builder = builder.with_visual_check_of_age(age.as_str());
        }
        if extractor.is_bulky_goods() {
            builder = builder.with_bulky_goods();
        }
        if let Some(day) = extractor.preferred_day() {
            builder = builder.with_preferred_day(day);
        }
        if let Some(time) = extractor.preferred_time() {
            builder = builder.with_preferred_time(time);
        }
        if let Some(neighbour) = extractor.preferred_neighbour() {
            builder = builder.with_preferred_neighbour(neighbour);
        }
        if let Some(location) = extractor.preferred_location() {
            builder = builder.with_preferred_location(location);
        }
        if extractor.is_parcel_outlet_routing() {
            builder = builder.with_parcel_outlet_routing(extractor.parcel_outlet_routing_email());
        }
        if extractor.is_parcel_announcement() {
            match &recipient.email {
                Some(email) => builder = builder.with_parcel_announcement(email.as_str()),
                None => tracing::debug!(
                    sequence_number,
                    "skipping parcel announcement, recipient has no e-mail address"
                ),
            }
        }
        if extractor.is_print_only_if_codeable() {
            builder = builder.with_print_only_if_codeable();
        }
        if extractor.is_no_neighbour_delivery() {
            builder = builder.with_no_neighbour_delivery();
        }
        if extractor.is_named_person_only() {
            builder = builder.with_named_person_only();
        }
        if extractor.is_signed_for_by_recipient() {
            builder = builder.with_signed_for_by_recipient();
        }
        if extractor.is_return_shipment() {
            builder = builder.with_return_shipment(
                extractor.return_shipment_account_number()?,
                contact_address(&extractor.shipper()),
            );
        }

        if package.customs_value.is_some() {
            builder = builder.with_customs_details(self.customs(&package, &extractor, &money));
            for item in extractor.package_items()? {
                builder = builder.with_export_item(self.export_item(&item, &money));
            }
        }

        Ok(builder.build()?)
    }

    fn customs(
        &self,
        package: &Package,
        extractor: &RequestExtractor<'_>,
        money: &dyn Fn(Decimal) -> Money,
    ) -> Customs {
        let additional = &package.additional;
        let invoice_number = extractor.order().increment_id.trim();
        Customs {
            export_type: package.export_type.clone(),
            export_type_description: package.export_type_description.clone(),
            terms_of_trade: package.terms_of_trade.clone(),
            export_description: package.content_description.clone(),
            additional_fee: additional.additional_fee.map(money),
            place_of_committal: additional.place_of_committal.clone(),
            permit_number: additional.permit_number.clone(),
            attestation_number: additional.attestation_number.clone(),
            electronic_export_notification: additional.electronic_export_notification,
            invoice_number: (!invoice_number.is_empty()).then(|| invoice_number.to_string()),
            items: Vec::new(),
        }
    }

    fn export_item(&self, item: &PackageItem, money: &dyn Fn(Decimal) -> Money) -> ExportItem {
        ExportItem {
            description: item
                .export_description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| item.name.clone()),
            quantity: item.qty,
            hs_code: item.hs_code.clone(),
            country_of_origin: item.country_of_origin.clone(),
            item_value: money(item.customs_value.unwrap_or(item.price)),
            weight_kg: self
                .units
                .convert_weight(item.weight, item.weight_unit, WeightUnit::Kilogram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhlpaket_core::{DefaultUnitConverter, StaticProcedureResolver};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use webservice::order::Consignee;

    fn mapper() -> RequestDataMapper {
        RequestDataMapper::new(
            AccountSettings::new("2222222222")
                .with_participation("01", "04")
                .with_participation("07", "02")
                .with_participation("53", "01"),
            Arc::new(StaticProcedureResolver::default()),
            Arc::new(DefaultUnitConverter),
        )
    }

    fn request(params: Value, services: Value) -> ShipmentRequest {
        serde_json::from_value(json!({
            "store_id": 1,
            "sales_shipment": {"shipment_id": 11, "order_increment_id": "000000011"},
            "order": {"increment_id": "000000011", "grand_total": "49.90", "currency_code": "eur"},
            "shipment_date": "2026-10-19",
            "shipper": {
                "person_name": "",
                "company_name": "Shop GmbH",
                "street": ["Nürnberger Str. 1"],
                "city": "Leipzig",
                "postal_code": "04103",
                "country_code": "DE"
            },
            "recipient": {
                "person_name": "Erika Mustermann",
                "email": "erika@example.com",
                "street": ["Heidestraße 17"],
                "city": "Köln",
                "postal_code": "51147",
                "country_code": "DE"
            },
            "packages": [{
                "params": params,
                "items": [{
                    "order_item_id": 3, "name": "Shirt", "sku": "S-1", "qty": 2.0,
                    "price": "19.95", "weight": 0.5,
                    "customs": {"hs_code": "61091000", "country_of_origin": "PT"}
                }]
            }],
            "services": services
        }))
        .unwrap()
    }

    fn domestic() -> Value {
        json!({"product_code": "V01PAK", "weight": 1500.0, "weight_units": "GRAM"})
    }

    #[test]
    fn test_map_domestic_request() {
        let order = mapper().map_request("4", &request(domestic(), json!({}))).unwrap();

        assert_eq!(order.sequence_number, "4");
        assert_eq!(order.billing_number, "22222222220104");
        assert_eq!(order.product, "V01PAK");
        assert_eq!(order.reference.as_deref(), Some("000000011"));
        assert_eq!(order.weight_kg, 1.5);
        assert_eq!(order.dimensions, None);
        assert_eq!(order.customs, None);
        assert_eq!(order.shipper.name1, "Shop GmbH");
        match order.consignee {
            Consignee::Address(address) => {
                assert_eq!(address.name1, "Erika Mustermann");
                assert_eq!(address.street_name, "Heidestraße");
                assert_eq!(address.street_number, "17");
            }
            other => panic!("unexpected consignee {other:?}"),
        }
    }

    #[test]
    fn test_dimensions_need_all_three_measures() {
        let partial = json!({
            "product_code": "V01PAK", "weight": 1.0, "weight_units": "KILOGRAM",
            "length": 10.0, "width": 10.0, "dimension_units": "INCH"
        });
        let order = mapper().map_request("0", &request(partial, json!({}))).unwrap();
        assert_eq!(order.dimensions, None);

        let complete = json!({
            "product_code": "V01PAK", "weight": 1.0, "weight_units": "KILOGRAM",
            "length": 10.0, "width": 10.0, "height": 4.0, "dimension_units": "INCH"
        });
        let order = mapper().map_request("0", &request(complete, json!({}))).unwrap();
        let dimensions = order.dimensions.unwrap();
        assert_eq!(
            (dimensions.length_cm, dimensions.width_cm, dimensions.height_cm),
            (25.0, 25.0, 10.0)
        );
    }

    #[test]
    fn test_map_value_added_services() {
        let services = json!({
            "cashOnDelivery": {"enabled": true, "details": "Order 11"},
            "additionalInsurance": true,
            "visualCheckOfAge": {"enabled": true, "details": "A16"},
            "bulkyGoods": true,
            "preferredDay": {"enabled": true, "date": "2026-10-21"},
            "preferredLocation": {"enabled": true, "details": "Garage"},
            "parcelOutletRouting": {"enabled": true},
            "returnShipment": true
        });
        let order = mapper().map_request("0", &request(domestic(), services)).unwrap();
        let services = order.services;

        let cod = services.cash_on_delivery.unwrap();
        assert_eq!(cod.amount, Money { value: Decimal::new(4990, 2), currency: "EUR".to_string() });
        assert_eq!(cod.reason_for_payment.as_deref(), Some("Order 11"));
        assert_eq!(services.insured_value.map(|m| m.value), Some(Decimal::new(4990, 2)));
        assert_eq!(services.visual_check_of_age.as_deref(), Some("A16"));
        assert!(services.bulky_goods);
        assert_eq!(services.preferred_day, chrono::NaiveDate::from_ymd_opt(2026, 10, 21));
        assert_eq!(services.preferred_location.as_deref(), Some("Garage"));
        assert_eq!(services.parcel_outlet_routing.as_deref(), Some("erika@example.com"));
        let ret = services.return_shipment.unwrap();
        assert_eq!(ret.billing_number, "22222222220702");
        assert_eq!(ret.receiver.name1, "Shop GmbH");
    }

    #[test]
    fn test_map_locker_delivery() {
        let services = json!({
            "parcelshopFinder": {
                "enabled": true, "locationType": "locker", "locationNumber": "118",
                "customerPostnumber": "12345678", "postalCode": "53113", "city": "Bonn"
            }
        });
        let order = mapper().map_request("0", &request(domestic(), services)).unwrap();
        assert_eq!(
            order.consignee,
            Consignee::Locker(Locker {
                name: "Erika Mustermann".to_string(),
                locker_id: "118".to_string(),
                post_number: "12345678".to_string(),
                postal_code: "53113".to_string(),
                city: "Bonn".to_string(),
                country_code: "DE".to_string(),
            })
        );
    }

    #[test]
    fn test_map_post_office_delivery() {
        let services = json!({
            "parcelshopFinder": {"enabled": true, "locationType": "postoffice", "locationNumber": "502"}
        });
        let order = mapper().map_request("0", &request(domestic(), services)).unwrap();
        match order.consignee {
            Consignee::PostOffice(office) => {
                assert_eq!(office.retail_id, "502");
                assert_eq!(office.post_number, None);
                assert_eq!(office.email.as_deref(), Some("erika@example.com"));
                assert_eq!(office.city, "Köln");
            }
            other => panic!("unexpected consignee {other:?}"),
        }
    }

    #[test]
    fn test_customs_only_with_customs_value() {
        let params = json!({
            "product_code": "V53WPAK", "weight": 1.0, "weight_units": "KILOGRAM",
            "customs_value": "39.90", "content_type": "COMMERCIAL_GOODS",
            "customs": {"terms_of_trade": "DDU", "place_of_committal": "Leipzig", "additional_fee": "4.50"}
        });
        let order = mapper().map_request("0", &request(params, json!({}))).unwrap();

        assert_eq!(order.billing_number, "22222222225301");
        let customs = order.customs.unwrap();
        assert_eq!(customs.export_type.as_deref(), Some("COMMERCIAL_GOODS"));
        assert_eq!(customs.terms_of_trade.as_deref(), Some("DDU"));
        assert_eq!(customs.place_of_committal.as_deref(), Some("Leipzig"));
        assert_eq!(customs.additional_fee.map(|m| m.value), Some(Decimal::new(450, 2)));
        assert_eq!(customs.invoice_number.as_deref(), Some("000000011"));
        assert_eq!(
            customs.items,
            vec![ExportItem {
                description: "Shirt".to_string(),
                quantity: 2.0,
                hs_code: Some("61091000".to_string()),
                country_of_origin: Some("PT".to_string()),
                item_value: Money { value: Decimal::new(1995, 2), currency: "EUR".to_string() },
                weight_kg: 0.5,
            }]
        );
    }

    #[test]
    fn test_unknown_product_fails_with_billing_number_error() {
        let params = json!({"product_code": "V99XX", "weight": 1.0, "weight_units": "KILOGRAM"});
        let err = mapper().map_request("0", &request(params, json!({}))).unwrap_err();
        assert!(matches!(err, MappingError::Extraction(ExtractionError::UnknownProcedure(_))));
        assert!(err.to_string().contains("billing number"));
    }

    #[test]
    fn test_return_shipment_without_return_procedure_is_rejected() {
        let params = json!({"product_code": "V53WPAK", "weight": 1.0, "weight_units": "KILOGRAM"});
        let err = mapper()
            .map_request("0", &request(params, json!({"returnShipment": true})))
            .unwrap_err();
        assert!(matches!(err, MappingError::Order(_)));
        assert!(err.to_string().contains("return billing number"));
    }
}
