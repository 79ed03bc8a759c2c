//! Shipment order request types.
//!
//! A [`ShipmentOrder`] is the immutable description of one label request as
//! the carrier's shipment web service expects it. Orders are assembled with
//! [`ShipmentOrderBuilder`]; [`ShipmentOrderBuilder::build`] performs the
//! structural checks the web service would otherwise reject the order for.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Street address of shipper, consignee or return receiver
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAddress {
    /// Person or company name
    pub name1: String,
    /// Company name if `name1` holds a person
    pub name2: Option<String>,
    /// Street name without house number
    pub street_name: String,
    /// House number including suffix
    pub street_number: String,
    /// Address supplement (building, floor)
    pub address_addition: Option<String>,
    /// Postal code
    pub postal_code: String,
    /// City
    pub city: String,
    /// State or province
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Contact e-mail
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

/// Parcel locker delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Locker {
    /// Recipient name
    pub name: String,
    /// Locker number
    pub locker_id: String,
    /// Recipient's post number, mandatory for lockers
    pub post_number: String,
    /// Postal code of the locker
    pub postal_code: String,
    /// City of the locker
    pub city: String,
    /// Country of the locker
    pub country_code: String,
}

/// Retail outlet delivery (post office or service point)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOffice {
    /// Recipient name
    pub name: String,
    /// Outlet number
    pub retail_id: String,
    /// Recipient's post number
    pub post_number: Option<String>,
    /// Notification e-mail, used when no post number is given
    pub email: Option<String>,
    /// Postal code of the outlet
    pub postal_code: String,
    /// City of the outlet
    pub city: String,
    /// Country of the outlet
    pub country_code: String,
}

/// Where the parcel is delivered to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Consignee {
    Address(ContactAddress),
    Locker(Locker),
    PostOffice(PostOffice),
}

/// Monetary amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    /// Amount
    pub value: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
}

/// Package dimensions in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

/// Cash on delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOnDelivery {
    /// Amount to collect
    pub amount: Money,
    /// Transfer note
    pub reason_for_payment: Option<String>,
}

/// Return label ordered together with the outbound label
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnShipment {
    /// Billing number of the return procedure
    pub billing_number: String,
    /// Address the return parcel is sent to
    pub receiver: ContactAddress,
}

/// Value-added services
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    pub cash_on_delivery: Option<CashOnDelivery>,
    pub insured_value: Option<Money>,
    /// `A16` or `A18`
    pub visual_check_of_age: Option<String>,
    pub bulky_goods: bool,
    pub preferred_day: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub preferred_neighbour: Option<String>,
    pub preferred_location: Option<String>,
    /// Notification e-mail for parcels routed to an outlet
    pub parcel_outlet_routing: Option<String>,
    /// Recipient e-mail for the parcel announcement
    pub parcel_announcement: Option<String>,
    pub print_only_if_codeable: bool,
    pub no_neighbour_delivery: bool,
    pub named_person_only: bool,
    pub signed_for_by_recipient: bool,
    pub return_shipment: Option<ReturnShipment>,
}

/// One line of the export declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItem {
    /// Goods description
    pub description: String,
    /// Number of units
    pub quantity: f64,
    /// Customs tariff number
    pub hs_code: Option<String>,
    /// ISO 3166-1 alpha-2 country of origin
    pub country_of_origin: Option<String>,
    /// Value per unit
    pub item_value: Money,
    /// Net weight per unit in kilograms
    pub weight_kg: f64,
}

/// Export declaration for dutiable shipments
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customs {
    /// Export type, e.g. `COMMERCIAL_GOODS`
    pub export_type: Option<String>,
    /// Description if the export type is `OTHER`
    pub export_type_description: Option<String>,
    /// Incoterm
    pub terms_of_trade: Option<String>,
    /// Goods description of the whole package
    pub export_description: Option<String>,
    /// Postage or handling fee charged to the recipient
    pub additional_fee: Option<Money>,
    /// Customs office the goods are committed at
    pub place_of_committal: Option<String>,
    /// Export permit number
    pub permit_number: Option<String>,
    /// Attestation number
    pub attestation_number: Option<String>,
    /// Whether an electronic export notification was filed
    pub electronic_export_notification: bool,
    /// Shop invoice or order number
    pub invoice_number: Option<String>,
    /// Declared goods
    pub items: Vec<ExportItem>,
}

/// A validated label request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentOrder {
    /// Correlation key echoed back in the shipment result
    pub sequence_number: String,
    /// Product code, e.g. `V01PAK`
    pub product: String,
    /// 14 character billing number
    pub billing_number: String,
    /// Shop reference printed on the label
    pub reference: Option<String>,
    /// Day the parcel is handed over to the carrier
    pub shipment_date: NaiveDate,
    /// Sender
    pub shipper: ContactAddress,
    /// Delivery destination
    pub consignee: Consignee,
    /// Gross weight in kilograms
    pub weight_kg: f64,
    /// Package dimensions
    pub dimensions: Option<Dimensions>,
    /// Booked services
    pub services: Services,
    /// Export declaration
    pub customs: Option<Customs>,
}

/// Structural problems found while building a [`ShipmentOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join(" "))]
pub struct OrderValidationError {
    pub violations: Vec<String>,
}

/// Incrementally describes a [`ShipmentOrder`].
///
/// Every `with_*` call consumes and returns the builder, so a failing mapping
/// step simply drops the partial builder.
#[derive(Debug, Clone, Default)]
pub struct ShipmentOrderBuilder {
    sequence_number: Option<String>,
    product: Option<String>,
    billing_number: Option<String>,
    reference: Option<String>,
    shipment_date: Option<NaiveDate>,
    shipper: Option<ContactAddress>,
    consignee: Option<Consignee>,
    weight_kg: Option<f64>,
    dimensions: Option<Dimensions>,
    services: Services,
    outlet_routing_requested: bool,
    customs: Option<Customs>,
}

impl ShipmentOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence_number(mut self, sequence_number: impl Into<String>) -> Self {
        self.sequence_number = Some(sequence_number.into());
        self
    }

    pub fn with_shipper_account(mut self, billing_number: impl Into<String>) -> Self {
        self.billing_number = Some(billing_number.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_shipment_date(mut self, date: NaiveDate) -> Self {
        self.shipment_date = Some(date);
        self
    }

    pub fn with_shipper(mut self, address: ContactAddress) -> Self {
        self.shipper = Some(address);
        self
    }

    pub fn with_recipient(mut self, address: ContactAddress) -> Self {
        self.consignee = Some(Consignee::Address(address));
        self
    }

    pub fn with_locker(mut self, locker: Locker) -> Self {
        self.consignee = Some(Consignee::Locker(locker));
        self
    }

    pub fn with_post_office(mut self, post_office: PostOffice) -> Self {
        self.consignee = Some(Consignee::PostOffice(post_office));
        self
    }

    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn with_dimensions(mut self, length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        self.dimensions = Some(Dimensions {
            length_cm,
            width_cm,
            height_cm,
        });
        self
    }

    pub fn with_cod_amount(mut self, amount: Money, reason_for_payment: Option<String>) -> Self {
        self.services.cash_on_delivery = Some(CashOnDelivery {
            amount,
            reason_for_payment,
        });
        self
    }

    pub fn with_insured_value(mut self, value: Money) -> Self {
        self.services.insured_value = Some(value);
        self
    }

    pub fn with_visual_check_of_age(mut self, age: impl Into<String>) -> Self {
        self.services.visual_check_of_age = Some(age.into());
        self
    }

    pub fn with_bulky_goods(mut self) -> Self {
        self.services.bulky_goods = true;
        self
    }

    pub fn with_preferred_day(mut self, day: NaiveDate) -> Self {
        self.services.preferred_day = Some(day);
        self
    }

    pub fn with_preferred_time(mut self, time: impl Into<String>) -> Self {
        self.services.preferred_time = Some(time.into());
        self
    }

    pub fn with_preferred_neighbour(mut self, neighbour: impl Into<String>) -> Self {
        self.services.preferred_neighbour = Some(neighbour.into());
        self
    }

    pub fn with_preferred_location(mut self, location: impl Into<String>) -> Self {
        self.services.preferred_location = Some(location.into());
        self
    }

    pub fn with_parcel_outlet_routing(mut self, email: Option<String>) -> Self {
        self.outlet_routing_requested = true;
        self.services.parcel_outlet_routing = email;
        self
    }

    pub fn with_parcel_announcement(mut self, email: impl Into<String>) -> Self {
        self.services.parcel_announcement = Some(email.into());
        self
    }

    pub fn with_print_only_if_codeable(mut self) -> Self {
        self.services.print_only_if_codeable = true;
        self
    }

    pub fn with_no_neighbour_delivery(mut self) -> Self {
        self.services.no_neighbour_delivery = true;
        self
    }

    pub fn with_named_person_only(mut self) -> Self {
        self.services.named_person_only = true;
        self
    }

    pub fn with_signed_for_by_recipient(mut self) -> Self {
        self.services.signed_for_by_recipient = true;
        self
    }

    pub fn with_return_shipment(
        mut self,
        billing_number: impl Into<String>,
        receiver: ContactAddress,
    ) -> Self {
        self.services.return_shipment = Some(ReturnShipment {
            billing_number: billing_number.into(),
            receiver,
        });
        self
    }

    /// Declare customs. Items already added are kept.
    pub fn with_customs_details(mut self, customs: Customs) -> Self {
        let items = self.customs.take().map(|c| c.items).unwrap_or_default();
        self.customs = Some(Customs {
            items: [items, customs.items].concat(),
            ..customs
        });
        self
    }

    pub fn with_export_item(mut self, item: ExportItem) -> Self {
        self.customs.get_or_insert_with(Customs::default).items.push(item);
        self
    }

    /// Check the collected data and produce the order.
    pub fn build(self) -> Result<ShipmentOrder, OrderValidationError> {
        let mut violations = Vec::new();

        let sequence_number = required(self.sequence_number, "sequence number", &mut violations);
        let product = required(self.product, "product", &mut violations);
        let billing_number = required(self.billing_number, "billing number", &mut violations);
        if !billing_number.is_empty() && !is_billing_number(&billing_number) {
            violations.push(format!(
                "Billing number \"{billing_number}\" must consist of 14 alphanumeric characters."
            ));
        }

        let shipper = match self.shipper {
            Some(shipper) => {
                address_checks("Shipper", &shipper, &mut violations);
                shipper
            }
            None => {
                violations.push("Shipper address is missing.".to_string());
                ContactAddress::default()
            }
        };

        match &self.consignee {
            Some(Consignee::Address(address)) => {
                address_checks("Consignee", address, &mut violations)
            }
            Some(Consignee::Locker(locker)) => {
                if locker.locker_id.trim().is_empty() {
                    violations.push("Locker number is missing.".to_string());
                }
                if locker.post_number.trim().is_empty() {
                    violations.push("Locker delivery requires a post number.".to_string());
                }
            }
            Some(Consignee::PostOffice(office)) => {
                if office.retail_id.trim().is_empty() {
                    violations.push("Post office number is missing.".to_string());
                }
                if office.post_number.is_none() && office.email.is_none() {
                    violations.push(
                        "Post office delivery requires a post number or an e-mail address."
                            .to_string(),
                    );
                }
            }
            None => violations.push("Consignee is missing.".to_string()),
        }

        let weight_kg = match self.weight_kg {
            Some(weight) if weight.is_finite() && weight > 0.0 => weight,
            _ => {
                violations.push("Package weight must be greater than zero.".to_string());
                0.0
            }
        };

        if let Some(cod) = &self.services.cash_on_delivery {
            if cod.amount.value <= Decimal::ZERO {
                violations.push("Cash on delivery amount must be greater than zero.".to_string());
            }
        }
        if let Some(ret) = &self.services.return_shipment {
            if ret.billing_number.trim().is_empty() {
                violations.push("Return shipment requires a return billing number.".to_string());
            }
        }
        if self.outlet_routing_requested && self.services.parcel_outlet_routing.is_none() {
            violations.push(
                "Parcel outlet routing requires a notification e-mail address.".to_string(),
            );
        }
        if let Some(customs) = &self.customs {
            if customs.items.is_empty() {
                violations
                    .push("Customs declaration requires at least one export item.".to_string());
            }
        }

        let shipment_date = match self.shipment_date {
            Some(date) => date,
            None => {
                violations.push("Shipment date is missing.".to_string());
                NaiveDate::MIN
            }
        };

        let consignee = match self.consignee {
            Some(consignee) if violations.is_empty() => consignee,
            _ => return Err(OrderValidationError { violations }),
        };

        Ok(ShipmentOrder {
            sequence_number,
            product,
            billing_number,
            reference: self.reference,
            shipment_date,
            shipper,
            consignee,
            weight_kg,
            dimensions: self.dimensions,
            services: self.services,
            customs: self.customs,
        })
    }
}

fn required(value: Option<String>, field: &str, violations: &mut Vec<String>) -> String {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => v,
        None => {
            violations.push(format!("The {field} is missing."));
            String::new()
        }
    }
}

fn is_billing_number(value: &str) -> bool {
    value.len() == 14 && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn address_checks(role: &str, address: &ContactAddress, violations: &mut Vec<String>) {
    for (field, value) in [
        ("name", &address.name1),
        ("street", &address.street_name),
        ("postal code", &address.postal_code),
        ("city", &address.city),
    ] {
        if value.trim().is_empty() {
            violations.push(format!("{role} {field} is missing."));
        }
    }
    if address.country_code.len() != 2 {
        violations.push(format!("{role} country code must have two letters."));
    }
}
