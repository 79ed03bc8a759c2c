//! Value-added service options.
//!
//! The platform submits service selections as a map of service code to a
//! details object, e.g. `"preferredDay": {"enabled": true, "date": "2026-10-20"}`.
//! [`ServiceSet::decode`] turns that map into [`ServiceOption`] variants once,
//! at the boundary. Disabled entries are dropped, unknown codes are logged and
//! ignored, malformed details of a known code are rejected.

use crate::error::ExtractionError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const CASH_ON_DELIVERY: &str = "cashOnDelivery";
pub const ADDITIONAL_INSURANCE: &str = "additionalInsurance";
pub const VISUAL_CHECK_OF_AGE: &str = "visualCheckOfAge";
pub const BULKY_GOODS: &str = "bulkyGoods";
pub const PREFERRED_DAY: &str = "preferredDay";
pub const PREFERRED_TIME: &str = "preferredTime";
pub const PREFERRED_NEIGHBOUR: &str = "preferredNeighbour";
pub const PREFERRED_LOCATION: &str = "preferredLocation";
pub const PARCEL_OUTLET_ROUTING: &str = "parcelOutletRouting";
pub const RETURN_SHIPMENT: &str = "returnShipment";
pub const PRINT_ONLY_IF_CODEABLE: &str = "printOnlyIfCodeable";
pub const PARCEL_ANNOUNCEMENT: &str = "parcelAnnouncement";
pub const NO_NEIGHBOUR_DELIVERY: &str = "noNeighbourDelivery";
pub const NAMED_PERSON_ONLY: &str = "namedPersonOnly";
pub const SIGNED_FOR_BY_RECIPIENT: &str = "signedForByRecipient";
pub const PARCELSHOP_FINDER: &str = "parcelshopFinder";

/// Every service code [`ServiceOption::decode`] understands.
pub const KNOWN_CODES: [&str; 16] = [
    CASH_ON_DELIVERY,
    ADDITIONAL_INSURANCE,
    VISUAL_CHECK_OF_AGE,
    BULKY_GOODS,
    PREFERRED_DAY,
    PREFERRED_TIME,
    PREFERRED_NEIGHBOUR,
    PREFERRED_LOCATION,
    PARCEL_OUTLET_ROUTING,
    RETURN_SHIPMENT,
    PRINT_ONLY_IF_CODEABLE,
    PARCEL_ANNOUNCEMENT,
    NO_NEIGHBOUR_DELIVERY,
    NAMED_PERSON_ONLY,
    SIGNED_FOR_BY_RECIPIENT,
    PARCELSHOP_FINDER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeCheck {
    A16,
    A18,
}

impl AgeCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeCheck::A16 => "A16",
            AgeCheck::A18 => "A18",
        }
    }
}

impl FromStr for AgeCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A16" => Ok(AgeCheck::A16),
            "A18" => Ok(AgeCheck::A18),
            other => Err(format!("unknown age check \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupLocationType {
    Locker,
    #[serde(rename = "postoffice")]
    PostOffice,
    #[serde(rename = "servicepoint")]
    ServicePoint,
}

/// Locker or retail outlet chosen by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupLocation {
    pub kind: PickupLocationType,
    pub id: Option<String>,
    /// Locker number or retail outlet number printed on the label.
    pub number: String,
    pub customer_post_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOption {
    CashOnDelivery { reason_for_payment: Option<String> },
    AdditionalInsurance,
    VisualCheckOfAge(AgeCheck),
    BulkyGoods,
    PreferredDay(NaiveDate),
    PreferredTime(String),
    PreferredNeighbour(String),
    PreferredLocation(String),
    ParcelOutletRouting { email: Option<String> },
    ReturnShipment,
    PrintOnlyIfCodeable,
    ParcelAnnouncement,
    NoNeighbourDelivery,
    NamedPersonOnly,
    SignedForByRecipient,
    PickupLocation(PickupLocation),
}

impl ServiceOption {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceOption::CashOnDelivery { .. } => CASH_ON_DELIVERY,
            ServiceOption::AdditionalInsurance => ADDITIONAL_INSURANCE,
            ServiceOption::VisualCheckOfAge(_) => VISUAL_CHECK_OF_AGE,
            ServiceOption::BulkyGoods => BULKY_GOODS,
            ServiceOption::PreferredDay(_) => PREFERRED_DAY,
            ServiceOption::PreferredTime(_) => PREFERRED_TIME,
            ServiceOption::PreferredNeighbour(_) => PREFERRED_NEIGHBOUR,
            ServiceOption::PreferredLocation(_) => PREFERRED_LOCATION,
            ServiceOption::ParcelOutletRouting { .. } => PARCEL_OUTLET_ROUTING,
            ServiceOption::ReturnShipment => RETURN_SHIPMENT,
            ServiceOption::PrintOnlyIfCodeable => PRINT_ONLY_IF_CODEABLE,
            ServiceOption::ParcelAnnouncement => PARCEL_ANNOUNCEMENT,
            ServiceOption::NoNeighbourDelivery => NO_NEIGHBOUR_DELIVERY,
            ServiceOption::NamedPersonOnly => NAMED_PERSON_ONLY,
            ServiceOption::SignedForByRecipient => SIGNED_FOR_BY_RECIPIENT,
            ServiceOption::PickupLocation(_) => PARCELSHOP_FINDER,
        }
    }

    /// Decode one raw entry. `Ok(None)` means the service is not selected.
    pub fn decode(code: &str, raw: &Value) -> Result<Option<Self>, ExtractionError> {
        if !KNOWN_CODES.contains(&code) {
            tracing::warn!(service_code = %code, details = %raw, "ignoring unknown service code");
            return Ok(None);
        }

        // flag services may be submitted as a bare boolean
        match raw {
            Value::Null | Value::Bool(false) => return Ok(None),
            Value::Bool(true) => return Self::decode_flag(code),
            _ => {}
        }

        let toggle: Toggle = parse(code, raw)?;
        match toggle.enabled {
            Some(true) => {}
            Some(false) => return Ok(None),
            None => {
                tracing::warn!(
                    service_code = %code,
                    details = %raw,
                    "service entry has no enabled flag, not selected"
                );
                return Ok(None);
            }
        }

        let option = match code {
            CASH_ON_DELIVERY => {
                let d: TextDetails = parse(code, raw)?;
                ServiceOption::CashOnDelivery {
                    reason_for_payment: d.details.filter(|s| !s.trim().is_empty()),
                }
            }
            VISUAL_CHECK_OF_AGE => {
                let d: TextDetails = parse(code, raw)?;
                let age = d
                    .details
                    .ok_or_else(|| invalid(code, "age check missing"))?
                    .parse::<AgeCheck>()
                    .map_err(|reason| invalid(code, &reason))?;
                ServiceOption::VisualCheckOfAge(age)
            }
            PREFERRED_DAY => {
                let d: DateDetails = parse(code, raw)?;
                let date = NaiveDate::parse_from_str(d.date.trim(), "%Y-%m-%d")
                    .map_err(|e| invalid(code, &e.to_string()))?;
                ServiceOption::PreferredDay(date)
            }
            PREFERRED_TIME => ServiceOption::PreferredTime(required_text(code, raw)?),
            PREFERRED_NEIGHBOUR => ServiceOption::PreferredNeighbour(required_text(code, raw)?),
            PREFERRED_LOCATION => ServiceOption::PreferredLocation(required_text(code, raw)?),
            PARCEL_OUTLET_ROUTING => {
                let d: TextDetails = parse(code, raw)?;
                ServiceOption::ParcelOutletRouting {
                    email: d.details.filter(|s| !s.trim().is_empty()),
                }
            }
            PARCELSHOP_FINDER => {
                let d: PickupDetails = parse(code, raw)?;
                if d.location_number.trim().is_empty() {
                    return Err(invalid(code, "location number missing"));
                }
                ServiceOption::PickupLocation(PickupLocation {
                    kind: d.location_type,
                    id: d.location_id,
                    number: d.location_number,
                    customer_post_number: d.customer_postnumber.filter(|s| !s.is_empty()),
                    postal_code: d.postal_code,
                    city: d.city,
                    country_code: d.country_code,
                })
            }
            _ => return Self::decode_flag(code),
        };

        Ok(Some(option))
    }

    fn decode_flag(code: &str) -> Result<Option<Self>, ExtractionError> {
        let option = match code {
            ADDITIONAL_INSURANCE => ServiceOption::AdditionalInsurance,
            BULKY_GOODS => ServiceOption::BulkyGoods,
            RETURN_SHIPMENT => ServiceOption::ReturnShipment,
            PRINT_ONLY_IF_CODEABLE => ServiceOption::PrintOnlyIfCodeable,
            PARCEL_ANNOUNCEMENT => ServiceOption::ParcelAnnouncement,
            NO_NEIGHBOUR_DELIVERY => ServiceOption::NoNeighbourDelivery,
            NAMED_PERSON_ONLY => ServiceOption::NamedPersonOnly,
            SIGNED_FOR_BY_RECIPIENT => ServiceOption::SignedForByRecipient,
            CASH_ON_DELIVERY => ServiceOption::CashOnDelivery {
                reason_for_payment: None,
            },
            PARCEL_OUTLET_ROUTING => ServiceOption::ParcelOutletRouting { email: None },
            VISUAL_CHECK_OF_AGE | PREFERRED_DAY | PREFERRED_TIME | PREFERRED_NEIGHBOUR
            | PREFERRED_LOCATION | PARCELSHOP_FINDER => {
                return Err(invalid(code, "service details missing"))
            }
            other => return Err(invalid(other, "service is not a flag")),
        };
        Ok(Some(option))
    }
}

#[derive(Deserialize)]
struct Toggle {
    #[serde(default)]
    enabled: Option<bool>,
}

#[derive(Deserialize)]
struct TextDetails {
    #[serde(default)]
    details: Option<String>,
}

#[derive(Deserialize)]
struct DateDetails {
    date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PickupDetails {
    location_type: PickupLocationType,
    #[serde(default)]
    location_id: Option<String>,
    location_number: String,
    #[serde(default)]
    customer_postnumber: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

fn invalid(code: &str, reason: &str) -> ExtractionError {
    ExtractionError::InvalidService {
        code: code.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T: DeserializeOwned>(code: &str, raw: &Value) -> Result<T, ExtractionError> {
    serde_json::from_value(raw.clone()).map_err(|e| invalid(code, &e.to_string()))
}

fn required_text(code: &str, raw: &Value) -> Result<String, ExtractionError> {
    let d: TextDetails = parse(code, raw)?;
    d.details
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| invalid(code, "details missing"))
}

/// The selected services of one shipment request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSet {
    options: Vec<ServiceOption>,
}

impl ServiceSet {
    pub fn decode(raw: &BTreeMap<String, Value>) -> Result<Self, ExtractionError> {
        let mut options = Vec::with_capacity(raw.len());
        for (code, value) in raw {
            if let Some(option) = ServiceOption::decode(code, value)? {
                options.push(option);
            }
        }
        Ok(Self { options })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceOption> {
        self.options.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.options.iter().any(|o| o.code() == code)
    }

    pub fn cash_on_delivery(&self) -> Option<Option<&str>> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::CashOnDelivery { reason_for_payment } => {
                Some(reason_for_payment.as_deref())
            }
            _ => None,
        })
    }

    pub fn visual_check_of_age(&self) -> Option<AgeCheck> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::VisualCheckOfAge(age) => Some(*age),
            _ => None,
        })
    }

    pub fn preferred_day(&self) -> Option<NaiveDate> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::PreferredDay(day) => Some(*day),
            _ => None,
        })
    }

    pub fn preferred_time(&self) -> Option<&str> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::PreferredTime(time) => Some(time.as_str()),
            _ => None,
        })
    }

    pub fn preferred_neighbour(&self) -> Option<&str> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::PreferredNeighbour(neighbour) => Some(neighbour.as_str()),
            _ => None,
        })
    }

    pub fn preferred_location(&self) -> Option<&str> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::PreferredLocation(location) => Some(location.as_str()),
            _ => None,
        })
    }

    pub fn parcel_outlet_routing(&self) -> Option<Option<&str>> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::ParcelOutletRouting { email } => Some(email.as_deref()),
            _ => None,
        })
    }

    pub fn pickup_location(&self) -> Option<&PickupLocation> {
        self.options.iter().find_map(|o| match o {
            ServiceOption::PickupLocation(location) => Some(location),
            _ => None,
        })
    }
}
