use crate::models::{ContactBag, ShipmentRequest};
use crate::services::{PickupLocationType, ServiceSet};
use crate::units::{DimensionUnit, WeightUnit};

pub fn package_checks(request: &ShipmentRequest) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();

    let package = match request.packages.as_slice() {
        [package] => package,
        [] => {
            errs.push("The shipment request does not contain a package.".to_string());
            return Err(errs);
        }
        _ => {
            errs.push("Multi-package shipments are not supported.".to_string());
            return Err(errs);
        }
    };
    let params = &package.params;

    if params.product_code.trim().is_empty() {
        errs.push("Package: shipping product is mandatory".to_string());
    }

    if !params.weight.is_finite() || params.weight <= 0.0 {
        errs.push("Package: weight must be greater than zero".to_string());
    }
    if params.weight_units.parse::<WeightUnit>().is_err() {
        errs.push(format!(
            "Package: unsupported weight unit \"{}\"",
            params.weight_units
        ));
    }

    if let Some(unit) = params.dimension_units.as_deref() {
        if unit.parse::<DimensionUnit>().is_err() {
            errs.push(format!("Package: unsupported dimension unit \"{unit}\""));
        }
    }
    for (label, value) in [
        ("length", params.length),
        ("width", params.width),
        ("height", params.height),
    ] {
        if matches!(value, Some(v) if !v.is_finite() || v <= 0.0) {
            errs.push(format!("Package: {label} must be greater than zero"));
        }
    }

    if params.customs_value.is_some() && package.items.is_empty() {
        errs.push("Package: customs declaration requires at least one package item".to_string());
    }

    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

fn contact_checks(role: &str, contact: &ContactBag, errs: &mut Vec<String>) {
    if contact.person_name.trim().is_empty() && contact.company_name.is_none() {
        errs.push(format!("{role}: name is mandatory"));
    }
    if contact.street.iter().all(|line| line.trim().is_empty()) {
        errs.push(format!("{role}: street is mandatory"));
    }
    if contact.city.trim().is_empty() {
        errs.push(format!("{role}: city is mandatory"));
    }
    if contact.postal_code.trim().is_empty() {
        errs.push(format!("{role}: postal code is mandatory"));
    }
    let country = contact.country_code.trim();
    if country.is_empty() {
        errs.push(format!("{role}: country is mandatory"));
    } else if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        errs.push(format!(
            "{role}: country must be a 2-letter ISO 3166 code"
        ));
    }
}

pub fn address_checks(request: &ShipmentRequest) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();
    contact_checks("Shipper", &request.shipper, &mut errs);
    contact_checks("Recipient", &request.recipient, &mut errs);
    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

/// Reject service selections the carrier cannot combine.
pub fn service_checks(request: &ShipmentRequest) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();

    let services = match ServiceSet::decode(&request.services) {
        Ok(services) => services,
        Err(e) => {
            errs.push(e.to_string());
            return Err(errs);
        }
    };

    if let Some(location) = services.pickup_location() {
        if services.preferred_neighbour().is_some() {
            errs.push(
                "Preferred neighbour cannot be booked for pickup-location delivery".to_string(),
            );
        }
        if services.preferred_location().is_some() {
            errs.push(
                "Preferred location cannot be booked for pickup-location delivery".to_string(),
            );
        }
        if location.kind == PickupLocationType::Locker && location.customer_post_number.is_none() {
            errs.push("Locker delivery requires the recipient's post number".to_string());
        }
    }

    if services.preferred_neighbour().is_some()
        && services.contains(crate::services::NO_NEIGHBOUR_DELIVERY)
    {
        errs.push("Preferred neighbour cannot be combined with no-neighbour delivery".to_string());
    }

    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}
