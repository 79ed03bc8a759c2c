//! Structural validation of shipment requests before any mapping happens.

mod rules;

use crate::models::ShipmentRequest;

/// Run every rule and collect all violations.
pub fn validate(request: &ShipmentRequest) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();
    if let Err(mut re) = rules::package_checks(request) {
        errs.append(&mut re);
    }
    if let Err(mut re) = rules::address_checks(request) {
        errs.append(&mut re);
    }
    if let Err(mut re) = rules::service_checks(request) {
        errs.append(&mut re);
    }
    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

#[cfg(test)]
mod tests;
