//! Carrier-agnostic shipment request handling for the DHL Paket integration.
//!
//! The calling workflow hands over loosely-typed [`models::ShipmentRequest`]
//! bags. This crate validates them ([`validation`]) and exposes a typed view
//! over them ([`extractor::RequestExtractor`]) that the label pipelines map
//! into web service requests.

pub mod address;
pub mod billing;
pub mod error;
pub mod extractor;
pub mod models;
pub mod procedure;
pub mod services;
pub mod units;
pub mod validation;

pub use billing::AccountSettings;
pub use error::ExtractionError;
pub use extractor::RequestExtractor;
pub use models::{SalesShipmentRef, ShipmentRequest};
pub use procedure::{ProcedureResolver, StaticProcedureResolver};
pub use units::{DefaultUnitConverter, DimensionUnit, UnitConverter, WeightUnit};
