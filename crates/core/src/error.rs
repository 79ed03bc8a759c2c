use thiserror::Error;

/// Failures while deriving the typed view of a shipment request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Multi-package shipments are not supported.")]
    MultiPackage,

    #[error("The shipment request does not contain a package.")]
    NoPackage,

    #[error("Invalid details for service \"{code}\": {reason}")]
    InvalidService { code: String, reason: String },

    #[error("Unsupported unit of measure \"{0}\".")]
    UnknownUnit(String),

    #[error("Unable to compose billing number: no procedure is known for product \"{0}\".")]
    UnknownProcedure(String),
}
