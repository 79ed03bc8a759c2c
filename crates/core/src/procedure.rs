use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Product code to billing procedure lookup.
pub trait ProcedureResolver: Send + Sync {
    /// Procedure used to bill outbound shipments of the given product.
    fn procedure(&self, product_code: &str) -> Option<String>;

    /// Procedure used for return labels of the given product, if returns are offered.
    fn return_procedure(&self, product_code: &str) -> Option<String>;
}

static PROCEDURES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("V01PAK", "01"),
        ("V53WPAK", "53"),
        ("V54EPAK", "54"),
        ("V62WP", "62"),
        ("V66WPI", "66"),
        ("V82PARCEL", "82"),
        ("V86PARCEL", "86"),
        ("V87PARCEL", "87"),
    ])
});

static RETURN_PROCEDURES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("V01PAK", "07"),
        ("V62WP", "07"),
        ("V86PARCEL", "83"),
        ("V87PARCEL", "85"),
    ])
});

fn owned_table(table: &HashMap<&'static str, &'static str>) -> HashMap<String, String> {
    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Table based resolver. `Default` carries the German market's products.
#[derive(Debug, Clone)]
pub struct StaticProcedureResolver {
    procedures: HashMap<String, String>,
    return_procedures: HashMap<String, String>,
}

impl StaticProcedureResolver {
    pub fn empty() -> Self {
        Self {
            procedures: HashMap::new(),
            return_procedures: HashMap::new(),
        }
    }

    pub fn with_procedure(mut self, product_code: &str, procedure: &str) -> Self {
        self.procedures
            .insert(product_code.to_string(), procedure.to_string());
        self
    }

    pub fn with_return_procedure(mut self, product_code: &str, procedure: &str) -> Self {
        self.return_procedures
            .insert(product_code.to_string(), procedure.to_string());
        self
    }

    pub fn product_codes(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }
}

impl Default for StaticProcedureResolver {
    fn default() -> Self {
        Self {
            procedures: owned_table(&PROCEDURES),
            return_procedures: owned_table(&RETURN_PROCEDURES),
        }
    }
}

impl ProcedureResolver for StaticProcedureResolver {
    fn procedure(&self, product_code: &str) -> Option<String> {
        self.procedures.get(product_code).cloned()
    }

    fn return_procedure(&self, product_code: &str) -> Option<String> {
        self.return_procedures.get(product_code).cloned()
    }
}
