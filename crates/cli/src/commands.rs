use anyhow::{Context, Result};
use config::{AppConfig, StoreConfig};
use dhlpaket_core::{AccountSettings, SalesShipmentRef, ShipmentRequest};
use pipeline::{CancelRequest, CancelShipmentsOutcome, CreateShipmentsOutcome, ShipmentManagement};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;
use webservice::mock::{MockServiceFactory, MockShipmentService};

#[derive(Debug, Clone, Serialize)]
pub struct RequestFile {
    pub path: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub path: String,
    pub request_index: usize,
    pub shipment: SalesShipmentRef,
    pub valid: bool,
    pub errors: Vec<String>,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn scan_folder(dir: &Path) -> Result<Vec<RequestFile>> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    let mut result = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let p = entry.path();
        if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
            if ext.eq_ignore_ascii_case("json") {
                let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
                result.push(RequestFile {
                    path: p.display().to_string(),
                    size_bytes,
                });
            }
        }
    }
    result.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(result)
}

/// Read shipment requests from a file holding one request or an array of requests.
pub fn load_requests(path: &Path) -> Result<Vec<ShipmentRequest>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let requests = if value.is_array() {
        serde_json::from_value::<Vec<ShipmentRequest>>(value)
    } else {
        serde_json::from_value::<ShipmentRequest>(value).map(|request| vec![request])
    }
    .with_context(|| format!("{} does not contain shipment requests", path.display()))?;
    Ok(requests)
}

pub fn validate_requests(paths: &[PathBuf]) -> Result<Vec<ValidationResult>> {
    let mut out = Vec::new();
    for path in paths {
        for (request_index, request) in load_requests(path)?.into_iter().enumerate() {
            let (valid, errors) = match dhlpaket_core::validation::validate(&request) {
                Ok(()) => (true, Vec::new()),
                Err(errs) => (false, errs),
            };
            out.push(ValidationResult {
                path: path.display().to_string(),
                request_index,
                shipment: request.sales_shipment,
                valid,
                errors,
            });
        }
    }
    Ok(out)
}

fn management(cfg: AppConfig) -> ShipmentManagement {
    tracing::info!("Using mock shipment service");
    let factory = MockServiceFactory::new(Arc::new(MockShipmentService::new()));
    ShipmentManagement::new(cfg, Arc::new(factory))
}

pub async fn create_labels(
    cfg: AppConfig,
    paths: &[PathBuf],
    out: Option<&Path>,
) -> Result<CreateShipmentsOutcome> {
    let mut requests = Vec::new();
    for path in paths {
        requests.extend(load_requests(path)?);
    }

    let outcome = management(cfg).create_labels(requests).await;

    if let Some(dir) = out {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for label in outcome.labels.values() {
            if label.label_content.is_empty() {
                tracing::warn!(
                    tracking_number = %label.tracking_number,
                    "no label document to write"
                );
                continue;
            }
            let file = dir.join(format!("{}.pdf", label.tracking_number));
            tokio::fs::write(&file, &label.label_content)
                .await
                .with_context(|| format!("Failed to write {}", file.display()))?;
            tracing::info!(path = %file.display(), "label written");
        }
    }
    Ok(outcome)
}

pub async fn cancel_labels(
    cfg: AppConfig,
    store_id: u32,
    tracking_numbers: Vec<String>,
) -> CancelShipmentsOutcome {
    let requests = tracking_numbers
        .into_iter()
        .map(|tracking_number| CancelRequest {
            store_id,
            tracking_number,
            sales_shipment: SalesShipmentRef {
                shipment_id: 0,
                order_increment_id: String::new(),
            },
        })
        .collect();
    management(cfg).cancel_labels(requests).await
}

/// Split a `procedure=participation` pair such as `01=04`.
fn parse_participation(value: &str) -> Result<(String, String)> {
    let (procedure, participation) = value
        .split_once('=')
        .with_context(|| format!("Participation {value:?} is not of the form PROCEDURE=NUMBER"))?;
    let (procedure, participation) = (procedure.trim(), participation.trim());
    for part in [procedure, participation] {
        if part.len() != 2 || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("Participation {value:?} must consist of two-character codes");
        }
    }
    Ok((procedure.to_string(), participation.to_string()))
}

/// Replace the account settings of `store_id` in `cfg`.
pub fn set_store(
    cfg: &mut AppConfig,
    store_id: u32,
    ekp: &str,
    participations: &[String],
    default_product: Option<String>,
) -> Result<StoreConfig> {
    let ekp = ekp.trim();
    if ekp.len() != 10 || !ekp.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("EKP {ekp:?} must be ten digits");
    }
    let mut account = AccountSettings::new(ekp);
    for value in participations {
        let (procedure, participation) = parse_participation(value)?;
        account = account.with_participation(&procedure, &participation);
    }

    let store = StoreConfig {
        store_id,
        default_product: default_product.filter(|p| !p.trim().is_empty()),
        account,
    };
    cfg.upsert_store(store.clone());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const REQUEST: &str = r#"{
        "sales_shipment": {"shipment_id": 4, "order_increment_id": "000000004"},
        "order": {"increment_id": "000000004", "grand_total": "12.00"},
        "shipper": {"company_name": "Shop", "street": ["Hauptstr. 1"], "city": "Bonn", "postal_code": "53113", "country_code": "DE"},
        "recipient": {"person_name": "Eva Beispiel", "street": ["Ringweg 3"], "city": "Essen", "postal_code": "45127", "country_code": "DE"},
        "packages": [{"params": {"product_code": "V01PAK", "weight": 1.0, "weight_units": "KILOGRAM"}}]
    }"#;

    #[test]
    fn test_load_single_request_and_array() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("single.json");
        let many = dir.path().join("many.json");
        fs::write(&single, REQUEST).unwrap();
        fs::write(&many, format!("[{REQUEST}, {REQUEST}]")).unwrap();

        assert_eq!(load_requests(&single).unwrap().len(), 1);
        assert_eq!(load_requests(&many).unwrap().len(), 2);
    }

    #[test]
    fn test_load_rejects_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"packages\": []}").unwrap();

        let err = load_requests(&path).unwrap_err();
        assert!(err.to_string().contains("does not contain shipment requests"));
    }

    #[test]
    fn test_scan_finds_json_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.json"), REQUEST).unwrap();
        fs::write(dir.path().join("nested").join("b.JSON"), REQUEST).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = scan_folder(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.size_bytes > 0));
        assert!(scan_folder(&dir.path().join("a.json")).is_err());
    }

    #[test]
    fn test_validate_reports_each_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let invalid = REQUEST.replace("\"Essen\"", "\"\"");
        fs::write(&path, format!("[{REQUEST}, {invalid}]")).unwrap();

        let results = validate_requests(&[path]).unwrap();
        assert!(results[0].valid);
        assert!(!results[1].valid);
        assert_eq!(results[1].errors, vec!["Recipient: city is mandatory".to_string()]);
    }

    #[tokio::test]
    async fn test_create_writes_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        fs::write(&path, REQUEST).unwrap();
        let out = dir.path().join("labels");

        let outcome = create_labels(AppConfig::default(), &[path], Some(&out))
            .await
            .unwrap();

        assert_eq!(outcome.labels.len(), 1);
        let label = &outcome.labels[&0];
        let written = fs::read(out.join(format!("{}.pdf", label.tracking_number))).unwrap();
        assert!(written.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_set_store_replaces_account() {
        let mut cfg = AppConfig::default();
        let participations = vec!["01=04".to_string(), " 07 = 02 ".to_string()];

        let store = set_store(&mut cfg, 0, "2222222222", &participations, None).unwrap();

        assert_eq!(cfg.stores.len(), 1);
        assert_eq!(cfg.store_config(0), Some(&store));
        assert_eq!(store.account.billing_number("01"), "22222222220104");
        assert_eq!(store.account.billing_number("07"), "22222222220702");
        assert_eq!(store.default_product, None);

        set_store(&mut cfg, 5, "5555555555", &[], Some("V62WP".to_string())).unwrap();
        assert_eq!(cfg.stores.len(), 2);
        assert_eq!(cfg.store_config(5).unwrap().default_product.as_deref(), Some("V62WP"));
    }

    #[test]
    fn test_set_store_rejects_malformed_settings() {
        let mut cfg = AppConfig::default();

        let err = set_store(&mut cfg, 1, "12345", &[], None).unwrap_err();
        assert!(err.to_string().contains("ten digits"));
        let err = set_store(&mut cfg, 1, "1111111111", &["0104".to_string()], None).unwrap_err();
        assert!(err.to_string().contains("PROCEDURE=NUMBER"));
        let err = set_store(&mut cfg, 1, "1111111111", &["1=04".to_string()], None).unwrap_err();
        assert!(err.to_string().contains("two-character"));

        assert_eq!(cfg, AppConfig::default());
    }

    #[tokio::test]
    async fn test_cancel_uses_store() {
        let outcome = cancel_labels(AppConfig::default(), 0, vec!["0034043".to_string()]).await;
        assert!(outcome.tracks.contains_key("0034043"));

        let outcome = cancel_labels(AppConfig::default(), 3, vec!["0034043".to_string()]).await;
        assert!(outcome.errors["0034043"].message().contains("store 3"));
    }
}
