use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sandbox customer number published by the carrier for integration tests.
pub const SANDBOX_EKP: &str = "3333333333";

/// Carrier account data of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    /// Standardized customer number, the first ten characters of every billing number.
    pub ekp: String,
    /// Participation number per procedure code.
    #[serde(default)]
    pub participations: BTreeMap<String, String>,
}

impl AccountSettings {
    pub fn new(ekp: impl Into<String>) -> Self {
        Self {
            ekp: ekp.into(),
            participations: BTreeMap::new(),
        }
    }

    pub fn with_participation(mut self, procedure: &str, participation: &str) -> Self {
        self.participations
            .insert(procedure.to_string(), participation.to_string());
        self
    }

    /// The carrier's sandbox account with participation `01` for every procedure.
    pub fn sandbox() -> Self {
        ["01", "07", "53", "54", "62", "66", "82", "83", "85", "86", "87"]
            .into_iter()
            .fold(Self::new(SANDBOX_EKP), |account, procedure| {
                account.with_participation(procedure, "01")
            })
    }

    /// Empty when no participation is configured for the procedure.
    pub fn participation(&self, procedure: &str) -> &str {
        self.participations
            .get(procedure)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// EKP + procedure + participation.
    pub fn billing_number(&self, procedure: &str) -> String {
        format!("{}{}{}", self.ekp, procedure, self.participation(procedure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_number_composition() {
        let account = AccountSettings::new("2222222222").with_participation("01", "04");
        assert_eq!(account.billing_number("01"), "22222222220104");
    }

    #[test]
    fn test_missing_participation_is_empty() {
        let account = AccountSettings::new("2222222222");
        assert_eq!(account.participation("53"), "");
        assert_eq!(account.billing_number("53"), "222222222253");
    }

    #[test]
    fn test_sandbox_account() {
        let account = AccountSettings::sandbox();
        assert_eq!(account.billing_number("07"), "33333333330701");
    }
}
