//! User profile and account type models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kinds of account a user can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Checking,
    Savings,
    #[serde(rename = "IRA")]
    Ira,
    Credit,
    Debit,
}

impl AccountType {
    /// All account types, in the order they are offered to the user.
    pub const ALL: [AccountType; 5] = [
        Self::Checking,
        Self::Savings,
        Self::Ira,
        Self::Credit,
        Self::Debit,
    ];

    /// Display label, as shown on choice buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::Ira => "IRA",
            Self::Credit => "Credit",
            Self::Debit => "Debit",
        }
    }

    /// Labels of every account type, for choice prompts.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|a| a.label().to_string()).collect()
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown account type: {s}"))
    }
}

/// Banking profile collected during the conversation.
///
/// Every field starts empty; a missing stored profile reads as `default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    /// Set once the balance is recorded and the receipt has been shown.
    #[serde(default)]
    pub ready_for_checkout: bool,
}

impl UserProfile {
    /// Whether no field has been collected yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record the opening balance and mark the profile ready for checkout.
    pub fn record_opening_balance(&mut self, balance: Decimal) {
        self.balance = Some(balance);
        self.ready_for_checkout = true;
    }

    /// Forget the opening balance so it is asked for again.
    pub fn reset_opening_balance(&mut self) {
        self.balance = None;
        self.ready_for_checkout = false;
    }

    /// Wipe every collected field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("savings".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert_eq!(" IRA ".parse::<AccountType>().unwrap(), AccountType::Ira);
        assert_eq!("ira".parse::<AccountType>().unwrap(), AccountType::Ira);
        assert!("brokerage".parse::<AccountType>().is_err());
    }

    #[test]
    fn account_type_display_matches_serde() {
        for account in AccountType::ALL {
            let json = serde_json::to_string(&account).unwrap();
            assert_eq!(json, format!("\"{account}\""));
        }
    }

    #[test]
    fn labels_are_in_offer_order() {
        assert_eq!(
            AccountType::labels(),
            vec!["Checking", "Savings", "IRA", "Credit", "Debit"]
        );
    }

    #[test]
    fn default_profile_is_empty() {
        let profile = UserProfile::default();
        assert!(profile.is_empty());
        assert!(!profile.ready_for_checkout);
    }

    #[test]
    fn opening_balance_sets_and_resets_checkout_flag() {
        let mut profile = UserProfile::default();
        profile.record_opening_balance(dec!(500));
        assert_eq!(profile.balance, Some(dec!(500)));
        assert!(profile.ready_for_checkout);

        profile.reset_opening_balance();
        assert!(profile.balance.is_none());
        assert!(!profile.ready_for_checkout);
    }

    #[test]
    fn clear_wipes_every_field() {
        let mut profile = UserProfile {
            name: Some("Ada".into()),
            address: Some("1 Main St".into()),
            account: Some(AccountType::Checking),
            balance: Some(dec!(10)),
            ready_for_checkout: true,
        };
        profile.clear();
        assert!(profile.is_empty());
    }

    #[test]
    fn profile_json_shape() {
        let profile = UserProfile {
            name: Some("Ada".into()),
            account: Some(AccountType::Ira),
            balance: Some(dec!(250.50)),
            ready_for_checkout: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["account"], "IRA");
        assert_eq!(json["balance"], "250.50");
        assert_eq!(json["readyForCheckout"], true);
        assert!(json.get("address").is_none());

        let parsed: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let parsed: UserProfile = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
