use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain used for auth accounts created from a phone number.
pub const SYNTHETIC_EMAIL_DOMAIN: &str = "climbox.local";

#[must_use]
pub fn is_email(text: &str) -> bool {
    text.contains('@')
}

/// Keeps `+` and ASCII digits.
#[must_use]
pub fn sanitize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| *c == '+' || c.is_ascii_digit())
        .collect()
}

/// `ph_<digits>@climbox.local`, with `+` spelled `p`.
#[must_use]
pub fn phone_to_synthetic_email(phone: &str) -> String {
    let local = sanitize_phone(phone).replace('+', "p");
    format!("ph_{local}@{SYNTHETIC_EMAIL_DOMAIN}")
}

#[must_use]
pub fn display_name_index_key(display_name: &str) -> String {
    format!("displayName_{}", display_name.to_lowercase())
}

#[must_use]
pub fn phone_index_key(phone: &str) -> String {
    format!("phone_{}", sanitize_phone(phone))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
}

/// Stored user document, keyed by auth uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Address the auth account signs in with; real or synthetic.
    pub auth_email: String,
    pub display_name: String,
    #[serde(default)]
    pub contacts: Contacts,
    #[serde(default)]
    pub notification_locations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    #[must_use]
    pub fn is_subscribed(&self, location_id: &str) -> bool {
        self.notification_locations.iter().any(|l| l == location_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexKind {
    DisplayName,
    Phone,
}

/// Lookup document mapping a display name or phone to its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIndexEntry {
    pub uid: String,
    pub auth_email: String,
    #[serde(rename = "type")]
    pub kind: IndexKind,
}

/// Adds `value` unless already present.
pub fn array_union(items: &mut Vec<String>, value: &str) -> bool {
    if items.iter().any(|item| item == value) {
        return false;
    }
    items.push(value.to_owned());
    true
}

/// Removes every occurrence of `value`.
pub fn array_remove(items: &mut Vec<String>, value: &str) -> bool {
    let before = items.len();
    items.retain(|item| item != value);
    items.len() != before
}
