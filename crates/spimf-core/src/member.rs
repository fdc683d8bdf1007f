//! Member record, login methods and edit state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Display name; also the key the backend uses to look members up.
pub const DISPLAY_NAME_FIELD: &str = "your_name_nama_anda";
/// Account status shown on the dashboard.
pub const STATUS_FIELD: &str = "status_account";
/// Internal flag carried inside the member snapshot.
pub const GUEST_FLAG_FIELD: &str = "isGuest";

/// Identifier scheme used to log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LoginMethod {
    #[default]
    Phone,
    IdCard,
    KodeUser,
    /// The only method that also requires a password
    Membership,
}

impl LoginMethod {
    /// Wire name sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginMethod::Phone => "phone",
            LoginMethod::IdCard => "idCard",
            LoginMethod::KodeUser => "kodeUser",
            LoginMethod::Membership => "membership",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoginMethod::Phone => "Phone Number",
            LoginMethod::IdCard => "ID Card Registration",
            LoginMethod::KodeUser => "Kode User",
            LoginMethod::Membership => "Membership Account",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            LoginMethod::Phone => "Enter your phone number",
            LoginMethod::IdCard => "Enter your ID Card number",
            LoginMethod::KodeUser => "Enter your Kode User",
            LoginMethod::Membership => "Enter your membership account",
        }
    }

    pub fn requires_password(&self) -> bool {
        matches!(self, LoginMethod::Membership)
    }

    pub fn all() -> &'static [LoginMethod] {
        &[
            LoginMethod::Phone,
            LoginMethod::IdCard,
            LoginMethod::KodeUser,
            LoginMethod::Membership,
        ]
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "idcard" | "id-card" | "id_card" => Ok(Self::IdCard),
            "kodeuser" | "kode-user" | "kode_user" => Ok(Self::KodeUser),
            "membership" => Ok(Self::Membership),
            _ => Err(format!(
                "Unknown login method: {value} (expected phone, idCard, kodeUser or membership)"
            )),
        }
    }
}

/// Member profile as returned by the backend.
///
/// The field set is backend-defined. Values are kept as strings; scalars of
/// other JSON types are stringified on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Member {
    fields: BTreeMap<String, String>,
}

impl Member {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Display name, if present and non-blank.
    pub fn display_name(&self) -> Option<&str> {
        self.get(DISPLAY_NAME_FIELD)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn status(&self) -> Option<&str> {
        self.get(STATUS_FIELD)
            .map(str::trim)
            .filter(|status| !status.is_empty())
    }

    pub fn is_guest(&self) -> bool {
        self.get(GUEST_FLAG_FIELD)
            .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
    }

    pub(crate) fn set_guest(&mut self, is_guest: bool) {
        if is_guest {
            self.set(GUEST_FLAG_FIELD, "true");
        } else {
            self.fields.remove(GUEST_FLAG_FIELD);
        }
    }

    /// Profile fields in name order, without internal flags.
    pub fn profile_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(k, _)| k.as_str() != GUEST_FLAG_FIELD)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// False for internal keys such as the guest flag.
    pub fn is_editable_field(field: &str) -> bool {
        field != GUEST_FLAG_FIELD
    }

    pub fn is_empty(&self) -> bool {
        self.profile_fields().next().is_none()
    }
}

impl<'de> Deserialize<'de> for Member {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let fields = raw
            .into_iter()
            .map(|(k, v)| (k, value_to_string(v)))
            .collect();
        Ok(Self { fields })
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other @ (Value::Array(_) | Value::Object(_)) => other.to_string(),
    }
}

/// Field currently open in an edit prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub field: String,
    pub current_value: String,
}

/// Method and identifier of the last member login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginContext {
    pub method: LoginMethod,
    pub identifier: String,
}
