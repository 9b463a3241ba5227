use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated user, as returned by `/whoami`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name with email, for status lines.
    pub fn display_name(&self) -> String {
        match self.email {
            Some(ref email) if !email.is_empty() => format!("{} <{}>", self.name, email),
            _ => self.name.clone(),
        }
    }
}
