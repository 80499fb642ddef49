//! SMTP settings saved through the draft store.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettings {
    #[validate(length(min = 1, max = 255, message = "SMTP host is required"))]
    pub host: String,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u32,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[validate(email)]
    pub from_email: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub secure: bool,
}

impl SmtpSettings {
    /// Copy safe to echo back to clients.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.password.is_empty() {
            copy.password = "********".to_string();
        }
        copy
    }
}
