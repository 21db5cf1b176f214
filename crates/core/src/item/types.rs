//! Core item data types.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Status assigned to an item by the bulk processor.
pub const PROCESSED_STATUS: &str = "PROCESSED";

/// Status given to freshly created items that did not specify one.
pub const DEFAULT_STATUS: &str = "QUEUED";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier. `None` until the item is first saved.
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form status, e.g. `QUEUED`, `PROCESSED`, `ACTIVE`.
    #[serde(default = "default_status")]
    pub status: String,
    pub email: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Item {
    /// Create an unsaved item.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        status: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            status: status.into(),
            email: email.into(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether this item has gone through the bulk processor.
    pub fn is_processed(&self) -> bool {
        self.status == PROCESSED_STATUS
    }

    /// Check the fields a client is allowed to submit.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be blank".to_string());
        }
        if self.status.trim().is_empty() {
            return Err("status must not be blank".to_string());
        }
        if !is_valid_email(&self.email) {
            return Err(format!("invalid email address: {:?}", self.email));
        }
        Ok(())
    }
}

/// Syntactic email check (`local@domain.tld`).
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_item() -> Item {
        Item::new("name1", "description1", "QUEUED", "email1@test.com")
    }

    #[test]
    fn test_valid_item_passes() {
        assert!(valid_item().validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut item = valid_item();
        item.name = "   ".to_string();
        assert!(item.validate().unwrap_err().contains("name"));
    }

    #[test]
    fn test_blank_status_rejected() {
        let mut item = valid_item();
        item.status = String::new();
        assert!(item.validate().unwrap_err().contains("status"));
    }

    #[test]
    fn test_email_formats() {
        assert!(is_valid_email("email1@test.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@test.com"));
        assert!(!is_valid_email("two@@test.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_deserialize_without_id_or_status() {
        let json = r#"{"name":"n","description":"d","email":"a@b.io"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, None);
        assert_eq!(item.status, DEFAULT_STATUS);
    }

    #[test]
    fn test_serialize_shape() {
        let item = valid_item().with_id(7);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "name1");
        assert_eq!(value["description"], "description1");
        assert_eq!(value["status"], "QUEUED");
        assert_eq!(value["email"], "email1@test.com");
    }

    #[test]
    fn test_is_processed() {
        let mut item = valid_item();
        assert!(!item.is_processed());
        item.status = PROCESSED_STATUS.to_string();
        assert!(item.is_processed());
    }
}
