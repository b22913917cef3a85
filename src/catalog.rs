//! # Catalog
//! Read-only list of services and the platforms under them, loaded from JSON:
//!
//! ```json
//! { "services": [ { "name": "Messaging" } ],
//!   "platforms": [ { "id": "slack", "name": "Slack", "service": "Messaging",
//!                    "appId": "com.Slack" } ] }
//! ```
//!
//! Lookups by service are case-insensitive; ids match exactly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Play Store package id used for review analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    services: Vec<Service>,
    #[serde(default)]
    platforms: Vec<Platform>,
}

impl Catalog {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing platform catalog")
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading catalog from {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn platforms_for_service(&self, service: &str) -> Vec<&Platform> {
        let wanted = service.trim();
        self.platforms
            .iter()
            .filter(|p| p.service.eq_ignore_ascii_case(wanted))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "services": [ { "name": "Messaging" }, { "name": "Ride Hailing", "description": "Taxis" } ],
        "platforms": [
            { "id": "slack", "name": "Slack", "service": "Messaging", "appId": "com.Slack", "rating": 4.4 },
            { "id": "uber", "name": "Uber", "service": "Ride Hailing" }
        ]
    }"#;

    #[test]
    fn lookup_by_service_and_id() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(c.services().len(), 2);
        assert_eq!(c.len(), 2);

        let msg = c.platforms_for_service("messaging");
        assert_eq!(msg.len(), 1);
        assert_eq!(msg[0].app_id.as_deref(), Some("com.Slack"));
        assert!(c.platforms_for_service("Banking").is_empty());

        assert_eq!(c.find("uber").map(|p| p.name.as_str()), Some("Uber"));
        assert!(c.find("UBER").is_none());
    }

    #[test]
    fn platform_json_is_camel_case_and_sparse() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        let v = serde_json::to_value(c.find("slack").unwrap()).unwrap();
        assert_eq!(v["appId"], "com.Slack");
        assert!(v.get("category").is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Catalog::load_from_file("does/not/exist.json").is_err());
    }
}
