//! # Layout Documents
//!
//! The records exchanged with a [`LayoutStore`](crate::layout::LayoutStore).
//!
//! ## Structure
//!
//! ```text
//! LayoutDocument
//! ├── id, name, ownerId
//! ├── schemaVersion (major must match SCHEMA_VERSION)
//! ├── modules, connections
//! └── createdAt, updatedAt
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::layout::{LayoutDocument, NewLayout};
//!
//! let doc = LayoutDocument::create("layout-1", NewLayout::empty("Hall A", "user-1"));
//! assert!(doc.check_schema_version().is_ok());
//!
//! let json = serde_json::to_string_pretty(&doc).unwrap();
//! assert!(json.contains("\"ownerId\""));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::layout::model::{Connection, LayoutSnapshot, Module};

/// Current schema version for stored layouts
pub const SCHEMA_VERSION: &str = "1.0.0";

/// A stored layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub schema_version: String,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LayoutDocument {
    /// Build the stored record for a create request.
    pub fn create(id: impl Into<String>, layout: NewLayout) -> Self {
        let now = Utc::now();
        LayoutDocument {
            id: id.into(),
            name: layout.name,
            owner_id: layout.owner_id,
            schema_version: SCHEMA_VERSION.to_string(),
            modules: layout.modules,
            connections: layout.connections,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::new(self.modules.clone(), self.connections.clone())
    }

    /// Overwrite modules/connections from an autosave.
    pub fn apply_update(&mut self, update: LayoutUpdate) {
        self.modules = update.modules;
        self.connections = update.connections;
        self.updated_at = update.updated_at;
    }

    /// Fail with `VersionMismatch` unless the major version matches.
    pub fn check_schema_version(&self) -> CalcResult<()> {
        check_schema_version(&self.schema_version)
    }
}

/// Autosave payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutUpdate {
    pub modules: Vec<Module>,
    pub connections: Vec<Connection>,
    pub updated_at: DateTime<Utc>,
}

impl LayoutUpdate {
    /// Update stamped with the current time
    pub fn from_snapshot(snapshot: LayoutSnapshot) -> Self {
        LayoutUpdate {
            modules: snapshot.modules,
            connections: snapshot.connections,
            updated_at: Utc::now(),
        }
    }
}

/// Create payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLayout {
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl NewLayout {
    pub fn empty(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        NewLayout {
            name: name.into(),
            owner_id: owner_id.into(),
            modules: Vec::new(),
            connections: Vec::new(),
        }
    }
}

/// Validate that a stored version is compatible with [`SCHEMA_VERSION`].
pub fn check_schema_version(version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let major = |v: &str| v.split('.').next().and_then(|p| p.trim().parse::<u32>().ok());
    match (major(version), major(SCHEMA_VERSION)) {
        (Some(found), Some(expected)) if found == expected => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_validation() {
        assert!(check_schema_version(SCHEMA_VERSION).is_ok());
        assert!(check_schema_version("1.4.2").is_ok());

        let err = check_schema_version("2.0.0").unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        assert!(check_schema_version("0.9.0").is_err());
        assert!(check_schema_version("banana").is_err());
    }

    #[test]
    fn test_create_and_update() {
        let mut doc = LayoutDocument::create("l-1", NewLayout::empty("Hall B", "owner"));
        assert_eq!(doc.created_at, doc.updated_at);
        assert!(doc.snapshot().is_empty());

        let snapshot = LayoutSnapshot::new(vec![Module::new("rack")], vec![]);
        let update = LayoutUpdate::from_snapshot(snapshot.clone());
        doc.apply_update(update);
        assert_eq!(doc.snapshot(), snapshot);
        assert!(doc.updated_at >= doc.created_at);
    }

    #[test]
    fn test_document_json_shape() {
        let doc = LayoutDocument::create("l-1", NewLayout::empty("Hall B", "owner"));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["schemaVersion"], SCHEMA_VERSION);
        assert!(json["createdAt"].is_string());

        let back: LayoutDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
