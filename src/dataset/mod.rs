// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Dataset references
//!
//! A [`DatasetRef`] is the stable identity of a data artifact, used only
//! for dependency inference. Identity is the `(namespace, name)` pair;
//! attached facets are opaque payload and never participate in equality
//! or graph construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Reference to a data artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Scheme-like class of the artifact (file, api, table, custom)
    pub namespace: String,

    /// Artifact name within the namespace
    pub name: String,

    /// Opaque metadata (schema, stats); excluded from identity
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub facets: BTreeMap<String, serde_json::Value>,
}

impl DatasetRef {
    /// Reference a file artifact by path.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            namespace: "file".to_string(),
            name: path.into(),
            facets: BTreeMap::new(),
        }
    }

    /// Reference an API endpoint artifact as `service:endpoint`.
    pub fn api(service: &str, endpoint: &str) -> Self {
        Self {
            namespace: "api".to_string(),
            name: format!("{}:{}", service, endpoint),
            facets: BTreeMap::new(),
        }
    }

    /// Reference a table artifact as `dataset/<dataset>/table/<table>`.
    pub fn table(dataset: &str, table: &str) -> Self {
        Self {
            namespace: "table".to_string(),
            name: format!("dataset/{}/table/{}", dataset, table),
            facets: BTreeMap::new(),
        }
    }

    /// Reference an artifact in a caller-chosen namespace.
    ///
    /// An empty namespace falls back to `custom`.
    pub fn custom(namespace: &str, name: impl Into<String>) -> Self {
        let namespace = if namespace.is_empty() {
            "custom"
        } else {
            namespace
        };
        Self {
            namespace: namespace.to_string(),
            name: name.into(),
            facets: BTreeMap::new(),
        }
    }

    /// Attach an opaque facet (schema metadata, stats).
    pub fn with_facet(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.facets.insert(key.into(), value);
        self
    }
}

// Identity is (namespace, name) only.
impl PartialEq for DatasetRef {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for DatasetRef {}

impl Hash for DatasetRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

impl std::fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.namespace, self.name)
    }
}
