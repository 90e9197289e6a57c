//! The assembled output document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Swagger version written into every document.
pub const SWAGGER_VERSION: &str = "2.0";

/// Document title and API version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// Full schema for one requested root resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResource {
    /// Normalized name of the resource definition.
    pub name: String,
    pub schema: Schema,
}

/// A closed OpenAPI v2 document: every `$ref` in `definitions` and
/// `resources` points at a key of `definitions`.
///
/// # Examples
///
/// ```
/// use crd_openapi_core::{Document, Info};
///
/// let doc = Document::new(Info { title: "Example".into(), version: "v1".into() });
/// let json = serde_json::to_value(&doc).unwrap();
/// assert_eq!(json["swagger"], "2.0");
/// assert_eq!(json["info"]["title"], "Example");
/// assert!(json.get("x-resources").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub swagger: String,
    pub info: Info,
    #[serde(default)]
    pub definitions: BTreeMap<String, Schema>,
    /// Root resources in the order they were requested.
    #[serde(rename = "x-resources", default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<RootResource>,
}

impl Document {
    pub fn new(info: Info) -> Self {
        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info,
            definitions: BTreeMap::new(),
            resources: Vec::new(),
        }
    }

    pub fn definition(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }
}
