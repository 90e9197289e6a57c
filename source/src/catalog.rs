//! Primary catalog loading.
//!
//! A catalog lists the generated definitions for the resource types of
//! interest, keyed by qualified name. Cross-references inside it name their
//! target by qualified name as well:
//!
//! ```yaml
//! definitions:
//!   github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.PodMonitor:
//!     type: object
//!     properties:
//!       metadata:
//!         $ref: k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta
//! ```
//!
//! Files ending in `.yaml` or `.yml` are read as YAML, anything else as
//! JSON.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use crd_openapi_core::{CatalogProducer, Schema};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SourceError};

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    definitions: BTreeMap<String, Schema>,
}

/// Catalog file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Loads a primary catalog, choosing the format from the file extension.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, and
/// [`SourceError::Json`] or [`SourceError::Yaml`] if parsing fails.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<CatalogProducer> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|err| SourceError::io(path, err))?;
    let reader = BufReader::new(file);

    let catalog: CatalogFile = match CatalogFormat::from_path(path) {
        CatalogFormat::Json => serde_json::from_reader(reader)?,
        CatalogFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    debug!(path = %path.display(), definitions = catalog.definitions.len(), "loaded primary catalog");
    Ok(CatalogProducer::new(catalog.definitions))
}

/// Parses a primary catalog from a string.
///
/// # Examples
///
/// ```
/// use crd_openapi_source::{CatalogFormat, parse_catalog};
///
/// let catalog = parse_catalog(
///     "definitions:\n  example.com/apis/v1.Widget:\n    type: object\n",
///     CatalogFormat::Yaml,
/// )
/// .unwrap();
/// assert!(catalog.contains("example.com/apis/v1.Widget"));
/// ```
pub fn parse_catalog(text: &str, format: CatalogFormat) -> Result<CatalogProducer> {
    let catalog: CatalogFile = match format {
        CatalogFormat::Json => serde_json::from_str(text)?,
        CatalogFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(CatalogProducer::new(catalog.definitions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(CatalogFormat::from_path(Path::new("defs.yaml")), CatalogFormat::Yaml);
        assert_eq!(CatalogFormat::from_path(Path::new("defs.yml")), CatalogFormat::Yaml);
        assert_eq!(CatalogFormat::from_path(Path::new("defs.json")), CatalogFormat::Json);
        assert_eq!(CatalogFormat::from_path(Path::new("defs")), CatalogFormat::Json);
    }

    #[test]
    fn test_parse_json_catalog() {
        let catalog = parse_catalog(
            r#"{ "definitions": {
                "example.com/apis/v1.Widget": { "type": "object" },
                "example.com/apis/v1.WidgetSpec": { "type": "object" }
            } }"#,
            CatalogFormat::Json,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["example.com/apis/v1.Widget", "example.com/apis/v1.WidgetSpec"]
        );
    }

    #[test]
    fn test_yaml_ref_keys_survive() {
        let yaml = r#"
definitions:
  example.com/apis/v1.Widget:
    type: object
    properties:
      metadata:
        $ref: k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta
"#;
        let catalog = parse_catalog(yaml, CatalogFormat::Yaml).unwrap();
        assert!(catalog.contains("example.com/apis/v1.Widget"));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = parse_catalog("{}", CatalogFormat::Json).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        let err = parse_catalog("definitions: [unclosed", CatalogFormat::Yaml).unwrap_err();
        assert!(matches!(err, SourceError::Yaml(_)));
    }
}
