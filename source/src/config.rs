//! Generator configuration.
//!
//! Every field is optional in the YAML file; missing fields take the
//! defaults, which reproduce the Prometheus Operator CRD generator.
//!
//! # Example YAML
//!
//! ```yaml
//! title: Prometheus Operator CRD OpenAPI
//! version: v1
//! fallback: swagger.json
//! primary: monitoring-v1.yaml
//! roots:
//!   - github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.Prometheus
//! kinds:
//!   github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.Prometheus:
//!     group: monitoring.coreos.com
//!     version: v1
//!     kind: Prometheus
//! prune_unreachable: false
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crd_openapi_core::{
    DEFAULT_TITLE, DEFAULT_VERSION, GroupVersionKind, MergeOptions, RestFriendlyNamer, WellKnown,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};

/// Fallback document read when nothing else is configured.
pub const DEFAULT_FALLBACK: &str = "swagger.json";

const MONITORING_V1: &str = "github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1";

/// The Prometheus Operator resource kinds.
pub const DEFAULT_ROOT_KINDS: [&str; 5] = [
    "Alertmanager",
    "PodMonitor",
    "Prometheus",
    "PrometheusRule",
    "ServiceMonitor",
];

/// Settings for one generator run.
///
/// # Examples
///
/// ```
/// use crd_openapi_source::GeneratorConfig;
///
/// let config: GeneratorConfig = serde_yaml::from_str("title: Widgets\n").unwrap();
/// assert_eq!(config.title, "Widgets");
/// assert_eq!(config.version, "v1");
/// assert_eq!(config.roots.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Document title.
    pub title: String,
    /// Document API version.
    pub version: String,
    /// Fallback OpenAPI document.
    pub fallback: PathBuf,
    /// Primary definition catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<PathBuf>,
    /// Qualified names of the root resources, in output order.
    pub roots: Vec<String>,
    /// API identities attached to definitions, keyed by qualified name.
    pub kinds: BTreeMap<String, GroupVersionKind>,
    /// Drop definitions not reachable from a root.
    pub prune_unreachable: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            fallback: PathBuf::from(DEFAULT_FALLBACK),
            primary: None,
            roots: DEFAULT_ROOT_KINDS
                .iter()
                .map(|kind| format!("{MONITORING_V1}.{kind}"))
                .collect(),
            kinds: BTreeMap::new(),
            prune_unreachable: false,
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read, or
    /// [`SourceError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| SourceError::io(path, err))?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|err| SourceError::io(path, err))?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Checks the settings a merge cannot run without and returns the
    /// primary catalog path.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidConfig`] when there are no roots, a root
    /// is blank or listed twice, or no primary catalog is set.
    pub fn validate(&self) -> Result<&Path> {
        if self.roots.is_empty() {
            return Err(SourceError::InvalidConfig("no root resources configured".into()));
        }
        let mut seen = std::collections::BTreeSet::new();
        for root in &self.roots {
            if root.trim().is_empty() {
                return Err(SourceError::InvalidConfig("root resource name cannot be empty".into()));
            }
            if !seen.insert(root.as_str()) {
                return Err(SourceError::InvalidConfig(format!("duplicate root resource: {root}")));
            }
        }
        self.primary
            .as_deref()
            .ok_or_else(|| SourceError::InvalidConfig("no primary catalog configured".into()))
    }

    /// Namer carrying the configured API identities.
    pub fn namer(&self) -> RestFriendlyNamer {
        let mut namer = RestFriendlyNamer::new();
        for (qualified, gvk) in &self.kinds {
            namer.register(qualified.clone(), gvk.clone());
        }
        namer
    }

    /// Merge options derived from this configuration.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            title: self.title.clone(),
            version: self.version.clone(),
            well_known: WellKnown::defaults(),
            prune_unreachable: self.prune_unreachable,
        }
    }
}
