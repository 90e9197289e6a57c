//! Qualified-to-public definition naming.
//!
//! The primary producer speaks in fully qualified type identifiers such as
//! `k8s.io/apimachinery/pkg/util/intstr.IntOrString`, while published API
//! documents key their definitions by a REST-friendly form of the same name
//! (`io.k8s.apimachinery.pkg.util.intstr.IntOrString`). A [`NameNormalizer`]
//! maps the former onto the latter, optionally attaching extension metadata.
//!
//! # Examples
//!
//! ```
//! use crd_openapi_core::{GroupVersionKind, NameNormalizer, RestFriendlyNamer};
//!
//! let namer = RestFriendlyNamer::new().with_kind(
//!     "github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.Prometheus",
//!     GroupVersionKind::new("monitoring.coreos.com", "v1", "Prometheus"),
//! );
//!
//! let normalized =
//!     namer.normalize("github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.Prometheus");
//! assert_eq!(
//!     normalized.name,
//!     "com.github.coreos.prometheus-operator.pkg.apis.monitoring.v1.Prometheus"
//! );
//! assert!(normalized.extensions.contains_key("x-kubernetes-group-version-kind"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Extensions;

/// Extension key carrying the API identity of a definition.
pub const GROUP_VERSION_KIND_EXTENSION: &str = "x-kubernetes-group-version-kind";

/// Output of a [`NameNormalizer`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedName {
    /// Public definition name.
    pub name: String,
    /// Extensions to attach to the definition's schema.
    pub extensions: Extensions,
}

impl NormalizedName {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Extensions::new(),
        }
    }
}

/// Maps qualified type identifiers onto public definition names.
///
/// Implementations must be deterministic, and two distinct qualified names
/// must never map to the same public name.
pub trait NameNormalizer {
    fn normalize(&self, qualified: &str) -> NormalizedName;

    /// Shorthand for `normalize(qualified).name`.
    fn normalized_name(&self, qualified: &str) -> String {
        self.normalize(qualified).name
    }
}

/// API group, version and kind of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }
}

/// Kubernetes-style definition namer.
///
/// Reverses the domain labels of the first path segment and joins all
/// segments with dots. Qualified names registered with a
/// [`GroupVersionKind`] also receive the
/// [`GROUP_VERSION_KIND_EXTENSION`] extension.
#[derive(Debug, Clone, Default)]
pub struct RestFriendlyNamer {
    kinds: BTreeMap<String, Vec<GroupVersionKind>>,
}

impl RestFriendlyNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an API identity for `qualified`.
    pub fn with_kind(mut self, qualified: impl Into<String>, gvk: GroupVersionKind) -> Self {
        self.register(qualified, gvk);
        self
    }

    /// Registers an API identity for `qualified`. Duplicates are ignored.
    pub fn register(&mut self, qualified: impl Into<String>, gvk: GroupVersionKind) {
        let kinds = self.kinds.entry(qualified.into()).or_default();
        if !kinds.contains(&gvk) {
            kinds.push(gvk);
            kinds.sort();
        }
    }

    /// Registered identities for `qualified`, sorted.
    pub fn kinds_of(&self, qualified: &str) -> &[GroupVersionKind] {
        self.kinds.get(qualified).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl NameNormalizer for RestFriendlyNamer {
    fn normalize(&self, qualified: &str) -> NormalizedName {
        let mut normalized = NormalizedName::plain(rest_friendly_name(qualified));

        let kinds = self.kinds_of(qualified);
        if !kinds.is_empty() {
            let value = kinds
                .iter()
                .map(|gvk| {
                    serde_json::json!({
                        "group": gvk.group,
                        "version": gvk.version,
                        "kind": gvk.kind,
                    })
                })
                .collect::<Vec<_>>();
            normalized
                .extensions
                .insert(GROUP_VERSION_KIND_EXTENSION.to_string(), Value::Array(value));
        }

        normalized
    }
}

/// Converts a Go-style package path plus type name into its REST-friendly
/// form.
///
/// # Examples
///
/// ```
/// use crd_openapi_core::rest_friendly_name;
///
/// assert_eq!(
///     rest_friendly_name("k8s.io/api/core/v1.PodSpec"),
///     "io.k8s.api.core.v1.PodSpec"
/// );
/// assert_eq!(rest_friendly_name("Plain"), "Plain");
/// ```
pub fn rest_friendly_name(qualified: &str) -> String {
    let mut segments: Vec<String> = qualified.split('/').map(str::to_string).collect();

    // A single segment is a bare type name ("pkg.Type"), not a domain.
    if segments.len() > 1 && segments[0].contains('.') {
        let mut labels: Vec<&str> = segments[0].split('.').collect();
        labels.reverse();
        segments[0] = labels.join(".");
    }

    segments.join(".")
}
