//! Merge engine for CRD OpenAPI definitions.
//!
//! Combines a small set of generated *primary* definitions for custom
//! resource types with a larger *fallback* reference document (typically a
//! cluster's `swagger.json`), producing one closed OpenAPI v2 document:
//!
//! - [`NameNormalizer`] / [`RestFriendlyNamer`] — map qualified type names
//!   such as `k8s.io/api/core/v1.PodSpec` onto public definition names
//!   (`io.k8s.api.core.v1.PodSpec`).
//! - [`ReferenceResolver`] — lazy, memoizing reference callback that pulls
//!   fallback definitions (and whatever they reference) into the merged set
//!   on first use.
//! - [`DefinitionProducer`] / [`CatalogProducer`] — the primary source.
//! - [`augment`] / [`WellKnown`] — definitions injected unconditionally.
//! - [`Merger`] — orchestrates a merge and checks reference closure.
//!
//! # Example
//!
//! ```
//! use crd_openapi_core::*;
//! use serde_json::json;
//!
//! let producer = CatalogProducer::new([(
//!     "example.com/apis/v1.Widget".to_string(),
//!     Schema::new(json!({
//!         "type": "object",
//!         "properties": {
//!             "metadata": { "$ref": "k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta" }
//!         }
//!     })),
//! )]);
//! let fallback: FallbackSource = [(
//!     "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta".to_string(),
//!     Schema::new(json!({ "type": "object" })),
//! )]
//! .into_iter()
//! .collect();
//!
//! let doc = merge(&producer, &fallback, &["example.com/apis/v1.Widget"]).unwrap();
//! assert_eq!(doc.definitions.len(), 3); // Widget, ObjectMeta, IntOrString
//! ```

mod augment;
mod closure;
mod definitions;
mod document;
mod error;
mod merge;
mod naming;
mod producer;
mod resolver;
mod schema;

pub use augment::{INT_OR_STRING, WellKnown, augment};
pub use closure::{find_dangling, reachable};
pub use definitions::{Definition, DefinitionSet, FallbackSource, Origin};
pub use document::{Document, Info, RootResource, SWAGGER_VERSION};
pub use error::{DanglingReference, MergeError, ProducerError, Result};
pub use merge::{DEFAULT_TITLE, DEFAULT_VERSION, MergeOptions, Merger, merge};
pub use naming::{
    GROUP_VERSION_KIND_EXTENSION, GroupVersionKind, NameNormalizer, NormalizedName,
    RestFriendlyNamer, rest_friendly_name,
};
pub use producer::{CatalogProducer, DefinitionProducer, PrimaryDefinitions};
pub use resolver::{NameClash, ReferenceResolver, Resolution};
pub use schema::{
    DEFINITION_PREFIX, Extensions, REF_KEY, Reference, Schema, escape_pointer_token,
    unescape_pointer_token,
};
