//! Merge orchestration.
//!
//! [`Merger::merge`] runs one full merge:
//!
//! 1. the primary producer is invoked once with a fresh
//!    [`ReferenceResolver`], which pulls fallback definitions into the memo
//!    table as references are emitted;
//! 2. every requested root must be among the primary definitions;
//! 3. primary definitions are overlaid onto the memo table, replacing any
//!    fallback entry with the same public name;
//! 4. well-known definitions are added where absent;
//! 5. unreachable definitions are optionally pruned;
//! 6. root resource schemas are assembled and the whole document is checked
//!    for dangling references, including names that were resolved but that
//!    nothing supplied.
//!
//! Any failure aborts the merge; no partial document is returned.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::augment::{WellKnown, augment};
use crate::closure::{find_dangling, reachable};
use crate::definitions::{Definition, FallbackSource, Origin};
use crate::document::{Document, Info, RootResource};
use crate::error::{DanglingReference, MergeError, Result};
use crate::naming::{NameNormalizer, NormalizedName, RestFriendlyNamer};
use crate::producer::DefinitionProducer;
use crate::resolver::{NameClash, ReferenceResolver, Resolution};
use crate::schema::Reference;

/// Default document title.
pub const DEFAULT_TITLE: &str = "Prometheus Operator CRD OpenAPI";

/// Default document API version.
pub const DEFAULT_VERSION: &str = "v1";

/// Settings for a [`Merger`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    pub title: String,
    pub version: String,
    /// Definitions injected after the overlay.
    pub well_known: Vec<WellKnown>,
    /// Drop definitions that no root or well-known entry reaches.
    pub prune_unreachable: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            well_known: WellKnown::defaults(),
            prune_unreachable: false,
        }
    }
}

/// Merges primary and fallback definitions into one closed [`Document`].
///
/// # Examples
///
/// ```
/// use crd_openapi_core::{CatalogProducer, FallbackSource, Merger, Schema};
/// use serde_json::json;
///
/// let producer = CatalogProducer::new([(
///     "example.com/apis/v1.Widget".to_string(),
///     Schema::new(json!({
///         "type": "object",
///         "properties": {
///             "port": { "$ref": "k8s.io/apimachinery/pkg/util/intstr.IntOrString" }
///         }
///     })),
/// )]);
///
/// let doc = Merger::new()
///     .merge(&producer, &FallbackSource::default(), &["example.com/apis/v1.Widget"])
///     .unwrap();
///
/// assert!(doc.definition("com.example.apis.v1.Widget").is_some());
/// assert!(doc.definition("io.k8s.apimachinery.pkg.util.intstr.IntOrString").is_some());
/// assert_eq!(doc.resources[0].name, "com.example.apis.v1.Widget");
/// ```
#[derive(Debug, Clone)]
pub struct Merger<N = RestFriendlyNamer> {
    namer: N,
    options: MergeOptions,
}

impl Merger<RestFriendlyNamer> {
    /// Merger with the REST-friendly namer and default options.
    pub fn new() -> Self {
        Self::with_namer(RestFriendlyNamer::new())
    }
}

impl Default for Merger<RestFriendlyNamer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NameNormalizer> Merger<N> {
    pub fn with_namer(namer: N) -> Self {
        Self {
            namer,
            options: MergeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }
    /// Runs one merge. See the module documentation for the steps.
    ///
    /// # Errors
    ///
    /// - [`MergeError::Producer`] if the producer fails.
    /// - [`MergeError::UnknownRoot`] if a root was not produced.
    /// - [`MergeError::NameCollision`] if two distinct qualified names
    ///   normalize alike.
    /// - [`MergeError::UnresolvedReferences`] if any reference dangles or a
    ///   resolved name was never supplied.
    pub fn merge<S: AsRef<str>>(
        &self,
        producer: &dyn DefinitionProducer,
        fallback: &FallbackSource,
        roots: &[S],
    ) -> Result<Document> {
        let mut resolver = ReferenceResolver::new(fallback, &self.namer);
        let primary = producer.produce(&mut resolver)?;

        for root in roots {
            let root = root.as_ref();
            if !primary.contains_key(root) {
                return Err(MergeError::UnknownRoot(root.to_string()));
            }
        }

        let Resolution {
            mut definitions,
            missing,
            sources: mut owners,
            clashes,
        } = resolver.finish();
        if let Some(NameClash { name, first, second }) = clashes.into_iter().next() {
            return Err(MergeError::NameCollision { name, first, second });
        }
        let from_fallback = definitions.len();

        for (qualified, mut schema) in primary {
            let NormalizedName { name, extensions } = self.namer.normalize(&qualified);
            match owners.get(&name) {
                Some(first) if *first != qualified => {
                    return Err(MergeError::NameCollision {
                        name,
                        first: first.clone(),
                        second: qualified,
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(name.clone(), qualified.clone());
                }
            }

            schema.add_extensions(&extensions);
            if let Some(previous) = definitions.overlay(name.clone(), Definition::new(schema, Origin::Primary)) {
                debug!(%name, origin = ?previous.origin, "primary definition replaces earlier entry");
            }
        }

        let injected = augment(&mut definitions, &self.options.well_known, &self.namer);

        // Resolved names that neither the fallback, the primary producer nor
        // the augmenter supplied.
        let mut unsupplied = Vec::new();
        for name in &missing {
            if definitions.contains(name) {
                debug!(%name, "missing from fallback, supplied later");
            } else {
                let qualified = owners.get(name).map_or(name.as_str(), String::as_str);
                unsupplied.push(DanglingReference {
                    from: format!("resolve({qualified})"),
                    pointer: Reference::to_definition(name).into_pointer(),
                });
            }
        }
        let primary_count = definitions.count_by(Origin::Primary);
        let mut schemas = definitions.into_schemas();

        let root_names: Vec<String> = roots
            .iter()
            .map(|root| self.namer.normalized_name(root.as_ref()))
            .collect();

        if self.options.prune_unreachable {
            let well_known: Vec<String> = self
                .options
                .well_known
                .iter()
                .map(|entry| self.namer.normalized_name(&entry.qualified))
                .collect();
            let keep: BTreeSet<String> = reachable(
                &schemas,
                root_names.iter().chain(well_known.iter()).map(String::as_str),
            );
            let before = schemas.len();
            schemas.retain(|name, _| keep.contains(name));
            debug!(removed = before - schemas.len(), "pruned unreachable definitions");
        }

        let mut document = Document::new(Info {
            title: self.options.title.clone(),
            version: self.options.version.clone(),
        });

        for (root, name) in roots.iter().zip(root_names) {
            let schema = schemas
                .get(&name)
                .cloned()
                .ok_or_else(|| MergeError::UnknownRoot(root.as_ref().to_string()))?;
            document.resources.push(RootResource { name, schema });
        }

        let mut dangling = find_dangling(
            &schemas,
            document
                .resources
                .iter()
                .map(|resource| (resource.name.as_str(), &resource.schema)),
        );
        for entry in unsupplied {
            if !dangling.iter().any(|known| known.pointer == entry.pointer) {
                dangling.push(entry);
            }
        }
        if !dangling.is_empty() {
            dangling.sort();
            return Err(MergeError::UnresolvedReferences(dangling));
        }

        info!(
            definitions = schemas.len(),
            from_fallback,
            primary = primary_count,
            well_known = injected.len(),
            roots = document.resources.len(),
            "merged definitions"
        );

        document.definitions = schemas;
        Ok(document)
    }
}

/// Merges with the REST-friendly namer and default options.
pub fn merge<S: AsRef<str>>(
    producer: &dyn DefinitionProducer,
    fallback: &FallbackSource,
    roots: &[S],
) -> Result<Document> {
    Merger::new().merge(producer, fallback, roots)
}
