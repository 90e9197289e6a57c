//! Primary definition producers.
//!
//! A [`DefinitionProducer`] builds the authoritative definitions for the
//! resource types of interest. It reports every cross-reference through the
//! [`ReferenceResolver`] it is handed, so that shared types it does not
//! define itself can be pulled from the fallback document.

use std::collections::BTreeMap;

use crate::error::ProducerError;
use crate::resolver::ReferenceResolver;
use crate::schema::Schema;

/// Primary definitions keyed by qualified name.
pub type PrimaryDefinitions = BTreeMap<String, Schema>;

/// Source of primary definitions. Called exactly once per merge.
pub trait DefinitionProducer {
    fn produce(
        &self,
        resolver: &mut ReferenceResolver<'_>,
    ) -> Result<PrimaryDefinitions, ProducerError>;
}

/// Producer backed by a catalog of definition templates.
///
/// Templates are ordinary schemas whose cross-references name their target
/// by qualified name, e.g. `{"$ref": "k8s.io/api/core/v1.PodSpec"}`. On
/// [`produce`](DefinitionProducer::produce) each such `$ref` is sent through
/// the resolver and replaced by the resulting definition pointer. `$ref`s
/// that already start with `#` are left alone.
///
/// # Examples
///
/// ```
/// use crd_openapi_core::{
///     CatalogProducer, DefinitionProducer, FallbackSource, ReferenceResolver,
///     RestFriendlyNamer, Schema,
/// };
/// use serde_json::json;
///
/// let producer = CatalogProducer::new([(
///     "example.com/apis/v1.Widget".to_string(),
///     Schema::new(json!({
///         "type": "object",
///         "properties": {
///             "metadata": { "$ref": "k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta" }
///         }
///     })),
/// )]);
///
/// let fallback = FallbackSource::default();
/// let namer = RestFriendlyNamer::new();
/// let mut resolver = ReferenceResolver::new(&fallback, &namer);
/// let produced = producer.produce(&mut resolver).unwrap();
///
/// assert_eq!(
///     produced["example.com/apis/v1.Widget"].as_value()["properties"]["metadata"]["$ref"],
///     json!("#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogProducer {
    templates: BTreeMap<String, Schema>,
}

impl CatalogProducer {
    pub fn new(templates: impl IntoIterator<Item = (String, Schema)>) -> Self {
        Self {
            templates: templates.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.templates.contains_key(qualified)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl DefinitionProducer for CatalogProducer {
    fn produce(
        &self,
        resolver: &mut ReferenceResolver<'_>,
    ) -> Result<PrimaryDefinitions, ProducerError> {
        let mut produced = PrimaryDefinitions::new();

        for (qualified, template) in &self.templates {
            let mut schema = template.clone();
            schema.try_rewrite_references(|current| match current {
                Ok(raw) if raw.starts_with('#') => Ok(None),
                Ok(raw) => Ok(Some(resolver.resolve(raw).into_pointer())),
                Err(value) => Err(ProducerError::InvalidReference {
                    definition: qualified.clone(),
                    value: value.to_string(),
                }),
            })?;
            produced.insert(qualified.clone(), schema);
        }

        Ok(produced)
    }
}
