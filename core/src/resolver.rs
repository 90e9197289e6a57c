//! Lazy, memoizing reference resolution.
//!
//! The primary producer calls [`ReferenceResolver::resolve`] for every
//! cross-reference it emits. On the first call for a given public name the
//! resolver copies the matching fallback definition (if any) into its
//! [`DefinitionSet`], together with every fallback definition it reaches
//! through its own `#/definitions/` references. Later calls for that name
//! only build the pointer.
//!
//! A name the fallback does not know is still resolved to a pointer. The
//! primary producer may supply that definition itself; if nothing does, the
//! merge reports it once overlay and augmentation are done.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::definitions::{Definition, DefinitionSet, FallbackSource, Origin};
use crate::naming::NameNormalizer;
use crate::schema::Reference;

/// Two distinct qualified names that normalized to the same public name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameClash {
    pub name: String,
    pub first: String,
    pub second: String,
}

/// Everything a finished resolver hands back to the merge.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Fallback definitions pulled in by resolution.
    pub definitions: DefinitionSet,
    /// Resolved names the fallback had no definition for.
    pub missing: BTreeSet<String>,
    /// Public name to the first qualified name resolved onto it.
    pub sources: BTreeMap<String, String>,
    /// Qualified names that landed on a public name already taken.
    pub clashes: Vec<NameClash>,
}

/// Stateful reference callback handed to a
/// [`DefinitionProducer`](crate::DefinitionProducer).
///
/// One resolver serves exactly one merge. It owns the memo table, so it
/// cannot be shared between concurrent merges without an external lock.
///
/// # Examples
///
/// ```
/// use crd_openapi_core::{FallbackSource, ReferenceResolver, RestFriendlyNamer, Schema};
/// use serde_json::json;
///
/// let fallback: FallbackSource = [
///     (
///         "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta".to_string(),
///         Schema::new(json!({
///             "type": "object",
///             "properties": {
///                 "creationTimestamp": { "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.Time" }
///             }
///         })),
///     ),
///     (
///         "io.k8s.apimachinery.pkg.apis.meta.v1.Time".to_string(),
///         Schema::new(json!({"type": "string", "format": "date-time"})),
///     ),
/// ]
/// .into_iter()
/// .collect();
/// let namer = RestFriendlyNamer::new();
/// let mut resolver = ReferenceResolver::new(&fallback, &namer);
///
/// let reference = resolver.resolve("k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta");
/// assert_eq!(
///     reference.pointer(),
///     "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
/// );
/// assert_eq!(resolver.definitions().len(), 2);
/// ```
pub struct ReferenceResolver<'a> {
    fallback: &'a FallbackSource,
    namer: &'a dyn NameNormalizer,
    definitions: DefinitionSet,
    visited: BTreeSet<String>,
    missing: BTreeSet<String>,
    sources: BTreeMap<String, String>,
    clashes: Vec<NameClash>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(fallback: &'a FallbackSource, namer: &'a dyn NameNormalizer) -> Self {
        Self {
            fallback,
            namer,
            definitions: DefinitionSet::new(),
            visited: BTreeSet::new(),
            missing: BTreeSet::new(),
            sources: BTreeMap::new(),
            clashes: Vec::new(),
        }
    }

    /// Returns the pointer for `qualified`, pulling its fallback definition
    /// and everything that definition references into the memo table on
    /// first use.
    pub fn resolve(&mut self, qualified: &str) -> Reference {
        let name = self.namer.normalized_name(qualified);

        match self.sources.get(&name) {
            Some(first) if first != qualified => {
                warn!(%name, %first, second = %qualified, "qualified names share a public name");
                self.clashes.push(NameClash {
                    name: name.clone(),
                    first: first.clone(),
                    second: qualified.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.sources.insert(name.clone(), qualified.to_string());
            }
        }

        if self.visited.insert(name.clone()) {
            if self.fallback.contains(&name) {
                debug!(%qualified, %name, "resolved from fallback");
                self.copy_closure(&name);
            } else {
                debug!(%qualified, %name, "not in fallback; expecting primary definition");
                self.missing.insert(name.clone());
            }
        }

        Reference::to_definition(&name)
    }

    /// Copies `start` and every fallback definition reachable from it.
    ///
    /// Fallback schemas already use public names, so their references are
    /// followed without the namer. Targets the fallback lacks are left for
    /// the closure check.
    fn copy_closure(&mut self, start: &str) {
        let fallback = self.fallback;
        let mut queue = VecDeque::from([start.to_string()]);

        while let Some(name) = queue.pop_front() {
            let Some(schema) = fallback.get(&name) else {
                continue;
            };
            for pointer in schema.references() {
                let Some(target) = Reference::from_pointer(pointer).definition_name() else {
                    continue;
                };
                if fallback.contains(&target) && self.visited.insert(target.clone()) {
                    debug!(from = %name, name = %target, "pulled in by fallback reference");
                    queue.push_back(target);
                }
            }
            self.definitions
                .insert_if_absent(name, Definition::new(schema.clone(), Origin::Fallback));
        }
    }

    /// Names resolved so far, whether or not a definition was found.
    pub fn resolved_names(&self) -> impl Iterator<Item = &str> {
        self.visited.iter().map(String::as_str)
    }

    /// Resolved names the fallback source had no definition for.
    pub fn missing_from_fallback(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }

    pub fn definitions(&self) -> &DefinitionSet {
        &self.definitions
    }

    /// Ends resolution and hands the accumulated state to the caller.
    pub fn finish(self) -> Resolution {
        Resolution {
            definitions: self.definitions,
            missing: self.missing,
            sources: self.sources,
            clashes: self.clashes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::RestFriendlyNamer;
    use crate::schema::Schema;
    use serde_json::json;

    fn fallback() -> FallbackSource {
        [
            (
                "io.k8s.api.core.v1.Container".to_string(),
                Schema::new(json!({"type": "object", "description": "container"})),
            ),
            (
                "io.k8s.apimachinery.pkg.util.intstr.IntOrString".to_string(),
                Schema::new(json!({"type": "string", "format": "int-or-string"})),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_copies_fallback_entry() {
        let fallback = fallback();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);

        let reference = resolver.resolve("k8s.io/api/core/v1.Container");

        assert_eq!(reference.pointer(), "#/definitions/io.k8s.api.core.v1.Container");
        let entry = resolver.definitions().get("io.k8s.api.core.v1.Container").unwrap();
        assert_eq!(entry.origin, Origin::Fallback);
        assert_eq!(entry.schema.get("description"), Some(&json!("container")));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let fallback = fallback();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);

        let first = resolver.resolve("k8s.io/api/core/v1.Container");
        let second = resolver.resolve("k8s.io/api/core/v1.Container");

        assert_eq!(first, second);
        assert_eq!(resolver.definitions().len(), 1);
        assert_eq!(resolver.resolved_names().count(), 1);
    }

    #[test]
    fn test_missing_fallback_entry_still_returns_pointer() {
        let fallback = fallback();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);

        let reference = resolver.resolve("example.com/apis/v1.Missing");

        assert_eq!(reference.pointer(), "#/definitions/com.example.apis.v1.Missing");
        assert!(resolver.definitions().is_empty());
        assert_eq!(
            resolver.missing_from_fallback().collect::<Vec<_>>(),
            vec!["com.example.apis.v1.Missing"]
        );
    }

    #[test]
    fn test_finish_returns_memo_missing_and_sources() {
        let fallback = fallback();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);
        resolver.resolve("k8s.io/apimachinery/pkg/util/intstr.IntOrString");
        resolver.resolve("example.com/apis/v1.Missing");

        let resolution = resolver.finish();
        assert!(resolution.definitions.contains("io.k8s.apimachinery.pkg.util.intstr.IntOrString"));
        assert!(resolution.missing.contains("com.example.apis.v1.Missing"));
        assert_eq!(
            resolution.sources["com.example.apis.v1.Missing"],
            "example.com/apis/v1.Missing"
        );
        assert!(resolution.clashes.is_empty());
    }

    #[test]
    fn test_fallback_references_are_followed() {
        let fallback: FallbackSource = [
            (
                "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta".to_string(),
                Schema::new(json!({
                    "properties": {
                        "ownerReferences": {
                            "type": "array",
                            "items": { "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.OwnerReference" }
                        },
                        "creationTimestamp": { "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.Time" }
                    }
                })),
            ),
            (
                "io.k8s.apimachinery.pkg.apis.meta.v1.OwnerReference".to_string(),
                Schema::new(json!({
                    "properties": {
                        "uid": { "$ref": "#/definitions/io.k8s.apimachinery.pkg.types.UID" }
                    }
                })),
            ),
            (
                "io.k8s.apimachinery.pkg.apis.meta.v1.Time".to_string(),
                Schema::new(json!({"type": "string", "format": "date-time"})),
            ),
            (
                "io.k8s.apimachinery.pkg.types.UID".to_string(),
                Schema::new(json!({"type": "string"})),
            ),
            ("io.k8s.api.core.v1.Pod".to_string(), Schema::new(json!({"type": "object"}))),
        ]
        .into_iter()
        .collect();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);

        resolver.resolve("k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta");

        let names: Vec<&str> = resolver.resolved_names().collect();
        assert_eq!(
            names,
            vec![
                "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta",
                "io.k8s.apimachinery.pkg.apis.meta.v1.OwnerReference",
                "io.k8s.apimachinery.pkg.apis.meta.v1.Time",
                "io.k8s.apimachinery.pkg.types.UID",
            ]
        );
        assert_eq!(resolver.definitions().len(), 4);
        assert!(!resolver.definitions().contains("io.k8s.api.core.v1.Pod"));
        assert_eq!(resolver.missing_from_fallback().count(), 0);
    }

    #[test]
    fn test_fallback_cycles_terminate() {
        let fallback: FallbackSource = [
            ("A".to_string(), Schema::new(json!({ "items": { "$ref": "#/definitions/B" } }))),
            ("B".to_string(), Schema::new(json!({ "items": { "$ref": "#/definitions/A" } }))),
        ]
        .into_iter()
        .collect();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);

        resolver.resolve("A");
        resolver.resolve("B");

        assert_eq!(resolver.definitions().len(), 2);
    }

    #[test]
    fn test_distinct_qualified_names_sharing_a_public_name_are_recorded() {
        let fallback = FallbackSource::default();
        let namer = RestFriendlyNamer::new();
        let mut resolver = ReferenceResolver::new(&fallback, &namer);

        let first = resolver.resolve("a/b.C");
        let second = resolver.resolve("b.a/C");
        resolver.resolve("a/b.C");

        assert_eq!(first, second);
        assert_eq!(
            resolver.finish().clashes,
            vec![NameClash {
                name: "a.b.C".into(),
                first: "a/b.C".into(),
                second: "b.a/C".into(),
            }]
        );
    }
}
