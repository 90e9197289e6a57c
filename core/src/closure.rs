//! Reference closure checks over an assembled definition set.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::DanglingReference;
use crate::schema::{Reference, Schema};

/// Finds every `$ref` in `definitions` (and in the `extra` schemas, labelled
/// by the first tuple member) that does not point at a key of
/// `definitions`.
///
/// Pointers that are not local `#/definitions/<name>` pointers are always
/// reported. The result is sorted and free of duplicates.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use crd_openapi_core::{find_dangling, Schema};
/// use serde_json::json;
///
/// let mut definitions = BTreeMap::new();
/// definitions.insert("Foo".to_string(), Schema::new(json!({ "$ref": "#/definitions/Bar" })));
///
/// let dangling = find_dangling(&definitions, std::iter::empty());
/// assert_eq!(dangling.len(), 1);
/// assert_eq!(dangling[0].from, "Foo");
/// ```
pub fn find_dangling<'a>(
    definitions: &BTreeMap<String, Schema>,
    extra: impl IntoIterator<Item = (&'a str, &'a Schema)>,
) -> Vec<DanglingReference> {
    let mut dangling = BTreeSet::new();

    for (from, schema) in definitions {
        collect_dangling(from, schema, definitions, &mut dangling);
    }
    for (from, schema) in extra {
        collect_dangling(from, schema, definitions, &mut dangling);
    }

    dangling.into_iter().collect()
}

fn collect_dangling(
    from: &str,
    schema: &Schema,
    definitions: &BTreeMap<String, Schema>,
    out: &mut BTreeSet<DanglingReference>,
) {
    for pointer in schema.references() {
        let present = Reference::from_pointer(pointer.as_str())
            .definition_name()
            .is_some_and(|name| definitions.contains_key(&name));
        if !present {
            out.insert(DanglingReference {
                from: from.to_string(),
                pointer,
            });
        }
    }
}

/// Names reachable from `seeds` by following `$ref` edges.
///
/// Seeds that are not in `definitions` are ignored, as are edges to absent
/// names.
pub fn reachable<'a>(
    definitions: &BTreeMap<String, Schema>,
    seeds: impl IntoIterator<Item = &'a str>,
) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut queue: VecDeque<String> = seeds
        .into_iter()
        .filter(|name| definitions.contains_key(*name))
        .map(str::to_string)
        .collect();

    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(schema) = definitions.get(&name) else {
            continue;
        };
        for pointer in schema.references() {
            if let Some(target) = Reference::from_pointer(pointer).definition_name() {
                if definitions.contains_key(&target) && !seen.contains(&target) {
                    queue.push_back(target);
                }
            }
        }
    }

    seen
}
