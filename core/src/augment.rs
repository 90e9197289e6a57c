//! Well-known definitions injected into every merged document.

use serde_json::json;
use tracing::debug;

use crate::definitions::{Definition, DefinitionSet, Origin};
use crate::naming::NameNormalizer;
use crate::schema::Schema;

/// Qualified name of the shared int-or-string wrapper type.
pub const INT_OR_STRING: &str = "k8s.io/apimachinery/pkg/util/intstr.IntOrString";

/// A definition that must be present whether or not anything references it.
#[derive(Debug, Clone, PartialEq)]
pub struct WellKnown {
    pub qualified: String,
    pub schema: Schema,
}

impl WellKnown {
    pub fn new(qualified: impl Into<String>, schema: Schema) -> Self {
        Self {
            qualified: qualified.into(),
            schema,
        }
    }

    /// `IntOrString`: a string that may also hold an integer.
    pub fn int_or_string() -> Self {
        Self::new(
            INT_OR_STRING,
            Schema::new(json!({
                "type": "string",
                "format": "int-or-string"
            })),
        )
    }

    /// The built-in list.
    pub fn defaults() -> Vec<Self> {
        vec![Self::int_or_string()]
    }
}

/// Adds each well-known definition under its normalized name, never
/// replacing an entry that is already present.
///
/// Returns the names that were actually added.
pub fn augment(
    definitions: &mut DefinitionSet,
    well_known: &[WellKnown],
    namer: &dyn NameNormalizer,
) -> Vec<String> {
    let mut added = Vec::new();
    for entry in well_known {
        let name = namer.normalized_name(&entry.qualified);
        if definitions.insert_if_absent(name.clone(), Definition::new(entry.schema.clone(), Origin::WellKnown)) {
            debug!(%name, "injected well-known definition");
            added.push(name);
        }
    }
    added
}
