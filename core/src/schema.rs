//! Schema fragments and definition references.
//!
//! A [`Schema`] is an untyped OpenAPI v2 schema fragment. The merge engine
//! only ever looks at the `$ref` members inside it, so the rest of the value
//! is carried through verbatim.
//!
//! A [`Reference`] is a local JSON pointer of the form
//! `#/definitions/<name>`, where `<name>` is escaped as a JSON pointer token.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix shared by every local definition pointer.
pub const DEFINITION_PREFIX: &str = "#/definitions/";

/// Member name used for references inside a schema object.
pub const REF_KEY: &str = "$ref";

/// Vendor extensions attached to a schema (`x-...` members).
pub type Extensions = BTreeMap<String, Value>;

/// A schema fragment.
///
/// # Examples
///
/// ```
/// use crd_openapi_core::{Reference, Schema};
/// use serde_json::json;
///
/// let schema = Schema::new(json!({
///     "type": "object",
///     "properties": { "bar": { "$ref": "#/definitions/Bar" } }
/// }));
/// assert_eq!(schema.references(), vec!["#/definitions/Bar".to_string()]);
/// assert_eq!(Reference::to_definition("Bar").definition_name().as_deref(), Some("Bar"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(Value);

impl Default for Schema {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Schema {
    /// Wraps a JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Builds the `{"$ref": ...}` object for a reference.
    pub fn reference(reference: &Reference) -> Self {
        let mut map = Map::new();
        map.insert(REF_KEY.to_string(), Value::String(reference.pointer().to_string()));
        Self(Value::Object(map))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns every `$ref` string in this fragment, depth first.
    ///
    /// Only string-valued `$ref` members count, so a property that happens
    /// to be named `$ref` is not mistaken for a reference.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_references(&self.0, &mut out);
        out
    }

    /// Rewrites `$ref` members in place.
    ///
    /// `rewrite` receives the current `$ref` value and returns the
    /// replacement pointer, `None` to leave it untouched, or an error to
    /// abort. Non-string `$ref` values are passed through as `Err(value)`.
    pub fn try_rewrite_references<E, F>(&mut self, mut rewrite: F) -> Result<(), E>
    where
        F: FnMut(Result<&str, &Value>) -> Result<Option<String>, E>,
    {
        rewrite_references(&mut self.0, &mut rewrite)
    }

    /// Merges vendor extensions into the top-level object.
    ///
    /// Existing members with the same key are replaced. Has no effect on a
    /// non-object schema.
    pub fn add_extensions(&mut self, extensions: &Extensions) {
        if let Value::Object(map) = &mut self.0 {
            for (key, value) in extensions {
                map.insert(key.clone(), value.clone());
            }
        }
    }

    /// Looks up a top-level member.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    (REF_KEY, Value::String(pointer)) => out.push(pointer.clone()),
                    _ => collect_references(child, out),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

fn rewrite_references<E, F>(value: &mut Value, rewrite: &mut F) -> Result<(), E>
where
    F: FnMut(Result<&str, &Value>) -> Result<Option<String>, E>,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == REF_KEY {
                    let replacement = match &*child {
                        Value::String(pointer) => rewrite(Ok(pointer.as_str()))?,
                        // A property named "$ref" rather than a reference.
                        Value::Object(_) => None,
                        other => rewrite(Err(other))?,
                    };
                    match replacement {
                        Some(pointer) => *child = Value::String(pointer),
                        None if child.is_object() => rewrite_references(child, rewrite)?,
                        None => {}
                    }
                } else {
                    rewrite_references(child, rewrite)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                rewrite_references(item, rewrite)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// A pointer to a definition in the output document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Builds `#/definitions/<name>` with `name` escaped as a pointer token.
    pub fn to_definition(name: &str) -> Self {
        Self(format!("{DEFINITION_PREFIX}{}", escape_pointer_token(name)))
    }

    /// Wraps a raw pointer string without validation.
    pub fn from_pointer(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    pub fn pointer(&self) -> &str {
        &self.0
    }

    pub fn into_pointer(self) -> String {
        self.0
    }

    /// Returns the unescaped definition name if this is a local
    /// `#/definitions/` pointer with a single token.
    pub fn definition_name(&self) -> Option<String> {
        let token = self.0.strip_prefix(DEFINITION_PREFIX)?;
        if token.is_empty() || token.contains('/') {
            return None;
        }
        Some(unescape_pointer_token(token))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes a JSON pointer token (RFC 6901): `~` → `~0`, `/` → `~1`.
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_pointer_token`].
pub fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
