//! Fallback document loading.
//!
//! The fallback is an OpenAPI v2 document such as the `swagger.json` served
//! by a Kubernetes API server. Only its `definitions` member is used; paths,
//! parameters and everything else are ignored.

use std::collections::BTreeMap;
use std::io::{BufReader, Read};
use std::path::Path;

use crd_openapi_core::{FallbackSource, Schema};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, SourceError};

#[derive(Deserialize)]
struct DefinitionsOnly {
    #[serde(default)]
    definitions: Option<BTreeMap<String, Schema>>,
}

/// Loads a fallback document from a JSON file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, or
/// [`SourceError::Json`] if it is not valid JSON.
pub fn load_fallback(path: impl AsRef<Path>) -> Result<FallbackSource> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|err| SourceError::io(path, err))?;
    let fallback = read_fallback(BufReader::new(file))?;
    debug!(path = %path.display(), definitions = fallback.len(), "loaded fallback document");
    Ok(fallback)
}

/// Reads a fallback document from any JSON reader.
pub fn read_fallback(reader: impl Read) -> Result<FallbackSource> {
    let doc: DefinitionsOnly = serde_json::from_reader(reader)?;
    Ok(into_source(doc))
}

/// Parses a fallback document from a JSON string.
///
/// # Examples
///
/// ```
/// use crd_openapi_source::parse_fallback;
///
/// let fallback = parse_fallback(r#"{
///     "swagger": "2.0",
///     "paths": {},
///     "definitions": { "io.k8s.api.core.v1.Pod": { "type": "object" } }
/// }"#).unwrap();
/// assert!(fallback.contains("io.k8s.api.core.v1.Pod"));
/// ```
pub fn parse_fallback(json: &str) -> Result<FallbackSource> {
    let doc: DefinitionsOnly = serde_json::from_str(json)?;
    Ok(into_source(doc))
}

fn into_source(doc: DefinitionsOnly) -> FallbackSource {
    match doc.definitions {
        Some(definitions) => FallbackSource::new(definitions),
        None => {
            warn!("fallback document has no definitions");
            FallbackSource::default()
        }
    }
}
