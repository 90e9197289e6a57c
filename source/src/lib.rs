//! Input loading for the CRD OpenAPI generator.
//!
//! - [`load_fallback`] reads the reference document (usually a cluster's
//!   `swagger.json`) and keeps its `definitions`.
//! - [`load_catalog`] reads the primary definitions as a
//!   [`CatalogProducer`](crd_openapi_core::CatalogProducer).
//! - [`GeneratorConfig`] holds the YAML-configurable settings of a run.
//!
//! # Quick start
//!
//! ```no_run
//! use crd_openapi_core::Merger;
//! use crd_openapi_source::{GeneratorConfig, load_catalog, load_fallback};
//!
//! let config = GeneratorConfig::load("crd-openapi.yaml").unwrap();
//! let primary = config.validate().unwrap();
//!
//! let fallback = load_fallback(&config.fallback).unwrap();
//! let catalog = load_catalog(primary).unwrap();
//!
//! let doc = Merger::with_namer(config.namer())
//!     .with_options(config.merge_options())
//!     .merge(&catalog, &fallback, config.roots.as_slice())
//!     .unwrap();
//! println!("{}", serde_json::to_string(&doc).unwrap());
//! ```

mod catalog;
mod config;
mod error;
mod fallback;

pub use catalog::{CatalogFormat, load_catalog, parse_catalog};
pub use config::{DEFAULT_FALLBACK, DEFAULT_ROOT_KINDS, GeneratorConfig};
pub use error::{Result, SourceError};
pub use fallback::{load_fallback, parse_fallback, read_fallback};
