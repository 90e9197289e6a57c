use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

const BIN: &str = env!("CARGO_BIN_EXE_crd-openapi");

const SERVICE_MONITOR: &str =
    "github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.ServiceMonitor";

fn write_swagger(dir: &Path) -> PathBuf {
    let json = serde_json::json!({
        "swagger": "2.0",
        "paths": {},
        "definitions": {
            "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta": {
                "type": "object",
                "properties": {
                    "ownerReferences": {
                        "type": "array",
                        "items": {
                            "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.OwnerReference"
                        }
                    }
                }
            },
            "io.k8s.apimachinery.pkg.apis.meta.v1.OwnerReference": { "type": "object" },
            "io.k8s.api.core.v1.Pod": { "type": "object" }
        }
    });
    let path = dir.join("swagger.json");
    fs::write(&path, serde_json::to_string(&json).unwrap()).expect("failed to write swagger");
    path
}

fn write_catalog(dir: &Path, extra_ref: Option<&str>) -> PathBuf {
    let mut properties = serde_json::json!({
        "metadata": { "$ref": "k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta" },
        "port": { "$ref": "k8s.io/apimachinery/pkg/util/intstr.IntOrString" }
    });
    if let Some(target) = extra_ref {
        properties["extra"] = serde_json::json!({ "$ref": target });
    }
    let json = serde_json::json!({
        "definitions": {
            SERVICE_MONITOR: { "type": "object", "properties": properties }
        }
    });
    let path = dir.join("primary.json");
    fs::write(&path, serde_json::to_string(&json).unwrap()).expect("failed to write catalog");
    path
}

fn run(args: &[&str], cwd: &Path) -> Output {
    std::process::Command::new(BIN)
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run crd-openapi")
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_writes_closed_document_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_swagger(dir.path());
    let catalog = write_catalog(dir.path(), None);

    // Fallback defaults to ./swagger.json.
    let out = run(
        &["generate", "--primary", catalog.to_str().unwrap(), "--root", SERVICE_MONITOR],
        dir.path(),
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["info"]["title"], "Prometheus Operator CRD OpenAPI");

    let definitions = doc["definitions"].as_object().unwrap();
    assert!(definitions.contains_key(
        "com.github.coreos.prometheus-operator.pkg.apis.monitoring.v1.ServiceMonitor"
    ));
    assert!(definitions.contains_key("io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"));
    assert!(definitions.contains_key("io.k8s.apimachinery.pkg.apis.meta.v1.OwnerReference"));
    assert!(definitions.contains_key("io.k8s.apimachinery.pkg.util.intstr.IntOrString"));
    assert!(!definitions.contains_key("io.k8s.api.core.v1.Pod"));

    assert_eq!(
        doc["x-resources"][0]["name"],
        "com.github.coreos.prometheus-operator.pkg.apis.monitoring.v1.ServiceMonitor"
    );
}

#[test]
fn generate_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let swagger = write_swagger(dir.path());
    let catalog = write_catalog(dir.path(), None);
    let config = dir.path().join("crd-openapi.yaml");
    fs::write(
        &config,
        format!(
            "title: Monitoring\nversion: v9\nfallback: {}\nprimary: {}\nroots:\n  - {SERVICE_MONITOR}\nkinds:\n  {SERVICE_MONITOR}:\n    group: monitoring.coreos.com\n    version: v1\n    kind: ServiceMonitor\n",
            swagger.display(),
            catalog.display()
        ),
    )
    .unwrap();

    let out = run(&["generate", "--config", config.to_str().unwrap()], dir.path());

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["info"]["title"], "Monitoring");
    assert_eq!(doc["info"]["version"], "v9");
    assert_eq!(
        doc["x-resources"][0]["schema"]["x-kubernetes-group-version-kind"][0]["kind"],
        "ServiceMonitor"
    );
}

#[test]
fn generate_fails_on_unresolved_reference() {
    let dir = tempfile::tempdir().unwrap();
    write_swagger(dir.path());
    let catalog = write_catalog(dir.path(), Some("example.com/apis/v1.Missing"));

    let out = run(
        &["generate", "--primary", catalog.to_str().unwrap(), "--root", SERVICE_MONITOR],
        dir.path(),
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty(), "no partial output expected");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: cannot build openapi definitions"));
    assert!(stderr.contains("#/definitions/com.example.apis.v1.Missing"));
}

#[test]
fn generate_fails_on_unknown_root() {
    let dir = tempfile::tempdir().unwrap();
    write_swagger(dir.path());
    let catalog = write_catalog(dir.path(), None);

    // Default roots include kinds the catalog does not define.
    let out = run(&["generate", "--primary", catalog.to_str().unwrap()], dir.path());

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown root resource"));
}

#[test]
fn generate_fails_without_fallback_document() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), None);

    let out = run(
        &["generate", "--primary", catalog.to_str().unwrap(), "--root", SERVICE_MONITOR],
        dir.path(),
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("swagger.json"));
}

#[test]
fn generate_requires_primary_catalog() {
    let dir = tempfile::tempdir().unwrap();
    write_swagger(dir.path());

    let out = run(&["generate"], dir.path());

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no primary catalog configured"));
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[test]
fn normalize_prints_public_names() {
    let dir = tempfile::tempdir().unwrap();

    let out = run(
        &["normalize", "k8s.io/api/core/v1.Pod", SERVICE_MONITOR],
        dir.path(),
    );

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "k8s.io/api/core/v1.Pod\tio.k8s.api.core.v1.Pod",
            "github.com/coreos/prometheus-operator/pkg/apis/monitoring/v1.ServiceMonitor\tcom.github.coreos.prometheus-operator.pkg.apis.monitoring.v1.ServiceMonitor",
        ]
    );
}
