use std::fs;
use std::path::PathBuf;

use chs_studio::{Command, StudioConfig, build_registry, read_document, run};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn compact() -> StudioConfig {
    StudioConfig {
        pretty: false,
        ..Default::default()
    }
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn parse_studio_toml() {
    let config = StudioConfig::parse(
        r#"
[studio]
types = ["role", "chapter"]
pretty = false
"#,
    )
    .unwrap();
    assert_eq!(config.types, Some(vec!["role".to_string(), "chapter".to_string()]));
    assert!(!config.pretty);
}

#[test]
fn empty_toml_gives_defaults() {
    assert_eq!(StudioConfig::parse("").unwrap(), StudioConfig::default());
    assert!(StudioConfig::default().pretty);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = StudioConfig::load_from(&dir.path().join("absent.toml"));
    assert_eq!(config, StudioConfig::default());
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("studio.toml");
    fs::write(&path, "[studio\ntypes = 3").unwrap();
    assert_eq!(StudioConfig::load_from(&path), StudioConfig::default());
}

#[test]
fn load_from_reads_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("studio.toml");
    fs::write(&path, "[studio]\ntypes = [\"strategist\"]\n").unwrap();
    let config = StudioConfig::load_from(&path);
    assert_eq!(config.types, Some(vec!["strategist".to_string()]));
}

// ── Registry from config ─────────────────────────────────────────

#[test]
fn default_config_enables_whole_catalog() {
    let registry = build_registry(&StudioConfig::default()).unwrap();
    assert_eq!(registry.list_types().len(), 3);
}

#[test]
fn configured_types_keep_config_order() {
    let config = StudioConfig {
        types: Some(vec!["role".into(), "chapter".into()]),
        ..Default::default()
    };
    let registry = build_registry(&config).unwrap();
    let names: Vec<&str> = registry.list_types().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["role", "chapter"]);
}

#[test]
fn unknown_configured_type_is_an_error() {
    let config = StudioConfig {
        types: Some(vec!["postType".into()]),
        ..Default::default()
    };
    let err = build_registry(&config).unwrap_err();
    assert_eq!(err.to_string(), "unknown document type: postType");
}

// ── Commands ─────────────────────────────────────────────────────

#[test]
fn validate_reports_errors_and_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_json(
        &dir,
        "role.json",
        &json!({
            "slug": {"current": "coach"},
            "name": "Coach",
            "team": "mun",
            "workMode": "on-site",
            "compensation": {"salary": true, "amount": -5}
        }),
    );
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Validate {
            type_name: "role".into(),
            file,
        },
        &registry,
        &compact(),
    )
    .unwrap();

    assert!(report.failed);
    let errors: Value = serde_json::from_str(&report.output).unwrap();
    assert_eq!(
        errors,
        json!([{
            "path": "compensation.amount",
            "kind": "constraint_violation",
            "message": "Amount must be positive"
        }])
    );
}

#[test]
fn validate_clean_document_succeeds() {
    let dir = TempDir::new().unwrap();
    let file = write_json(
        &dir,
        "strategist.json",
        &json!({"name": "Ada", "role": "academic", "roleLabel": "Academic Strategist"}),
    );
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Validate {
            type_name: "strategist".into(),
            file,
        },
        &registry,
        &compact(),
    )
    .unwrap();
    assert!(!report.failed);
    assert_eq!(report.output, "[]");
}

#[test]
fn visible_prints_boolean() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "role.json", &json!({"communication": {"asynchronous": true}}));
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Visible {
            type_name: "role".into(),
            path: "communication.workingHours".into(),
            file,
        },
        &registry,
        &compact(),
    )
    .unwrap();
    assert_eq!(report.output, "false");
}

#[test]
fn visibility_lists_paths() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "role.json", &json!({"compensation": {"salary": false}}));
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Visibility {
            type_name: "role".into(),
            file,
        },
        &registry,
        &compact(),
    )
    .unwrap();
    let entries: Vec<Value> = serde_json::from_str(&report.output).unwrap();
    assert!(entries.contains(&json!({"path": "compensation.amount", "visible": false})));
    assert!(entries.contains(&json!({"path": "name", "visible": true})));
}

#[test]
fn preview_renders_projection() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "role.json", &json!({"active": true, "name": "Engineer"}));
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Preview {
            type_name: "role".into(),
            file,
        },
        &registry,
        &compact(),
    )
    .unwrap();
    let preview: Value = serde_json::from_str(&report.output).unwrap();
    assert_eq!(preview["title"], "🟢 Engineer");
    assert_eq!(preview["subtitle"], Value::Null);
}

#[test]
fn init_prints_defaults() {
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Init {
            type_name: "chapter".into(),
        },
        &registry,
        &compact(),
    )
    .unwrap();
    let initial: Value = serde_json::from_str(&report.output).unwrap();
    assert_eq!(initial, json!({"_type": "chapter", "isFlagship": false}));
}

#[test]
fn slug_prints_generated_value() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "role.json", &json!({"name": "Safety Officer"}));
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let report = run(
        &Command::Slug {
            type_name: "role".into(),
            field: "slug".into(),
            file,
        },
        &registry,
        &compact(),
    )
    .unwrap();
    assert_eq!(report.output, "safety-officer");
}

#[test]
fn types_describes_enabled_types() {
    let config = StudioConfig {
        types: Some(vec!["strategist".into()]),
        pretty: true,
    };
    let registry = build_registry(&config).unwrap();
    let report = run(&Command::Types, &registry, &config).unwrap();
    assert!(report.output.contains('\n'));
    let described: Value = serde_json::from_str(&report.output).unwrap();
    assert_eq!(described[0]["name"], "strategist");
    assert_eq!(described[0]["fields"][1]["type"]["kind"], "enumeration");
    assert_eq!(described[0]["preview"]["select"]["media"], "photo");
}

#[test]
fn commands_surface_unknown_types() {
    let registry = build_registry(&StudioConfig::default()).unwrap();
    let err = run(
        &Command::Init {
            type_name: "post".into(),
        },
        &registry,
        &compact(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown document type: post"));
}

// ── Document input ───────────────────────────────────────────────

#[test]
fn unreadable_document_has_context() {
    let dir = TempDir::new().unwrap();
    let err = read_document(&dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read document"));
}

#[test]
fn malformed_document_has_context() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{not json").unwrap();
    let err = read_document(&path).unwrap_err();
    assert!(err.to_string().contains("as JSON"));
}
