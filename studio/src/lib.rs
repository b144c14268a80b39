//! Studio host for the CHS content schema.
//!
//! Loads `studio.toml`, builds a [`Registry`] from the content catalog and
//! runs host operations (list, validate, visibility, preview, initial values,
//! slugs) against JSON document snapshots on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chs_schema::{Error as SchemaError, Registry};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Host settings parsed from `studio.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Enabled document types in listing order. `None` enables the whole
    /// catalog.
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            types: None,
            pretty: default_pretty(),
        }
    }
}

/// Raw TOML structure matching the studio.toml format.
#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    studio: StudioConfig,
}

impl StudioConfig {
    /// Loads `~/.chs-studio/studio.toml` if it exists.
    pub fn load() -> Self {
        Self::load_from(&config_dir().join("studio.toml"))
    }

    /// Loads config from an explicit path, falling back to defaults with a
    /// warning when the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!("Loaded studio config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config file {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<ConfigFile>(contents).map(|file| file.studio)
    }
}

/// Resolve the studio config directory.
fn config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".chs-studio")
    } else if let Ok(home) = std::env::var("USERPROFILE") {
        Path::new(&home).join(".chs-studio")
    } else {
        PathBuf::from(".chs-studio")
    }
}

/// Registers the catalog types enabled by `config`.
pub fn build_registry(config: &StudioConfig) -> chs_schema::Result<Registry> {
    let Some(enabled) = &config.types else {
        return chs_content::registry();
    };
    let catalog = chs_content::schema_types()?;

    let mut registry = Registry::new();
    for name in enabled {
        let doc_type = catalog
            .iter()
            .find(|t| &t.name == name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownTypeName(name.clone()))?;
        registry.register(doc_type)?;
    }
    debug!(types = registry.list_types().len(), "Registry built from config");
    Ok(registry)
}

/// Host operations exposed on the command line.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Describe every enabled document type
    Types,
    /// Validate a document; exits non-zero when errors are found
    Validate {
        #[arg(value_name = "TYPE")]
        type_name: String,
        file: PathBuf,
    },
    /// Report whether the field at PATH is visible in a document
    Visible {
        #[arg(value_name = "TYPE")]
        type_name: String,
        path: String,
        file: PathBuf,
    },
    /// List the visibility of every field in a document
    Visibility {
        #[arg(value_name = "TYPE")]
        type_name: String,
        file: PathBuf,
    },
    /// Compute the list preview of a document
    Preview {
        #[arg(value_name = "TYPE")]
        type_name: String,
        file: PathBuf,
    },
    /// Print a new document filled with declared defaults
    Init {
        #[arg(value_name = "TYPE")]
        type_name: String,
    },
    /// Generate a slug for FIELD from its source field
    Slug {
        #[arg(value_name = "TYPE")]
        type_name: String,
        field: String,
        file: PathBuf,
    },
}

/// Rendered command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub output: String,
    /// Set when the document failed validation.
    pub failed: bool,
}

impl Report {
    fn ok(output: String) -> Self {
        Self {
            output,
            failed: false,
        }
    }
}

pub fn run(command: &Command, registry: &Registry, config: &StudioConfig) -> Result<Report> {
    let report = match command {
        Command::Types => {
            let types: Vec<_> = registry.list_types().iter().map(|t| t.as_ref()).collect();
            Report::ok(render(&types, config.pretty)?)
        }
        Command::Validate { type_name, file } => {
            let document = read_document(file)?;
            let errors = registry.validate(type_name, &document)?;
            info!(type_name = %type_name, errors = errors.len(), "Validation finished");
            Report {
                output: render(&errors, config.pretty)?,
                failed: !errors.is_empty(),
            }
        }
        Command::Visible {
            type_name,
            path,
            file,
        } => {
            let document = read_document(file)?;
            let visible = registry.is_field_visible(type_name, path, &document)?;
            Report::ok(visible.to_string())
        }
        Command::Visibility { type_name, file } => {
            let document = read_document(file)?;
            let map = registry.visibility_map(type_name, &document)?;
            Report::ok(render(&map, config.pretty)?)
        }
        Command::Preview { type_name, file } => {
            let document = read_document(file)?;
            let preview = registry.preview(type_name, &document)?;
            Report::ok(render(&preview, config.pretty)?)
        }
        Command::Init { type_name } => {
            let initial = registry.initial_value(type_name)?;
            Report::ok(render(&initial, config.pretty)?)
        }
        Command::Slug {
            type_name,
            field,
            file,
        } => {
            let document = read_document(file)?;
            let slug = registry.generate_slug(type_name, field, &document)?;
            Report::ok(slug.unwrap_or_default())
        }
    };
    Ok(report)
}

/// Reads a JSON document snapshot from disk.
pub fn read_document(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse document {} as JSON", path.display()))
}

fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}
