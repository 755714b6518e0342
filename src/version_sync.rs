//! Application version synchronization.
//!
//! This module provides the [`VersionSync`] used at build time to propagate the
//! version declared in `version.json` to the other files that carry it:
//!
//! - `package.json` - `version` field
//! - `src-tauri/tauri.conf.json` - `version` field
//! - `src/version.ts` - generated module exporting `APP_VERSION`
//!
//! Reading `version.json` is the only fatal step. Failures on the other files
//! are logged and reported in the [`SyncReport`].
//!
//! Any truthy `version` value is accepted: a non-empty string, a non-zero
//! number, `true`, an array or an object. The JSON targets receive the value
//! unchanged, the generated module receives its text form.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use log::{error, info};
use serde_json::Value;
use tokio::fs;

/// File holding the version of record.
const VERSION_FILE: &str = "version.json";
/// JSON files whose `version` field is rewritten.
const JSON_TARGETS: [&str; 2] = ["package.json", "src-tauri/tauri.conf.json"];
/// Generated module exporting the version.
const VERSION_MODULE: &str = "src/version.ts";

/// Outcome of a synchronization run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Text form of the version read from `version.json`
    pub version: String,
    /// Files written successfully
    pub updated: Vec<PathBuf>,
    /// Files that could not be written
    pub failed: Vec<PathBuf>,
}

/// Propagates the application version from `version.json`.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), anyhow::Error> {
/// let report = VersionSync::new(".").sync().await?;
/// println!("synced version {}", report.version);
/// # Ok(())
/// # }
/// ```
pub struct VersionSync {
    /// Project root containing `version.json`
    root: PathBuf,
}

impl VersionSync {
    /// Creates a new `VersionSync` working on the project at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VersionSync { root: root.into() }
    }

    /// Reads the version of record.
    ///
    /// # Errors
    ///
    /// Fails if `version.json` cannot be read or parsed, or if its `version`
    /// field is missing, `null`, `false`, zero or an empty string.
    pub async fn read_version(&self) -> Result<Value, anyhow::Error> {
        let path = self.root.join(VERSION_FILE);
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let data: Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        match data.get("version") {
            Some(version) if is_truthy(version) => Ok(version.clone()),
            _ => bail!("{} has no version field", path.display()),
        }
    }

    /// Runs the synchronization.
    ///
    /// # Errors
    ///
    /// Only a failure of [`Self::read_version`] is returned, other failures are
    /// logged and listed in [`SyncReport::failed`].
    pub async fn sync(&self) -> Result<SyncReport, anyhow::Error> {
        let value = self.read_version().await?;
        let version = version_text(&value);
        info!("syncing version {}", version);

        let mut report = SyncReport {
            version: version.clone(),
            ..Default::default()
        };

        for target in JSON_TARGETS {
            let path = self.root.join(target);
            match update_json_version(&path, &value).await {
                Ok(()) => {
                    info!("updated {}", path.display());
                    report.updated.push(path);
                }
                Err(e) => {
                    error!("failed to update {}: {:#}", path.display(), e);
                    report.failed.push(path);
                }
            }
        }

        let path = self.root.join(VERSION_MODULE);
        match fs::write(&path, version_module(&version)).await {
            Ok(()) => {
                info!("generated {}", path.display());
                report.updated.push(path);
            }
            Err(e) => {
                error!("failed to generate {}: {}", path.display(), e);
                report.failed.push(path);
            }
        }

        info!("version sync finished");

        Ok(report)
    }
}

/// Sets the top-level `version` field of the JSON object stored at `path`.
///
/// Other keys keep their order, the file is rewritten with two-space indentation.
async fn update_json_version(path: &Path, version: &Value) -> Result<(), anyhow::Error> {
    let content = fs::read_to_string(path).await?;
    let mut data: Value = serde_json::from_str(&content)?;

    let object = data
        .as_object_mut()
        .ok_or_else(|| anyhow!("top-level value is not an object"))?;
    object.insert("version".to_owned(), version.clone());

    fs::write(path, serde_json::to_string_pretty(&data)?).await?;

    Ok(())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings are taken as is, other values as their JSON text.
fn version_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Source of the generated version module.
fn version_module(version: &str) -> String {
    let escaped = version.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "// Global version information, generated by miku-catalog sync-version\n\
         // Do not edit this file by hand\n\
         export const APP_VERSION = '{}';\n",
        escaped
    )
}
