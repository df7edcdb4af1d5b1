use std::fs;
use std::path::Path;

use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;

/// Sidecar the workflow drops next to its job directories.
const METADATA_FILE: &str = "workflow-metadata.json";

/// Placeholder text the workflow writes when a value was not available.
const PLACEHOLDER: &str = "Unknown";

/// Optional run details pulled from the metadata sidecar. Every field is
/// absent when the sidecar is missing, malformed, or carries placeholder
/// values.
#[derive(Debug, Clone, Default)]
pub struct RunMetadata {
    pub actor: Option<String>,
    pub release_version: Option<String>,
    pub started_at: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Error)]
enum SidecarError {
    #[error("unreadable sidecar: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct Sidecar {
    #[serde(default)]
    workflow: WorkflowSection,
    #[serde(default)]
    inputs: InputsSection,
    #[serde(default)]
    execution: ExecutionSection,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowSection {
    actor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InputsSection {
    #[serde(rename = "release-version")]
    release_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExecutionSection {
    started_at: Option<String>,
    completed_at: Option<String>,
    duration_formatted: Option<String>,
}

/// Loads the metadata sidecar for one run directory. Never fails: a missing
/// sidecar is normal, and a broken one is reported and skipped.
pub fn load(dir: &Path) -> RunMetadata {
    let path = dir.join(METADATA_FILE);
    if !path.exists() {
        return RunMetadata::default();
    }

    let sidecar = match read_sidecar(&path) {
        Ok(sidecar) => sidecar,
        Err(err) => {
            eprintln!(
                "Warning: skipping metadata for {}: {err}",
                dir.display()
            );
            return RunMetadata::default();
        }
    };

    let duration = non_blank(sidecar.execution.duration_formatted.clone())
        .or_else(|| derive_duration(&sidecar.execution));

    RunMetadata {
        actor: without_placeholder(sidecar.workflow.actor),
        release_version: without_placeholder(sidecar.inputs.release_version),
        started_at: non_blank(sidecar.execution.started_at.clone()),
        duration,
    }
}

fn read_sidecar(path: &Path) -> Result<Sidecar, SidecarError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn without_placeholder(value: Option<String>) -> Option<String> {
    non_blank(value).filter(|text| text != PLACEHOLDER)
}

/// Falls back to computing the duration from the start/end instants when the
/// workflow did not record one. Unparseable timestamps leave it absent.
fn derive_duration(execution: &ExecutionSection) -> Option<String> {
    let started = parse_instant(execution.started_at.as_deref()?)?;
    let completed = parse_instant(execution.completed_at.as_deref()?)?;
    let seconds = (completed - started).num_seconds().max(0);
    Some(format_duration(seconds))
}

fn parse_instant(text: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(text.trim()).ok()
}

fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = total_seconds % 3600 / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
