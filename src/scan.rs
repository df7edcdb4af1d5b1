use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::metadata;

/// Summary page the sibling generator script writes into a run directory.
const SUMMARY_FILE: &str = "index.html";

/// Never workflow runs, even if a stray name happened to match the pattern.
const RESERVED_DIRS: [&str; 2] = ["__pycache__", ".git"];

static RUN_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(\d+)").unwrap());

/// One workflow run directory, rebuilt from disk on every invocation.
#[derive(Debug, Clone)]
pub struct WorkflowRecord {
    pub name: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub run_id: String,
    pub has_summary: bool,
    pub job_count: usize,
    pub actor: Option<String>,
    pub release_version: Option<String>,
    pub started_at: Option<String>,
    pub duration: Option<String>,
}

/// Collects every run directory under `base_dir`, newest first. The
/// date-prefixed naming makes reverse lexicographic order chronological,
/// with same-day runs ordered by descending run id.
pub fn scan_workflows(base_dir: &Path) -> Result<Vec<WorkflowRecord>> {
    let entries = fs::read_dir(base_dir)
        .with_context(|| format!("failed to read {}", base_dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to list {}", base_dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        if !file_type.is_dir() {
            continue;
        }
        // Non-UTF-8 names cannot match the run pattern.
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort_by(|a, b| b.cmp(a));

    let mut records = Vec::new();
    for name in names {
        if RESERVED_DIRS.contains(&name.as_str()) {
            continue;
        }
        let Some(caps) = RUN_DIR_RE.captures(&name) else {
            continue;
        };

        let dir = base_dir.join(&name);
        let has_summary = dir.join(SUMMARY_FILE).exists();
        let job_count = count_job_dirs(&dir)?;
        let meta = metadata::load(&dir);

        records.push(WorkflowRecord {
            year: caps[1].to_string(),
            month: caps[2].to_string(),
            day: caps[3].to_string(),
            run_id: caps[4].to_string(),
            name,
            has_summary,
            job_count,
            actor: meta.actor,
            release_version: meta.release_version,
            started_at: meta.started_at,
            duration: meta.duration,
        });
    }

    Ok(records)
}

fn count_job_dirs(dir: &Path) -> Result<usize> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?
            .is_dir()
        {
            count += 1;
        }
    }
    Ok(count)
}
