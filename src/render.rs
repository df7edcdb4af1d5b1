use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::{NoExpand, Regex};

use crate::scan::WorkflowRecord;

/// Template rewritten in place at the root of the results directory.
pub const TEMPLATE_FILE: &str = "index.html";

/// Indentation of the generated array entries and of the closing bracket,
/// matching the template's nesting depth.
const ENTRY_INDENT: &str = "                ";
const CLOSE_INDENT: &str = "            ";

/// Footer placeholder present in the hand-written template before the first
/// generated rewrite.
const FIRST_RUN_MARKER: &str = r#"Generated on <span id="current-date"></span>"#;

// `workflowDirectories` is the legacy array name; templates still carrying
// it are migrated to `workflowData` on the next rewrite.
static DATA_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)const (?:workflowDirectories|workflowData) = \[.*?\];").unwrap()
});

static CHECK_FOR_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(function checkForIndex\(workflowName\) \{.*?return ).*?(;.*?\})").unwrap()
});

static LAST_UPDATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Last updated: \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \| Auto-generated from directory scan",
    )
    .unwrap()
});

/// Rewrites the index template under `base_dir` with the given records.
/// Returns `Ok(false)` only when the template file does not exist.
pub fn update_index(
    base_dir: &Path,
    records: &[WorkflowRecord],
    generated_at: DateTime<Local>,
) -> Result<bool> {
    let path = base_dir.join(TEMPLATE_FILE);
    if !path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let updated = render_template(&content, records, generated_at);
    fs::write(&path, updated)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

/// Applies the three splices to the template text. Pattern misses degrade to
/// the unmodified section and a warning; they never fail the run.
pub fn render_template(
    content: &str,
    records: &[WorkflowRecord],
    generated_at: DateTime<Local>,
) -> String {
    let (content, found) = splice_workflow_array(content, records);
    if !found {
        eprintln!("Warning: workflow data array not found in {TEMPLATE_FILE}, leaving it as is");
    }
    let (content, found) = splice_summary_lookup(&content, records);
    if !found {
        eprintln!("Warning: checkForIndex helper not found in {TEMPLATE_FILE}, leaving it as is");
    }
    splice_timestamp(&content, generated_at)
}

/// One object literal per record, fixed key order. Values are inserted
/// verbatim: run directory names and sidecar fields are expected never to
/// contain quotes, and no escaping is attempted here.
fn render_entry(record: &WorkflowRecord) -> String {
    format!(
        "{{ name: '{}', hasIndex: {}, jobCount: {}, actor: {}, releaseVersion: {}, startedAt: {}, duration: {} }}",
        record.name,
        record.has_summary,
        record.job_count,
        js_string(record.actor.as_deref()),
        js_string(record.release_version.as_deref()),
        js_string(record.started_at.as_deref()),
        js_string(record.duration.as_deref()),
    )
}

fn js_string(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("'{text}'"),
        None => "null".to_string(),
    }
}

fn splice_workflow_array(content: &str, records: &[WorkflowRecord]) -> (String, bool) {
    if !DATA_ARRAY_RE.is_match(content) {
        return (content.to_string(), false);
    }

    let entries = records
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join(&format!(",\n{ENTRY_INDENT}"));
    let replacement =
        format!("const workflowData = [\n{ENTRY_INDENT}{entries}\n{CLOSE_INDENT}];");
    let updated = DATA_ARRAY_RE
        .replace(content, NoExpand(&replacement))
        .into_owned();
    (updated, true)
}

/// Rebuilds the name list inside the template's `checkForIndex` helper from
/// the records that have a generated summary page.
fn splice_summary_lookup(content: &str, records: &[WorkflowRecord]) -> (String, bool) {
    let Some(caps) = CHECK_FOR_INDEX_RE.captures(content) else {
        return (content.to_string(), false);
    };

    let names = records
        .iter()
        .filter(|record| record.has_summary)
        .map(|record| format!("'{}'", record.name))
        .collect::<Vec<_>>()
        .join(", ");

    let matched = caps.get(0).expect("regex match has a whole capture");
    let mut updated = String::with_capacity(content.len());
    updated.push_str(&content[..matched.start()]);
    updated.push_str(&caps[1]);
    updated.push_str(&format!("[{names}].includes(workflowName)"));
    updated.push_str(&caps[2]);
    updated.push_str(&content[matched.end()..]);
    (updated, true)
}

fn splice_timestamp(content: &str, generated_at: DateTime<Local>) -> String {
    let line = format!(
        "Last updated: {} | Auto-generated from directory scan",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    if LAST_UPDATED_RE.is_match(content) {
        LAST_UPDATED_RE
            .replace(content, NoExpand(&line))
            .into_owned()
    } else {
        content.replace(FIRST_RUN_MARKER, &line)
    }
}
