use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

/// Marker script that identifies a workflow-results directory.
const GENERATOR_MARKER: &str = "generate-workflow-summary.py";
const RESULTS_SUBDIR: &str = "workflow-results";

#[derive(Debug, Parser)]
#[command(
    name = "update-workflow-index",
    version,
    about = "Refresh the workflow-results index.html from the run directories on disk."
)]
pub struct Cli {
    /// Workflow-results directory to scan. When omitted, the current
    /// directory and ./workflow-results are probed for the summary
    /// generator script.
    #[arg(long, env = "WORKFLOW_INDEX_BASE_DIR")]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
}

impl Config {
    pub fn from_cli() -> Result<Self> {
        let cli = Cli::parse();
        Config::from_parts(cli)
    }

    fn from_parts(cli: Cli) -> Result<Self> {
        let base_dir = match cli.base_dir {
            Some(dir) => dir,
            None => {
                let cwd =
                    env::current_dir().context("failed to determine the current directory")?;
                resolve_base_dir(&cwd)?
            }
        };
        Ok(Self { base_dir })
    }
}

fn resolve_base_dir(cwd: &Path) -> Result<PathBuf> {
    if cwd.join(GENERATOR_MARKER).exists() {
        return Ok(cwd.to_path_buf());
    }
    let nested = cwd.join(RESULTS_SUBDIR);
    if nested.join(GENERATOR_MARKER).exists() {
        return Ok(nested);
    }
    Err(anyhow!(
        "{GENERATOR_MARKER} not found; run from the project root or the {RESULTS_SUBDIR} directory, or pass --base-dir"
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn resolves_current_directory_when_marker_present() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(GENERATOR_MARKER), "#!/usr/bin/env python3\n").unwrap();

        let resolved = resolve_base_dir(temp.path()).unwrap();
        assert_eq!(resolved, temp.path());
    }

    #[test]
    fn resolves_nested_results_directory() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join(RESULTS_SUBDIR);
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join(GENERATOR_MARKER), "#!/usr/bin/env python3\n").unwrap();

        let resolved = resolve_base_dir(temp.path()).unwrap();
        assert_eq!(resolved, nested);
    }

    #[test]
    fn fails_without_marker_in_either_location() {
        let temp = tempfile::tempdir().unwrap();

        let err = resolve_base_dir(temp.path()).expect_err("expected resolution failure");
        assert!(err.to_string().contains(GENERATOR_MARKER));
    }

    #[test]
    fn explicit_base_dir_skips_probing() {
        let temp = tempfile::tempdir().unwrap();
        let cli = Cli {
            base_dir: Some(temp.path().to_path_buf()),
        };

        let config = Config::from_parts(cli).unwrap();
        assert_eq!(config.base_dir, temp.path());
    }
}
