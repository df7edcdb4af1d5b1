use anyhow::Result;
use workflow_index::Config;
use workflow_index::pipeline::run_once;

fn main() -> Result<()> {
    let config = Config::from_cli()?;
    run_once(&config)
}
