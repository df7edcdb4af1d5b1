use anyhow::Result;
use chrono::Local;

use crate::config::Config;
use crate::render;
use crate::scan;

/// Runs listed individually before the remainder is summarized.
const PREVIEW_LIMIT: usize = 5;

pub fn run_once(config: &Config) -> Result<()> {
    println!("Scanning workflow directories...");
    let records = scan::scan_workflows(&config.base_dir)?;

    if records.is_empty() {
        println!("No workflow directories found.");
        return Ok(());
    }

    println!("Found {} workflow directories:", records.len());
    for record in records.iter().take(PREVIEW_LIMIT) {
        let status = if record.has_summary {
            "✅ Summary"
        } else {
            "📁 Raw files"
        };
        println!(
            "  {} ({} jobs) - {}",
            record.name, record.job_count, status
        );
    }
    if records.len() > PREVIEW_LIMIT {
        println!("  ... and {} more", records.len() - PREVIEW_LIMIT);
    }

    println!();
    println!("Updating {}...", render::TEMPLATE_FILE);
    if render::update_index(&config.base_dir, &records, Local::now())? {
        println!("✅ Successfully updated {}", render::TEMPLATE_FILE);
        println!(
            "🌐 Open workflow-results/{} in your browser to view the updated listing",
            render::TEMPLATE_FILE
        );
    } else {
        println!("❌ Failed to update {}", render::TEMPLATE_FILE);
    }

    Ok(())
}
