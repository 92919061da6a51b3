//! The `adaptest render` command.

use std::path::PathBuf;

use adaptest_core::report::SessionReport;
use adaptest_report::write_html_report;
use anyhow::Result;

pub fn execute(report_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let report = SessionReport::load_json(&report_path)?;
    let output = output.unwrap_or_else(|| report_path.with_extension("html"));

    write_html_report(&report, &output)?;
    println!("HTML report: {}", output.display());
    Ok(())
}
