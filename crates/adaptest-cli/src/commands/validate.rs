//! The `adaptest validate` command.

use std::path::PathBuf;

use adaptest_core::catalog::DOMAINS;
use adaptest_core::parser::{load_bank, validate_bank};
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let load = load_bank(&bank_path)?;

    println!(
        "Bank: {} ({} usable records, {} skipped)",
        bank_path.display(),
        load.records.len(),
        load.rejected.len()
    );

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Records"]);
    for domain in &DOMAINS {
        let count = load
            .records
            .iter()
            .filter(|r| r.domain == Some(domain.id))
            .count();
        table.add_row(vec![
            Cell::new(format!("D{} {}", domain.id, domain.name)),
            Cell::new(count),
        ]);
    }
    let untagged = load.records.iter().filter(|r| r.domain.is_none()).count();
    if untagged > 0 {
        table.add_row(vec![Cell::new("(any domain)"), Cell::new(untagged)]);
    }
    println!("{table}");

    let warnings = validate_bank(&load);
    for w in &warnings {
        let prefix = w
            .record_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Bank is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
