//! The `adaptest domains` command.

use adaptest_core::catalog::DOMAINS;
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Domain", "Short", "Topics"]);
    for domain in &DOMAINS {
        table.add_row(vec![
            Cell::new(domain.id),
            Cell::new(domain.name),
            Cell::new(domain.short),
            Cell::new(domain.topics.join(", ")),
        ]);
    }
    println!("{table}");
    Ok(())
}
