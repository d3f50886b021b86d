use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::analyzer::Strategy;
use crate::models::{Deps, PackageId};

/// Render a colored terminal report.
pub fn render(
    deps: &Deps,
    strategy: Strategy,
    path: &Path,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let direct_count = deps.direct.len();
    let transitive_count = deps.transitive.len();

    if quiet {
        println!(
            "Direct: {}  Transitive: {}",
            direct_count.to_string().green(),
            transitive_count.to_string().cyan(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "hsdeps".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Analyzing: {} ({})\n", path.display(), strategy);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Direct imports       : {:>5}", direct_count));
    println!(" │  {:<48} │", format!("Transitive packages  : {:>5}", transitive_count));
    println!(" └────────────────────────────────────────────────────┘\n");

    if direct_count > 0 {
        println!(" {} Direct imports:\n", "[DIRECT]".green().bold());
        render_table(deps.direct.iter().map(|i| &i.resolved), Color::Green);
        println!();
    }

    if verbose && transitive_count > 0 {
        println!(" {} Transitive dependencies:\n", "[TRANSITIVE]".cyan().bold());
        render_table(deps.transitive.values().map(|p| &p.id), Color::Cyan);
        println!();
    }

    if deps.is_empty() {
        println!(" {}", "No dependencies found.".yellow());
    }

    Ok(())
}

fn render_table<'a>(ids: impl Iterator<Item = &'a PackageId>, color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Ecosystem").add_attribute(Attribute::Bold),
        ]);

    for id in ids {
        table.add_row(vec![
            Cell::new(&id.name).fg(color),
            Cell::new(&id.revision),
            Cell::new(id.ecosystem.to_string()),
        ]);
    }

    println!("{}", table);
}
