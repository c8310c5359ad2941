//! Terminal rendering for sampling passes

use crate::orchestrator::PassSummary;
use comfy_table::{Cell, Table};
use console::{style, Style};
use tracing::info;

/// Print one pass: per-region type summaries, then a totals table
pub fn display_pass(summary: &PassSummary) {
    for aggregate in &summary.aggregates {
        if aggregate.type_summary.is_empty() {
            continue;
        }
        println!("{}", style(&aggregate.region).bold().cyan());
        for type_summary in aggregate.type_summary.values() {
            println!("  {}", style(&type_summary.instance_type).bold());
            println!("    Instances: {}", type_summary.instance_count);
            println!("    Total hours: {:.2}", type_summary.total_hours);
            println!("    Cost of current running: {:.2}", type_summary.cost);
            info!(
                "{}: {}: instances: {}, total hours: {:.2}, cost: {:.2}",
                aggregate.region,
                type_summary.instance_type,
                type_summary.instance_count,
                type_summary.total_hours,
                type_summary.cost
            );
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Region", "Instances", "Cost"]);
    let mut has_rows = false;
    for aggregate in &summary.aggregates {
        if aggregate.instances.is_empty() {
            continue;
        }
        has_rows = true;
        table.add_row(vec![
            Cell::new(&aggregate.region),
            Cell::new(aggregate.instances.len()),
            Cell::new(format!("${:.2}", aggregate.cost)),
        ]);
    }
    if has_rows {
        println!("{}", table);
    }

    let cost_style = if summary.total_cost > 10.0 {
        Style::new().red().bold()
    } else {
        Style::new().yellow()
    };
    println!(
        "Running total: {}",
        cost_style.apply_to(format!("${:.2}", summary.total_cost))
    );
}
