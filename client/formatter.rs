use crate::rtree::{DataItem, RTree, Rectangle};
use crate::storage::LoadStats;
use colored::*;

/// 终端输出格式化
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_banner() -> String {
        "===== R-Tree Spatial Query Application ====="
            .bold()
            .to_string()
    }

    pub fn format_load_stats(source: &str, stats: &LoadStats) -> String {
        let mut result = format!("Finished loading data from '{}'.\n", source.cyan());
        result.push_str(&format!(
            "  Total lines processed: {}\n",
            stats.lines.to_string().cyan()
        ));
        result.push_str(&format!(
            "  Items loaded successfully: {}\n",
            stats.loaded.to_string().green()
        ));
        let skipped = stats.skipped.to_string();
        result.push_str(&format!(
            "  Items skipped (comments/errors/empty): {}",
            if stats.skipped > 0 {
                skipped.yellow()
            } else {
                skipped.normal()
            }
        ));
        result
    }

    pub fn format_tree_summary(rtree: &RTree) -> String {
        format!(
            "Index: {} records, {} nodes, depth {}, m={} M={}, bounds {}",
            rtree.len().to_string().cyan(),
            rtree.node_count(),
            rtree.depth(),
            rtree.min_entries(),
            rtree.max_entries(),
            rtree.root_mbr()
        )
    }

    pub fn format_query(bounds: &Rectangle, min_population: i64) -> String {
        format!(
            "Querying within {} for population >= {}",
            bounds.to_string().blue(),
            min_population.to_string().blue()
        )
    }

    pub fn format_results(items: &[DataItem]) -> String {
        if items.is_empty() {
            return "(no matching records)".yellow().to_string();
        }

        let mut result = format!("Found {} items matching criteria:", items.len().to_string().green());
        for item in items {
            result.push_str(&format!(
                "\n  - ID: {}, Name: {}, Pop: {}, Bounds: {}",
                item.id.to_string().cyan(),
                item.name,
                item.population,
                item.bounds
            ));
        }
        result
    }

    pub fn format_written(path: &str, count: usize) -> String {
        format!(
            "Results ({} records) written to '{}'",
            count.to_string().green(),
            path.green()
        )
    }

    pub fn format_error(err: &str) -> String {
        format!("{} {}", "(error)".red(), err.red())
    }
}
