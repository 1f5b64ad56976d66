/*!
 * Reporting functionality for dumptree
 *
 * Renders a summary of an export as a console table using tabled.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::export::ExportStats;
use crate::utils::{format_number, truncate_start};

/// Everything the summary shows about one export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Where the artifact was written
    pub output_file: String,
    /// Time taken to walk, render and write
    pub duration: Duration,
    /// Whether only checked paths were rendered
    pub filtered: bool,
    /// Whether the artifact also went to the clipboard
    pub copied: bool,
    /// Size figures of the artifact
    pub stats: ExportStats,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: &'static str,

    #[tabled(rename = "Value")]
    value: String,
}

/// Build the summary table for `report`
pub fn generate_report(report: &ExportReport) -> String {
    let stats = &report.stats;
    let mode = if report.filtered { "checked paths" } else { "full tree" };

    let mut rows = vec![
        SummaryRow {
            key: "📂 Output File",
            value: truncate_start(&report.output_file, 60),
        },
        SummaryRow {
            key: "⏱️ Process Time",
            value: format!("{:.4?}", report.duration),
        },
        SummaryRow {
            key: "🌲 Mode",
            value: mode.to_string(),
        },
        SummaryRow {
            key: "📁 Directories",
            value: format_number(stats.directories),
        },
        SummaryRow {
            key: "📄 Files",
            value: format_number(stats.files),
        },
        SummaryRow {
            key: "📝 Inlined Files",
            value: format_number(stats.inlined_files),
        },
        SummaryRow {
            key: "📏 Output Size",
            value: format!(
                "{} lines, {} chars",
                format_number(stats.total_lines),
                format_number(stats.total_chars)
            ),
        },
    ];
    if report.copied {
        rows.push(SummaryRow {
            key: "📋 Clipboard",
            value: "copied".to_string(),
        });
    }

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));

    format!("✅  EXPORT COMPLETE\n{}", table)
}

/// Print the summary table to stdout
pub fn print_report(report: &ExportReport) {
    println!("\n{}", generate_report(report));
}
