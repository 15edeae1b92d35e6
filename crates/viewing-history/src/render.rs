//! Plain-text and JSON rendering of a [`Report`].
//!
//! Tables are drawn with `prettytable`, one row per group plus a bold totals
//! row. Cell widths are measured in display columns, so Hebrew and CJK titles
//! line up.

use prettytable::{format, row, Cell, Row, Table};
use viewing_core::formatting::{
    format_hours, format_number, format_time, percentage, truncate_to_width,
};

use crate::report::{Report, ReportBody};

/// Widest first column before keys are cut with an ellipsis.
const MAX_KEY_WIDTH: usize = 40;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const EMPTY_SELECTION: &str = "No viewing data for this selection.";

pub fn render_json(report: &Report) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_table(report: &Report) -> String {
    let table = match &report.body {
        ReportBody::Hours {
            label,
            rows,
            total_hours,
            ..
        } => {
            if rows.is_empty() {
                return empty(&report.title);
            }
            let mut table = new_table();
            table.set_titles(row![b -> label, b -> "Hours", b -> "Share"]);
            for r in rows {
                let share = format!("{}%", format_number(percentage(r.hours, *total_hours, 1), 1));
                table.add_row(row![
                    truncate_to_width(&r.key, MAX_KEY_WIDTH),
                    r -> format_hours(r.hours),
                    r -> share
                ]);
            }
            table.add_row(row![
                b -> "TOTAL",
                br -> format_hours(*total_hours),
                r -> format!("{} shown", rows.len())
            ]);
            table
        }
        ReportBody::Monthly { rows } => {
            if rows.is_empty() {
                return empty(&report.title);
            }
            let mut table = new_table();
            table.set_titles(row![b -> "Month", b -> "Views"]);
            for r in rows {
                table.add_row(row![r.month, r -> r.count]);
            }
            let total: usize = rows.iter().map(|r| r.count).sum();
            table.add_row(row![b -> "TOTAL", br -> total]);
            table
        }
        ReportBody::Matrix { rows } => {
            if rows.is_empty() {
                return empty(&report.title);
            }
            let mut table = new_table();
            let titles = std::iter::once(Cell::new("Year").style_spec("b"))
                .chain(MONTHS.iter().map(|m| Cell::new(m).style_spec("b")))
                .collect();
            table.set_titles(Row::new(titles));
            for r in rows {
                let cells = std::iter::once(Cell::new(&r.year))
                    .chain(r.counts.iter().map(|c| {
                        let text = c.map_or_else(|| "-".to_string(), |n| n.to_string());
                        Cell::new(&text).style_spec("r")
                    }))
                    .collect();
                table.add_row(Row::new(cells));
            }
            table
        }
        ReportBody::Sessions {
            session_count,
            average_minutes,
            rows,
        } => {
            if rows.is_empty() {
                return empty(&report.title);
            }
            let mut table = new_table();
            table.set_titles(row![b -> "Month", b -> "Sessions"]);
            for r in rows {
                table.add_row(row![r.month, r -> r.count]);
            }
            table.add_row(row![b -> "TOTAL", br -> session_count]);
            return format!(
                "{}\n\n{}Average session: {}\n",
                report.title,
                table,
                format_time(*average_minutes)
            );
        }
    };
    format!("{}\n\n{}", report.title, table)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table
}

fn empty(title: &str) -> String {
    format!("{title}\n\n{EMPTY_SELECTION}\n")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
