//! Output formatting module for ccteam
//!
//! Formatters for the one-shot `snapshot` command:
//! - Table format for human-readable terminal output
//! - JSON format for scripts and other tools
//!
//! # Examples
//!
//! ```
//! use ccteam::output::get_formatter;
//! use ccteam::aggregation_types::Snapshot;
//!
//! let snapshot = Snapshot::default();
//! let formatter = get_formatter(true);
//! let json = formatter.format_snapshot(&snapshot);
//! assert!(json.contains("\"members\": []"));
//! ```

use crate::aggregation_types::{Member, Snapshot, TeamTotals};
use colored::Colorize;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;
use std::cmp::Reverse;

/// Trait for snapshot formatters
pub trait OutputFormatter {
    /// Render a snapshot with its team totals
    fn format_snapshot(&self, snapshot: &Snapshot) -> String;
}

/// Members ordered for display: active first, then by lines today descending
///
/// Ties keep id order.
pub fn display_order(snapshot: &Snapshot) -> Vec<&Member> {
    let mut members: Vec<&Member> = snapshot.members().iter().collect();
    members.sort_by_key(|m| (Reverse(m.active), Reverse(m.lines_today), m.id));
    members
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn format_status(active: bool) -> String {
        if active {
            "● active".green().to_string()
        } else {
            "○ idle".dimmed().to_string()
        }
    }

    fn format_member_row(member: &Member) -> Row {
        Row::new(vec![
            Cell::new(&member.avatar),
            Cell::new(&member.name),
            Cell::new(member.email.as_str()),
            Cell::new(&Self::format_status(member.active)),
            Cell::new(&Self::format_number(member.lines_today)).style_spec("r"),
            Cell::new(&Self::format_number(member.lines_this_week)).style_spec("r"),
            Cell::new(&Self::format_number(member.lines_all_time)).style_spec("r"),
        ])
    }

    fn format_totals_row(totals: &TeamTotals) -> Row {
        row![
            b -> "",
            b -> "TOTAL",
            b -> format!("{} members", totals.members),
            b -> format!("{} active", totals.active),
            br -> Self::format_number(totals.lines_today),
            br -> Self::format_number(totals.lines_this_week),
            br -> Self::format_number(totals.lines_all_time),
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_snapshot(&self, snapshot: &Snapshot) -> String {
        if snapshot.is_empty() {
            return "No Claude Code activity in the reporting window".to_string();
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "",
            b -> "Name",
            b -> "Identity",
            b -> "Status",
            br -> "Today",
            br -> "This Week",
            br -> "All Time",
        ]);

        for member in display_order(snapshot) {
            table.add_row(Self::format_member_row(member));
        }
        table.add_row(Self::format_totals_row(&snapshot.totals()));

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_snapshot(&self, snapshot: &Snapshot) -> String {
        let output = json!({
            "members": snapshot,
            "totals": snapshot.totals(),
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Get the formatter for the requested output mode
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
