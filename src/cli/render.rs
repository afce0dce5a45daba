//! Plain-text renderers for the table and chart views

use itertools::Itertools;
use termtree::Tree;

use crate::domain::{ChartNode, EmployeeRecord, FlatRow};

const HEADERS: [&str; 6] = [
    "Level",
    "Employee",
    "Code",
    "Position",
    "Department",
    "Direct Reports",
];

/// Render flattened rows as an aligned table.
///
/// The employee column is indented by `indent_width` per level, with a
/// `└─` marker below the root level.
pub fn render_table(rows: &[FlatRow<'_>], indent_width: usize) -> String {
    if rows.is_empty() {
        return "No hierarchy data\n".to_string();
    }

    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            let marker = if row.level > 0 { "└─ " } else { "" };
            [
                row.level.to_string(),
                format!(
                    "{}{}{}",
                    " ".repeat(row.level * indent_width),
                    marker,
                    row.employee.name
                ),
                format!("#{}", row.employee.id),
                row.employee.title.clone(),
                row.employee.department.clone(),
                row.direct_reports.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |line: &[String]| {
        line.iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut out = String::new();
    out.push_str(&format_line(&header));
    out.push('\n');
    out.push_str(&format_line(&rule));
    out.push('\n');
    for line in &cells {
        out.push_str(&format_line(line));
        out.push('\n');
    }
    out
}

/// Chart label: expand marker, name, code, title and the report badge.
pub fn chart_label(node: &ChartNode<'_>) -> String {
    let marker = match (node.direct_reports, node.expanded) {
        (0, _) => "•",
        (_, true) => "▼",
        (_, false) => "▶",
    };
    let mut label = format!("{} {} #{}", marker, node.employee.name, node.employee.id);
    if !node.employee.title.is_empty() {
        label.push_str(&format!(" · {}", node.employee.title));
    }
    if !node.employee.department.is_empty() {
        label.push_str(&format!(" · {}", node.employee.department));
    }
    if node.direct_reports > 0 {
        label.push_str(&format!(" ({})", node.direct_reports));
    }
    label
}

pub trait ChartConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl ChartConvert for ChartNode<'_> {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(chart_label(self)).with_leaves(leaves)
    }
}

/// Render every visible chart tree, separated by blank lines.
pub fn render_chart(roots: &[ChartNode<'_>]) -> String {
    if roots.is_empty() {
        return "No hierarchy created\n".to_string();
    }
    roots
        .iter()
        .map(|root| root.to_tree_string().to_string())
        .join("\n")
}

/// One line per employee: `#id name · department`.
pub fn render_unplaced(records: &[&EmployeeRecord]) -> String {
    if records.is_empty() {
        return "No employees available to add\n".to_string();
    }
    records
        .iter()
        .map(|r| {
            if r.department.is_empty() {
                format!("#{} {}\n", r.id, r.name)
            } else {
                format!("#{} {} · {}\n", r.id, r.name, r.department)
            }
        })
        .collect()
}
