//! Plain-text rendering of connections, breadcrumbs and resource rows.

use colored::{ColoredString, Colorize};
use kbpick_core::indexing::IndexOutcome;
use kbpick_core::listing::{ListDisplay, ResourceRow};
use kbpick_core::model::{Connection, Resource, ResourceStatus};

pub fn status_badge(status: &ResourceStatus) -> ColoredString {
    let label = format!("[{}]", status);
    match status {
        ResourceStatus::Indexed => label.green(),
        ResourceStatus::Pending => label.yellow(),
        ResourceStatus::PendingDelete => label.bright_black(),
        ResourceStatus::Error => label.red(),
        ResourceStatus::Other(_) => label.normal(),
    }
}

/// One numbered row; `number` is 1-based.
pub fn format_row(number: usize, row: &ResourceRow) -> String {
    let mark = if row.selected { "[x]" } else { "[ ]" };
    let name = if row.is_directory() {
        format!("{}/", row.name()).bold().blue().to_string()
    } else {
        row.name().to_string()
    };

    let mut line = format!("{:>3} {} {}", number, mark, name);
    if let Some(status) = &row.status {
        line.push(' ');
        line.push_str(&status_badge(status).to_string());
    }
    if row.busy {
        line.push(' ');
        line.push_str(&"(unindexing...)".italic().to_string());
    }
    line
}

pub fn format_listing(display: &ListDisplay) -> Vec<String> {
    match display {
        ListDisplay::Loading => vec!["Loading...".bright_black().to_string()],
        ListDisplay::Empty => vec!["No files found".bright_black().to_string()],
        ListDisplay::Rows(rows) => rows
            .iter()
            .enumerate()
            .map(|(i, row)| format_row(i + 1, row))
            .collect(),
    }
}

pub fn format_connections(connections: &[Connection], selected: Option<&str>) -> Vec<String> {
    if connections.is_empty() {
        return vec!["No connections".bright_black().to_string()];
    }
    connections
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let active = selected == Some(c.connection_id.as_str());
            let marker = if active { "*" } else { " " };
            let line = format!(
                "{:>3} {} {} ({}) {}",
                i + 1,
                marker,
                c.name,
                c.connection_provider,
                c.connection_id.bright_black()
            );
            if active { line.bold().to_string() } else { line }
        })
        .collect()
}

/// `Connection / Docs / Reports`, or just the root label.
pub fn format_breadcrumbs(root_label: &str, crumbs: &[String]) -> String {
    let mut parts = vec![root_label.to_string()];
    parts.extend(crumbs.iter().cloned());
    parts.join(" / ")
}

pub fn format_knowledge_base_entry(resource: &Resource) -> String {
    let kind = if resource.is_directory() { "dir " } else { "file" };
    let status = resource
        .status
        .as_ref()
        .map(|s| status_badge(s).to_string())
        .unwrap_or_default();
    format!("{} {} {}", kind, resource.path(), status)
        .trim_end()
        .to_string()
}

pub fn format_index_outcome(outcome: &IndexOutcome) -> String {
    match (&outcome.knowledge_base_id, &outcome.error) {
        (Some(id), None) => format!("Indexing started in knowledge base {}", id)
            .green()
            .to_string(),
        (Some(id), Some(e)) => format!("Knowledge base {} created, but sync failed: {}", id, e)
            .yellow()
            .to_string(),
        (None, Some(e)) => format!("Indexing failed: {}", e).red().to_string(),
        (None, None) => "Nothing was indexed".to_string(),
    }
}
