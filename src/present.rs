//! Rendering of resolution results, and parsing clicks on rendered caller lists.
//!
//! Caller list layout:
//!
//! ```text
//! Callers of method submitOrder
//!
//! ui/button.js:
//!   40: submitOrder(cart);
//!   77: submitOrder(saved);
//! api/routes.js:
//!   5: route(body)
//!
//! Found 3 callers in 2 files
//! ```
//!
//! File header lines start at column 0 and end with `:`. Call-site rows are
//! indented and split into line number and text at the first `": "`.
//! [`parse_caller_click`] depends on both.

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::CallSite;
use crate::resolve::{ClickResolution, Diagnostic, NavigationTarget, Resolution};

const ROW_INDENT: &str = "  ";
const ROW_DELIMITER: &str = ": ";

/// `singular` for exactly one, `plural` otherwise (including zero).
#[must_use]
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

#[must_use]
pub fn callers_header(identifier: &str) -> String {
    format!("Callers of method {}", identifier)
}

#[must_use]
pub fn callers_footer(count: usize, file_count: usize) -> String {
    format!(
        "Found {} {} in {} {}",
        count,
        pluralize(count, "caller", "callers"),
        file_count,
        pluralize(file_count, "file", "files"),
    )
}

// ─── Caller report ───────────────────────────────────────────────────

/// Call sites of one file, in artifact order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub file: String,
    pub sites: Vec<CallSite>,
}

/// Call sites grouped by file (files in first-seen order) plus totals.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CallerReport {
    pub identifier: String,
    pub count: usize,
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    pub files: Vec<FileGroup>,
}

impl CallerReport {
    pub fn new(identifier: &str, call_sites: &[CallSite]) -> Self {
        let mut files: Vec<FileGroup> = Vec::new();
        for site in call_sites {
            match files.iter_mut().find(|g| g.file == site.file) {
                Some(group) => group.sites.push(site.clone()),
                None => files.push(FileGroup {
                    file: site.file.clone(),
                    sites: vec![site.clone()],
                }),
            }
        }
        let distinct: HashSet<&str> = call_sites.iter().map(|s| s.file.as_str()).collect();
        Self {
            identifier: identifier.to_string(),
            count: call_sites.len(),
            file_count: distinct.len(),
            files,
        }
    }

    pub fn footer(&self) -> String {
        callers_footer(self.count, self.file_count)
    }

    pub fn render(&self) -> String {
        let mut out = callers_header(&self.identifier);
        out.push_str("\n\n");
        for group in &self.files {
            out.push_str(&group.file);
            out.push_str(":\n");
            for site in &group.sites {
                out.push_str(ROW_INDENT);
                out.push_str(&site.line.to_string());
                out.push_str(ROW_DELIMITER);
                out.push_str(site.text.as_deref().unwrap_or(""));
                out.push('\n');
            }
        }
        out.push('\n');
        out.push_str(&self.footer());
        out.push('\n');
        out
    }
}

/// Render a caller list: header, one row per call site grouped by file, footer.
#[must_use]
pub fn format_callers(identifier: &str, call_sites: &[CallSite]) -> String {
    CallerReport::new(identifier, call_sites).render()
}

// ─── Other results ───────────────────────────────────────────────────

#[must_use]
pub fn format_definition(identifier: &str, target: &NavigationTarget) -> String {
    format!("Definition of {}: {}:{}", identifier, target.path.display(), target.row)
}

#[must_use]
pub fn format_not_found(identifier: &str) -> String {
    format!("No call graph entry for {}", identifier)
}

#[must_use]
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    format!("warning: {}", diagnostic)
}

/// Text rendering of a full click resolution, as printed by the CLI.
#[must_use]
pub fn format_resolution(res: &ClickResolution) -> String {
    let mut out = match &res.outcome.resolution {
        Resolution::Callers { identifier, call_sites } => format_callers(identifier, call_sites),
        Resolution::Definition { identifier, .. } => {
            let mut text = String::new();
            for target in &res.targets {
                text.push_str(&format_definition(identifier, target));
                text.push('\n');
            }
            text
        }
        Resolution::NotFound { identifier } => format!("{}\n", format_not_found(identifier)),
    };
    for diagnostic in &res.outcome.diagnostics {
        out.push_str(&format_diagnostic(diagnostic));
        out.push('\n');
    }
    out
}

// ─── Reverse parsing ─────────────────────────────────────────────────

/// A call site picked from a rendered caller list.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CallerLink {
    pub path: String,
    pub line: u32,
    #[serde(rename = "startColumn")]
    pub start_column: u32,
    #[serde(rename = "endColumn")]
    pub end_column: u32,
}

/// Map a click at `row` (0-based) of rendered caller text back to its call site.
///
/// `selection` is the selected column range on that row, in rendered
/// columns; it is shifted to source-text columns. Without a selection the
/// whole source text is covered. Returns `None` for rows that are not
/// call-site rows or that have no file header above them.
#[must_use]
pub fn parse_caller_click(text: &str, row: usize, selection: Option<(u32, u32)>) -> Option<CallerLink> {
    let lines: Vec<&str> = text.lines().collect();
    let current = *lines.get(row)?;
    let (number, rest) = current.split_once(ROW_DELIMITER)?;
    let line: u32 = number.trim().parse().ok()?;

    let header = lines[..row].iter().rev().find(|l| is_file_header(l))?;
    let path = header.strip_suffix(':')?;
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    let offset = (number.len() + ROW_DELIMITER.len()) as u32;
    let (start_column, end_column) = match selection {
        Some((start, end)) => (start.saturating_sub(offset), end.saturating_sub(offset)),
        None => (0, rest.chars().count() as u32),
    };

    Some(CallerLink {
        path: path.to_string(),
        line,
        start_column,
        end_column,
    })
}

fn is_file_header(line: &str) -> bool {
    line.ends_with(':') && !line.starts_with(char::is_whitespace)
}

// ─── Tests ───────────────────────────────────────────────────────────
