//! Widget model the pages render into
//!
//! Widgets are plain data so view-models can be inspected in tests; the
//! `render` methods produce the text the CLI prints.

use crate::pages::view::FailureView;
use std::fmt::Write;

/// One table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// Clickable text pointing at `href` (an external URL or a route path)
    Link { text: String, href: String },
    /// Highlighted label such as a sales stage
    Tag(String),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text cell, or `-` when absent
    pub fn optional(value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => Self::Text(v.to_string()),
            None => Self::Empty,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            href: href.into(),
        }
    }

    /// The visible text
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Link { text, href } if text == href => text.clone(),
            Self::Link { text, href } => format!("{} <{}>", text, href),
            Self::Tag(s) => format!("[{}]", s),
            Self::Empty => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column titled `title`
    pub fn column(&self, title: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == title)
    }

    pub fn cell(&self, row: usize, title: &str) -> Option<&Cell> {
        let col = self.column(title)?;
        self.rows.get(row)?.get(col)
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| display_width(c)).collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::display).collect())
            .collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(display_width(cell));
                }
            }
        }

        let mut out = String::new();
        out.push_str(&render_row(&self.columns, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&render_row(&rule, &widths));
        for row in &rows {
            out.push_str(&render_row(row, &widths));
        }
        out
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(0);
        let pad = width.saturating_sub(display_width(cell));
        line.push_str(cell);
        line.push_str(&" ".repeat(pad));
        if i + 1 < cells.len() {
            line.push_str(" | ");
        }
    }
    line.trim_end().to_string() + "\n"
}

/// Terminal columns taken by `s`; CJK characters are double width
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if (c as u32) >= 0x1100 { 2 } else { 1 })
        .sum()
}

/// Labelled figure on a summary card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub title: String,
    pub value: String,
}

impl Stat {
    pub fn new(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
        }
    }
}

/// Percentage with one decimal place
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn render_stats(stats: &[Stat]) -> String {
    let mut out = String::new();
    for stat in stats {
        let _ = writeln!(out, "  {}: {}", stat.title, stat.value);
    }
    out
}

/// Action control; disabled buttons render in parentheses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub enabled: bool,
    pub loading: bool,
}

impl Button {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            enabled: true,
            loading: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.enabled = !disabled;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn render(&self) -> String {
        let label = if self.loading {
            format!("{}…", self.label)
        } else {
            self.label.clone()
        };
        if self.enabled {
            format!("[{}]", label)
        } else {
            format!("({})", label)
        }
    }
}

/// Placeholder shown instead of an empty table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: &'static str,
    pub hint: Option<&'static str>,
}

impl EmptyState {
    pub fn render(&self) -> String {
        match self.hint {
            Some(hint) => format!("  {}\n  {}\n", self.message, hint),
            None => format!("  {}\n", self.message),
        }
    }
}

pub fn render_failure(failure: &FailureView) -> String {
    format!(
        "!! {}\n   {}\n   [{}]\n",
        failure.title,
        failure.description,
        failure.action.label()
    )
}

/// Section heading
pub fn heading(title: &str) -> String {
    format!("\n## {}\n", title)
}
