//! Pretty table collection and layout
//!
//! Cells are collected as already-rendered text while the walker descends
//! through a table, then laid out as a bordered text grid with `tabled`.

use tabled::Table;
use tabled::builder::Builder;
use tabled::grid::config::{Borders, HorizontalLine};
use tabled::settings::object::{Columns, Object, Rows};
use tabled::settings::{Alignment, Merge};

use crate::options::{CellAlign, PrettyTableOptions};

/// Cells collected for the table currently being rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableContext {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
    pub footer: Vec<String>,
    pub in_footer: bool,
}

impl TableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a row; rows inside the footer section are not body rows
    pub fn open_row(&mut self) {
        if !self.in_footer {
            self.body.push(Vec::new());
        }
    }

    /// Finish the open row, discarding it if it collected no data cells
    pub fn close_row(&mut self) {
        if !self.in_footer && self.body.last().is_some_and(Vec::is_empty) {
            self.body.pop();
        }
    }

    pub fn push_header(&mut self, cell: String) {
        self.header.push(cell);
    }

    /// Append a data cell to the footer or to the open body row
    pub fn push_cell(&mut self, cell: String) {
        if self.in_footer {
            self.footer.push(cell);
            return;
        }
        match self.body.last_mut() {
            Some(row) => row.push(cell),
            None => self.body.push(vec![cell]),
        }
    }

    /// Width of the widest row
    pub fn column_count(&self) -> usize {
        self.body
            .iter()
            .map(Vec::len)
            .chain([self.header.len(), self.footer.len()])
            .max()
            .unwrap_or(0)
    }

    /// Lay the collected cells out as a grid
    ///
    /// Returns an empty string for a table without any cells.
    pub fn render(&self, style: &PrettyTableOptions) -> String {
        let columns = self.column_count();
        if columns == 0 {
            return String::new();
        }

        let has_header = !self.header.is_empty();
        let has_footer = !self.footer.is_empty();

        let mut builder = Builder::default();
        if has_header {
            builder.push_record(padded(
                self.header.iter().map(|c| header_text(c, style)),
                columns,
            ));
        }
        for row in &self.body {
            let cells = row.iter().map(|cell| {
                if style.auto_wrap_text {
                    wrap_cell(cell, style.col_width, style.reflow_during_auto_wrap)
                } else {
                    cell.clone()
                }
            });
            builder.push_record(padded(cells, columns));
        }
        if has_footer {
            builder.push_record(padded(
                self.footer.iter().map(|c| header_text(c, style)),
                columns,
            ));
        }

        let mut table = builder.build();
        let total = table.count_rows();
        let body_start = usize::from(has_header);
        let body_end = total - usize::from(has_footer);

        apply_lines(&mut table, style, has_header.then_some(1), has_footer.then_some(body_end));

        if body_end > body_start {
            for column in 0..columns {
                let align = style
                    .column_alignment
                    .get(column)
                    .copied()
                    .filter(|a| *a != CellAlign::Default)
                    .unwrap_or(style.alignment);
                table.modify(
                    Columns::one(column).intersect(Rows::new(body_start..body_end)),
                    alignment(align, Alignment::left()),
                );
            }
        }
        if has_header {
            table.modify(
                Rows::first(),
                alignment(style.header_alignment, Alignment::center()),
            );
        }
        if has_footer {
            table.modify(
                Rows::last(),
                alignment(style.footer_alignment, Alignment::center()),
            );
        }

        if style.auto_merge_cells {
            table.with(Merge::vertical());
        }

        tracing::trace!(rows = total, columns, "laid out table");
        let rendered = table.to_string();
        if style.new_line == "\n" {
            rendered
        } else {
            rendered.lines().collect::<Vec<_>>().join(&style.new_line)
        }
    }
}

/// Wrap a cell's lines that are wider than `width` at word boundaries
///
/// With `reflow`, a cell that needs wrapping has its existing line breaks
/// joined first, so the whole cell is refilled.
fn wrap_cell(cell: &str, width: usize, reflow: bool) -> String {
    if cell.lines().all(|line| line.chars().count() <= width) {
        return cell.to_string();
    }
    let joined;
    let lines: Vec<&str> = if reflow {
        joined = cell.split_whitespace().collect::<Vec<_>>().join(" ");
        vec![joined.as_str()]
    } else {
        cell.lines().collect()
    };

    let mut wrapped = Vec::new();
    for line in lines {
        if line.chars().count() <= width {
            wrapped.push(line.to_string());
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        wrapped.extend(
            balanced_lines(&words, width)
                .into_iter()
                .map(|range| words[range].join(" ")),
        );
    }
    wrapped.join("\n")
}

/// Penalty added for every line that overflows the width
const OVERFLOW_PENALTY: usize = 100_000;

/// Break `words` into lines minimizing the squared slack of every line but
/// the last
///
/// Ties go to the earlier break. A word wider than `width` raises the limit
/// to its own width.
fn balanced_lines(words: &[&str], width: usize) -> Vec<std::ops::Range<usize>> {
    let n = words.len();
    let lengths: Vec<usize> = words.iter().map(|w| w.chars().count()).collect();
    let limit = lengths.iter().copied().max().unwrap_or(0).max(width);
    let span = |i: usize, j: usize| lengths[i..=j].iter().sum::<usize>() + (j - i);

    let mut cost = vec![usize::MAX; n + 1];
    let mut next = vec![n; n + 1];
    cost[n] = 0;
    for i in (0..n).rev() {
        if span(i, n - 1) <= limit {
            cost[i] = 0;
            continue;
        }
        for j in i + 1..n {
            let len = span(i, j - 1);
            let slack = limit.abs_diff(len);
            let mut c = slack * slack + cost[j];
            if len > limit {
                c += OVERFLOW_PENALTY;
            }
            if c < cost[i] {
                cost[i] = c;
                next[i] = j;
            }
        }
    }

    let mut lines = Vec::new();
    let mut i = 0;
    while i < n {
        lines.push(i..next[i]);
        i = next[i];
    }
    lines
}

fn padded(cells: impl Iterator<Item = String>, columns: usize) -> Vec<String> {
    let mut row: Vec<String> = cells.collect();
    row.resize(columns, String::new());
    row
}

fn header_text(cell: &str, style: &PrettyTableOptions) -> String {
    if style.auto_format_header {
        cell.replace('_', " ").to_uppercase()
    } else {
        cell.to_string()
    }
}

fn alignment(align: CellAlign, fallback: Alignment) -> Alignment {
    match align {
        CellAlign::Default => fallback,
        CellAlign::Left => Alignment::left(),
        CellAlign::Center => Alignment::center(),
        CellAlign::Right => Alignment::right(),
    }
}

/// Replace the default style with the configured separators and borders
fn apply_lines(
    table: &mut Table,
    style: &PrettyTableOptions,
    header_line: Option<usize>,
    footer_line: Option<usize>,
) {
    let sides = style.borders;
    let h = style.row_separator;
    let v = style.column_separator;
    let c = style.center_separator;
    let edge = |on: bool, ch: char| on.then_some(ch);

    let borders = Borders {
        top: edge(sides.top, h),
        top_left: edge(sides.top && sides.left, c),
        top_right: edge(sides.top && sides.right, c),
        top_intersection: edge(sides.top, c),
        bottom: edge(sides.bottom, h),
        bottom_left: edge(sides.bottom && sides.left, c),
        bottom_right: edge(sides.bottom && sides.right, c),
        bottom_intersection: edge(sides.bottom, c),
        horizontal: edge(style.row_line, h),
        left_intersection: edge(style.row_line && sides.left, c),
        right_intersection: edge(style.row_line && sides.right, c),
        intersection: edge(style.row_line, c),
        left: edge(sides.left, v),
        right: edge(sides.right, v),
        vertical: Some(v),
    };

    let line = || HorizontalLine::new(Some(h), Some(c), edge(sides.left, c), edge(sides.right, c));

    let config = table.get_config_mut();
    config.set_borders(borders);
    if style.header_line {
        if let Some(row) = header_line {
            config.insert_horizontal_line(row, line());
        }
    }
    if let Some(row) = footer_line {
        config.insert_horizontal_line(row, line());
    }
}
