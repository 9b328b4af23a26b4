//! Table rendering.
//!
//! Rows and cells may carry `table:number-rows-repeated` and
//! `table:number-columns-repeated`. Runs are kept compressed until the
//! trailing empty rows and columns are trimmed, then expanded into a grid.

use super::TextRenderer;
use crate::common::{Error, Result};
use crate::odf::elements::element::{NodeId, Tree};
use crate::odf::elements::tag_matcher::{OdfTag, match_tag};

/// Widest table rendered, in columns
const MAX_COLUMNS: usize = 16_384;
/// Largest table rendered, in cells after expansion
const MAX_CELLS: usize = 1 << 22;

/// A cell value and the number of columns it spans by repetition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellRun {
    pub value: String,
    pub repeat: usize,
}

/// A row of cell runs and the number of times it is repeated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct RowRun {
    pub cells: Vec<CellRun>,
    pub repeat: usize,
}

impl RowRun {
    /// Columns up to and including the last non-empty cell.
    fn content_width(&self) -> usize {
        let mut column: usize = 0;
        let mut width = 0;
        for run in &self.cells {
            column = column.saturating_add(run.repeat);
            if !run.value.is_empty() {
                width = column;
            }
        }
        width
    }
}

/// Expands repeated rows and cells into a rectangular grid.
pub(crate) struct TableExpander;

impl TableExpander {
    /// Expand `rows`, dropping trailing empty rows and columns.
    ///
    /// Fails with [`Error::Unsupported`] when the trimmed table exceeds
    /// [`MAX_COLUMNS`] columns or [`MAX_CELLS`] cells.
    pub fn expand(rows: &[RowRun]) -> Result<Vec<Vec<String>>> {
        let width = rows.iter().map(RowRun::content_width).max().unwrap_or(0);
        let Some(last) = rows.iter().rposition(|row| row.content_width() > 0) else {
            return Ok(Vec::new());
        };
        let height = rows[..=last]
            .iter()
            .fold(0usize, |height, row| height.saturating_add(row.repeat));
        if width > MAX_COLUMNS || width.saturating_mul(height) > MAX_CELLS {
            return Err(Error::Unsupported(format!("table of {height} rows by {width} columns")));
        }
        let mut grid = Vec::with_capacity(height);
        for row in &rows[..=last] {
            let expanded = Self::expand_row(row, width);
            for _ in 1..row.repeat {
                grid.push(expanded.clone());
            }
            grid.push(expanded);
        }
        Ok(grid)
    }

    fn expand_row(row: &RowRun, width: usize) -> Vec<String> {
        let mut cells = Vec::with_capacity(width);
        for run in &row.cells {
            for _ in 0..run.repeat {
                if cells.len() == width {
                    return cells;
                }
                cells.push(run.value.clone());
            }
        }
        cells.resize(width, String::new());
        cells
    }
}

fn repeat_count(tree: &Tree, node: NodeId, attribute: &str) -> usize {
    tree.attribute(node, attribute)
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Row elements of a table in order, through header rows and row groups.
fn table_rows(tree: &Tree, node: NodeId, rows: &mut Vec<NodeId>) {
    for &child in tree.children(node) {
        match match_tag(tree.tag(child)) {
            OdfTag::TableTableRow => rows.push(child),
            OdfTag::TableTableHeaderRows | OdfTag::TableTableRows | OdfTag::TableTableRowGroup => {
                table_rows(tree, child, rows)
            },
            _ => {},
        }
    }
}

/// Value attribute holding the typed value of a cell, by `office:value-type`
fn typed_value_attribute(value_type: &str) -> Option<&'static str> {
    match value_type {
        "float" | "percentage" | "currency" => Some("office:value"),
        "date" => Some("office:date-value"),
        "time" => Some("office:time-value"),
        "boolean" => Some("office:boolean-value"),
        "string" => Some("office:string-value"),
        _ => None,
    }
}

impl TextRenderer<'_> {
    /// Render a table as one unit: plain text lists cells one per line with a
    /// blank line between rows, rst draws a grid table.
    pub(super) fn render_table(&mut self, table: NodeId, out: &mut String) -> Result<()> {
        self.context.inline_image_level += 1;
        let rows = self.collect_rows(table);
        self.context.inline_image_level -= 1;
        let grid = TableExpander::expand(&rows?)?;
        if grid.is_empty() {
            return Ok(());
        }
        if self.context.is_rst() {
            render_grid(&grid, out);
        } else {
            for row in &grid {
                for cell in row {
                    out.push_str(cell);
                    out.push('\n');
                }
                out.push('\n');
            }
        }
        Ok(())
    }

    fn collect_rows(&mut self, table: NodeId) -> Result<Vec<RowRun>> {
        let tree = self.tree;
        let mut nodes = Vec::new();
        table_rows(tree, table, &mut nodes);
        let mut rows = Vec::with_capacity(nodes.len());
        for row in nodes {
            let mut cells = Vec::new();
            for &cell in tree.children(row) {
                if !matches!(
                    match_tag(tree.tag(cell)),
                    OdfTag::TableTableCell | OdfTag::TableCoveredTableCell
                ) {
                    continue;
                }
                cells.push(CellRun {
                    value: self.cell_value(cell)?,
                    repeat: repeat_count(tree, cell, "table:number-columns-repeated"),
                });
            }
            rows.push(RowRun {
                cells,
                repeat: repeat_count(tree, row, "table:number-rows-repeated"),
            });
        }
        Ok(rows)
    }

    fn cell_value(&mut self, cell: NodeId) -> Result<String> {
        let tree = self.tree;
        let typed = tree
            .attribute(cell, "office:value-type")
            .and_then(typed_value_attribute)
            .and_then(|attribute| tree.attribute(cell, attribute));
        if let Some(value) = typed {
            return Ok(value.to_string());
        }
        let mut value = String::new();
        for &child in tree.children(cell) {
            self.render_block(child, &mut value)?;
        }
        Ok(value.trim_end_matches('\n').to_string())
    }
}

/// reStructuredText grid table, header separator after the first row.
fn render_grid(grid: &[Vec<String>], out: &mut String) {
    let columns = grid.first().map(Vec::len).unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            grid.iter()
                .flat_map(|row| row[column].lines())
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
                .max(2)
        })
        .collect();
    let border = |fill: char| {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat_n(fill, width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    out.push('\n');
    out.push_str(&border('-'));
    for (index, row) in grid.iter().enumerate() {
        let cells: Vec<Vec<&str>> = row.iter().map(|cell| cell.lines().collect()).collect();
        let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for line in 0..height {
            out.push('|');
            for (lines, &width) in cells.iter().zip(&widths) {
                let text = lines.get(line).copied().unwrap_or_default();
                out.push_str(&format!(" {text:<width$} |"));
            }
            out.push('\n');
        }
        let fill = if index == 0 && grid.len() > 1 { '=' } else { '-' };
        out.push_str(&border(fill));
    }
    out.push('\n');
}
