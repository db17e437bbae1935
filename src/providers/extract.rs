//! Locates rate rows in rate board markup.
//!
//! Boards change their table markup without notice, so each known shape is a
//! [`Layout`] matcher. A source lists its layouts in priority order and
//! [`extract`] returns the rows of the first one that matches anything. All
//! layouts run against a single parse of the document.

use crate::providers::normalize::parse_number;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static PUBLISH_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.publish tr").unwrap());
static LIST_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.lst tr").unwrap());

/// Text cells of one table row, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Returns the cell at `index`, or an empty string past the end.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

impl<S: Into<String>> FromIterator<S> for RawRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Rows with `align="center"` whose data cells carry `bgcolor="#FFFFFF"`;
    /// at least 7 such cells.
    CenteredWhiteCells,
    /// Rows of `table.publish` with at least 7 cells and a numeric second cell.
    PublishTable,
    /// Rows of `table.lst` with at least 6 cells and a numeric fourth cell.
    ListTable,
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::CenteredWhiteCells => "centered-white-cells",
            Layout::PublishTable => "publish-table",
            Layout::ListTable => "list-table",
        }
    }

    /// Returns every qualifying row of `document`, in document order.
    pub fn rows(&self, document: &Html) -> Vec<RawRow> {
        match self {
            Layout::CenteredWhiteCells => document
                .select(&ROW)
                .filter(|row| attr_eq(row, "align", "center"))
                .map(|row| {
                    row.select(&CELL)
                        .filter(|cell| attr_eq(cell, "bgcolor", "#FFFFFF"))
                        .map(cell_text)
                        .collect::<RawRow>()
                })
                .filter(|row| row.len() >= 7)
                .collect(),
            Layout::PublishTable => numeric_rows(document, &PUBLISH_ROW, 7, 1),
            Layout::ListTable => numeric_rows(document, &LIST_ROW, 6, 3),
        }
    }
}

/// Rows under `selector` with at least `min_cells` cells, a non-empty first
/// cell and a numeric cell at `numeric_index`.
fn numeric_rows(
    document: &Html,
    selector: &Selector,
    min_cells: usize,
    numeric_index: usize,
) -> Vec<RawRow> {
    document
        .select(selector)
        .map(|row| row.select(&CELL).map(cell_text).collect::<RawRow>())
        .filter(|row| {
            row.len() >= min_cells
                && !row.cell(0).is_empty()
                && parse_number(row.cell(numeric_index)).is_some()
        })
        .collect()
}

fn attr_eq(element: &ElementRef, name: &str, expected: &str) -> bool {
    element
        .value()
        .attr(name)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

fn cell_text(cell: ElementRef) -> String {
    clean_text(&cell.text().collect::<String>())
}

/// Strips non-breaking space artifacts, decoded or left behind as a literal
/// entity, and surrounding whitespace.
pub fn clean_text(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Parses `html` once and tries `layouts` in order, returning the rows of the
/// first layout that yields any. An empty result means no known structure was
/// found, which is not an error.
pub fn extract(html: &str, layouts: &[Layout]) -> Vec<RawRow> {
    extract_with(html, layouts, |rows| rows)
}

/// Like [`extract`], but a layout only wins when `convert` turns its rows
/// into a non-empty result. Rows that match a layout's shape without
/// carrying data fall through to the next layout.
pub fn extract_with<T>(
    html: &str,
    layouts: &[Layout],
    mut convert: impl FnMut(Vec<RawRow>) -> Vec<T>,
) -> Vec<T> {
    let document = Html::parse_document(html);
    for layout in layouts {
        let rows = layout.rows(&document);
        let matched = rows.len();
        let converted = convert(rows);
        if !converted.is_empty() {
            debug!(layout = layout.name(), rows = matched, "Layout matched");
            return converted;
        }
        debug!(layout = layout.name(), rows = matched, "Layout yielded nothing usable");
    }
    Vec::new()
}
