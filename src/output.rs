//! Cell sinks for the layout engine.
//!
//! - [`XlsxSheet`]: a styled `rust_xlsxwriter` worksheet for the real report
//! - [`GridSheet`]: an in-memory grid used by `--dry-run` and tests

use crate::error::LayoutError;
use crate::layout::{CellSink, StyleTag, Variant};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

// ============================================================================
// In-memory grid
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum GridValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub value: GridValue,
    pub style: StyleTag,
}

/// Records every write so a layout can be inspected without a workbook.
#[derive(Debug, Default)]
pub struct GridSheet {
    cells: BTreeMap<(u32, u16), GridCell>,
    autofit: BTreeSet<u16>,
}

impl GridSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&GridCell> {
        self.cells.get(&(row, col))
    }

    pub fn text(&self, row: u32, col: u16) -> Option<&str> {
        match self.cell(row, col).map(|c| &c.value) {
            Some(GridValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, row: u32, col: u16) -> Option<f64> {
        match self.cell(row, col).map(|c| &c.value) {
            Some(GridValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn style(&self, row: u32, col: u16) -> Option<StyleTag> {
        self.cell(row, col).map(|c| c.style)
    }

    pub fn autofit_columns(&self) -> &BTreeSet<u16> {
        &self.autofit
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Plain-text rendering, one line per row, cells separated by ` | `.
    /// Low and high hours are marked with `-` and `+`.
    pub fn render(&self) -> String {
        let Some(&(last_row, _)) = self.cells.keys().next_back() else {
            return String::new();
        };
        let last_col = self.cells.keys().map(|&(_, c)| c).max().unwrap_or(0);
        let mut widths = vec![0usize; last_col as usize + 1];
        let mut rendered: HashMap<(u32, u16), String> = HashMap::new();
        for (&(row, col), cell) in &self.cells {
            let text = match (&cell.value, cell.style) {
                (GridValue::Text(s), _) => s.clone(),
                (GridValue::Number(n), StyleTag::Low) => format!("-{}", n),
                (GridValue::Number(n), StyleTag::High) => format!("+{}", n),
                (GridValue::Number(n), _) => n.to_string(),
            };
            // titles span the sheet and should not widen the first column
            if cell.style != StyleTag::Title {
                widths[col as usize] = widths[col as usize].max(text.chars().count());
            }
            rendered.insert((row, col), text);
        }

        let mut out = String::new();
        for row in 0..=last_row {
            let mut line = String::new();
            for col in 0..=last_col {
                let text = rendered.get(&(row, col)).map(String::as_str).unwrap_or("");
                line.push_str(&format!("{:<width$} | ", text, width = widths[col as usize]));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

impl CellSink for GridSheet {
    fn write_text(
        &mut self,
        row: u32,
        col: u16,
        value: &str,
        style: StyleTag,
    ) -> Result<(), LayoutError> {
        self.cells.insert(
            (row, col),
            GridCell {
                value: GridValue::Text(value.to_string()),
                style,
            },
        );
        Ok(())
    }

    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: StyleTag,
    ) -> Result<(), LayoutError> {
        self.cells.insert(
            (row, col),
            GridCell {
                value: GridValue::Number(value),
                style,
            },
        );
        Ok(())
    }

    fn write_merged(
        &mut self,
        row: u32,
        first_col: u16,
        _last_col: u16,
        value: &str,
        style: StyleTag,
    ) -> Result<(), LayoutError> {
        self.write_text(row, first_col, value, style)
    }

    fn autofit_column(&mut self, col: u16) -> Result<(), LayoutError> {
        self.autofit.insert(col);
        Ok(())
    }
}

// ============================================================================
// Excel worksheet
// ============================================================================

const TITLE_ROW_HEIGHT: f64 = 30.6;
const TITLE_FILL: &str = "#CCCCFF"; // light cornflower blue
const HEADER_FILL: &str = "#969696"; // grey 40%

/// Cell formats for each [`StyleTag`]. Every style has a thin black border.
struct Styles {
    title: Format,
    header: Format,
    normal: Format,
    normal_centered: Format,
    normal_right: Format,
    low: Format,
    high: Format,
}

impl Styles {
    fn new() -> Self {
        let bordered = || {
            Format::new()
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::Black)
        };
        Self {
            title: bordered()
                .set_align(FormatAlign::Left)
                .set_background_color(TITLE_FILL)
                .set_indent(3)
                .set_bold()
                .set_font_size(24),
            header: bordered()
                .set_align(FormatAlign::Center)
                .set_bold()
                .set_background_color(HEADER_FILL),
            normal: bordered().set_align(FormatAlign::Left),
            normal_centered: bordered().set_align(FormatAlign::Center),
            normal_right: bordered().set_align(FormatAlign::Right),
            low: bordered()
                .set_align(FormatAlign::Right)
                .set_bold()
                .set_font_color(Color::Red),
            high: bordered()
                .set_align(FormatAlign::Right)
                .set_bold()
                .set_font_color(Color::Red)
                .set_background_color(Color::Yellow),
        }
    }

    fn get(&self, tag: StyleTag) -> &Format {
        match tag {
            StyleTag::Title => &self.title,
            StyleTag::Header => &self.header,
            StyleTag::Normal => &self.normal,
            StyleTag::NormalCentered => &self.normal_centered,
            StyleTag::NormalRight => &self.normal_right,
            StyleTag::Low => &self.low,
            StyleTag::High => &self.high,
        }
    }
}

/// A report worksheet that remembers how wide each column's content is.
pub struct XlsxSheet {
    worksheet: Worksheet,
    styles: Styles,
    widths: HashMap<u16, usize>,
}

impl XlsxSheet {
    /// Create the sheet for `variant` with print setup applied.
    pub fn new(variant: Variant) -> Result<Self, XlsxError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(variant.sheet_name())?;
        worksheet
            .set_screen_gridlines(false)
            .set_print_gridlines(false)
            .set_print_fit_to_pages(1, 0)
            .set_print_center_horizontally(true)
            .set_portrait();
        worksheet.set_row_height(0, TITLE_ROW_HEIGHT)?;
        Ok(Self {
            worksheet,
            styles: Styles::new(),
            widths: HashMap::new(),
        })
    }

    pub fn into_worksheet(self) -> Worksheet {
        self.worksheet
    }

    fn note_width(&mut self, col: u16, text_len: usize) {
        let width = self.widths.entry(col).or_insert(0);
        *width = (*width).max(text_len);
    }
}

fn sink_error(row: u32, col: u16, e: XlsxError) -> LayoutError {
    LayoutError::Sink {
        row,
        col,
        message: e.to_string(),
    }
}

impl CellSink for XlsxSheet {
    fn write_text(
        &mut self,
        row: u32,
        col: u16,
        value: &str,
        style: StyleTag,
    ) -> Result<(), LayoutError> {
        self.worksheet
            .write_string_with_format(row, col, value, self.styles.get(style))
            .map_err(|e| sink_error(row, col, e))?;
        self.note_width(col, value.chars().count());
        Ok(())
    }

    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: StyleTag,
    ) -> Result<(), LayoutError> {
        self.worksheet
            .write_number_with_format(row, col, value, self.styles.get(style))
            .map_err(|e| sink_error(row, col, e))?;
        self.note_width(col, value.to_string().len());
        Ok(())
    }

    fn write_merged(
        &mut self,
        row: u32,
        first_col: u16,
        last_col: u16,
        value: &str,
        style: StyleTag,
    ) -> Result<(), LayoutError> {
        self.worksheet
            .merge_range(row, first_col, row, last_col, value, self.styles.get(style))
            .map_err(|e| sink_error(row, first_col, e))?;
        Ok(())
    }

    fn autofit_column(&mut self, col: u16) -> Result<(), LayoutError> {
        let chars = self.widths.get(&col).copied().unwrap_or(0);
        // padding for the border and bold headers
        let width = chars as f64 * 1.1 + 2.0;
        self.worksheet
            .set_column_width(col, width)
            .map_err(|e| sink_error(0, col, e))?;
        Ok(())
    }
}

/// Collect finished sheets into a workbook and write it to `path`.
pub fn save_workbook(sheets: Vec<XlsxSheet>, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        workbook.push_worksheet(sheet.into_worksheet());
    }
    workbook.save(path)
}
