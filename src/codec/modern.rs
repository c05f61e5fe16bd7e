//! Modern (.xlsx) Codec
//!
//! `rust_xlsxwriter`を使用して、シートモデルをOOXMLパッケージとして書き出す。

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use log::debug;
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, FormatUnderline, Formula, Note,
    ProtectionOptions, Workbook as XlsxWorkbook, Worksheet, XlsxError,
};

use super::panes::{apply_split_panes, SplitPane};
use super::WorkbookCodec;
use crate::api::{
    BorderStyle, FillPattern, FontUnderline, HorizontalAlignment, SpreadsheetFormat,
    VerticalAlignment,
};
use crate::error::{Result, XlsBridgeError};
use crate::format::{datetime_to_serial, default_date_format};
use crate::model::{Cell, CellValue, Pane, Sheet};
use crate::style::{Fill, FillColor, Font, Style, StyleAttributes};

const MAX_ROWS: u32 = 1_048_576;
const MAX_COLUMNS: u16 = 16_384;

/// Modern形式のコーデック
#[derive(Debug, Default)]
pub(crate) struct ModernCodec;

impl ModernCodec {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl WorkbookCodec for ModernCodec {
    fn format(&self) -> SpreadsheetFormat {
        SpreadsheetFormat::Modern
    }

    fn max_rows(&self) -> u32 {
        MAX_ROWS
    }

    fn max_columns(&self) -> u16 {
        MAX_COLUMNS
    }

    /// 背景色（標準パレット）があれば単色の塗りつぶし、RGB値があればそれで上書きする
    fn create_style(&self, name: &str, font: Font, attributes: &StyleAttributes) -> Style {
        let pattern = attributes.fill_pattern.unwrap_or(FillPattern::Solid);
        let mut fill = attributes.background_color.map(|color| Fill {
            color: FillColor::Indexed(color),
            pattern,
        });
        if let Some(rgb) = attributes.rgb {
            fill = Some(Fill {
                color: FillColor::Rgb(rgb),
                pattern: FillPattern::Solid,
            });
        }
        Style::assemble(name, SpreadsheetFormat::Modern, font, attributes, fill)
    }

    fn serialize_to(&self, sheets: &[Sheet], writer: &mut dyn Write) -> Result<()> {
        let mut workbook = XlsxWorkbook::new();
        let mut formats = FormatCache::default();
        let mut split_panes = Vec::new();

        for (sheet_index, sheet) in sheets.iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet, &mut formats).map_err(save_error)?;
            if let Some(Pane::Split {
                x_split_pos,
                y_split_pos,
                leftmost_column,
                top_row,
                active_pane,
            }) = sheet.pane()
            {
                split_panes.push(SplitPane {
                    sheet_index,
                    x_split_pos: *x_split_pos,
                    y_split_pos: *y_split_pos,
                    leftmost_column: *leftmost_column,
                    top_row: *top_row,
                    active_pane: *active_pane,
                });
            }
        }

        let buffer = workbook.save_to_buffer().map_err(save_error)?;
        let buffer = apply_split_panes(buffer, &split_panes)?;
        debug!(
            "wrote xlsx package: {} bytes, {} split pane(s)",
            buffer.len(),
            split_panes.len()
        );
        writer.write_all(&buffer)?;
        Ok(())
    }

    fn supports_protection(&self) -> bool {
        true
    }

    fn supports_notes(&self) -> bool {
        true
    }
}

fn save_error(e: XlsxError) -> XlsBridgeError {
    XlsBridgeError::Save(e.to_string())
}

/// スタイルごとの`Format`のキャッシュ
///
/// キーは`Arc<Style>`のポインタと日付書式の有無。
#[derive(Default)]
struct FormatCache {
    formats: HashMap<(usize, Option<&'static str>), Format>,
}

impl FormatCache {
    fn get(&mut self, style: Option<&Arc<Style>>, date_format: Option<&'static str>) -> Format {
        let key = (style.map_or(0, |s| Arc::as_ptr(s) as usize), date_format);
        self.formats
            .entry(key)
            .or_insert_with(|| {
                let mut format = style.map_or_else(Format::new, |s| to_format(s));
                // 日付セルは、スタイルに書式コードがなければ既定の日付書式を使う
                let has_code = style.is_some_and(|s| s.number_format.is_some());
                if let (Some(code), false) = (date_format, has_code) {
                    format = format.set_num_format(code);
                }
                format
            })
            .clone()
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    formats: &mut FormatCache,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name(sheet.name())?;

    for range in sheet.merged_regions() {
        let first = sheet
            .row(range.start.row)
            .and_then(|row| row.cell(range.start.col));
        let format = formats.get(first.and_then(|c| c.style.as_ref()), None);
        worksheet.merge_range(
            range.start.row,
            range.start.col,
            range.end.row,
            range.end.col,
            "",
            &format,
        )?;
    }

    for row in sheet.rows() {
        if let Some(height) = row.height() {
            worksheet.set_row_height(row.index(), height)?;
        }
        for cell in row.cells() {
            write_cell(worksheet, row.index(), cell, formats)?;
            if let Some(note) = &cell.note {
                let mut xlsx_note = Note::new(&note.text);
                if let Some(author) = &note.author {
                    xlsx_note = xlsx_note.set_author(author);
                }
                worksheet.insert_note(row.index(), cell.column, &xlsx_note)?;
            }
        }
    }

    for (column, width) in sheet.column_widths() {
        worksheet.set_column_width(column, width)?;
    }

    if let Some(Pane::Freeze {
        col_split,
        row_split,
        leftmost_column,
        top_row,
    }) = sheet.pane()
    {
        worksheet.set_freeze_panes(*row_split, *col_split)?;
        if leftmost_column != col_split || top_row != row_split {
            worksheet.set_freeze_panes_top_cell(*top_row, *leftmost_column)?;
        }
    }

    if let Some(protection) = sheet.protection() {
        // 既定のオプションでは行・列の挿入と削除が禁止される
        let options = ProtectionOptions::new();
        worksheet.protect_with_password(&protection.password);
        worksheet.protect_with_options(&options);
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    cell: &Cell,
    formats: &mut FormatCache,
) -> std::result::Result<(), XlsxError> {
    let col = cell.column;
    let style = cell.style.as_ref();

    match &cell.value {
        CellValue::Text(s) => {
            let format = formats.get(style, None);
            worksheet.write_string_with_format(row, col, s, &format)?;
        }
        CellValue::Number(n) => {
            let format = formats.get(style, None);
            worksheet.write_number_with_format(row, col, *n, &format)?;
        }
        CellValue::Boolean(b) => {
            let format = formats.get(style, None);
            worksheet.write_boolean_with_format(row, col, *b, &format)?;
        }
        CellValue::Date(dt) => {
            let format = formats.get(style, Some(default_date_format(dt)));
            worksheet.write_number_with_format(row, col, datetime_to_serial(dt), &format)?;
        }
        CellValue::Formula { text, cached } => {
            let mut formula = Formula::new(text);
            if let Some(result) = cached {
                formula = formula.set_result(result.to_text());
            }
            let format = formats.get(style, None);
            worksheet.write_formula_with_format(row, col, formula, &format)?;
        }
        CellValue::Error(e) => {
            let format = formats.get(style, None);
            worksheet.write_string_with_format(row, col, e, &format)?;
        }
        CellValue::Blank => {
            let format = formats.get(style, None);
            worksheet.write_blank(row, col, &format)?;
        }
    }
    Ok(())
}

/// スタイルを`rust_xlsxwriter`の`Format`に変換する
fn to_format(style: &Style) -> Format {
    let mut format = Format::new()
        .set_font_name(&style.font.name)
        .set_font_size(style.font.size)
        .set_font_color(Color::RGB(style.font.color.rgb()))
        .set_align(horizontal_align(style.horizontal))
        .set_align(vertical_align(style.vertical))
        .set_border_top(border(style.borders.top))
        .set_border_bottom(border(style.borders.bottom))
        .set_border_left(border(style.borders.left))
        .set_border_right(border(style.borders.right));

    if style.font.bold {
        format = format.set_bold();
    }
    if style.font.italic {
        format = format.set_italic();
    }
    if style.font.underline != FontUnderline::None {
        format = format.set_underline(underline(style.font.underline));
    }

    if let Some(fill) = style.fill {
        let color = match fill.color {
            FillColor::Indexed(indexed) => Color::RGB(indexed.rgb()),
            FillColor::Rgb([r, g, b]) => {
                Color::RGB((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
            }
            // Modern形式ではパレットインデックスを使わない
            FillColor::Palette(_) => Color::Default,
        };
        format = match fill.pattern {
            FillPattern::None => format,
            FillPattern::Solid => format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(color),
            other => format
                .set_pattern(pattern(other))
                .set_foreground_color(color),
        };
    }

    if let Some(code) = &style.number_format {
        format = format.set_num_format(code);
    }

    format
}

fn horizontal_align(alignment: HorizontalAlignment) -> FormatAlign {
    match alignment {
        HorizontalAlignment::General => FormatAlign::General,
        HorizontalAlignment::Left => FormatAlign::Left,
        HorizontalAlignment::Center => FormatAlign::Center,
        HorizontalAlignment::Right => FormatAlign::Right,
        HorizontalAlignment::Fill => FormatAlign::Fill,
        HorizontalAlignment::Justify => FormatAlign::Justify,
        HorizontalAlignment::CenterSelection => FormatAlign::CenterAcross,
        HorizontalAlignment::Distributed => FormatAlign::Distributed,
    }
}

fn vertical_align(alignment: VerticalAlignment) -> FormatAlign {
    match alignment {
        VerticalAlignment::Top => FormatAlign::Top,
        VerticalAlignment::Center => FormatAlign::VerticalCenter,
        VerticalAlignment::Bottom => FormatAlign::Bottom,
        VerticalAlignment::Justify => FormatAlign::VerticalJustify,
        VerticalAlignment::Distributed => FormatAlign::VerticalDistributed,
    }
}

fn border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
        BorderStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderStyle::DashDot => FormatBorder::DashDot,
        BorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn underline(style: FontUnderline) -> FormatUnderline {
    match style {
        FontUnderline::None => FormatUnderline::None,
        FontUnderline::Single => FormatUnderline::Single,
        FontUnderline::Double => FormatUnderline::Double,
        FontUnderline::SingleAccounting => FormatUnderline::SingleAccounting,
        FontUnderline::DoubleAccounting => FormatUnderline::DoubleAccounting,
    }
}

fn pattern(pattern: FillPattern) -> FormatPattern {
    match pattern {
        FillPattern::None => FormatPattern::None,
        FillPattern::Solid => FormatPattern::Solid,
        FillPattern::MediumGray => FormatPattern::MediumGray,
        FillPattern::DarkGray => FormatPattern::DarkGray,
        FillPattern::LightGray => FormatPattern::LightGray,
        FillPattern::DarkHorizontal => FormatPattern::DarkHorizontal,
        FillPattern::DarkVertical => FormatPattern::DarkVertical,
        FillPattern::DarkDown => FormatPattern::DarkDown,
        FillPattern::DarkUp => FormatPattern::DarkUp,
        FillPattern::DarkGrid => FormatPattern::DarkGrid,
        FillPattern::DarkTrellis => FormatPattern::DarkTrellis,
        FillPattern::LightHorizontal => FormatPattern::LightHorizontal,
        FillPattern::LightVertical => FormatPattern::LightVertical,
        FillPattern::LightDown => FormatPattern::LightDown,
        FillPattern::LightUp => FormatPattern::LightUp,
        FillPattern::LightGrid => FormatPattern::LightGrid,
        FillPattern::LightTrellis => FormatPattern::LightTrellis,
        FillPattern::Gray125 => FormatPattern::Gray125,
        FillPattern::Gray0625 => FormatPattern::Gray0625,
    }
}
