//! Workbook Stream Builder
//!
//! シートモデルからBIFF8の`Workbook`ストリームを組み立てる。
//!
//! ストリームの構成:
//! 1. ワークブックグローバル（BOF, CODEPAGE, FONT, FORMAT, XF, STYLE, BOUNDSHEET, SST, EOF）
//! 2. シートごとのサブストリーム（BOF, COLINFO, DIMENSIONS, ROW + セル, WINDOW2, PANE, MERGEDCELLS, EOF）
//!
//! BOUNDSHEETのシート位置はシートを書き込んだ後に書き換える。

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace, warn};

use super::formula::{compile, error_code};
use super::records::{
    BiffWriter, FontRecord, FormulaResult, RowRecord, XfRecord, MAX_TEXT_CHARS,
    SUBSTREAM_WORKBOOK, SUBSTREAM_WORKSHEET,
};
use crate::api::{FontUnderline, HorizontalAlignment, VerticalAlignment};
use crate::error::{Result, XlsBridgeError};
use crate::format::{builtin_format_id, datetime_to_serial, default_date_format};
use crate::model::{Cell, CellValue, Pane, Row, Sheet};
use crate::style::{FillColor, Style};

/// UTF-16LEのコードページ
const CODEPAGE_UNICODE: u16 = 1200;

/// ユーザー定義の書式IDの開始値
const FIRST_CUSTOM_FORMAT_ID: u16 = 164;

/// スタイルXFの数（0〜14）
const STYLE_XF_COUNT: u16 = 15;

/// 既定のセルXF
const DEFAULT_CELL_XF: u16 = 15;

/// 既定フォントの数（FONTインデックス4は欠番）
const DEFAULT_FONT_COUNT: usize = 4;

/// ROWレコードとセルを書き込む単位
const ROW_BLOCK_SIZE: usize = 32;

/// システムの前景色・背景色
const COLOR_SYSTEM_FOREGROUND: u16 = 0x40;
const COLOR_SYSTEM_BACKGROUND: u16 = 0x41;
const COLOR_AUTOMATIC: u16 = 0x7FFF;

fn default_font() -> FontRecord {
    FontRecord {
        name: "Arial".to_string(),
        height: 200,
        italic: false,
        bold: false,
        underline: 0,
        color_index: COLOR_AUTOMATIC,
    }
}

/// XFのキー（スタイルのポインタと、書式コードを持たない日付セルの既定書式）
type XfKey = (usize, Option<&'static str>);

/// FONT・FORMAT・XFのテーブル
#[derive(Debug)]
struct FormatTable {
    fonts: Vec<FontRecord>,
    formats: Vec<(u16, String)>,
    xfs: Vec<XfRecord>,
    index: HashMap<XfKey, u16>,
}

impl FormatTable {
    fn new() -> Self {
        Self {
            fonts: vec![default_font(); DEFAULT_FONT_COUNT],
            formats: Vec::new(),
            xfs: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn key(style: Option<&Arc<Style>>, date_format: Option<&'static str>) -> XfKey {
        let has_code = style.is_some_and(|s| s.number_format.is_some());
        let date_format = if has_code { None } else { date_format };
        (style.map_or(0, |s| Arc::as_ptr(s) as usize), date_format)
    }

    /// セルのXFを登録する
    fn register(&mut self, style: Option<&Arc<Style>>, date_format: Option<&'static str>) {
        let key = Self::key(style, date_format);
        if key == (0, None) || self.index.contains_key(&key) {
            return;
        }
        let format_index = match style.and_then(|s| s.number_format.as_deref()).or(key.1) {
            Some(code) => self.format_id(code),
            None => 0,
        };
        let xf = match style {
            Some(style) => XfRecord {
                font_index: self.font_index(style),
                format_index,
                ..style_xf(style)
            },
            None => XfRecord {
                format_index,
                ..unstyled_xf()
            },
        };
        let xf_index = DEFAULT_CELL_XF + 1 + self.xfs.len() as u16;
        self.xfs.push(xf);
        self.index.insert(key, xf_index);
    }

    fn xf_index(&self, style: Option<&Arc<Style>>, date_format: Option<&'static str>) -> u16 {
        self.index
            .get(&Self::key(style, date_format))
            .copied()
            .unwrap_or(DEFAULT_CELL_XF)
    }

    fn format_id(&mut self, code: &str) -> u16 {
        if let Some(id) = builtin_format_id(code) {
            return id;
        }
        if let Some((id, _)) = self.formats.iter().find(|(_, c)| c == code) {
            return *id;
        }
        let id = FIRST_CUSTOM_FORMAT_ID + self.formats.len() as u16;
        self.formats.push((id, code.to_string()));
        id
    }

    fn font_index(&mut self, style: &Style) -> u16 {
        let font = FontRecord {
            name: style.font.name.clone(),
            height: (style.font.size * 20.0).round().clamp(20.0, 8180.0) as u16,
            italic: style.font.italic,
            bold: style.font.bold,
            underline: underline_code(style.font.underline),
            color_index: style.font.color.index(),
        };
        let position = match self.fonts.iter().position(|f| *f == font) {
            Some(position) => position,
            None => {
                self.fonts.push(font);
                self.fonts.len() - 1
            }
        };
        // インデックス4は欠番のため、5番目以降は1つずれる
        if position >= DEFAULT_FONT_COUNT {
            position as u16 + 1
        } else {
            position as u16
        }
    }

    fn write(&self, writer: &mut BiffWriter) -> Result<()> {
        for font in &self.fonts {
            writer.font(font)?;
        }
        for (id, code) in &self.formats {
            writer.format(*id, code)?;
        }
        let style_xf = XfRecord {
            is_style: true,
            ..unstyled_xf()
        };
        for _ in 0..STYLE_XF_COUNT {
            writer.xf(&style_xf)?;
        }
        writer.xf(&unstyled_xf())?;
        for xf in &self.xfs {
            writer.xf(xf)?;
        }
        writer.builtin_style(0, 0)
    }
}

fn unstyled_xf() -> XfRecord {
    XfRecord {
        vertical: 2,
        fill_foreground: COLOR_SYSTEM_FOREGROUND,
        fill_background: COLOR_SYSTEM_BACKGROUND,
        ..XfRecord::default()
    }
}

fn style_xf(style: &Style) -> XfRecord {
    let (fill_pattern, fill_foreground, fill_background) = match style.fill {
        Some(fill) => {
            let color = match fill.color {
                FillColor::Indexed(color) => Some(color.index()),
                FillColor::Palette(index) => Some(index),
                FillColor::Rgb(_) => None,
            };
            match color {
                Some(color) => (fill.pattern as u8, color, COLOR_SYSTEM_FOREGROUND),
                None => (0, COLOR_SYSTEM_FOREGROUND, COLOR_SYSTEM_BACKGROUND),
            }
        }
        None => (0, COLOR_SYSTEM_FOREGROUND, COLOR_SYSTEM_BACKGROUND),
    };

    XfRecord {
        font_index: 0,
        format_index: 0,
        is_style: false,
        horizontal: horizontal_code(style.horizontal),
        vertical: vertical_code(style.vertical),
        borders: [
            style.borders.left as u8,
            style.borders.right as u8,
            style.borders.top as u8,
            style.borders.bottom as u8,
        ],
        fill_pattern,
        fill_foreground,
        fill_background,
    }
}

fn horizontal_code(alignment: HorizontalAlignment) -> u8 {
    match alignment {
        HorizontalAlignment::General => 0,
        HorizontalAlignment::Left => 1,
        HorizontalAlignment::Center => 2,
        HorizontalAlignment::Right => 3,
        HorizontalAlignment::Fill => 4,
        HorizontalAlignment::Justify => 5,
        HorizontalAlignment::CenterSelection => 6,
        HorizontalAlignment::Distributed => 7,
    }
}

fn vertical_code(alignment: VerticalAlignment) -> u8 {
    match alignment {
        VerticalAlignment::Top => 0,
        VerticalAlignment::Center => 1,
        VerticalAlignment::Bottom => 2,
        VerticalAlignment::Justify => 3,
        VerticalAlignment::Distributed => 4,
    }
}

fn underline_code(underline: FontUnderline) -> u8 {
    match underline {
        FontUnderline::None => 0x00,
        FontUnderline::Single => 0x01,
        FontUnderline::Double => 0x02,
        FontUnderline::SingleAccounting => 0x21,
        FontUnderline::DoubleAccounting => 0x22,
    }
}

/// 日付セルの既定書式（日付以外は`None`）
fn date_format_of(value: &CellValue) -> Option<&'static str> {
    match value {
        CellValue::Date(dt) => Some(default_date_format(dt)),
        _ => None,
    }
}

/// 共有文字列テーブル
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, u32>,
    total: u32,
}

impl SharedStrings {
    fn insert(&mut self, text: &str) -> Result<()> {
        let count = text.chars().count();
        if count > MAX_TEXT_CHARS {
            return Err(XlsBridgeError::Save(format!(
                "cell text exceeds {} characters ({})",
                MAX_TEXT_CHARS, count
            )));
        }
        self.total = self.total.saturating_add(1);
        if !self.index.contains_key(text) {
            self.index.insert(text.to_string(), self.strings.len() as u32);
            self.strings.push(text.to_string());
        }
        Ok(())
    }

    fn get(&self, text: &str) -> Result<u32> {
        self.index.get(text).copied().ok_or_else(|| {
            XlsBridgeError::Save(format!("string '{}' missing from shared string table", text))
        })
    }
}

/// セル値のうち共有文字列テーブルに入る文字列
fn shared_text(value: &CellValue) -> Option<&str> {
    match value {
        CellValue::Text(s) => Some(s),
        CellValue::Error(e) if error_code(e).is_none() => Some(e),
        _ => None,
    }
}

/// `Workbook`ストリームを組み立てる
///
/// # 引数
///
/// * `sheets` - 書き込むシート（1つ以上）
///
/// # 戻り値
///
/// BIFF8レコードを連結したストリームのバイト列
pub(super) fn build_workbook_stream(sheets: &[Sheet]) -> Result<Vec<u8>> {
    let mut formats = FormatTable::new();
    let mut strings = SharedStrings::default();
    for cell in sheets.iter().flat_map(|s| s.rows()).flat_map(|r| r.cells()) {
        formats.register(cell.style.as_ref(), date_format_of(&cell.value));
        if let Some(text) = shared_text(&cell.value) {
            strings.insert(text)?;
        }
    }

    let mut writer = BiffWriter::new();
    writer.bof(SUBSTREAM_WORKBOOK)?;
    writer.codepage(CODEPAGE_UNICODE)?;
    writer.date1904(false)?;
    writer.window1()?;
    formats.write(&mut writer)?;

    let mut position_offsets = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        position_offsets.push(writer.boundsheet(sheet.name())?);
    }
    writer.sst(&strings.strings, strings.total)?;
    writer.eof()?;

    for (sheet_index, (sheet, offset)) in sheets.iter().zip(position_offsets).enumerate() {
        let position = u32::try_from(writer.position())
            .map_err(|_| XlsBridgeError::Save("workbook stream exceeds 4GB".to_string()))?;
        writer.patch_u32(offset, position)?;
        write_sheet(&mut writer, sheet, sheet_index == 0, &formats, &strings)?;
        trace!(
            "sheet '{}' substream: {} bytes at offset {}",
            sheet.name(),
            writer.position() - position as usize,
            position
        );
    }

    debug!(
        "built BIFF8 stream: {} sheet(s), {} font(s), {} cell XF(s), {} shared string(s)",
        sheets.len(),
        formats.fonts.len(),
        formats.xfs.len(),
        strings.strings.len()
    );
    Ok(writer.into_inner())
}

fn write_sheet(
    writer: &mut BiffWriter,
    sheet: &Sheet,
    selected: bool,
    formats: &FormatTable,
    strings: &SharedStrings,
) -> Result<()> {
    writer.bof(SUBSTREAM_WORKSHEET)?;
    writer.wsbool()?;

    for (column, width) in sheet.column_widths() {
        writer.colinfo(column, (width * 256.0).round().clamp(0.0, 65_280.0) as u16)?;
    }

    let (first_row, last_row, first_col, last_col) = used_range(sheet);
    writer.dimensions(first_row, last_row, first_col, last_col)?;

    let rows: Vec<&Row> = sheet
        .rows()
        .filter(|row| !row.is_empty() || row.height().is_some())
        .collect();
    for block in rows.chunks(ROW_BLOCK_SIZE) {
        for row in block {
            let first_column = row.cells().next().map_or(0, |c| c.column);
            let last_column = row.last_column().map_or(0, |c| c + 1);
            writer.row(&RowRecord {
                index: row.index(),
                first_column,
                last_column,
                height: row
                    .height()
                    .map(|h| (h * 20.0).round().clamp(0.0, 8191.0) as u16),
            })?;
        }
        for row in block {
            for cell in row.cells() {
                write_cell(writer, row.index(), cell, formats, strings)?;
            }
        }
    }

    writer.window2(matches!(sheet.pane(), Some(Pane::Freeze { .. })), selected)?;
    match sheet.pane() {
        Some(Pane::Freeze {
            col_split,
            row_split,
            leftmost_column,
            top_row,
        }) => {
            let rows = u16::try_from(*row_split).map_err(|_| {
                XlsBridgeError::Save(format!("freeze row {} exceeds 65535", row_split))
            })?;
            let active = match (*col_split > 0, *row_split > 0) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            };
            writer.pane(*col_split, rows, *top_row, *leftmost_column, active)?;
        }
        Some(Pane::Split {
            x_split_pos,
            y_split_pos,
            leftmost_column,
            top_row,
            active_pane,
        }) => {
            let twips = |pos: u32| u16::try_from(pos).unwrap_or(u16::MAX);
            writer.pane(
                twips(*x_split_pos),
                twips(*y_split_pos),
                *top_row,
                *leftmost_column,
                *active_pane as u8,
            )?;
        }
        None => {}
    }

    let merges: Vec<(u32, u32, u16, u16)> = sheet
        .merged_regions()
        .iter()
        .map(|r| (r.start.row, r.end.row, r.start.col, r.end.col))
        .collect();
    if !merges.is_empty() {
        writer.merged_cells(&merges)?;
    }

    writer.eof()
}

/// 使用範囲（行・列の終端は最後のインデックス + 1）
fn used_range(sheet: &Sheet) -> (u32, u32, u16, u16) {
    let mut range: Option<(u32, u32, u16, u16)> = None;
    for row in sheet.rows().filter(|r| !r.is_empty()) {
        let first = row.cells().next().map_or(0, |c| c.column);
        let last = row.last_column().unwrap_or(0);
        range = Some(match range {
            None => (row.index(), row.index() + 1, first, last + 1),
            Some((r0, _, c0, c1)) => (r0, row.index() + 1, c0.min(first), c1.max(last + 1)),
        });
    }
    range.unwrap_or((0, 0, 0, 0))
}

fn write_cell(
    writer: &mut BiffWriter,
    row: u32,
    cell: &Cell,
    formats: &FormatTable,
    strings: &SharedStrings,
) -> Result<()> {
    let col = cell.column;
    let xf = formats.xf_index(cell.style.as_ref(), date_format_of(&cell.value));

    match &cell.value {
        CellValue::Text(s) => writer.label_sst(row, col, xf, strings.get(s)?),
        CellValue::Number(n) => writer.number(row, col, xf, *n),
        CellValue::Boolean(b) => writer.boolean(row, col, xf, *b),
        CellValue::Date(dt) => writer.number(row, col, xf, datetime_to_serial(dt)),
        CellValue::Error(e) => match error_code(e) {
            Some(code) => writer.error(row, col, xf, code),
            None => writer.label_sst(row, col, xf, strings.get(e)?),
        },
        CellValue::Blank => writer.blank(row, col, xf),
        CellValue::Formula { text, cached } => match compile(text) {
            Ok(tokens) => {
                let cached = cached.as_deref();
                let result = match cached {
                    Some(CellValue::Number(n)) => FormulaResult::Number(*n),
                    Some(CellValue::Date(dt)) => FormulaResult::Number(datetime_to_serial(dt)),
                    Some(CellValue::Boolean(b)) => FormulaResult::Boolean(*b),
                    Some(CellValue::Error(e)) => {
                        FormulaResult::Error(error_code(e).unwrap_or(0x0F))
                    }
                    Some(CellValue::Text(_)) => FormulaResult::Text,
                    _ => FormulaResult::Empty,
                };
                writer.formula(row, col, xf, &result, &tokens)?;
                if let Some(CellValue::Text(s)) = cached {
                    writer.string(s)?;
                }
                Ok(())
            }
            // 読み込んだファイルの数式がBIFF8で表現できない場合は計算結果のみを残す
            Err(e) => {
                warn!("writing cached value for formula at row {}: {}", row + 1, e);
                match cached.as_deref() {
                    Some(CellValue::Number(n)) => writer.number(row, col, xf, *n),
                    Some(CellValue::Boolean(b)) => writer.boolean(row, col, xf, *b),
                    _ => writer.blank(row, col, xf),
                }
            }
        },
    }
}
