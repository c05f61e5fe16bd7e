//! Workbook Loader
//!
//! calamineのワークブック（`Xls` / `Xlsx`）から値・数式・結合範囲を読み込み、
//! `Sheet`モデルを構築する。スタイルは読み込まない。

use std::fmt::Display;
use std::io::Cursor;

use calamine::{Data, Dimensions, Range, Reader, Xls, Xlsx};
use log::debug;

use crate::api::SpreadsheetFormat;
use crate::error::{Result, XlsBridgeError};
use crate::format::parse_datetime_text;
use crate::model::{Cell, CellValue, Sheet};
use crate::types::{CellCoord, CellRange};

type Source = Cursor<Vec<u8>>;

/// バイト列からすべてのシートを読み込む
///
/// # 引数
///
/// * `bytes` - ワークブックのバイト列
/// * `format` - バイト列の形式
///
/// # 戻り値
///
/// * `Ok(Vec<Sheet>)` - ワークブック内の順序で並んだシート
/// * `Err(XlsBridgeError::Parse)` - calamineがバイト列を拒否した場合
/// * `Err(XlsBridgeError::Read)` - シートの読み込み中に失敗した場合
pub(crate) fn load_sheets(bytes: Vec<u8>, format: SpreadsheetFormat) -> Result<Vec<Sheet>> {
    let source = Cursor::new(bytes);
    match format {
        SpreadsheetFormat::Legacy => {
            let mut workbook: Xls<Source> = Xls::new(source).map_err(open_error)?;
            load_all(&mut workbook, |workbook, name| {
                Ok(workbook.worksheet_merge_cells(name).unwrap_or_default())
            })
        }
        SpreadsheetFormat::Modern => {
            let mut workbook: Xlsx<Source> = Xlsx::new(source).map_err(open_error)?;
            workbook.load_merged_regions().map_err(read_error)?;
            load_all(&mut workbook, |workbook, name| {
                match workbook.worksheet_merge_cells(name) {
                    Some(regions) => regions.map_err(read_error),
                    None => Ok(Vec::new()),
                }
            })
        }
    }
}

fn open_error(e: impl Display) -> XlsBridgeError {
    XlsBridgeError::Parse(e.to_string())
}

fn read_error(e: impl Display) -> XlsBridgeError {
    XlsBridgeError::Read(e.to_string())
}

fn load_all<W, F>(workbook: &mut W, merges: F) -> Result<Vec<Sheet>>
where
    W: Reader<Source>,
    W::Error: Display,
    F: Fn(&mut W, &str) -> Result<Vec<Dimensions>>,
{
    let names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let values = workbook.worksheet_range(&name).map_err(read_error)?;
        // 数式の解析に失敗しても値は読み込める
        let formulas = match workbook.worksheet_formula(&name) {
            Ok(formulas) => Some(formulas),
            Err(e) => {
                debug!("formulas of sheet '{}' are unavailable: {}", name, e);
                None
            }
        };

        let mut sheet = Sheet::new(name.as_str());
        fill_values(&mut sheet, &values);
        if let Some(formulas) = &formulas {
            fill_formulas(&mut sheet, formulas);
        }
        for dims in merges(workbook, &name)? {
            let range = merged_range(&dims);
            if let Some(range) = range {
                // 単一セルや重複した範囲はファイル上の記述をそのまま捨てる
                if let Err(e) = sheet.add_merged_region(range) {
                    debug!("ignoring merged region in sheet '{}': {}", name, e);
                }
            }
        }

        debug!(
            "loaded sheet '{}' ({} rows, {} merged regions)",
            name,
            sheet.row_count(),
            sheet.merged_regions().len()
        );
        sheets.push(sheet);
    }

    Ok(sheets)
}

/// calamineの相対座標を絶対座標に変換する
fn absolute(start: (u32, u32), row: usize, col: usize) -> Option<CellCoord> {
    let row = start.0.checked_add(u32::try_from(row).ok()?)?;
    let col = start.1.checked_add(u32::try_from(col).ok()?)?;
    Some(CellCoord::new(row, u16::try_from(col).ok()?))
}

fn fill_values(sheet: &mut Sheet, range: &Range<Data>) {
    let start = range.start().unwrap_or((0, 0));
    for (row, col, data) in range.used_cells() {
        let Some(coord) = absolute(start, row, col) else {
            continue;
        };
        let Some(value) = convert_value(data) else {
            continue;
        };
        sheet
            .row_or_create(coord.row)
            .set_cell(Cell::new(coord.col, value));
    }
}

fn fill_formulas(sheet: &mut Sheet, range: &Range<String>) {
    let start = range.start().unwrap_or((0, 0));
    for (row, col, formula) in range.used_cells() {
        let text = formula.trim();
        let text = text.strip_prefix('=').unwrap_or(text);
        if text.is_empty() {
            continue;
        }
        let Some(coord) = absolute(start, row, col) else {
            continue;
        };
        let target = sheet.row_or_create(coord.row);
        let cached = target
            .remove_cell(coord.col)
            .map(|cell| Box::new(cell.value));
        target.set_cell(Cell::new(
            coord.col,
            CellValue::Formula {
                text: text.to_string(),
                cached,
            },
        ));
    }
}

/// calamineの値をセル値に変換する（空セルは`None`）
fn convert_value(data: &Data) -> Option<CellValue> {
    let value = match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                CellValue::Number(dt.as_f64())
            } else {
                dt.as_datetime()
                    .map(CellValue::Date)
                    .unwrap_or_else(|| CellValue::Number(dt.as_f64()))
            }
        }
        Data::DateTimeIso(s) => parse_datetime_text(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => return None,
    };
    Some(value)
}

fn merged_range(dims: &Dimensions) -> Option<CellRange> {
    let start = CellCoord::new(dims.start.0, u16::try_from(dims.start.1).ok()?);
    let end = CellCoord::new(dims.end.0, u16::try_from(dims.end.1).ok()?);
    Some(CellRange::new(start, end))
}
