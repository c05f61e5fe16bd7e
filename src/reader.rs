//! Tabular Reader Module
//!
//! シートの行を、ヘッダー行のラベルをキーとするレコード列に射影する。

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::api::SpreadsheetFormat;
use crate::builder::ReaderOptions;
use crate::error::{Result, XlsBridgeError};
use crate::format::{is_date_format, serial_to_datetime};
use crate::model::{Cell, CellValue, Row, Sheet, Workbook};
use crate::types::{FieldValue, Record, SheetRecords};

/// ワークブックの読み込みを行う構造体
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsbridge::ExcelReader;
///
/// # fn main() -> Result<(), xlsbridge::XlsBridgeError> {
/// let reader = ExcelReader::open("students.xlsx")?;
/// for record in reader.read_sheet("Sheet1")? {
///     println!("{:?}", record.get("Name"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExcelReader {
    workbook: Workbook,
    options: ReaderOptions,
}

impl ExcelReader {
    /// ファイルを開く（形式は拡張子から選択される）
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    /// 読み込み設定を指定してファイルを開く
    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let format = SpreadsheetFormat::from_file_name(path);
        let file = std::fs::File::open(path)?;
        Self::from_reader_with_options(file, format, options)
    }

    /// リーダーからワークブックを読み込む
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックのバイト列を読み込むリーダー
    /// * `format` - バイト列の形式
    ///
    /// # 戻り値
    ///
    /// * `Ok(ExcelReader)` - 読み込みに成功した場合
    /// * `Err(XlsBridgeError::Parse)` - バイト列がワークブックとして解釈できない場合
    /// * `Err(XlsBridgeError::SecurityViolation)` - 入力サイズまたはシート数が上限を超えた場合
    pub fn from_reader<R: Read>(reader: R, format: SpreadsheetFormat) -> Result<Self> {
        Self::from_reader_with_options(reader, format, ReaderOptions::default())
    }

    pub fn from_reader_with_options<R: Read>(
        reader: R,
        format: SpreadsheetFormat,
        options: ReaderOptions,
    ) -> Result<Self> {
        let workbook = Workbook::open_with_security(reader, format, &options.security)?;
        Ok(Self { workbook, options })
    }

    /// 構築済みのワークブックを読み込み対象にする
    pub fn from_workbook(workbook: Workbook) -> Self {
        Self {
            workbook,
            options: ReaderOptions::default(),
        }
    }

    /// 読み込み設定を置き換える
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 既定のヘッダー位置でシートを読み込む
    pub fn read_sheet(&self, name: &str) -> Result<Vec<Record>> {
        self.read_sheet_at(name, self.options.header_row_index)
    }

    /// ヘッダー位置を指定してシートを読み込む
    ///
    /// # 引数
    ///
    /// * `name` - シート名
    /// * `header_row_index` - ヘッダー行の位置（既存の行を先頭から数えた0始まりの位置）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Record>)` - ヘッダー行以降の各行のレコード（ヘッダー行がなければ空）
    /// * `Err(XlsBridgeError::NotFound)` - シートが存在しない場合
    /// * `Err(XlsBridgeError::Schema)` - ヘッダー行に空セルや重複ラベルがある場合
    pub fn read_sheet_at(&self, name: &str, header_row_index: usize) -> Result<Vec<Record>> {
        let sheet = self
            .workbook
            .sheet(name)
            .ok_or_else(|| XlsBridgeError::NotFound(format!("sheet '{}'", name)))?;
        project_sheet(sheet, header_row_index)
    }

    /// すべてのシートを格納順に読み込む
    pub fn read_workbook(&self) -> Result<Vec<SheetRecords>> {
        self.workbook
            .sheets()
            .iter()
            .map(|sheet| {
                Ok(SheetRecords {
                    name: sheet.name().to_string(),
                    records: project_sheet(sheet, self.options.header_row_index)?,
                })
            })
            .collect()
    }
}

fn project_sheet(sheet: &Sheet, header_row_index: usize) -> Result<Vec<Record>> {
    let mut rows = sheet.rows().skip(header_row_index);
    let Some(header_row) = rows.next() else {
        debug!(
            "sheet '{}' has no row at position {}; no records",
            sheet.name(),
            header_row_index
        );
        return Ok(Vec::new());
    };
    let headers = header_labels(sheet.name(), header_row)?;
    Ok(rows.map(|row| project_row(&headers, row)).collect())
}

fn header_labels(sheet: &str, row: &Row) -> Result<Vec<String>> {
    let Some(last) = row.last_column() else {
        return Ok(Vec::new());
    };
    let mut seen = HashSet::new();
    (0..=last)
        .map(|column| {
            let label = row
                .cell(column)
                .map(|cell| cell.value.to_text())
                .filter(|text| !text.is_empty())
                .ok_or_else(|| XlsBridgeError::Schema {
                    sheet: sheet.to_string(),
                    message: format!("header cell at column {} is blank", column),
                })?;
            if !seen.insert(label.clone()) {
                return Err(XlsBridgeError::Schema {
                    sheet: sheet.to_string(),
                    message: format!("duplicate header label '{}'", label),
                });
            }
            Ok(label)
        })
        .collect()
}

fn project_row(headers: &[String], row: &Row) -> Record {
    let mut record = Record::with_capacity(headers.len());
    for (column, header) in (0u16..).zip(headers) {
        let value = row.cell(column).and_then(decode_cell);
        record.push(header.clone(), value);
    }
    record
}

/// セルを読み込み結果の値に変換する
///
/// 数値セルは、スタイルの数値書式が日付書式なら日時として返します。
fn decode_cell(cell: &Cell) -> Option<FieldValue> {
    let date_styled = cell
        .style
        .as_ref()
        .and_then(|style| style.number_format.as_deref())
        .is_some_and(is_date_format);
    decode(&cell.value, date_styled)
}

/// セル値を読み込み結果の値に変換する（空白は`None`）
fn decode(value: &CellValue, date_styled: bool) -> Option<FieldValue> {
    match value {
        CellValue::Text(s) => Some(FieldValue::Text(s.clone())),
        CellValue::Number(n) if date_styled => Some(
            serial_to_datetime(*n).map_or(FieldValue::Number(*n), FieldValue::Date),
        ),
        CellValue::Number(n) => Some(FieldValue::Number(*n)),
        CellValue::Boolean(b) => Some(FieldValue::Boolean(*b)),
        CellValue::Date(d) => Some(FieldValue::Date(*d)),
        CellValue::Formula { cached, .. } => {
            cached.as_deref().and_then(|cached| decode(cached, date_styled))
        }
        CellValue::Blank => None,
        CellValue::Error(_) => Some(FieldValue::Text(value.to_text())),
    }
}
