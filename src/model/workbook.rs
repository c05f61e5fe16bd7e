//! Workbook Model
//!
//! 形式に束縛されたワークブック。シートの所有、スタイルの定義と解決、
//! セル値の変換と配置、レイアウト操作、コーデックを介した読み書きを担う。

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::api::{PanePosition, SpreadsheetFormat, ValueKind};
use crate::coerce::{coerce, RawValue};
use crate::codec::{codec_for, WorkbookCodec};
use crate::error::{Result, XlsBridgeError};
use crate::format::{autofit_width, display_width};
use crate::model::cell::{Cell, CellValue, Note};
use crate::model::sheet::{Pane, Row, Sheet};
use crate::security::SecurityConfig;
use crate::style::{Style, StyleAttributes, StyleCache};
use crate::types::{CellCoord, CellRange};

/// 自動調整で使用する既定のフォントサイズ（スタイルなしのセル）
const DEFAULT_FONT_SIZE: f64 = 11.0;

/// 行への参照（シート名 + 行インデックス）
///
/// `ExcelWriter::add_row` / `create_row`が返し、セル操作の対象指定に使用します。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowRef {
    sheet: String,
    index: u32,
}

impl RowRef {
    pub fn new(sheet: impl Into<String>, index: u32) -> Self {
        Self {
            sheet: sheet.into(),
            index,
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// 0始まりの行インデックス
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.index + 1)
    }
}

/// ワークブック
pub struct Workbook {
    format: SpreadsheetFormat,
    sheets: Vec<Sheet>,
    styles: StyleCache,
    codec: Box<dyn WorkbookCodec>,
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("format", &self.format)
            .field("sheets", &self.sheet_names())
            .field("styles", &self.styles.len())
            .finish()
    }
}

impl Workbook {
    /// 空のワークブックを作成する
    pub fn new(format: SpreadsheetFormat) -> Self {
        Self {
            format,
            sheets: Vec::new(),
            styles: StyleCache::new(),
            codec: codec_for(format),
        }
    }

    /// リーダーからワークブックを読み込む
    ///
    /// 値・数式・結合範囲を読み込みます。スタイルは読み込みません。
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックのバイト列を読み込むリーダー
    /// * `format` - バイト列の形式
    ///
    /// # 戻り値
    ///
    /// * `Ok(Workbook)` - 読み込みに成功した場合
    /// * `Err(XlsBridgeError::Parse)` - コーデックがバイト列を拒否した場合
    /// * `Err(XlsBridgeError::SecurityViolation)` - 入力サイズの上限を超えた場合
    pub fn open<R: Read>(reader: R, format: SpreadsheetFormat) -> Result<Self> {
        Self::open_with_security(reader, format, &SecurityConfig::default())
    }

    /// セキュリティ設定を指定してワークブックを読み込む
    pub fn open_with_security<R: Read>(
        reader: R,
        format: SpreadsheetFormat,
        security: &SecurityConfig,
    ) -> Result<Self> {
        let bytes = security.read_limited(reader)?;
        let mut workbook = Self::new(format);
        debug!("opening {:?} workbook ({} bytes)", format, bytes.len());
        let sheets = workbook.codec.parse(bytes)?;
        security.check_sheet_count(sheets.len())?;
        workbook.sheets = sheets;
        Ok(workbook)
    }

    /// ファイル名から形式を選択してワークブックを読み込む
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SpreadsheetFormat::from_file_name(path);
        let file = std::fs::File::open(path)?;
        Self::open(file, format)
    }

    pub fn format(&self) -> SpreadsheetFormat {
        self.format
    }

    /// 作成順のシート名
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    fn require_sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheet_mut(name)
            .ok_or_else(|| XlsBridgeError::NotFound(format!("sheet '{}'", name)))
    }

    /// シートを作成する（同名のシートが存在する場合はエラー）
    ///
    /// # 戻り値
    ///
    /// * `Ok(&mut Sheet)` - 作成されたシート
    /// * `Err(XlsBridgeError::DuplicateSheet)` - 同名のシートが存在する場合
    /// * `Err(XlsBridgeError::InvalidSheetName)` - シート名が形式の制約を満たさない場合
    pub fn create_sheet_strict(&mut self, name: &str) -> Result<&mut Sheet> {
        if self.sheet(name).is_some() {
            return Err(XlsBridgeError::DuplicateSheet(name.to_string()));
        }
        let sheet = self.codec.create_sheet(name)?;
        debug!("created sheet '{}' in {:?} workbook", name, self.format);
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// シートを取得し、存在しなければ作成する
    pub fn get_or_create_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        match self.sheets.iter().position(|s| s.name() == name) {
            Some(pos) => Ok(&mut self.sheets[pos]),
            None => self.create_sheet_strict(name),
        }
    }

    /// すべてのシートを削除する（スタイルは保持される）
    pub fn clear(&mut self) {
        self.sheets.clear();
    }

    /// 名前付きスタイルを定義する（同名のスタイルは置き換えられる）
    pub fn define_style(&mut self, name: &str, attributes: &StyleAttributes) -> Arc<Style> {
        let font = self.codec.create_font(attributes);
        let style = self.codec.create_style(name.trim(), font, attributes);
        self.styles.insert(style)
    }

    /// このワークブックの形式でスタイルを検索する
    pub fn style(&self, name: &str) -> Option<Arc<Style>> {
        self.styles.get(self.format, name)
    }

    pub fn styles(&self) -> &StyleCache {
        &self.styles
    }

    fn resolve_style(&self, name: &str) -> Option<Arc<Style>> {
        if name.trim().is_empty() {
            return None;
        }
        let style = self.style(name);
        if style.is_none() {
            debug!(
                "style '{}' is not defined for {:?}; cell left unstyled",
                name.trim(),
                self.format
            );
        }
        style
    }

    /// 指定したインデックスに行を作成する（シートがなければ作成する）
    ///
    /// # 戻り値
    ///
    /// * `Ok(RowRef)` - 作成された行への参照
    /// * `Err(XlsBridgeError::RowExists)` - 同じインデックスの行が既に存在する場合
    pub fn create_row(&mut self, sheet: &str, index: u32) -> Result<RowRef> {
        let max_rows = self.codec.max_rows();
        if index >= max_rows {
            return Err(XlsBridgeError::UnsupportedOperation(format!(
                "row {} exceeds the {} row limit of the {:?} format",
                index, max_rows, self.format
            )));
        }
        self.get_or_create_sheet(sheet)?.create_row(index)?;
        Ok(RowRef::new(sheet, index))
    }

    /// 行を取得する
    pub fn row(&self, row: &RowRef) -> Option<&Row> {
        self.sheet(row.sheet()).and_then(|s| s.row(row.index()))
    }

    fn require_row_mut(&mut self, row: &RowRef) -> Result<&mut Row> {
        self.sheet_mut(row.sheet())
            .and_then(|s| s.row_mut(row.index()))
            .ok_or_else(|| XlsBridgeError::NotFound(format!("row {}", row)))
    }

    fn check_column(&self, column: u16) -> Result<()> {
        let limit = self.codec.max_columns();
        if column >= limit {
            return Err(XlsBridgeError::ColumnOutOfRange {
                column: usize::from(column),
                limit: usize::from(limit),
            });
        }
        Ok(())
    }

    /// 行の高さ（ポイント）を設定する
    pub fn set_row_height(&mut self, row: &RowRef, height: Option<f64>) -> Result<()> {
        self.require_row_mut(row)?.set_height(height);
        Ok(())
    }

    /// 値を変換してセルに設定する
    ///
    /// # 引数
    ///
    /// * `row` - 対象の行
    /// * `column` - 0始まりの列インデックス
    /// * `raw` - 実行時の値
    /// * `kind` - 宣言された値種別
    /// * `style` - スタイル名（空文字列ならスタイルなし、未定義ならスタイルなしで続行）
    pub fn set_cell(
        &mut self,
        row: &RowRef,
        column: u16,
        raw: &RawValue,
        kind: &ValueKind,
        style: &str,
    ) -> Result<()> {
        self.check_column(column)?;
        let value = coerce(raw, kind)?;
        self.put_cell(row, column, value, style)
    }

    /// 数式を設定する（先頭の`=`は除去される）
    ///
    /// Legacy形式では、数式がBIFF8で表現できるかをこの時点で検証します。
    pub fn set_formula(&mut self, row: &RowRef, column: u16, text: &str, style: &str) -> Result<()> {
        self.check_column(column)?;
        let text = text.trim();
        let text = text.strip_prefix('=').unwrap_or(text).to_string();
        self.codec.validate_formula(&text)?;
        let value = CellValue::Formula { text, cached: None };
        self.put_cell(row, column, value, style)
    }

    /// 型付きの値をそのまま設定する
    pub fn set_value(
        &mut self,
        row: &RowRef,
        column: u16,
        value: CellValue,
        style: &str,
    ) -> Result<()> {
        self.check_column(column)?;
        if let CellValue::Formula { text, .. } = &value {
            self.codec.validate_formula(text)?;
        }
        self.put_cell(row, column, value, style)
    }

    fn put_cell(&mut self, row: &RowRef, column: u16, value: CellValue, style: &str) -> Result<()> {
        let style = self.resolve_style(style);
        let target = self.require_row_mut(row)?;
        let mut cell = Cell::new(column, value);
        cell.style = style;
        target.set_cell(cell);
        Ok(())
    }

    /// 既存セルのスタイルを変更する
    pub fn set_cell_style(&mut self, row: &RowRef, column: u16, style: &str) -> Result<()> {
        let style = self.resolve_style(style);
        let cell = self
            .require_row_mut(row)?
            .cell_mut(column)
            .ok_or_else(|| XlsBridgeError::NotFound(format!("cell {} column {}", row, column)))?;
        cell.style = style;
        Ok(())
    }

    /// セルを削除する
    ///
    /// # 戻り値
    ///
    /// 削除されたセル（存在しなかった場合は`None`）
    pub fn delete_cell(&mut self, row: &RowRef, column: u16) -> Result<Option<Cell>> {
        Ok(self.require_row_mut(row)?.remove_cell(column))
    }

    /// 行のセル数（最後のセルの列インデックス + 1）
    pub fn cell_count(&self, row: &RowRef) -> Result<usize> {
        self.row(row)
            .map(Row::cell_count)
            .ok_or_else(|| XlsBridgeError::NotFound(format!("row {}", row)))
    }

    /// 既存セルにコメントを付与する（Modern形式のみ）
    pub fn add_cell_comment(
        &mut self,
        row: &RowRef,
        column: u16,
        text: &str,
        author: Option<&str>,
    ) -> Result<()> {
        if !self.codec.supports_notes() {
            return Err(XlsBridgeError::UnsupportedOperation(format!(
                "cell comments are not supported by the {:?} format",
                self.format
            )));
        }
        let cell = self
            .require_row_mut(row)?
            .cell_mut(column)
            .ok_or_else(|| XlsBridgeError::NotFound(format!("cell {} column {}", row, column)))?;
        cell.note = Some(Note {
            text: text.to_string(),
            author: author.map(str::to_string),
        });
        Ok(())
    }

    /// セルを結合する（行・列の範囲は両端を含む）
    pub fn merge_cells(
        &mut self,
        sheet: &str,
        row_start: u32,
        row_end: u32,
        col_start: u16,
        col_end: u16,
    ) -> Result<()> {
        let range = CellRange::new(
            CellCoord::new(row_start, col_start),
            CellCoord::new(row_end, col_end),
        );
        self.check_column(range.end.col)?;
        self.require_sheet_mut(sheet)?.add_merged_region(range)
    }

    /// ウィンドウ枠を固定する
    pub fn freeze_pane(&mut self, sheet: &str, col_split: u16, row_split: u32) -> Result<()> {
        self.freeze_pane_at(sheet, col_split, row_split, col_split, row_split)
    }

    /// 表示開始位置を指定してウィンドウ枠を固定する
    pub fn freeze_pane_at(
        &mut self,
        sheet: &str,
        col_split: u16,
        row_split: u32,
        leftmost_column: u16,
        top_row: u32,
    ) -> Result<()> {
        self.require_sheet_mut(sheet)?.set_pane(Pane::Freeze {
            col_split,
            row_split,
            leftmost_column,
            top_row,
        });
        Ok(())
    }

    /// ウィンドウを分割する（位置はtwip単位）
    pub fn split_pane(
        &mut self,
        sheet: &str,
        x_split_pos: u32,
        y_split_pos: u32,
        leftmost_column: u16,
        top_row: u32,
        active_pane: PanePosition,
    ) -> Result<()> {
        self.require_sheet_mut(sheet)?.set_pane(Pane::Split {
            x_split_pos,
            y_split_pos,
            leftmost_column,
            top_row,
            active_pane,
        });
        Ok(())
    }

    /// シートをパスワードで保護する（Modern形式のみ）
    ///
    /// 保護されたシートでは行・列の挿入と削除が禁止されます。
    pub fn protect_sheet(&mut self, sheet: &str, password: &str) -> Result<()> {
        if !self.codec.supports_protection() {
            return Err(XlsBridgeError::UnsupportedOperation(format!(
                "sheet protection is not supported by the {:?} format",
                self.format
            )));
        }
        self.require_sheet_mut(sheet)?.protect(password);
        Ok(())
    }

    /// 列幅（文字数単位）を設定する
    pub fn set_column_width(&mut self, sheet: &str, column: u16, width: f64) -> Result<()> {
        self.check_column(column)?;
        if !(0.0..=255.0).contains(&width) {
            return Err(XlsBridgeError::InvalidValue {
                value: width.to_string(),
                target: "column width (0-255)",
            });
        }
        self.require_sheet_mut(sheet)?.set_column_width(column, width);
        Ok(())
    }

    /// 列の内容から列幅を自動調整する
    ///
    /// 複数列にまたがる結合セルは計算から除外されます。内容のない列は変更しません。
    pub fn auto_size_column(&mut self, sheet: &str, column: u16) -> Result<()> {
        let target = self.require_sheet_mut(sheet)?;
        let width = fitted_width(target, column);
        if let Some(width) = width {
            target.set_column_width(column, width);
        }
        Ok(())
    }

    /// 各シートの列`0..最大セル数`を自動調整する
    pub fn auto_size_all(&mut self) {
        for sheet in &mut self.sheets {
            let count = sheet.max_physical_cell_count();
            for column in 0..count {
                let Ok(column) = u16::try_from(column) else {
                    break;
                };
                if let Some(width) = fitted_width(sheet, column) {
                    sheet.set_column_width(column, width);
                }
            }
        }
    }

    /// ワークブックをシリアライズして書き出す
    pub fn write_to(&self, writer: &mut dyn Write) -> Result<()> {
        debug!(
            "serializing {:?} workbook with {} sheet(s)",
            self.format,
            self.sheets.len()
        );
        self.codec.serialize_to(&self.sheets, writer)
    }

    /// ワークブックをバイト列にシリアライズする
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }
}

fn fitted_width(sheet: &Sheet, column: u16) -> Option<f64> {
    sheet
        .rows()
        .filter_map(|row| {
            let cell = row.cell(column)?;
            let spans_columns = sheet
                .merged_region_at(CellCoord::new(row.index(), column))
                .is_some_and(|range| range.start.col != range.end.col);
            if spans_columns {
                return None;
            }
            let font_size = cell
                .style
                .as_deref()
                .map_or(DEFAULT_FONT_SIZE, |s| s.font.size);
            Some(autofit_width(display_width(&cell.value.to_text()), font_size))
        })
        .reduce(f64::max)
}
