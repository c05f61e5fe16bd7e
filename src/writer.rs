//! Writer Module
//!
//! 追記型の行書き込み、表データの書き込み、ファイルまたはストリームへの保存を行う
//! `ExcelWriter`を定義する。リソースの解放は`close()`または破棄時に一度だけ行われる。

use std::fs;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::api::{PanePosition, SpreadsheetFormat, ValueKind};
use crate::builder::{ExcelWriterBuilder, WriterConfig};
use crate::coerce::RawValue;
use crate::error::{Result, XlsBridgeError};
use crate::model::{Cell, RowRef, Workbook};
use crate::sequencer::RowSequencer;
use crate::style::{Style, StyleAttributes};
use crate::types::Table;

/// ワークブックの書き込みを行う構造体
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsbridge::{ExcelWriter, SpreadsheetFormat, ValueKind};
///
/// # fn main() -> Result<(), xlsbridge::XlsBridgeError> {
/// let mut writer = ExcelWriter::from_file_name("students.xls");
/// assert_eq!(writer.format(), SpreadsheetFormat::Legacy);
///
/// let header = writer.add_row("Sheet1")?;
/// writer.set_cell(&header, 0, "Student No", &ValueKind::Text, "")?;
/// writer.set_cell(&header, 1, "Name", &ValueKind::Text, "")?;
///
/// let row = writer.add_row("Sheet1")?;
/// writer.set_cell(&row, 0, 20210001, &ValueKind::Int32, "")?;
/// writer.set_cell(&row, 1, "Rizal", &ValueKind::Text, "")?;
///
/// writer.save(true)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExcelWriter {
    workbook: Workbook,
    sequencer: RowSequencer,
    config: WriterConfig,
    released: bool,
}

impl ExcelWriter {
    /// 保存先を持たない空のワークブックで書き込みを開始する
    ///
    /// 保存には`save_as`または`save_to_stream`を使用します。
    pub fn new(format: SpreadsheetFormat) -> Self {
        Self::from_config(WriterConfig {
            format,
            ..WriterConfig::default()
        })
    }

    /// 保存先ファイル名を指定して書き込みを開始する（形式は拡張子から選択される）
    pub fn from_file_name(file_name: impl Into<PathBuf>) -> Self {
        let file_name = file_name.into();
        Self::from_config(WriterConfig {
            format: SpreadsheetFormat::from_file_name(&file_name),
            file_name: Some(file_name),
            ..WriterConfig::default()
        })
    }

    pub fn builder() -> ExcelWriterBuilder {
        ExcelWriterBuilder::new()
    }

    pub(crate) fn from_config(config: WriterConfig) -> Self {
        Self {
            workbook: Workbook::new(config.format),
            sequencer: RowSequencer::new(),
            config,
            released: false,
        }
    }

    pub fn format(&self) -> SpreadsheetFormat {
        self.workbook.format()
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.config.file_name.as_deref()
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// 書き込んだワークブックを取り出す（解放処理は行われない）
    pub fn into_workbook(mut self) -> Workbook {
        self.released = true;
        std::mem::replace(&mut self.workbook, Workbook::new(self.config.format))
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シートを作成する（同名のシートが存在する場合は`DuplicateSheet`）
    pub fn create_sheet_strict(&mut self, name: &str) -> Result<()> {
        self.workbook.create_sheet_strict(name).map(|_| ())
    }

    /// シートを取得し、存在しなければ作成する
    pub fn get_or_create_sheet(&mut self, name: &str) -> Result<()> {
        self.workbook.get_or_create_sheet(name).map(|_| ())
    }

    /// 既定の高さで次の行を追加する
    ///
    /// シートが存在しなければ作成します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(RowRef)` - 追加された行への参照
    /// * `Err(XlsBridgeError::RowExists)` - 割り当てたインデックスに`create_row`で作成済みの行がある場合
    pub fn add_row(&mut self, sheet: &str) -> Result<RowRef> {
        self.add_row_with_height(sheet, self.config.default_row_height)
    }

    /// 高さ（ポイント）を指定して次の行を追加する
    ///
    /// インデックスは行の作成に失敗しても消費されます。
    pub fn add_row_with_height(&mut self, sheet: &str, height: f64) -> Result<RowRef> {
        self.workbook.get_or_create_sheet(sheet)?;
        let index = self.sequencer.next_index(sheet);
        let row = self.workbook.create_row(sheet, index)?;
        self.workbook.set_row_height(&row, Some(height))?;
        Ok(row)
    }

    /// 指定したインデックスに行を作成する（行の割り当て順序には影響しない）
    pub fn create_row(&mut self, sheet: &str, index: u32) -> Result<RowRef> {
        self.workbook.create_row(sheet, index)
    }

    /// 既存の行への参照を取得する
    ///
    /// # 戻り値
    ///
    /// * `Ok(RowRef)` - 行が存在する場合
    /// * `Err(XlsBridgeError::NotFound)` - シートまたは行が存在しない場合
    pub fn row(&self, sheet: &str, index: u32) -> Result<RowRef> {
        let row = RowRef::new(sheet, index);
        match self.workbook.row(&row) {
            Some(_) => Ok(row),
            None => Err(XlsBridgeError::NotFound(format!("row {}", row))),
        }
    }

    /// 値を変換してセルに設定する
    ///
    /// # 引数
    ///
    /// * `row` - 対象の行
    /// * `column` - 0始まりの列インデックス
    /// * `value` - 実行時の値
    /// * `kind` - 宣言された値種別
    /// * `style` - スタイル名（空文字列ならスタイルなし）
    pub fn set_cell(
        &mut self,
        row: &RowRef,
        column: u16,
        value: impl Into<RawValue>,
        kind: &ValueKind,
        style: &str,
    ) -> Result<()> {
        self.workbook
            .set_cell(row, column, &value.into(), kind, style)
    }

    /// 行の末尾（最後のセルの次の列）にセルを追加する
    pub fn add_cell(
        &mut self,
        row: &RowRef,
        value: impl Into<RawValue>,
        kind: &ValueKind,
        style: &str,
    ) -> Result<()> {
        let column = u16::try_from(self.workbook.cell_count(row)?)
            .map_err(|_| XlsBridgeError::ColumnOutOfRange {
                column: usize::from(u16::MAX) + 1,
                limit: usize::from(u16::MAX) + 1,
            })?;
        self.set_cell(row, column, value, kind, style)
    }

    /// 数式を設定する（先頭の`=`は除去される）
    pub fn set_formula(&mut self, row: &RowRef, column: u16, text: &str, style: &str) -> Result<()> {
        self.workbook.set_formula(row, column, text, style)
    }

    pub fn set_cell_style(&mut self, row: &RowRef, column: u16, style: &str) -> Result<()> {
        self.workbook.set_cell_style(row, column, style)
    }

    pub fn delete_cell(&mut self, row: &RowRef, column: u16) -> Result<Option<Cell>> {
        self.workbook.delete_cell(row, column)
    }

    /// 行のセル数（最後のセルの列インデックス + 1）
    pub fn cell_count(&self, row: &RowRef) -> Result<usize> {
        self.workbook.cell_count(row)
    }

    pub fn add_cell_comment(
        &mut self,
        row: &RowRef,
        column: u16,
        text: &str,
        author: Option<&str>,
    ) -> Result<()> {
        self.workbook.add_cell_comment(row, column, text, author)
    }

    /// 名前付きスタイルを定義する
    ///
    /// 同名のスタイルを再定義しても、既にスタイルが適用されたセルは変更されません。
    pub fn define_style(&mut self, name: &str, attributes: &StyleAttributes) -> Arc<Style> {
        self.workbook.define_style(name, attributes)
    }

    pub fn merge_cells(
        &mut self,
        sheet: &str,
        row_start: u32,
        row_end: u32,
        col_start: u16,
        col_end: u16,
    ) -> Result<()> {
        self.workbook
            .merge_cells(sheet, row_start, row_end, col_start, col_end)
    }

    pub fn freeze_pane(&mut self, sheet: &str, col_split: u16, row_split: u32) -> Result<()> {
        self.workbook.freeze_pane(sheet, col_split, row_split)
    }

    pub fn freeze_pane_at(
        &mut self,
        sheet: &str,
        col_split: u16,
        row_split: u32,
        leftmost_column: u16,
        top_row: u32,
    ) -> Result<()> {
        self.workbook
            .freeze_pane_at(sheet, col_split, row_split, leftmost_column, top_row)
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
        self.workbook.split_pane(
            sheet,
            x_split_pos,
            y_split_pos,
            leftmost_column,
            top_row,
            active_pane,
        )
    }

    /// シートをパスワードで保護する（Modern形式のみ）
    pub fn protect_sheet(&mut self, sheet: &str, password: &str) -> Result<()> {
        self.workbook.protect_sheet(sheet, password)
    }

    pub fn set_column_width(&mut self, sheet: &str, column: u16, width: f64) -> Result<()> {
        self.workbook.set_column_width(sheet, column, width)
    }

    pub fn auto_size_column(&mut self, sheet: &str, column: u16) -> Result<()> {
        self.workbook.auto_size_column(sheet, column)
    }

    /// 見出し行を書き込む
    ///
    /// # 引数
    ///
    /// * `sheet` - シート名（存在しなければ作成する）
    /// * `columns` - 列見出し
    /// * `start_col` - 最初の見出しを書き込む列
    /// * `start_row` - 見出しを書き込む行（既存の行ならそのまま使用する）
    pub fn add_header<S: AsRef<str>>(
        &mut self,
        sheet: &str,
        columns: &[S],
        start_col: u16,
        start_row: u32,
    ) -> Result<()> {
        let row = self.row_at(sheet, start_row)?;
        for (offset, label) in columns.iter().enumerate() {
            let column = column_at(start_col, offset)?;
            self.workbook.set_cell(
                &row,
                column,
                &RawValue::from(label.as_ref()),
                &ValueKind::Text,
                "",
            )?;
        }
        Ok(())
    }

    /// データ行を書き込む
    ///
    /// 各値は実行時の型に従って変換されます。
    pub fn add_data(
        &mut self,
        sheet: &str,
        rows: &[Vec<RawValue>],
        start_col: u16,
        start_row: u32,
    ) -> Result<()> {
        for (row_offset, values) in (0u32..).zip(rows) {
            let index = start_row.checked_add(row_offset).ok_or_else(|| {
                XlsBridgeError::UnsupportedOperation("row index overflow".to_string())
            })?;
            let row = self.row_at(sheet, index)?;
            self.write_values(&row, values, start_col)?;
        }
        Ok(())
    }

    /// 表を新しいシートに書き込む
    ///
    /// 見出し行とデータ行は`add_row`と同じく行の割り当て順序に従って追加されます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 書き込みに成功した場合
    /// * `Err(XlsBridgeError::DuplicateSheet)` - 同名のシートが既に存在する場合
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        self.workbook.create_sheet_strict(&table.name)?;
        let header = self.add_row(&table.name)?;
        for (offset, label) in table.columns.iter().enumerate() {
            let column = column_at(0, offset)?;
            self.workbook.set_cell(
                &header,
                column,
                &RawValue::from(label.as_str()),
                &ValueKind::Text,
                "",
            )?;
        }
        for values in &table.rows {
            let row = self.add_row(&table.name)?;
            self.write_values(&row, values, 0)?;
        }
        debug!(
            "wrote table '{}' ({} columns, {} rows)",
            table.name,
            table.columns.len(),
            table.rows.len()
        );
        Ok(())
    }

    pub fn write_tables(&mut self, tables: &[Table]) -> Result<()> {
        tables.iter().try_for_each(|table| self.write_table(table))
    }

    fn write_values(&mut self, row: &RowRef, values: &[RawValue], start_col: u16) -> Result<()> {
        for (offset, value) in values.iter().enumerate() {
            let column = column_at(start_col, offset)?;
            self.workbook
                .set_cell(row, column, value, &value.natural_kind(), "")?;
        }
        Ok(())
    }

    fn row_at(&mut self, sheet: &str, index: u32) -> Result<RowRef> {
        let row = RowRef::new(sheet, index);
        if self.workbook.row(&row).is_some() {
            return Ok(row);
        }
        self.workbook.create_row(sheet, index)
    }

    /// すべてのシートを削除し、行の割り当てを初期化する（スタイルは保持される）
    pub fn clear(&mut self) {
        self.workbook.clear();
        self.sequencer.reset();
    }

    /// 設定された保存先ファイルに保存する
    ///
    /// # 引数
    ///
    /// * `auto_size` - 保存前に各シートの列幅を自動調整するか
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 保存に成功した場合
    /// * `Err(XlsBridgeError::Config)` - 保存先ファイル名が設定されていない場合（ファイルは作成されない）
    /// * `Err(XlsBridgeError::Save)` - シリアライズに失敗した場合
    pub fn save(&mut self, auto_size: bool) -> Result<()> {
        let path = self.config.file_name.clone().ok_or_else(|| {
            XlsBridgeError::Config(
                "No file name configured; use save_as() or with_file_name()".to_string(),
            )
        })?;
        self.save_as(path, auto_size)
    }

    /// 指定したパスに保存する（既存のファイルは上書きされる）
    pub fn save_as(&mut self, path: impl AsRef<Path>, auto_size: bool) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.serialize(auto_size)?;
        fs::write(path, &bytes)?;
        debug!("saved workbook to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// ストリームに保存する
    ///
    /// 書き込み後にフラッシュし、ストリームの位置を先頭に戻します。
    pub fn save_to_stream<W: Write + Seek>(&mut self, stream: &mut W, auto_size: bool) -> Result<()> {
        let bytes = self.serialize(auto_size)?;
        stream.write_all(&bytes)?;
        stream.flush()?;
        stream.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn serialize(&mut self, auto_size: bool) -> Result<Vec<u8>> {
        if auto_size {
            self.workbook.auto_size_all();
        }
        self.workbook.to_bytes()
    }

    /// リソースを解放する
    ///
    /// `delete_file_on_drop`が設定されている場合は保存先ファイルを削除します。
    /// 2回目以降の呼び出しと、その後の破棄では何も行いません。
    pub fn close(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.delete_backing_file()
    }

    fn delete_backing_file(&self) -> Result<()> {
        if !self.config.delete_on_drop {
            return Ok(());
        }
        match &self.config.file_name {
            Some(path) if path.exists() => {
                fs::remove_file(path)?;
                debug!("deleted {}", path.display());
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Drop for ExcelWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to release workbook writer: {}", e);
        }
    }
}

fn column_at(start: u16, offset: usize) -> Result<u16> {
    let column = usize::from(start) + offset;
    u16::try_from(column).map_err(|_| XlsBridgeError::ColumnOutOfRange {
        column,
        limit: usize::from(u16::MAX) + 1,
    })
}
