//! Builder Module
//!
//! Fluent Builder APIを提供し、`ExcelWriter`インスタンスを段階的に構築する。
//! 読み込み側の設定（`ReaderOptions`）もここで定義する。

use std::path::PathBuf;

use crate::api::SpreadsheetFormat;
use crate::error::{Result, XlsBridgeError};
use crate::security::SecurityConfig;
use crate::writer::ExcelWriter;

/// 既定の行の高さ（ポイント）
pub(crate) const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// 行の高さの上限（ポイント）
const MAX_ROW_HEIGHT: f64 = 409.0;

/// 書き込み処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WriterConfig {
    /// ワークブックの形式
    pub format: SpreadsheetFormat,

    /// 保存先ファイル名（Option: Noneの場合は`save()`がエラーになる）
    pub file_name: Option<PathBuf>,

    /// `add_row`で使用する行の高さ（ポイント）
    pub default_row_height: f64,

    /// 解放時に保存先ファイルを削除するか
    pub delete_on_drop: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            format: SpreadsheetFormat::Modern,
            file_name: None,
            default_row_height: DEFAULT_ROW_HEIGHT,
            delete_on_drop: false,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `ExcelWriter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsbridge::{ExcelWriterBuilder, SpreadsheetFormat};
///
/// # fn main() -> Result<(), xlsbridge::XlsBridgeError> {
/// let writer = ExcelWriterBuilder::new()
///     .with_file_name("report.xls")
///     .with_default_row_height(18.0)
///     .build()?;
/// assert_eq!(writer.format(), SpreadsheetFormat::Legacy);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExcelWriterBuilder {
    /// 内部設定（構築中）
    config: WriterConfig,

    /// 形式が明示的に指定されたか
    format_set: bool,
}

impl ExcelWriterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 形式: Modern
    /// - 保存先: なし
    /// - 行の高さ: 15ポイント
    /// - 解放時のファイル削除: しない
    pub fn new() -> Self {
        Self::default()
    }

    /// ワークブックの形式を指定する
    ///
    /// 指定した形式は、`with_file_name`による推定より優先されます。
    pub fn with_format(mut self, format: SpreadsheetFormat) -> Self {
        self.config.format = format;
        self.format_set = true;
        self
    }

    /// 保存先ファイル名を指定する
    ///
    /// 形式が明示されていない場合は、拡張子から形式を推定します。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsbridge::ExcelWriterBuilder;
    ///
    /// let builder = ExcelWriterBuilder::new().with_file_name("legacy.xls");
    /// ```
    pub fn with_file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        let file_name = file_name.into();
        if !self.format_set {
            self.config.format = SpreadsheetFormat::from_file_name(&file_name);
        }
        self.config.file_name = Some(file_name);
        self
    }

    /// `add_row`で使用する行の高さ（ポイント）を指定する
    pub fn with_default_row_height(mut self, height: f64) -> Self {
        self.config.default_row_height = height;
        self
    }

    /// `close()`または破棄時に保存先ファイルを削除するかを指定する
    ///
    /// 一時ファイルとしてワークブックを出力する用途を想定しています。
    pub fn delete_file_on_drop(mut self, delete: bool) -> Self {
        self.config.delete_on_drop = delete;
        self
    }

    /// 設定を検証し、`ExcelWriter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ExcelWriter)`: 設定が有効な場合
    /// * `Err(XlsBridgeError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsBridgeError::Config(String)`: 設定の検証に失敗した場合
    ///   * 行の高さが0以下、または409ポイントを超える
    ///   * ファイル名が空
    pub fn build(self) -> Result<ExcelWriter> {
        // 1. 行の高さの検証
        let height = self.config.default_row_height;
        if !(height > 0.0 && height <= MAX_ROW_HEIGHT) {
            return Err(XlsBridgeError::Config(format!(
                "Invalid default row height: {} (must be > 0 and <= {})",
                height, MAX_ROW_HEIGHT
            )));
        }

        // 2. ファイル名の検証
        if let Some(file_name) = &self.config.file_name {
            if file_name.as_os_str().is_empty() {
                return Err(XlsBridgeError::Config("File name is empty".to_string()));
            }
        }

        Ok(ExcelWriter::from_config(self.config))
    }
}

/// 読み込み設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// ヘッダー行の位置（既存の行を先頭から数えた0始まりの位置）
    /// デフォルト: 1（先頭行をタイトル行とみなす）
    pub header_row_index: usize,
    /// 読み込み時のリソース制限
    pub security: SecurityConfig,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            header_row_index: 1,
            security: SecurityConfig::default(),
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_row_index(mut self, index: usize) -> Self {
        self.header_row_index = index;
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }
}
