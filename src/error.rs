//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//! コーデック由来のエラーは、失敗した操作（open/read/save）を示す接頭辞付きで包まれる。

use thiserror::Error;

/// xlsbridgeクレート全体で使用するエラー型
///
/// ワークブックの構築、スタイル定義、読み込み、保存の各処理中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Config`: 設定の検証に失敗したエラー（保存先ファイル名が未設定など）
/// - `DuplicateSheet` / `NotFound`: シートの重複作成、存在しないシートや行の参照
/// - `Schema`: ヘッダー行が不正（空セル、重複ラベル）
/// - `UnsupportedType` / `InvalidValue`: 値の型変換に失敗
/// - `UnsupportedOperation`: 形式が対応していない操作（Legacy形式でのシート保護など）
/// - `Parse` / `Read` / `Save`: コーデック由来のエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsbridge::{ExcelWriter, SpreadsheetFormat, XlsBridgeError};
///
/// let mut writer = ExcelWriter::new(SpreadsheetFormat::Modern);
/// match writer.save(false) {
///     Err(XlsBridgeError::Config(msg)) => println!("設定エラー: {}", msg),
///     _ => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsBridgeError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// 保存先ファイル名が設定されていない状態で`save()`を呼んだ場合や、
    /// `ExcelWriterBuilder::build()`で無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 同名のシートが既に存在する
    #[error("Sheet '{0}' already exists")]
    DuplicateSheet(String),

    /// シート名が形式の制約を満たさない
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName {
        /// 指定されたシート名
        name: String,
        /// 拒否された理由
        reason: String,
    },

    /// 対象（シートや行）が見つからない
    #[error("Not found: {0}")]
    NotFound(String),

    /// ヘッダー行の構造が不正
    ///
    /// ヘッダー行の占有範囲内に空セルがある、またはラベルが重複している場合に発生します。
    #[error("Schema error in sheet '{sheet}': {message}")]
    Schema {
        /// 対象シート名
        sheet: String,
        /// 詳細メッセージ
        message: String,
    },

    /// 宣言された値種別に対応する変換規則がない
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    /// 宣言された値種別への変換に失敗した
    #[error("Cannot convert '{value}' to {target}")]
    InvalidValue {
        /// 変換元の値（テキスト表現）
        value: String,
        /// 変換先の種別名
        target: &'static str,
    },

    /// 現在の形式では対応していない操作
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// 保護されたシートに対する構造的な編集
    #[error("Sheet '{0}' is protected against structural edits")]
    SheetProtected(String),

    /// 行インデックスの衝突
    ///
    /// `add_row`と`create_row`を同じシートで混在させ、既存の行と同じ
    /// インデックスに行を作成しようとした場合に発生します。
    #[error("Row {row} already exists in sheet '{sheet}'")]
    RowExists {
        /// 対象シート名
        sheet: String,
        /// 衝突した行インデックス（0始まり）
        row: u32,
    },

    /// 列インデックスが上限を超えた
    ///
    /// `limit`は対象（列アドレス表、または形式ごとの最大列数）で使える列の数です。
    #[error("Column index {column} is out of range (limit: {limit} columns)")]
    ColumnOutOfRange {
        /// 0始まりの列インデックス
        column: usize,
        /// 使用可能な列の数
        limit: usize,
    },

    /// Legacy形式で表現できない数式
    #[error("Invalid formula '{formula}': {message}")]
    InvalidFormula {
        /// 数式テキスト
        formula: String,
        /// 詳細メッセージ
        message: String,
    },

    /// コーデックがバイト列を拒否した（open）
    #[error("Failed to open workbook: {0}")]
    Parse(String),

    /// シートの読み込み中にコーデックが失敗した（read）
    #[error("Excel reading error: {0}")]
    Read(String),

    /// シリアライズ中にコーデックが失敗した（save）
    #[error("Failed to save workbook: {0}")]
    Save(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズやシート数の上限を超えた場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

/// クレート内で使用する`Result`の別名
pub type Result<T> = std::result::Result<T, XlsBridgeError>;
