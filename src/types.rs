//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! セル座標・範囲と、読み込み結果（`Record`）・書き込み入力（`Table`）を含む。

use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::coerce::RawValue;
use crate::columns::cell_address;
use crate::error::Result;

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u16,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    pub fn to_a1_notation(self) -> Result<String> {
        cell_address(self.row, usize::from(self.col))
    }
}

/// セル範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    ///
    /// 始点と終点の大小が逆転していても、正規化された範囲を返します。
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self {
            start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// 2つの範囲が重なっているかを判定
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// 範囲のサイズ（行数 × 列数）を計算
    pub fn size(&self) -> (u32, u32) {
        let rows = self.end.row - self.start.row + 1;
        let cols = u32::from(self.end.col - self.start.col) + 1;
        (rows, cols)
    }

    /// 単一セルの範囲かどうか
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }
}

/// 読み込み結果のフィールド値
///
/// JSONへは型タグなしの素の値としてシリアライズされます。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 文字列
    Text(String),
    /// 数値
    Number(f64),
    /// 論理値
    Boolean(bool),
    /// 日時
    Date(NaiveDateTime),
}

impl FieldValue {
    /// 文字列値を取得
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 数値を取得
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 論理値を取得
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// 日時を取得
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// ヘッダーラベルをキーとする1行分のレコード
///
/// フィールドはヘッダー列の順序を保持します。
/// 値が`None`のフィールドは、セルが存在しないか空白であることを表します。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Option<FieldValue>)>,
}

impl Record {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, header: String, value: Option<FieldValue>) {
        self.fields.push((header, value));
    }

    /// ヘッダーラベルでフィールド値を取得する
    ///
    /// ヘッダーが存在しない場合と値が`None`の場合は、どちらも`None`を返します。
    pub fn get(&self, header: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == header)
            .and_then(|(_, value)| value.as_ref())
    }

    /// ヘッダーラベルが存在するかを判定
    pub fn contains_header(&self, header: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == header)
    }

    /// ヘッダーラベルを順に返す
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// `(ヘッダー, 値)`の組を順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// シート1枚分の読み込み結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRecords {
    /// シート名
    pub name: String,
    /// ヘッダー行以降のレコード
    pub records: Vec<Record>,
}

/// 書き込み用の表データ
///
/// `ExcelWriter::write_table`で、シート名`name`に見出し行とデータ行として書き込まれます。
/// 各値は実行時の型（`RawValue::natural_kind`）に従って変換されます。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// シート名
    pub name: String,
    /// 列見出し
    pub columns: Vec<String>,
    /// データ行
    pub rows: Vec<Vec<RawValue>>,
}

impl Table {
    /// 列見出しを指定して空の表を作成
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// データ行を追加
    pub fn push_row(&mut self, row: Vec<RawValue>) {
        self.rows.push(row);
    }
}
