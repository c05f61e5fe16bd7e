//! Cell Model
//!
//! セルとセル値の型。

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::format::datetime_to_string;
use crate::style::Style;

/// セルの値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),

    /// 論理値
    Boolean(bool),

    /// 日時（保存時はシリアル値と日付書式で表現される）
    Date(NaiveDateTime),

    /// 数式
    ///
    /// 数式は評価されません。`cached`は既存ファイルから読み込んだ結果値、
    /// または書き込み側が明示的に設定した結果値です。
    Formula {
        /// 先頭の`=`を除いた数式テキスト
        text: String,
        /// キャッシュされた計算結果
        cached: Option<Box<CellValue>>,
    },

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空白
    Blank,
}

impl CellValue {
    /// 値が空白かどうかを判定
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// 値のテキスト表現（書式適用前）
    ///
    /// 数式はキャッシュ結果のテキスト表現、結果がなければ数式テキストを返します。
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Date(d) => datetime_to_string(d),
            CellValue::Formula { text, cached } => match cached {
                Some(value) => value.to_text(),
                None => format!("={}", text),
            },
            CellValue::Error(e) => e.clone(),
            CellValue::Blank => String::new(),
        }
    }
}

/// セル
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// 0始まりの列インデックス
    pub column: u16,
    /// 値
    pub value: CellValue,
    /// 適用されたスタイル（同一形式のワークブックで定義されたもの）
    pub style: Option<Arc<Style>>,
    /// コメント
    pub note: Option<Note>,
}

impl Cell {
    /// スタイルなしのセルを生成
    pub fn new(column: u16, value: CellValue) -> Self {
        Self {
            column,
            value,
            style: None,
            note: None,
        }
    }

    /// スタイル名（スタイルが適用されていない場合は`None`）
    pub fn style_name(&self) -> Option<&str> {
        self.style.as_deref().map(|s| s.name.as_str())
    }
}

/// セルに付与するコメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub text: String,
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_blank() {
        assert!(CellValue::Blank.is_blank());
        assert!(!CellValue::Text(String::new()).is_blank());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(42.5).to_text(), "42.5");
        assert_eq!(CellValue::Number(3.0).to_text(), "3");
        assert_eq!(CellValue::Boolean(true).to_text(), "true");
        assert_eq!(CellValue::Error("#DIV/0!".to_string()).to_text(), "#DIV/0!");

        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::Date(date).to_text(), "2024-03-01");
    }

    #[test]
    fn test_formula_text_uses_cached_result() {
        let formula = CellValue::Formula {
            text: "SUM(A1:A3)".to_string(),
            cached: Some(Box::new(CellValue::Number(6.0))),
        };
        assert_eq!(formula.to_text(), "6");

        let uncached = CellValue::Formula {
            text: "SUM(A1:A3)".to_string(),
            cached: None,
        };
        assert_eq!(uncached.to_text(), "=SUM(A1:A3)");
    }
}
