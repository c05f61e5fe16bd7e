//! Codec Module
//!
//! 形式ごとのバイトレベルのエンコード・デコードを担うコーデックを定義するモジュール。
//!
//! - `ModernCodec`: `rust_xlsxwriter`で`.xlsx`を書き出し、分割ペインは`zip` + `quick-xml`で後処理する
//! - `LegacyCodec`: BIFF8レコードを直接組み立て、`cfb`で複合ファイルに格納する
//!
//! 読み込みはどちらも`calamine`を使用します（`crate::parser`）。

mod legacy;
mod modern;
mod panes;

use std::fmt::Debug;
use std::io::Write;

pub(crate) use legacy::LegacyCodec;
pub(crate) use modern::ModernCodec;

use crate::api::SpreadsheetFormat;
use crate::error::{Result, XlsBridgeError};
use crate::model::Sheet;
use crate::style::{Font, Style, StyleAttributes};

/// シート名の最大文字数（両形式共通）
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// 形式ごとのコーデック
///
/// ワークブックの生成時に形式に応じた実装が選ばれ、以降変更されません。
pub trait WorkbookCodec: Debug + Send {
    /// コーデックが扱う形式
    fn format(&self) -> SpreadsheetFormat;

    /// 1シートあたりの最大行数
    fn max_rows(&self) -> u32;

    /// 1シートあたりの最大列数
    fn max_columns(&self) -> u16;

    /// シート名を検証し、空のシートを生成する
    fn create_sheet(&self, name: &str) -> Result<Sheet> {
        validate_sheet_name(name)?;
        Ok(Sheet::new(name))
    }

    /// 属性からフォントを生成する
    fn create_font(&self, attributes: &StyleAttributes) -> Font {
        Font::from_attributes(attributes)
    }

    /// フォントと属性からスタイルを生成する（塗りつぶしの規則は形式ごとに異なる）
    fn create_style(&self, name: &str, font: Font, attributes: &StyleAttributes) -> Style;

    /// 数式テキストがこの形式で表現できるかを検証する
    fn validate_formula(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    /// シートをシリアライズして書き出す
    fn serialize_to(&self, sheets: &[Sheet], writer: &mut dyn Write) -> Result<()>;

    /// バイト列からシートを読み込む
    fn parse(&self, bytes: Vec<u8>) -> Result<Vec<Sheet>> {
        crate::parser::load_sheets(bytes, self.format())
    }

    /// シート保護に対応しているか
    fn supports_protection(&self) -> bool;

    /// セルのコメントに対応しているか
    fn supports_notes(&self) -> bool;
}

/// 形式に対応するコーデックを生成する
pub(crate) fn codec_for(format: SpreadsheetFormat) -> Box<dyn WorkbookCodec> {
    match format {
        SpreadsheetFormat::Legacy => Box::new(LegacyCodec::new()),
        SpreadsheetFormat::Modern => Box::new(ModernCodec::new()),
    }
}

/// シート名を検証する
///
/// 空でなく、31文字以下で、`[ ] : * ? / \`を含まず、先頭と末尾が`'`でないこと。
pub(crate) fn validate_sheet_name(name: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(XlsBridgeError::InvalidSheetName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return reject("name exceeds 31 characters");
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return reject(&format!("name contains invalid character '{}'", c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return reject("name starts or ends with an apostrophe");
    }
    Ok(())
}
