//! Parser Module
//!
//! calamineを使用したワークブック読み込みの実装。
//! 両形式のバイト列を、形式に依存しないシートモデルに変換します。

mod workbook;

pub(crate) use workbook::load_sheets;
