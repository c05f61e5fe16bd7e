//! Legacy (.xls) Codec
//!
//! BIFF8レコードを直接組み立て、`cfb`でOLE複合ファイルの`Workbook`ストリームに格納する。

mod formula;
mod records;
mod stream;

use std::io::{Cursor, Write};

use log::debug;

use super::WorkbookCodec;
use crate::api::{FillPattern, SpreadsheetFormat};
use crate::error::{Result, XlsBridgeError};
use crate::model::Sheet;
use crate::style::{Fill, FillColor, Font, Style, StyleAttributes, LEGACY_AUTOMATIC_COLOR};

const MAX_ROWS: u32 = 65_536;
const MAX_COLUMNS: u16 = 256;

/// `Workbook`ストリームの最小サイズ（これ未満はミニストリームに格納されてしまう）
const MIN_STREAM_SIZE: usize = 4096;

/// 空のワークブックを保存するときに追加するシート名
const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Legacy形式のコーデック
#[derive(Debug, Default)]
pub(crate) struct LegacyCodec;

impl LegacyCodec {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl WorkbookCodec for LegacyCodec {
    fn format(&self) -> SpreadsheetFormat {
        SpreadsheetFormat::Legacy
    }

    fn max_rows(&self) -> u32 {
        MAX_ROWS
    }

    fn max_columns(&self) -> u16 {
        MAX_COLUMNS
    }

    /// 背景色（標準パレット）を優先し、なければパレットインデックスで単色に塗りつぶす
    fn create_style(&self, name: &str, font: Font, attributes: &StyleAttributes) -> Style {
        let fill = match attributes.background_color {
            Some(color) => Some(Fill {
                color: FillColor::Indexed(color),
                pattern: attributes.fill_pattern.unwrap_or(FillPattern::Solid),
            }),
            None if attributes.legacy_background_index != LEGACY_AUTOMATIC_COLOR => Some(Fill {
                color: FillColor::Palette(attributes.legacy_background_index),
                pattern: FillPattern::Solid,
            }),
            None => None,
        };
        Style::assemble(name, SpreadsheetFormat::Legacy, font, attributes, fill)
    }

    fn validate_formula(&self, text: &str) -> Result<()> {
        formula::compile(text).map(|_| ())
    }

    fn serialize_to(&self, sheets: &[Sheet], writer: &mut dyn Write) -> Result<()> {
        let default_sheets;
        let sheets = if sheets.is_empty() {
            default_sheets = [Sheet::new(DEFAULT_SHEET_NAME)];
            &default_sheets[..]
        } else {
            sheets
        };

        let mut workbook_stream = stream::build_workbook_stream(sheets)?;
        if workbook_stream.len() < MIN_STREAM_SIZE {
            workbook_stream.resize(MIN_STREAM_SIZE, 0);
        }

        // calamineはV3（512バイトセクタ）のコンテナのみ読める
        let mut compound =
            cfb::CompoundFile::create_with_version(cfb::Version::V3, Cursor::new(Vec::new()))
                .map_err(save_error)?;
        {
            let mut stream = compound.create_stream("Workbook").map_err(save_error)?;
            stream.write_all(&workbook_stream).map_err(save_error)?;
        }
        compound.flush().map_err(save_error)?;
        let bytes = compound.into_inner().into_inner();
        debug!(
            "wrote xls compound file: {} bytes ({} byte workbook stream)",
            bytes.len(),
            workbook_stream.len()
        );
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn supports_protection(&self) -> bool {
        false
    }

    fn supports_notes(&self) -> bool {
        false
    }
}

fn save_error(e: std::io::Error) -> XlsBridgeError {
    XlsBridgeError::Save(format!("compound file: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::IndexedColor;
    use crate::model::{Cell, CellValue};

    fn style(attributes: &StyleAttributes) -> Style {
        let codec = LegacyCodec::new();
        codec.create_style("s", codec.create_font(attributes), attributes)
    }

    #[test]
    fn test_indexed_background_wins() {
        let built = style(
            &StyleAttributes::default()
                .with_background(IndexedColor::Red)
                .with_fill_pattern(FillPattern::LightGrid)
                .with_legacy_background_index(22),
        );
        assert_eq!(
            built.fill,
            Some(Fill {
                color: FillColor::Indexed(IndexedColor::Red),
                pattern: FillPattern::LightGrid,
            })
        );
    }

    #[test]
    fn test_palette_index_fill() {
        let built = style(&StyleAttributes::default().with_legacy_background_index(22));
        assert_eq!(
            built.fill,
            Some(Fill {
                color: FillColor::Palette(22),
                pattern: FillPattern::Solid,
            })
        );
        assert!(style(&StyleAttributes::default()).fill.is_none());
    }

    #[test]
    fn test_rgb_is_ignored() {
        let built = style(&StyleAttributes::default().with_rgb([1, 2, 3]));
        assert!(built.fill.is_none());
    }

    #[test]
    fn test_validate_formula() {
        let codec = LegacyCodec::new();
        assert!(codec.validate_formula("SUM(A1:A3)").is_ok());
        assert!(codec.validate_formula("IFERROR(A1,0)").is_err());
    }

    #[test]
    fn test_serialize_produces_compound_file() {
        let mut sheet = Sheet::new("Data");
        sheet
            .create_row(0)
            .unwrap()
            .set_cell(Cell::new(0, CellValue::Number(1.5)));
        let mut buffer = Vec::new();
        LegacyCodec::new().serialize_to(&[sheet], &mut buffer).unwrap();
        assert_eq!(&buffer[..8], &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
        // メジャーバージョン3、セクタシフト9（512バイト）
        assert_eq!(u16::from_le_bytes([buffer[26], buffer[27]]), 3);
        assert_eq!(u16::from_le_bytes([buffer[30], buffer[31]]), 9);
        let sheets = crate::parser::load_sheets(buffer, SpreadsheetFormat::Legacy).unwrap();
        assert_eq!(
            sheets[0].row(0).unwrap().cell(0).unwrap().value,
            CellValue::Number(1.5)
        );
    }

    #[test]
    fn test_empty_workbook_gets_default_sheet() {
        let mut buffer = Vec::new();
        LegacyCodec::new().serialize_to(&[], &mut buffer).unwrap();
        let sheets = crate::parser::load_sheets(buffer, SpreadsheetFormat::Legacy).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name(), "Sheet1");
    }
}
