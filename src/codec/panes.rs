//! Split Pane Patcher
//!
//! `rust_xlsxwriter`は固定ペインのみを出力するため、分割ペインはシリアライズ後の
//! パッケージを書き換えて追加する。対象シートのXMLの`<sheetView>`の先頭に
//! `<pane state="split"/>`要素を挿入し、その他のパーツはそのままコピーする。

use std::io::{Cursor, Read, Write};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::api::PanePosition;
use crate::columns::cell_address;
use crate::error::{Result, XlsBridgeError};

/// 分割ペインの設定（シートのインデックスは0始まり）
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitPane {
    pub sheet_index: usize,
    pub x_split_pos: u32,
    pub y_split_pos: u32,
    pub leftmost_column: u16,
    pub top_row: u32,
    pub active_pane: PanePosition,
}

fn save_error(e: impl std::fmt::Display) -> XlsBridgeError {
    XlsBridgeError::Save(e.to_string())
}

fn sheet_part_name(sheet_index: usize) -> String {
    format!("xl/worksheets/sheet{}.xml", sheet_index + 1)
}

/// パッケージ内の対象シートに分割ペインを挿入する
///
/// # 引数
///
/// * `package` - `.xlsx`のバイト列
/// * `panes` - 挿入する分割ペイン
///
/// # 戻り値
///
/// 書き換え後の`.xlsx`のバイト列
pub(crate) fn apply_split_panes(package: Vec<u8>, panes: &[SplitPane]) -> Result<Vec<u8>> {
    if panes.is_empty() {
        return Ok(package);
    }

    let mut archive = ZipArchive::new(Cursor::new(package)).map_err(save_error)?;
    let mut output = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let name = archive.by_index_raw(i).map_err(save_error)?.name().to_string();
        let pane = panes.iter().find(|p| sheet_part_name(p.sheet_index) == name);

        match pane {
            Some(pane) => {
                let mut xml = Vec::new();
                archive
                    .by_index(i)
                    .map_err(save_error)?
                    .read_to_end(&mut xml)?;
                let patched = insert_pane(&xml, pane)?;
                output.start_file(name, options).map_err(save_error)?;
                output.write_all(&patched)?;
            }
            None => {
                let file = archive.by_index_raw(i).map_err(save_error)?;
                output.raw_copy_file(file).map_err(save_error)?;
            }
        }
    }

    let cursor = output.finish().map_err(save_error)?;
    Ok(cursor.into_inner())
}

fn pane_element(pane: &SplitPane) -> Result<BytesStart<'static>> {
    let mut element = BytesStart::new("pane");
    if pane.x_split_pos > 0 {
        element.push_attribute(("xSplit", pane.x_split_pos.to_string().as_str()));
    }
    if pane.y_split_pos > 0 {
        element.push_attribute(("ySplit", pane.y_split_pos.to_string().as_str()));
    }
    let top_left = cell_address(pane.top_row, usize::from(pane.leftmost_column))?;
    element.push_attribute(("topLeftCell", top_left.as_str()));
    element.push_attribute(("activePane", pane.active_pane.ooxml_name()));
    element.push_attribute(("state", "split"));
    Ok(element)
}

/// シートXMLの`<sheetView>`に`<pane>`を挿入する
fn insert_pane(xml: &[u8], pane: &SplitPane) -> Result<Vec<u8>> {
    let pane = pane_element(pane)?;
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 128));
    let mut buf = Vec::new();
    let mut inserted = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(save_error)?;
        match event {
            Event::Eof => break,
            Event::Empty(e) if !inserted && e.name().as_ref() == b"sheetView" => {
                writer.write_event(Event::Start(e)).map_err(save_error)?;
                writer
                    .write_event(Event::Empty(pane.borrow()))
                    .map_err(save_error)?;
                writer
                    .write_event(Event::End(BytesEnd::new("sheetView")))
                    .map_err(save_error)?;
                inserted = true;
            }
            Event::Start(e) if !inserted && e.name().as_ref() == b"sheetView" => {
                writer.write_event(Event::Start(e)).map_err(save_error)?;
                writer
                    .write_event(Event::Empty(pane.borrow()))
                    .map_err(save_error)?;
                inserted = true;
            }
            other => writer.write_event(other).map_err(save_error)?,
        }
        buf.clear();
    }

    if !inserted {
        return Err(XlsBridgeError::Save(
            "worksheet has no <sheetView> element to hold a split pane".to_string(),
        ));
    }
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(x: u32, y: u32) -> SplitPane {
        SplitPane {
            sheet_index: 0,
            x_split_pos: x,
            y_split_pos: y,
            leftmost_column: 2,
            top_row: 4,
            active_pane: PanePosition::LowerRight,
        }
    }

    #[test]
    fn test_insert_into_empty_sheet_view() {
        let xml = br#"<worksheet><sheetViews><sheetView tabSelected="1" workbookViewId="0"/></sheetViews><sheetData/></worksheet>"#;
        let patched = String::from_utf8(insert_pane(xml, &split(3000, 1500)).unwrap()).unwrap();
        assert!(patched.contains(
            r#"<sheetView tabSelected="1" workbookViewId="0"><pane xSplit="3000" ySplit="1500" topLeftCell="C5" activePane="bottomRight" state="split"/></sheetView>"#
        ));
        assert!(patched.ends_with("<sheetData/></worksheet>"));
    }

    #[test]
    fn test_insert_before_selection() {
        let xml = br#"<worksheet><sheetViews><sheetView workbookViewId="0"><selection activeCell="B2"/></sheetView></sheetViews></worksheet>"#;
        let patched = String::from_utf8(insert_pane(xml, &split(0, 900)).unwrap()).unwrap();
        let pane_pos = patched.find("<pane").unwrap();
        let selection_pos = patched.find("<selection").unwrap();
        assert!(pane_pos < selection_pos);
        assert!(!patched.contains("xSplit"));
        assert!(patched.contains(r#"ySplit="900""#));
    }

    #[test]
    fn test_missing_sheet_view_is_an_error() {
        let xml = br#"<worksheet><sheetData/></worksheet>"#;
        assert!(matches!(
            insert_pane(xml, &split(1, 1)),
            Err(XlsBridgeError::Save(_))
        ));
    }

    #[test]
    fn test_no_panes_returns_package_unchanged() {
        let bytes = vec![1, 2, 3];
        assert_eq!(apply_split_panes(bytes.clone(), &[]).unwrap(), bytes);
    }
}
