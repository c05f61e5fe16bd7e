//! Security Tests
//!
//! 読み込み時のリソース制限と、不正な入力に対する振る舞いを検証します。

use std::io::{Cursor, Write};

use xlsbridge::{
    ExcelReader, ExcelWriter, ReaderOptions, SecurityConfig, SpreadsheetFormat, ValueKind,
    Workbook, XlsBridgeError,
};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

fn saved(format: SpreadsheetFormat, sheets: &[&str]) -> Vec<u8> {
    let mut writer = ExcelWriter::new(format);
    for sheet in sheets {
        let row = writer.add_row(sheet).unwrap();
        writer.set_cell(&row, 0, "v", &ValueKind::Text, "").unwrap();
    }
    let mut buffer = Cursor::new(Vec::new());
    writer.save_to_stream(&mut buffer, false).unwrap();
    buffer.into_inner()
}

/// 入力サイズの上限を1バイトでも超えると拒否される
#[test]
fn test_input_size_limit() {
    for format in [SpreadsheetFormat::Legacy, SpreadsheetFormat::Modern] {
        let data = saved(format, &["S"]);
        let size = data.len() as u64;

        let exact = ReaderOptions::new()
            .with_security(SecurityConfig::new().with_max_input_file_size(size));
        assert!(ExcelReader::from_reader_with_options(Cursor::new(data.clone()), format, exact).is_ok());

        let tight = ReaderOptions::new()
            .with_security(SecurityConfig::new().with_max_input_file_size(size - 1));
        match ExcelReader::from_reader_with_options(Cursor::new(data), format, tight) {
            Err(XlsBridgeError::SecurityViolation(msg)) => {
                assert!(msg.contains("Input file size exceeds maximum"));
            }
            other => panic!("Expected SecurityViolation for {:?}, got {:?}", format, other),
        }
    }
}

#[test]
fn test_sheet_count_limit() {
    for format in [SpreadsheetFormat::Legacy, SpreadsheetFormat::Modern] {
        let data = saved(format, &["A", "B", "C"]);
        let options =
            ReaderOptions::new().with_security(SecurityConfig::new().with_max_sheet_count(2));
        match ExcelReader::from_reader_with_options(Cursor::new(data), format, options) {
            Err(XlsBridgeError::SecurityViolation(msg)) => assert!(msg.contains("Sheet count")),
            other => panic!("Expected SecurityViolation for {:?}, got {:?}", format, other),
        }
    }
}

#[test]
fn test_default_limits() {
    let config = SecurityConfig::default();
    assert_eq!(config.max_input_file_size, 2_147_483_648);
    assert_eq!(config.max_sheet_count, 1024);
}

/// ワークブックでないバイト列は`Parse`エラーになる
#[test]
fn test_garbage_input() {
    for format in [SpreadsheetFormat::Legacy, SpreadsheetFormat::Modern] {
        match Workbook::open(Cursor::new(b"definitely not a workbook".to_vec()), format) {
            Err(XlsBridgeError::Parse(msg)) => assert!(!msg.is_empty()),
            other => panic!("Expected Parse error for {:?}, got {:?}", format, other),
        }
    }
}

#[test]
fn test_empty_input() {
    assert!(matches!(
        Workbook::open(Cursor::new(Vec::new()), SpreadsheetFormat::Modern),
        Err(XlsBridgeError::Parse(_))
    ));
}

/// 形式を取り違えたバイト列も`Parse`エラーになる
#[test]
fn test_mismatched_format() {
    let modern = saved(SpreadsheetFormat::Modern, &["S"]);
    assert!(matches!(
        Workbook::open(Cursor::new(modern), SpreadsheetFormat::Legacy),
        Err(XlsBridgeError::Parse(_))
    ));
    let legacy = saved(SpreadsheetFormat::Legacy, &["S"]);
    assert!(matches!(
        Workbook::open(Cursor::new(legacy), SpreadsheetFormat::Modern),
        Err(XlsBridgeError::Parse(_))
    ));
}

/// 必要なパーツを欠いたZIPアーカイブ
#[test]
fn test_zip_without_workbook_part() {
    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("../../etc/passwd", options).unwrap();
        zip.write_all(b"root:x:0:0").unwrap();
        zip.finish().unwrap();
    }

    let result = ExcelReader::from_reader(Cursor::new(zip_data), SpreadsheetFormat::Modern);
    assert!(matches!(result, Err(XlsBridgeError::Parse(_))));
}

/// 読み込み失敗後もファイルは作成されない
#[test]
fn test_failed_open_path_reports_io() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("missing.xlsx");
    assert!(matches!(ExcelReader::open(&missing), Err(XlsBridgeError::Io(_))));
    assert!(!missing.exists());
}
