//! Integration Tests for xlsbridge
//!
//! 書き込み → 保存 → 読み込みの往復を、Legacy形式とModern形式の両方で検証します。

use std::io::Cursor;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, XlsxError};
use tempfile::TempDir;
use xlsbridge::{
    CellValue, ExcelReader, ExcelWriter, ExcelWriterBuilder, FieldValue, IndexedColor,
    PanePosition, RawValue, ReaderOptions, SpreadsheetFormat, StyleAttributes, Table, ValueKind,
    Workbook, XlsBridgeError,
};

const FORMATS: [SpreadsheetFormat; 2] = [SpreadsheetFormat::Legacy, SpreadsheetFormat::Modern];

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// 他の書き込みライブラリで作成した、タイトル行付きの名簿
    pub fn generate_student_list() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = XlsxWorkbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Sheet1")?;

        worksheet.write_string(0, 0, "Class of 2021")?;
        worksheet.write_string(1, 0, "Student No")?;
        worksheet.write_string(1, 1, "Name")?;
        worksheet.write_string(2, 0, "20210001")?;
        worksheet.write_string(2, 1, "Rizal")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 日付書式の数値、論理値、数式を含むシート
    pub fn generate_typed_values() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = XlsxWorkbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        worksheet.write_string(0, 0, "When")?;
        worksheet.write_string(0, 1, "Done")?;
        worksheet.write_string(0, 2, "Total")?;
        worksheet.write_number_with_format(1, 0, 45352.0, &date_format)?;
        worksheet.write_boolean(1, 1, true)?;
        worksheet.write_formula(1, 2, "=1+2")?;
        worksheet.set_formula_result(1, 2, "3");

        Ok(workbook.save_to_buffer()?)
    }
}

fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn round_trip(writer: &mut ExcelWriter) -> ExcelReader {
    let format = writer.format();
    let mut buffer = Cursor::new(Vec::new());
    writer.save_to_stream(&mut buffer, false).unwrap();
    ExcelReader::from_reader(buffer, format).unwrap()
}

fn write_student_list(writer: &mut ExcelWriter) {
    let title = writer.add_row("Sheet1").unwrap();
    writer
        .set_cell(&title, 0, "Class of 2021", &ValueKind::Text, "")
        .unwrap();
    let header = writer.add_row("Sheet1").unwrap();
    writer
        .set_cell(&header, 0, "Student No", &ValueKind::Text, "")
        .unwrap();
    writer.set_cell(&header, 1, "Name", &ValueKind::Text, "").unwrap();
    let row = writer.add_row("Sheet1").unwrap();
    writer
        .set_cell(&row, 0, 20210001, &ValueKind::Int32, "")
        .unwrap();
    writer.set_cell(&row, 1, "Rizal", &ValueKind::Text, "").unwrap();
}

/// 名簿の射影: タイトル行の次の行がヘッダーになる
#[test]
fn test_student_projection_round_trip() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        write_student_list(&mut writer);
        let records = round_trip(&mut writer).read_sheet("Sheet1").unwrap();

        assert_eq!(records.len(), 1, "format {:?}", format);
        assert_eq!(
            records[0].get("Student No"),
            Some(&FieldValue::Text("20210001".to_string()))
        );
        assert_eq!(
            records[0].get("Name"),
            Some(&FieldValue::Text("Rizal".to_string()))
        );
        assert_eq!(
            records[0].headers().collect::<Vec<_>>(),
            vec!["Student No", "Name"]
        );
    }
}

#[test]
fn test_foreign_workbook_projection() {
    let data = fixtures::generate_student_list().unwrap();
    let reader = ExcelReader::from_reader(Cursor::new(data), SpreadsheetFormat::Modern).unwrap();
    let records = reader.read_sheet("Sheet1").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        serde_json::to_string(&records).unwrap(),
        r#"[{"Student No":"20210001","Name":"Rizal"}]"#
    );
}

#[test]
fn test_foreign_typed_values() {
    let data = fixtures::generate_typed_values().unwrap();
    let reader = ExcelReader::from_reader(Cursor::new(data), SpreadsheetFormat::Modern).unwrap();
    let records = reader.read_sheet_at("Sheet1", 0).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("When"),
        Some(&FieldValue::Date(midnight(2024, 3, 1)))
    );
    assert_eq!(records[0].get("Done"), Some(&FieldValue::Boolean(true)));
    assert_eq!(records[0].get("Total"), Some(&FieldValue::Number(3.0)));

    let sheet = reader.workbook().sheet("Sheet1").unwrap();
    match &sheet.row(1).unwrap().cell(2).unwrap().value {
        CellValue::Formula { text, cached } => {
            assert_eq!(text, "1+2");
            assert_eq!(cached.as_deref(), Some(&CellValue::Number(3.0)));
        }
        other => panic!("Expected Formula, got {:?}", other),
    }
}

/// 宣言種別ごとの変換結果が両形式で保存・復元される
#[test]
fn test_coerced_values_round_trip() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let header = writer.add_row("Data").unwrap();
        for (column, label) in (0u16..).zip(["Text", "Flag", "Day", "Amount", "Id"]) {
            writer
                .set_cell(&header, column, label, &ValueKind::Text, "")
                .unwrap();
        }
        let row = writer.add_row("Data").unwrap();
        writer.set_cell(&row, 0, "日本語", &ValueKind::Text, "").unwrap();
        writer.set_cell(&row, 1, "yes", &ValueKind::Boolean, "").unwrap();
        writer
            .set_cell(
                &row,
                2,
                NaiveDate::from_ymd_opt(2021, 6, 30).unwrap(),
                &ValueKind::Date,
                "",
            )
            .unwrap();
        writer
            .set_cell(&row, 3, "12.75", &ValueKind::Decimal, "")
            .unwrap();
        writer.set_cell(&row, 4, 7i64, &ValueKind::Int64, "").unwrap();

        let reader = round_trip(&mut writer);
        let records = reader.read_sheet_at("Data", 0).unwrap();
        assert_eq!(records.len(), 1, "format {:?}", format);
        let record = &records[0];
        assert_eq!(record.get("Text"), Some(&FieldValue::Text("日本語".to_string())));
        assert_eq!(record.get("Flag"), Some(&FieldValue::Boolean(true)));
        assert_eq!(
            record.get("Day"),
            Some(&FieldValue::Date(midnight(2021, 6, 30))),
            "format {:?}",
            format
        );
        assert_eq!(record.get("Amount"), Some(&FieldValue::Number(12.75)));
        assert_eq!(record.get("Id"), Some(&FieldValue::Text("7".to_string())));
    }
}

#[test]
fn test_datetime_with_time_round_trip() {
    let value = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let header = writer.add_row("S").unwrap();
        writer.set_cell(&header, 0, "At", &ValueKind::Text, "").unwrap();
        let row = writer.add_row("S").unwrap();
        writer.set_cell(&row, 0, value, &ValueKind::Date, "").unwrap();

        let records = round_trip(&mut writer).read_sheet_at("S", 0).unwrap();
        match records[0].get("At") {
            Some(FieldValue::Date(read)) => {
                let drift = (*read - value).num_seconds().abs();
                assert!(drift <= 1, "format {:?}: {} vs {}", format, read, value);
            }
            other => panic!("Expected Date for {:?}, got {:?}", format, other),
        }
    }
}

/// 1900年3月1日より前の日付も1日ずれずに往復する
#[test]
fn test_dates_before_march_1900_round_trip() {
    let days = [midnight(1900, 1, 1), midnight(1900, 1, 15), midnight(1900, 2, 28)];
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let header = writer.add_row("S").unwrap();
        writer.set_cell(&header, 0, "Day", &ValueKind::Text, "").unwrap();
        for day in days {
            let row = writer.add_row("S").unwrap();
            writer.set_cell(&row, 0, day, &ValueKind::Date, "").unwrap();
        }

        let records = round_trip(&mut writer).read_sheet_at("S", 0).unwrap();
        let read: Vec<_> = records.iter().map(|r| r.get("Day").cloned()).collect();
        let expected: Vec<_> = days.iter().map(|d| Some(FieldValue::Date(*d))).collect();
        assert_eq!(read, expected, "format {:?}", format);
    }
}

/// 日付書式スタイル付きの数値は、保存後もメモリ上でも同じ日時として読める
#[test]
fn test_date_styled_number_reads_alike_from_file_and_memory() {
    for format in FORMATS {
        let build = || {
            let mut writer = ExcelWriter::new(format);
            writer.define_style("day", &StyleAttributes::default().with_number_format("yyyy-mm-dd"));
            let header = writer.add_row("S").unwrap();
            writer.set_cell(&header, 0, "When", &ValueKind::Text, "").unwrap();
            let row = writer.add_row("S").unwrap();
            writer.set_cell(&row, 0, 45352.0, &ValueKind::Double, "day").unwrap();
            writer
        };

        let from_file = round_trip(&mut build()).read_sheet_at("S", 0).unwrap();
        let in_memory = ExcelReader::from_workbook(build().into_workbook())
            .read_sheet_at("S", 0)
            .unwrap();
        let expected = Some(&FieldValue::Date(midnight(2024, 3, 1)));
        assert_eq!(from_file[0].get("When"), expected, "format {:?}", format);
        assert_eq!(in_memory[0].get("When"), expected, "format {:?}", format);
    }
}

#[test]
fn test_sheet_order_and_read_workbook() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        writer.create_sheet_strict("Zeta").unwrap();
        writer.create_sheet_strict("Alpha").unwrap();
        writer.get_or_create_sheet("Zeta").unwrap();
        for sheet in ["Zeta", "Alpha"] {
            writer.add_header(sheet, &["Key"], 0, 0).unwrap();
            writer
                .add_data(sheet, &[vec![RawValue::from(sheet)]], 0, 1)
                .unwrap();
        }

        let reader = round_trip(&mut writer);
        assert_eq!(reader.sheet_names(), vec!["Zeta", "Alpha"]);

        let reader = reader.with_options(ReaderOptions::new().with_header_row_index(0));
        let all = reader.read_workbook().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Zeta");
        assert_eq!(
            all[1].records[0].get("Key"),
            Some(&FieldValue::Text("Alpha".to_string()))
        );
    }
}

#[test]
fn test_write_tables_round_trip() {
    let mut scores = Table::new("Scores", vec!["Name".to_string(), "Score".to_string()]);
    scores.push_row(vec![RawValue::from("Ana"), RawValue::from(91.5)]);
    scores.push_row(vec![RawValue::from("Ben"), RawValue::Null]);
    let mut flags = Table::new("Flags", vec!["On".to_string()]);
    flags.push_row(vec![RawValue::from(false)]);

    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        writer.write_tables(&[scores.clone(), flags.clone()]).unwrap();
        let reader = round_trip(&mut writer)
            .with_options(ReaderOptions::new().with_header_row_index(0));

        let records = reader.read_sheet("Scores").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Score"), Some(&FieldValue::Number(91.5)));
        // nullは空文字列として書き込まれる
        let empty = records[1].get("Score");
        assert!(
            empty.is_none() || empty == Some(&FieldValue::Text(String::new())),
            "format {:?}: {:?}",
            format,
            empty
        );

        let records = reader.read_sheet("Flags").unwrap();
        assert_eq!(records[0].get("On"), Some(&FieldValue::Boolean(false)));
    }
}

#[test]
fn test_merged_regions_round_trip() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let row = writer.add_row("S").unwrap();
        writer.set_cell(&row, 0, "Wide", &ValueKind::Text, "").unwrap();
        writer.add_row("S").unwrap();
        writer.merge_cells("S", 0, 1, 0, 2).unwrap();

        let reader = round_trip(&mut writer);
        let sheet = reader.workbook().sheet("S").unwrap();
        assert_eq!(sheet.merged_regions().len(), 1, "format {:?}", format);
        let region = sheet.merged_regions()[0];
        assert_eq!((region.start.row, region.start.col), (0, 0));
        assert_eq!((region.end.row, region.end.col), (1, 2));
    }
}

#[test]
fn test_formula_round_trip_modern() {
    let mut writer = ExcelWriter::new(SpreadsheetFormat::Modern);
    let row = writer.add_row("S").unwrap();
    writer.set_cell(&row, 0, 2.0, &ValueKind::Double, "").unwrap();
    writer.set_cell(&row, 1, 3.0, &ValueKind::Double, "").unwrap();
    writer.set_formula(&row, 2, "=SUM(A1:B1)", "").unwrap();

    let reader = round_trip(&mut writer);
    let cell = reader.workbook().sheet("S").unwrap().row(0).unwrap().cell(2).unwrap();
    match &cell.value {
        CellValue::Formula { text, .. } => assert_eq!(text, "SUM(A1:B1)"),
        other => panic!("Expected Formula, got {:?}", other),
    }
}

#[test]
fn test_formula_saved_in_legacy() {
    let mut writer = ExcelWriter::new(SpreadsheetFormat::Legacy);
    let row = writer.add_row("S").unwrap();
    writer.set_cell(&row, 0, 2.0, &ValueKind::Double, "").unwrap();
    writer
        .set_formula(&row, 1, "=ROUND(A1*1.5,0)&\" units\"", "")
        .unwrap();
    assert!(matches!(
        writer.set_formula(&row, 2, "IFERROR(A1,0)", ""),
        Err(XlsBridgeError::InvalidFormula { .. })
    ));

    let reader = round_trip(&mut writer);
    let sheet = reader.workbook().sheet("S").unwrap();
    assert_eq!(
        sheet.row(0).unwrap().cell(0).unwrap().value,
        CellValue::Number(2.0)
    );
}

#[test]
fn test_styled_cells_save_in_both_formats() {
    let attributes = StyleAttributes::default()
        .with_font("Calibri", 11.0)
        .bold(true)
        .with_background(IndexedColor::Yellow)
        .with_number_format("0.00");
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        writer.define_style("money", &attributes);
        let header = writer.add_row("S").unwrap();
        writer.set_cell(&header, 0, "Amount", &ValueKind::Text, "money").unwrap();
        let row = writer.add_row("S").unwrap();
        writer.set_cell(&row, 0, 1234.5, &ValueKind::Double, "money").unwrap();
        writer.set_column_width("S", 1, 20.0).unwrap();
        writer.freeze_pane("S", 0, 1).unwrap();

        let records = round_trip(&mut writer).read_sheet_at("S", 0).unwrap();
        assert_eq!(records[0].get("Amount"), Some(&FieldValue::Number(1234.5)));
    }
}

#[test]
fn test_split_pane_saves_in_both_formats() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let row = writer.add_row("S").unwrap();
        writer.set_cell(&row, 0, "x", &ValueKind::Text, "").unwrap();
        writer
            .split_pane("S", 1200, 2400, 2, 4, PanePosition::LowerRight)
            .unwrap();
        let reader = round_trip(&mut writer);
        assert_eq!(reader.sheet_names(), vec!["S"]);
    }
}

#[test]
fn test_style_redefinition_keeps_existing_cells() {
    let mut writer = ExcelWriter::new(SpreadsheetFormat::Modern);
    let old = writer.define_style("s", &StyleAttributes::default().bold(true));
    let row = writer.add_row("S").unwrap();
    writer.set_cell(&row, 0, "a", &ValueKind::Text, "s").unwrap();
    let new = writer.define_style("s", &StyleAttributes::default().italic(true));
    writer.set_cell(&row, 1, "b", &ValueKind::Text, "s").unwrap();

    let stored = writer.workbook().row(&row).unwrap();
    let first = stored.cell(0).unwrap().style.clone().unwrap();
    let second = stored.cell(1).unwrap().style.clone().unwrap();
    assert!(Arc::ptr_eq(&first, &old));
    assert!(Arc::ptr_eq(&second, &new));
    assert!(first.font.bold && !first.font.italic);
    assert!(second.font.italic && !second.font.bold);
}

#[test]
fn test_style_is_bound_to_format() {
    let mut legacy = ExcelWriter::new(SpreadsheetFormat::Legacy);
    legacy.define_style("only-legacy", &StyleAttributes::default());
    assert!(legacy.workbook().style("only-legacy").is_some());

    // 未定義のスタイル名はエラーにならず、スタイルなしで書き込まれる
    let mut modern = ExcelWriter::new(SpreadsheetFormat::Modern);
    let row = modern.add_row("S").unwrap();
    modern
        .set_cell(&row, 0, "v", &ValueKind::Text, "only-legacy")
        .unwrap();
    assert!(modern.workbook().row(&row).unwrap().cell(0).unwrap().style.is_none());
}

#[test]
fn test_protection_modern_and_legacy() {
    let mut modern = ExcelWriter::new(SpreadsheetFormat::Modern);
    modern.add_row("S").unwrap();
    modern.protect_sheet("S", "secret").unwrap();
    let sheet = modern.workbook_mut().sheet_mut("S").unwrap();
    assert!(matches!(sheet.insert_rows(0, 1), Err(XlsBridgeError::SheetProtected(_))));
    assert!(matches!(sheet.delete_columns(0, 1), Err(XlsBridgeError::SheetProtected(_))));
    let mut buffer = Cursor::new(Vec::new());
    modern.save_to_stream(&mut buffer, false).unwrap();

    let mut legacy = ExcelWriter::new(SpreadsheetFormat::Legacy);
    legacy.add_row("S").unwrap();
    assert!(matches!(
        legacy.protect_sheet("S", "secret"),
        Err(XlsBridgeError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_notes_are_modern_only() {
    let mut modern = ExcelWriter::new(SpreadsheetFormat::Modern);
    let row = modern.add_row("S").unwrap();
    modern.set_cell(&row, 0, "v", &ValueKind::Text, "").unwrap();
    modern.add_cell_comment(&row, 0, "checked", Some("QA")).unwrap();
    let mut buffer = Cursor::new(Vec::new());
    modern.save_to_stream(&mut buffer, false).unwrap();

    let mut legacy = ExcelWriter::new(SpreadsheetFormat::Legacy);
    let row = legacy.add_row("S").unwrap();
    legacy.set_cell(&row, 0, "v", &ValueKind::Text, "").unwrap();
    assert!(matches!(
        legacy.add_cell_comment(&row, 0, "checked", None),
        Err(XlsBridgeError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_save_to_file_and_open_path() {
    let dir = TempDir::new().unwrap();
    for (file, format) in [("out.xls", SpreadsheetFormat::Legacy), ("out.xlsx", SpreadsheetFormat::Modern)] {
        let path = dir.path().join(file);
        let mut writer = ExcelWriterBuilder::new().with_file_name(&path).build().unwrap();
        assert_eq!(writer.format(), format);
        write_student_list(&mut writer);
        writer.save(true).unwrap();
        writer.close().unwrap();
        assert!(path.exists());

        let workbook = Workbook::open_path(&path).unwrap();
        assert_eq!(workbook.format(), format);
        let reader = ExcelReader::open(&path).unwrap();
        assert_eq!(reader.read_sheet("Sheet1").unwrap().len(), 1);
    }
}

#[test]
fn test_save_without_file_name_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let mut writer = ExcelWriter::new(SpreadsheetFormat::Modern);
    write_student_list(&mut writer);
    assert!(matches!(writer.save(false), Err(XlsBridgeError::Config(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_auto_size_sets_column_widths() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let row = writer.add_row("S").unwrap();
        writer
            .set_cell(&row, 0, "a considerably long value", &ValueKind::Text, "")
            .unwrap();
        writer.set_cell(&row, 1, "b", &ValueKind::Text, "").unwrap();
        let mut buffer = Cursor::new(Vec::new());
        writer.save_to_stream(&mut buffer, true).unwrap();

        let sheet = writer.workbook().sheet("S").unwrap();
        let wide = sheet.column_width(0).unwrap();
        let narrow = sheet.column_width(1).unwrap();
        assert!(wide > narrow, "format {:?}: {} <= {}", format, wide, narrow);
    }
}

#[test]
fn test_empty_workbook_saves() {
    for format in FORMATS {
        let mut writer = ExcelWriter::new(format);
        let reader = round_trip(&mut writer);
        assert_eq!(reader.sheet_names().len(), 1);
    }
}
