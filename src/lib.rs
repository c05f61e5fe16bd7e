//! xlsbridge - One value-typed API over legacy `.xls` and modern `.xlsx` workbooks
//!
//! This crate builds, styles, saves and reads tabular workbooks in either the
//! legacy BIFF8 format (`.xls`, inside an OLE2 compound file) or the modern
//! OOXML format (`.xlsx`). The format is selected once, from a file extension or
//! an explicit flag, and the rest of the API is identical for both.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsbridge::{ExcelWriter, StyleAttributes, ValueKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The extension selects the legacy format
//!     let mut writer = ExcelWriter::from_file_name("students.xls");
//!     writer.define_style("header", &StyleAttributes::default().bold(true));
//!
//!     let title = writer.add_row("Sheet1")?;
//!     writer.set_cell(&title, 0, "Class of 2021", &ValueKind::Text, "")?;
//!
//!     let header = writer.add_row("Sheet1")?;
//!     writer.set_cell(&header, 0, "Student No", &ValueKind::Text, "header")?;
//!     writer.set_cell(&header, 1, "Name", &ValueKind::Text, "header")?;
//!
//!     let row = writer.add_row("Sheet1")?;
//!     writer.set_cell(&row, 0, "20210001", &ValueKind::Text, "")?;
//!     writer.set_cell(&row, 1, "Rizal", &ValueKind::Text, "")?;
//!
//!     writer.save(true)?;
//!     Ok(())
//! }
//! ```
//!
//! # Reading Records
//!
//! ```rust,no_run
//! use xlsbridge::ExcelReader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = ExcelReader::open("students.xls")?;
//!
//!     // The header is the second existing row by default
//!     for record in reader.read_sheet("Sheet1")? {
//!         println!("{}", serde_json::to_string(&record)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # In-memory Output
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use xlsbridge::{ExcelReader, ExcelWriterBuilder, SpreadsheetFormat, ValueKind};
//!
//! # fn main() -> Result<(), xlsbridge::XlsBridgeError> {
//! let mut writer = ExcelWriterBuilder::new()
//!     .with_format(SpreadsheetFormat::Modern)
//!     .build()?;
//! let row = writer.add_row("Data")?;
//! writer.set_cell(&row, 0, 42.0, &ValueKind::Double, "")?;
//!
//! let mut buffer = Cursor::new(Vec::new());
//! writer.save_to_stream(&mut buffer, false)?;
//! let reader = ExcelReader::from_reader(buffer, SpreadsheetFormat::Modern)?;
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod codec;
mod coerce;
mod columns;
mod error;
mod format;
mod model;
mod parser;
mod reader;
mod security;
mod sequencer;
mod style;
mod types;
mod writer;

// 公開API
pub use api::{
    BorderStyle, FillPattern, FontUnderline, HorizontalAlignment, IndexedColor, PanePosition,
    SpreadsheetFormat, ValueKind, VerticalAlignment,
};
pub use builder::{ExcelWriterBuilder, ReaderOptions};
pub use coerce::{coerce, RawValue};
pub use columns::{cell_address, column_letter, COLUMN_TABLE_LEN};
pub use error::{Result, XlsBridgeError};
pub use format::{
    builtin_format_code, builtin_format_id, datetime_to_serial, is_date_format,
    serial_to_datetime, DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT,
};
pub use model::{Cell, CellValue, Note, Pane, Protection, Row, RowRef, Sheet, Workbook};
pub use reader::ExcelReader;
pub use security::SecurityConfig;
pub use sequencer::RowSequencer;
pub use style::{
    Borders, Fill, FillColor, Font, Style, StyleAttributes, StyleCache, LEGACY_AUTOMATIC_COLOR,
};
pub use types::{CellCoord, CellRange, FieldValue, Record, SheetRecords, Table};
pub use writer::ExcelWriter;
