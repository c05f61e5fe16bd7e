//! Workbook Model Module
//!
//! ワークブック・シート・行・セルのメモリ上のモデル。
//! 形式に依存しない表現で、コーデックがこのモデルとバイト列を相互変換する。

mod cell;
mod sheet;
mod workbook;

pub use cell::{Cell, CellValue, Note};
pub use sheet::{Pane, Protection, Row, Sheet};
pub use workbook::{RowRef, Workbook};
