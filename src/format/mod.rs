//! Number Format Module
//!
//! 数値書式コードの判定、Excelシリアル値と日時の相互変換、列幅の自動計算を提供します。

mod builtin;
mod detect;
mod serial;
mod width;

pub use builtin::{builtin_format_code, builtin_format_id, DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT};
pub use detect::is_date_format;
pub use serial::{datetime_to_serial, serial_to_datetime};
pub(crate) use serial::{datetime_to_string, default_date_format, parse_datetime_text};
pub(crate) use width::{autofit_width, display_width};
