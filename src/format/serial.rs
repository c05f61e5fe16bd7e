//! Excelシリアル値と日時の相互変換
//!
//! 1900年エポックのみを扱う。Excelは1900年を閏年として数えるため、
//! 1900年3月1日より前の日付は基準日 1899-12-31 から数える（シリアル値60が架空の2月29日）。

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::builtin::{DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 架空の1900-02-29に当たるシリアル値
const PHANTOM_LEAP_DAY: f64 = 60.0;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// 日時をExcelシリアル値に変換する
pub fn datetime_to_serial(value: &NaiveDateTime) -> f64 {
    let elapsed = *value - epoch();
    let days = elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY;
    // 1899-12-30からの日数が61未満なら1900-03-01より前
    if days < PHANTOM_LEAP_DAY + 1.0 {
        days - 1.0
    } else {
        days
    }
}

/// Excelシリアル値を日時に変換する
///
/// ミリ秒単位に丸めます。範囲外の値（負数、非有限数、オーバーフロー）は`None`を返します。
/// 60未満の値は1900年閏年バグを補正して1日後ろにずらします。
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = if serial < PHANTOM_LEAP_DAY {
        serial + 1.0
    } else {
        serial
    };
    let millis = (days * MILLIS_PER_DAY).round();
    if millis > i64::MAX as f64 {
        return None;
    }
    epoch().checked_add_signed(Duration::milliseconds(millis as i64))
}

/// 日時に適した既定の書式コード（0時0分0秒なら日付のみ）
pub(crate) fn default_date_format(value: &NaiveDateTime) -> &'static str {
    if is_midnight(value) {
        DEFAULT_DATE_FORMAT
    } else {
        DEFAULT_DATETIME_FORMAT
    }
}

/// 日時のテキスト表現（0時0分0秒なら日付のみ）
pub(crate) fn datetime_to_string(value: &NaiveDateTime) -> String {
    if is_midnight(value) {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// 日時文字列を解析する
///
/// ISO 8601（`T`区切り・空白区切り、日付のみ）と`m/d/Y`形式を受け付けます。
pub(crate) fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    const DATETIME_PATTERNS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

    let text = text.trim();
    DATETIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
        .or_else(|| {
            DATE_PATTERNS.iter().find_map(|pattern| {
                NaiveDate::parse_from_str(text, pattern)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
        })
}

fn is_midnight(value: &NaiveDateTime) -> bool {
    value.num_seconds_from_midnight() == 0 && value.nanosecond() == 0
}
