//! Value Coercion Module
//!
//! 実行時の値（`RawValue`）と宣言された値種別（`ValueKind`）から、型付きのセル値を決定する。
//!
//! 変換規則は上から順に評価されます。
//!
//! 1. 値が`Null`なら空文字列
//! 2. 種別が整数（Int16/Int32/Int64）か`Text`、または値が`Absent`ならテキスト表現
//! 3. `Boolean`なら論理値に変換
//! 4. `Date`なら日時に変換
//! 5. `Double` / `Decimal`なら数値に変換
//! 6. それ以外の種別は`UnsupportedType`

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::api::ValueKind;
use crate::error::{Result, XlsBridgeError};
use crate::format::{datetime_to_string, parse_datetime_text, serial_to_datetime};
use crate::model::CellValue;

/// 実行時の値
///
/// `Absent`は「値が存在しないこと」を明示する番兵で、種別に関係なく空文字列として書き込まれます。
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// null
    Null,
    /// 値なしの番兵
    Absent,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl RawValue {
    /// 実行時の型に対応する値種別
    ///
    /// 表データ（`Table`）の書き込みで、列ごとの宣言がない場合に使用されます。
    pub fn natural_kind(&self) -> ValueKind {
        match self {
            RawValue::Null | RawValue::Absent | RawValue::Text(_) => ValueKind::Text,
            RawValue::Int(_) => ValueKind::Int64,
            RawValue::Float(_) => ValueKind::Double,
            RawValue::Bool(_) => ValueKind::Boolean,
            RawValue::DateTime(_) | RawValue::Date(_) => ValueKind::Date,
        }
    }

    /// 値のテキスト表現
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Null | RawValue::Absent => String::new(),
            RawValue::Text(s) => s.clone(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) => f.to_string(),
            RawValue::Bool(b) => b.to_string(),
            RawValue::DateTime(dt) => datetime_to_string(dt),
            RawValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

macro_rules! raw_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for RawValue {
            fn from(value: $t) -> Self {
                RawValue::Int(i64::from(value))
            }
        })*
    };
}

raw_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for RawValue {
    fn from(value: f32) -> Self {
        RawValue::Float(f64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(value: NaiveDateTime) -> Self {
        RawValue::DateTime(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(value: NaiveDate) -> Self {
        RawValue::Date(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

/// 値と宣言種別からセル値を決定する
///
/// # 引数
///
/// * `raw` - 実行時の値
/// * `kind` - 宣言された値種別
///
/// # 戻り値
///
/// * `Ok(CellValue)` - 変換されたセル値
/// * `Err(XlsBridgeError::UnsupportedType)` - 種別に対応する規則がない場合
/// * `Err(XlsBridgeError::InvalidValue)` - 変換に失敗した場合
pub fn coerce(raw: &RawValue, kind: &ValueKind) -> Result<CellValue> {
    if *raw == RawValue::Null {
        return Ok(CellValue::Text(String::new()));
    }

    if kind.is_integer() || *kind == ValueKind::Text || *raw == RawValue::Absent {
        return Ok(CellValue::Text(raw.to_text()));
    }

    match kind {
        ValueKind::Boolean => to_bool(raw).map(CellValue::Boolean),
        ValueKind::Date => to_datetime(raw).map(CellValue::Date),
        ValueKind::Double | ValueKind::Decimal => to_number(raw).map(CellValue::Number),
        other => Err(XlsBridgeError::UnsupportedType(other.name().to_string())),
    }
}

fn invalid(raw: &RawValue, target: &'static str) -> XlsBridgeError {
    XlsBridgeError::InvalidValue {
        value: raw.to_text(),
        target,
    }
}

fn to_bool(raw: &RawValue) -> Result<bool> {
    match raw {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Int(i) => Ok(*i != 0),
        RawValue::Float(f) => Ok(*f != 0.0),
        RawValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(invalid(raw, "Boolean")),
        },
        _ => Err(invalid(raw, "Boolean")),
    }
}

fn to_datetime(raw: &RawValue) -> Result<NaiveDateTime> {
    match raw {
        RawValue::DateTime(dt) => Ok(*dt),
        RawValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        RawValue::Text(s) => parse_datetime_text(s).ok_or_else(|| invalid(raw, "Date")),
        RawValue::Int(i) => serial_to_datetime(*i as f64).ok_or_else(|| invalid(raw, "Date")),
        RawValue::Float(f) => serial_to_datetime(*f).ok_or_else(|| invalid(raw, "Date")),
        _ => Err(invalid(raw, "Date")),
    }
}

fn to_number(raw: &RawValue) -> Result<f64> {
    match raw {
        RawValue::Int(i) => Ok(*i as f64),
        RawValue::Float(f) => Ok(*f),
        RawValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid(raw, "Number")),
        _ => Err(invalid(raw, "Number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_null_is_empty_text() {
        for kind in [ValueKind::Text, ValueKind::Double, ValueKind::Date, ValueKind::Boolean] {
            assert_eq!(
                coerce(&RawValue::Null, &kind).unwrap(),
                CellValue::Text(String::new())
            );
        }
    }

    #[test]
    fn test_integer_kinds_are_stringified() {
        assert_eq!(
            coerce(&RawValue::Int(42), &ValueKind::Int32).unwrap(),
            CellValue::Text("42".to_string())
        );
        assert_eq!(
            coerce(&RawValue::Float(1.5), &ValueKind::Int64).unwrap(),
            CellValue::Text("1.5".to_string())
        );
    }

    // Absentは宣言種別より優先される
    #[test]
    fn test_absent_beats_declared_kind() {
        assert_eq!(
            coerce(&RawValue::Absent, &ValueKind::Double).unwrap(),
            CellValue::Text(String::new())
        );
        assert_eq!(
            coerce(&RawValue::Absent, &ValueKind::Other("Guid".to_string())).unwrap(),
            CellValue::Text(String::new())
        );
    }

    #[test]
    fn test_boolean_conversion() {
        assert_eq!(
            coerce(&RawValue::Bool(true), &ValueKind::Boolean).unwrap(),
            CellValue::Boolean(true)
        );
        assert_eq!(
            coerce(&RawValue::Int(0), &ValueKind::Boolean).unwrap(),
            CellValue::Boolean(false)
        );
        assert_eq!(
            coerce(&RawValue::from("Yes"), &ValueKind::Boolean).unwrap(),
            CellValue::Boolean(true)
        );
        assert!(matches!(
            coerce(&RawValue::from("maybe"), &ValueKind::Boolean),
            Err(XlsBridgeError::InvalidValue { target: "Boolean", .. })
        ));
    }

    #[test]
    fn test_date_conversion() {
        assert_eq!(
            coerce(&RawValue::from(date(2024, 1, 15)), &ValueKind::Date).unwrap(),
            CellValue::Date(date(2024, 1, 15))
        );
        assert_eq!(
            coerce(
                &RawValue::from(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                &ValueKind::Date
            )
            .unwrap(),
            CellValue::Date(date(2024, 1, 15))
        );
        assert_eq!(
            coerce(&RawValue::from("1/15/2024"), &ValueKind::Date).unwrap(),
            CellValue::Date(date(2024, 1, 15))
        );
        assert_eq!(
            coerce(&RawValue::Int(45306), &ValueKind::Date).unwrap(),
            CellValue::Date(date(2024, 1, 15))
        );
        assert!(matches!(
            coerce(&RawValue::Bool(true), &ValueKind::Date),
            Err(XlsBridgeError::InvalidValue { target: "Date", .. })
        ));
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(
            coerce(&RawValue::Int(7), &ValueKind::Double).unwrap(),
            CellValue::Number(7.0)
        );
        assert_eq!(
            coerce(&RawValue::from(" 3.25 "), &ValueKind::Decimal).unwrap(),
            CellValue::Number(3.25)
        );
        assert_eq!(
            coerce(&RawValue::Bool(true), &ValueKind::Double).unwrap(),
            CellValue::Number(1.0)
        );
        match coerce(&RawValue::from("abc"), &ValueKind::Double) {
            Err(XlsBridgeError::InvalidValue { value, target }) => {
                assert_eq!(value, "abc");
                assert_eq!(target, "Number");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_unmatched_kind_is_unsupported() {
        match coerce(&RawValue::from("x"), &ValueKind::Other("Guid".to_string())) {
            Err(XlsBridgeError::UnsupportedType(name)) => assert_eq!(name, "Guid"),
            other => panic!("Expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_natural_kind() {
        assert_eq!(RawValue::Int(1).natural_kind(), ValueKind::Int64);
        assert_eq!(RawValue::Float(1.0).natural_kind(), ValueKind::Double);
        assert_eq!(RawValue::Bool(true).natural_kind(), ValueKind::Boolean);
        assert_eq!(RawValue::from(Some("a")).natural_kind(), ValueKind::Text);
        assert_eq!(RawValue::from(None::<i32>), RawValue::Null);
    }

    proptest! {
        // テキスト種別では任意の文字列がそのまま保持される
        #[test]
        fn prop_text_kind_preserves_strings(s in ".*") {
            let value = coerce(&RawValue::Text(s.clone()), &ValueKind::Text).unwrap();
            prop_assert_eq!(value, CellValue::Text(s));
        }

        #[test]
        fn prop_integer_kind_matches_display(i in any::<i64>()) {
            let value = coerce(&RawValue::Int(i), &ValueKind::Int64).unwrap();
            prop_assert_eq!(value, CellValue::Text(i.to_string()));
        }
    }
}
