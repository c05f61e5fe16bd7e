//! 組み込み数値書式
//!
//! BIFF8/OOXMLで予約されている書式ID（0〜49）のうち、本クレートが参照するもの。

/// 時刻を含まない日付の既定書式
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";

/// 時刻を含む日時の既定書式
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

const BUILTIN_FORMATS: &[(u16, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "m/d/yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// 書式コードに対応する組み込み書式IDを返す
///
/// 組み込み書式でない場合は`None`を返します。Legacy形式では、`None`の書式は
/// ID 164以降のFORMATレコードとして書き出されます。
pub fn builtin_format_id(code: &str) -> Option<u16> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, builtin)| builtin.eq_ignore_ascii_case(code))
        .map(|(id, _)| *id)
}

/// 組み込み書式IDに対応する書式コードを返す
pub fn builtin_format_code(id: u16) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(builtin_id, _)| *builtin_id == id)
        .map(|(_, code)| *code)
}
