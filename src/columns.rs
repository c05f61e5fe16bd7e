//! Column Address Module
//!
//! 0始まりの列インデックスから列記号（"A"〜"ZZ"）への変換表を提供するモジュール。
//! 変換表はプロセス全体で一度だけ構築され、以降は読み取り専用です。

use once_cell::sync::Lazy;

use crate::error::{Result, XlsBridgeError};

/// 変換表の要素数（"A"〜"Z"の26個 + "AA"〜"ZZ"の676個）
pub const COLUMN_TABLE_LEN: usize = 702;

static COLUMN_TABLE: Lazy<Vec<String>> = Lazy::new(|| {
    let letters: Vec<char> = ('A'..='Z').collect();
    let mut table = Vec::with_capacity(COLUMN_TABLE_LEN);
    table.extend(letters.iter().map(|c| c.to_string()));
    for first in &letters {
        for second in &letters {
            table.push(format!("{}{}", first, second));
        }
    }
    table
});

/// 列インデックスを列記号に変換する
///
/// # 引数
///
/// * `index` - 0始まりの列インデックス
///
/// # 戻り値
///
/// * `Ok(&str)` - 列記号（0 -> "A", 25 -> "Z", 26 -> "AA", 701 -> "ZZ"）
/// * `Err(XlsBridgeError::ColumnOutOfRange)` - インデックスが702以上の場合
pub fn column_letter(index: usize) -> Result<&'static str> {
    COLUMN_TABLE
        .get(index)
        .map(String::as_str)
        .ok_or(XlsBridgeError::ColumnOutOfRange {
            column: index,
            limit: COLUMN_TABLE_LEN,
        })
}

/// 行・列インデックスをA1形式のセルアドレスに変換する
///
/// ```rust
/// use xlsbridge::cell_address;
///
/// assert_eq!(cell_address(2, 1).unwrap(), "B3");
/// ```
pub fn cell_address(row: u32, column: usize) -> Result<String> {
    let letter = column_letter(column)?;
    Ok(format!("{}{}", letter, u64::from(row) + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_boundaries() {
        assert_eq!(COLUMN_TABLE.len(), COLUMN_TABLE_LEN);
        assert_eq!(column_letter(0).unwrap(), "A");
        assert_eq!(column_letter(25).unwrap(), "Z");
        assert_eq!(column_letter(26).unwrap(), "AA");
        assert_eq!(column_letter(51).unwrap(), "AZ");
        assert_eq!(column_letter(52).unwrap(), "BA");
        assert_eq!(column_letter(701).unwrap(), "ZZ");
    }

    #[test]
    fn test_out_of_range() {
        match column_letter(702) {
            Err(XlsBridgeError::ColumnOutOfRange { column: 702, limit }) => {
                assert_eq!(limit, COLUMN_TABLE_LEN)
            }
            other => panic!("Expected ColumnOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_address() {
        assert_eq!(cell_address(0, 0).unwrap(), "A1");
        assert_eq!(cell_address(2, 1).unwrap(), "B3");
        assert_eq!(cell_address(99, 27).unwrap(), "AB100");
        assert!(cell_address(0, 702).is_err());
    }
}
