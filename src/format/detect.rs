//! 日付書式の判定
//!
//! 書式コードを字句単位で走査し、日付・時刻のプレースホルダーを含むかを判定する。
//! 引用符内のリテラル、`\`でエスケープされた文字、角括弧内の色・条件指定は無視する。

/// 書式コードが日付・時刻書式かどうかを判定する
///
/// 複数セクションを持つ書式では、最初のセクションのみで判定します。
/// 経過時間書式（`[h]`, `[mm]`, `[ss]`）は日付書式として扱います。
///
/// ```rust
/// use xlsbridge::is_date_format;
///
/// assert!(is_date_format("yyyy-mm-dd"));
/// assert!(is_date_format("[h]:mm:ss"));
/// assert!(!is_date_format("#,##0.00"));
/// assert!(!is_date_format("\"Day\" 0"));
/// ```
pub fn is_date_format(code: &str) -> bool {
    let mut chars = code.chars().peekable();
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '\\' | '_' | '*' => {
                // 次の1文字はリテラル（`_`は幅、`*`は埋め文字）
                chars.next();
            }
            '[' => {
                let mut bracket = String::new();
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    bracket.push(inner);
                }
                if is_elapsed_time(&bracket) {
                    return true;
                }
            }
            ';' => return false,
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => return true,
            _ => {}
        }
    }

    false
}

fn is_elapsed_time(bracket: &str) -> bool {
    !bracket.is_empty()
        && bracket
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'h' | 'm' | 's'))
}
