//! 列幅の自動計算
//!
//! 文字列の表示幅（全角文字は2）から、フォントサイズに比例した列幅（文字数単位）を求める。

use unicode_width::UnicodeWidthStr;

/// 列幅の基準フォントサイズ（ポイント）
const BASE_FONT_SIZE: f64 = 11.0;

/// 最小列幅（文字数）
const MIN_WIDTH: f64 = 2.0;

/// 最大列幅（文字数）
const MAX_WIDTH: f64 = 255.0;

/// 文字列の表示幅（改行を含む場合は最も長い行）
pub(crate) fn display_width(text: &str) -> usize {
    text.lines().map(|line| line.width()).max().unwrap_or(0)
}

/// 表示幅とフォントサイズから列幅を計算する
///
/// # 引数
///
/// * `text_width` - 表示幅（`display_width`の結果）
/// * `font_size` - フォントサイズ（ポイント）
///
/// # 戻り値
///
/// 列幅（文字数単位、余白1文字を含む）。2〜255の範囲に収まります。
pub(crate) fn autofit_width(text_width: usize, font_size: f64) -> f64 {
    let scale = if font_size > 0.0 {
        font_size / BASE_FONT_SIZE
    } else {
        1.0
    };
    (text_width as f64 * scale + 1.0).clamp(MIN_WIDTH, MAX_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("Name"), 4);
        assert_eq!(display_width("市区町村コード"), 14);
        assert_eq!(display_width("short\nmuch longer"), 11);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn test_autofit_width() {
        assert_eq!(autofit_width(10, 11.0), 11.0);
        assert_eq!(autofit_width(0, 11.0), MIN_WIDTH);
        assert!(autofit_width(10, 8.0) < autofit_width(10, 11.0));
        assert_eq!(autofit_width(10_000, 11.0), MAX_WIDTH);
    }
}
