//! Style Module
//!
//! 名前付きセルスタイルの定義とキャッシュを提供するモジュール。
//!
//! スタイルは`StyleAttributes`（形式に依存しない属性）から、ワークブックの形式に対応する
//! コーデック（`WorkbookCodec::create_font` / `create_style`）によって構築されます。
//! 構築されたスタイルは`Arc<Style>`として共有され、キャッシュは`(形式, 名前)`をキーとします。
//! 同名のスタイルを再定義してもキャッシュのエントリが置き換わるだけで、
//! 既にスタイルを適用済みのセルは元の`Arc`を保持し続けます。

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::api::{
    BorderStyle, FillPattern, FontUnderline, HorizontalAlignment, IndexedColor,
    SpreadsheetFormat, VerticalAlignment,
};

/// 自動色を表すLegacyパレットインデックス（塗りつぶしなし）
pub const LEGACY_AUTOMATIC_COLOR: u16 = 64;

/// スタイル定義の入力属性
///
/// すべてのフィールドに既定値があり、JSONなどから部分的に読み込むことができます。
///
/// # デフォルト値
///
/// - フォント: "Arial"、8ポイント、標準（斜体・太字・下線なし）、黒
/// - 配置: 左揃え・上揃え
/// - 罫線: なし
/// - 塗りつぶし: なし（Legacyパレットインデックスは64 = 自動）
///
/// # 使用例
///
/// ```rust
/// use xlsbridge::{HorizontalAlignment, IndexedColor, StyleAttributes};
///
/// let header = StyleAttributes::default()
///     .with_font("Calibri", 11.0)
///     .bold(true)
///     .with_horizontal(HorizontalAlignment::Center)
///     .with_background(IndexedColor::Grey25Percent);
///
/// let from_json: StyleAttributes =
///     serde_json::from_str(r#"{"bold": true, "font_size": 11.0}"#).unwrap();
/// assert!(from_json.bold);
/// assert_eq!(from_json.font_name, "Arial");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleAttributes {
    pub font_name: String,
    pub font_size: f64,
    pub italic: bool,
    pub underline: FontUnderline,
    pub bold: bool,
    pub font_color: IndexedColor,
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub border_top: BorderStyle,
    pub border_bottom: BorderStyle,
    pub border_left: BorderStyle,
    pub border_right: BorderStyle,
    /// 背景色（指定時は塗りつぶしになる）
    pub background_color: Option<IndexedColor>,
    /// 塗りつぶしパターン（省略時は単色）
    pub fill_pattern: Option<FillPattern>,
    /// 背景のRGB値（Modern形式のみ有効）
    pub rgb: Option<[u8; 3]>,
    /// 背景のパレットインデックス（Legacy形式のみ有効、64は自動）
    pub legacy_background_index: u16,
    /// 数値・日付の書式コード
    pub number_format: Option<String>,
}

impl Default for StyleAttributes {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 8.0,
            italic: false,
            underline: FontUnderline::None,
            bold: false,
            font_color: IndexedColor::Black,
            horizontal: HorizontalAlignment::Left,
            vertical: VerticalAlignment::Top,
            border_top: BorderStyle::None,
            border_bottom: BorderStyle::None,
            border_left: BorderStyle::None,
            border_right: BorderStyle::None,
            background_color: None,
            fill_pattern: None,
            rgb: None,
            legacy_background_index: LEGACY_AUTOMATIC_COLOR,
            number_format: None,
        }
    }
}

impl StyleAttributes {
    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = name.into();
        self.font_size = size;
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: FontUnderline) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_font_color(mut self, color: IndexedColor) -> Self {
        self.font_color = color;
        self
    }

    pub fn with_horizontal(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal = alignment;
        self
    }

    pub fn with_vertical(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical = alignment;
        self
    }

    /// 4辺すべての罫線を設定
    pub fn with_borders(mut self, border: BorderStyle) -> Self {
        self.border_top = border;
        self.border_bottom = border;
        self.border_left = border;
        self.border_right = border;
        self
    }

    pub fn with_background(mut self, color: IndexedColor) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_fill_pattern(mut self, pattern: FillPattern) -> Self {
        self.fill_pattern = Some(pattern);
        self
    }

    pub fn with_rgb(mut self, rgb: [u8; 3]) -> Self {
        self.rgb = Some(rgb);
        self
    }

    pub fn with_legacy_background_index(mut self, index: u16) -> Self {
        self.legacy_background_index = index;
        self
    }

    pub fn with_number_format(mut self, code: impl Into<String>) -> Self {
        self.number_format = Some(code.into());
        self
    }
}

/// フォント
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    /// ポイント
    pub size: f64,
    pub italic: bool,
    pub bold: bool,
    pub underline: FontUnderline,
    pub color: IndexedColor,
}

impl Font {
    pub(crate) fn from_attributes(attributes: &StyleAttributes) -> Self {
        Self {
            name: attributes.font_name.clone(),
            size: attributes.font_size,
            italic: attributes.italic,
            bold: attributes.bold,
            underline: attributes.underline,
            color: attributes.font_color,
        }
    }
}

/// 4辺の罫線
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    pub top: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
    pub right: BorderStyle,
}

/// 塗りつぶしの色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillColor {
    /// 標準パレットの色
    Indexed(IndexedColor),
    /// Legacyパレットのインデックス
    Palette(u16),
    /// RGB値
    Rgb([u8; 3]),
}

/// 塗りつぶし
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub color: FillColor,
    pub pattern: FillPattern,
}

/// 構築済みのセルスタイル
///
/// 構築した形式（`format`）のワークブックのセルにのみ適用されます。
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub format: SpreadsheetFormat,
    pub font: Font,
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub borders: Borders,
    /// 形式ごとの規則で決定された塗りつぶし
    pub fill: Option<Fill>,
    pub rgb: Option<[u8; 3]>,
    pub legacy_palette_index: Option<u16>,
    pub number_format: Option<String>,
}

impl Style {
    /// 塗りつぶし以外の属性からスタイルを組み立てる
    pub(crate) fn assemble(
        name: &str,
        format: SpreadsheetFormat,
        font: Font,
        attributes: &StyleAttributes,
        fill: Option<Fill>,
    ) -> Self {
        let legacy_palette_index = (attributes.legacy_background_index != LEGACY_AUTOMATIC_COLOR)
            .then_some(attributes.legacy_background_index);
        Self {
            name: name.to_string(),
            format,
            font,
            horizontal: attributes.horizontal,
            vertical: attributes.vertical,
            borders: Borders {
                top: attributes.border_top,
                bottom: attributes.border_bottom,
                left: attributes.border_left,
                right: attributes.border_right,
            },
            fill,
            rgb: attributes.rgb,
            legacy_palette_index,
            number_format: attributes.number_format.clone(),
        }
    }
}

/// 名前付きスタイルのキャッシュ
///
/// キーは`(形式, スタイル名)`です。ワークブックは自分の形式のキーでのみ検索するため、
/// 異なる形式で構築されたスタイルがセルに付くことはありません。
#[derive(Debug, Default)]
pub struct StyleCache {
    styles: HashMap<(SpreadsheetFormat, String), Arc<Style>>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// スタイルを登録または置き換える
    ///
    /// # 戻り値
    ///
    /// 登録されたスタイルの共有参照
    pub fn insert(&mut self, style: Style) -> Arc<Style> {
        let style = Arc::new(style);
        self.styles
            .insert((style.format, style.name.clone()), Arc::clone(&style));
        style
    }

    /// スタイルを検索する
    ///
    /// 名前は前後の空白を除去してから照合します。空の名前は常に`None`です。
    pub fn get(&self, format: SpreadsheetFormat, name: &str) -> Option<Arc<Style>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.styles.get(&(format, name.to_string())).cloned()
    }

    /// 指定した形式のスタイル名（ソート済み）
    pub fn names(&self, format: SpreadsheetFormat) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .styles
            .keys()
            .filter(|(f, _)| *f == format)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
