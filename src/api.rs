//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。
//! 形式選択（`SpreadsheetFormat`）と、スタイル属性・値種別・ペイン位置を表す列挙型を含む。

use serde::{Deserialize, Serialize};
use std::path::Path;

/// スプレッドシートの形式ファミリー
///
/// ワークブックは生成時にどちらか一方の形式に束縛され、以降変更されません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadsheetFormat {
    /// 旧形式（BIFF8 `.xls`、OLE2複合ファイル）
    Legacy,

    /// 新形式（OOXML `.xlsx`、XMLパーツのZIPアーカイブ）
    Modern,
}

impl SpreadsheetFormat {
    /// ファイル名の拡張子から形式を選択する
    ///
    /// 拡張子が`.xls`（大文字小文字を区別しない）の場合は`Legacy`、
    /// それ以外（拡張子なしを含む）はすべて`Modern`になります。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsbridge::SpreadsheetFormat;
    ///
    /// assert_eq!(SpreadsheetFormat::from_file_name("report.XLS"), SpreadsheetFormat::Legacy);
    /// assert_eq!(SpreadsheetFormat::from_file_name("report.xlsx"), SpreadsheetFormat::Modern);
    /// assert_eq!(SpreadsheetFormat::from_file_name("report"), SpreadsheetFormat::Modern);
    /// ```
    pub fn from_file_name(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xls") => SpreadsheetFormat::Legacy,
            _ => SpreadsheetFormat::Modern,
        }
    }

    /// 「新形式か」フラグから形式を選択する
    pub fn from_new_format_flag(is_new_format: bool) -> Self {
        if is_new_format {
            SpreadsheetFormat::Modern
        } else {
            SpreadsheetFormat::Legacy
        }
    }

    /// 新形式（Modern）かどうか
    pub fn is_modern(self) -> bool {
        self == SpreadsheetFormat::Modern
    }

    /// 形式に対応するファイル拡張子（ドット付き）
    pub fn extension(self) -> &'static str {
        match self {
            SpreadsheetFormat::Legacy => ".xls",
            SpreadsheetFormat::Modern => ".xlsx",
        }
    }
}

/// セルに設定する値の宣言種別
///
/// 実行時の値（`RawValue`）とは独立に、呼び出し側が「この値をどの型として書くか」を宣言します。
/// 整数種別と`Text`は常に文字列化され、`Other`はどの変換規則にも一致しません。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// 16ビット整数（文字列化される）
    Int16,
    /// 32ビット整数（文字列化される）
    Int32,
    /// 64ビット整数（文字列化される）
    Int64,
    /// 文字列
    Text,
    /// 論理値
    Boolean,
    /// 日時
    Date,
    /// 浮動小数点数
    Double,
    /// 固定小数点数（浮動小数点数として格納される）
    Decimal,
    /// 上記以外の型（型名を保持する）
    Other(String),
}

impl ValueKind {
    /// 整数種別かどうか
    pub fn is_integer(&self) -> bool {
        matches!(self, ValueKind::Int16 | ValueKind::Int32 | ValueKind::Int64)
    }

    /// 種別名
    pub fn name(&self) -> &str {
        match self {
            ValueKind::Int16 => "Int16",
            ValueKind::Int32 => "Int32",
            ValueKind::Int64 => "Int64",
            ValueKind::Text => "Text",
            ValueKind::Boolean => "Boolean",
            ValueKind::Date => "Date",
            ValueKind::Double => "Double",
            ValueKind::Decimal => "Decimal",
            ValueKind::Other(name) => name,
        }
    }
}

/// 水平方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlignment {
    General,
    #[default]
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterSelection,
    Distributed,
}

/// 垂直方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
    Justify,
    Distributed,
}

/// 罫線の種類
///
/// 並び順はBIFF8の罫線コード（0〜13）と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

/// 下線の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontUnderline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

/// 塗りつぶしパターン
///
/// 並び順はBIFF8の`fls`コード（0〜18）と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPattern {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

/// 標準パレットの色
///
/// 各色はBIFF8のパレットインデックスとRGB値を持ちます。
/// Legacy形式ではインデックスを、Modern形式ではRGB値を使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexedColor {
    Black,
    White,
    Red,
    BrightGreen,
    Blue,
    Yellow,
    Pink,
    Turquoise,
    DarkRed,
    Green,
    DarkBlue,
    DarkYellow,
    Violet,
    Teal,
    Grey25Percent,
    Grey50Percent,
    CornflowerBlue,
    SkyBlue,
    LightTurquoise,
    LightGreen,
    LightYellow,
    PaleBlue,
    Rose,
    Lavender,
    Tan,
    LightBlue,
    Aqua,
    Lime,
    Gold,
    LightOrange,
    Orange,
    Grey40Percent,
    SeaGreen,
    Grey80Percent,
}

impl IndexedColor {
    /// BIFF8パレットインデックス
    pub fn index(self) -> u16 {
        self.entry().0
    }

    /// RGB値（0xRRGGBB）
    pub fn rgb(self) -> u32 {
        self.entry().1
    }

    fn entry(self) -> (u16, u32) {
        match self {
            IndexedColor::Black => (8, 0x000000),
            IndexedColor::White => (9, 0xFFFFFF),
            IndexedColor::Red => (10, 0xFF0000),
            IndexedColor::BrightGreen => (11, 0x00FF00),
            IndexedColor::Blue => (12, 0x0000FF),
            IndexedColor::Yellow => (13, 0xFFFF00),
            IndexedColor::Pink => (14, 0xFF00FF),
            IndexedColor::Turquoise => (15, 0x00FFFF),
            IndexedColor::DarkRed => (16, 0x800000),
            IndexedColor::Green => (17, 0x008000),
            IndexedColor::DarkBlue => (18, 0x000080),
            IndexedColor::DarkYellow => (19, 0x808000),
            IndexedColor::Violet => (20, 0x800080),
            IndexedColor::Teal => (21, 0x008080),
            IndexedColor::Grey25Percent => (22, 0xC0C0C0),
            IndexedColor::Grey50Percent => (23, 0x808080),
            IndexedColor::CornflowerBlue => (24, 0x9999FF),
            IndexedColor::SkyBlue => (40, 0x00CCFF),
            IndexedColor::LightTurquoise => (41, 0xCCFFFF),
            IndexedColor::LightGreen => (42, 0xCCFFCC),
            IndexedColor::LightYellow => (43, 0xFFFF99),
            IndexedColor::PaleBlue => (44, 0x99CCFF),
            IndexedColor::Rose => (45, 0xFF99CC),
            IndexedColor::Lavender => (46, 0xCC99FF),
            IndexedColor::Tan => (47, 0xFFCC99),
            IndexedColor::LightBlue => (48, 0x3366FF),
            IndexedColor::Aqua => (49, 0x33CCCC),
            IndexedColor::Lime => (50, 0x99CC00),
            IndexedColor::Gold => (51, 0xFFCC00),
            IndexedColor::LightOrange => (52, 0xFF9900),
            IndexedColor::Orange => (53, 0xFF6600),
            IndexedColor::Grey40Percent => (55, 0x969696),
            IndexedColor::SeaGreen => (57, 0x339966),
            IndexedColor::Grey80Percent => (63, 0x333333),
        }
    }
}

/// 分割ペインのアクティブ位置
///
/// 並び順はBIFF8 PANEレコードの`pnnAcct`と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanePosition {
    LowerRight,
    UpperRight,
    LowerLeft,
    #[default]
    UpperLeft,
}

impl PanePosition {
    /// OOXMLの`activePane`属性値
    pub fn ooxml_name(self) -> &'static str {
        match self {
            PanePosition::LowerRight => "bottomRight",
            PanePosition::UpperRight => "topRight",
            PanePosition::LowerLeft => "bottomLeft",
            PanePosition::UpperLeft => "topLeft",
        }
    }
}
