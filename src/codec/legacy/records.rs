//! BIFF8 Record Writer
//!
//! BIFF8のレコード（2バイトの種別 + 2バイトの長さ + データ）をバッファに書き込む。
//! 1レコードのデータ長は8224バイトが上限で、超える場合はCONTINUEレコードに分割する。

use crate::error::{Result, XlsBridgeError};

/// 1レコードのデータ長の上限
pub(super) const MAX_RECORD_DATA: usize = 8224;

/// MERGEDCELLSレコード1件に格納できる範囲の数
const MAX_MERGED_RANGES: usize = 1027;

/// セル文字列の最大文字数
pub(super) const MAX_TEXT_CHARS: usize = 32_767;

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const CODEPAGE: u16 = 0x0042;
const DATE1904: u16 = 0x0022;
const WINDOW1: u16 = 0x003D;
const FONT: u16 = 0x0031;
const FORMAT: u16 = 0x041E;
const XF: u16 = 0x00E0;
const STYLE: u16 = 0x0293;
const BOUNDSHEET: u16 = 0x0085;
const SST: u16 = 0x00FC;
const CONTINUE: u16 = 0x003C;
const WSBOOL: u16 = 0x0081;
const COLINFO: u16 = 0x007D;
const DIMENSIONS: u16 = 0x0200;
const ROW: u16 = 0x0208;
const NUMBER: u16 = 0x0203;
const LABELSST: u16 = 0x00FD;
const BOOLERR: u16 = 0x0205;
const BLANK: u16 = 0x0201;
const FORMULA: u16 = 0x0006;
const STRING: u16 = 0x0207;
const WINDOW2: u16 = 0x023E;
const PANE: u16 = 0x0041;
const MERGEDCELLS: u16 = 0x00E5;

/// BOFレコードのサブストリーム種別
pub(super) const SUBSTREAM_WORKBOOK: u16 = 0x0005;
pub(super) const SUBSTREAM_WORKSHEET: u16 = 0x0010;

/// 文字列を圧縮形式（Latin-1）またはUTF-16LEで符号化する
///
/// # 戻り値
///
/// `(文字数, オプションフラグ, 文字データ)`
fn encode_chars(text: &str) -> (usize, u8, Vec<u8>) {
    if text.chars().all(|c| u32::from(c) <= 0xFF) {
        let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
        (bytes.len(), 0x00, bytes)
    } else {
        let units: Vec<u16> = text.encode_utf16().collect();
        let bytes = units.iter().flat_map(|u| u.to_le_bytes()).collect();
        (units.len(), 0x01, bytes)
    }
}

fn too_long(what: &str, text: &str) -> XlsBridgeError {
    XlsBridgeError::Save(format!(
        "{} is too long for a BIFF8 record: {} characters",
        what,
        text.chars().count()
    ))
}

/// 1バイトの文字数を持つ文字列（ShortXLUnicodeString）
fn short_unicode_string(text: &str, what: &str) -> Result<Vec<u8>> {
    let (cch, flags, chars) = encode_chars(text);
    let cch = u8::try_from(cch).map_err(|_| too_long(what, text))?;
    let mut data = Vec::with_capacity(chars.len() + 2);
    data.push(cch);
    data.push(flags);
    data.extend_from_slice(&chars);
    Ok(data)
}

/// 2バイトの文字数を持つ文字列（XLUnicodeString）
fn unicode_string(text: &str, what: &str) -> Result<Vec<u8>> {
    let (cch, flags, chars) = encode_chars(text);
    let cch = u16::try_from(cch).map_err(|_| too_long(what, text))?;
    let mut data = Vec::with_capacity(chars.len() + 3);
    data.extend_from_slice(&cch.to_le_bytes());
    data.push(flags);
    data.extend_from_slice(&chars);
    Ok(data)
}

fn row_u16(row: u32) -> Result<u16> {
    u16::try_from(row).map_err(|_| {
        XlsBridgeError::Save(format!("row index {} exceeds the BIFF8 limit of 65535", row))
    })
}

/// FONTレコードの内容
#[derive(Debug, Clone, PartialEq)]
pub(super) struct FontRecord {
    pub name: String,
    /// 高さ（twip）
    pub height: u16,
    pub italic: bool,
    pub bold: bool,
    /// 下線種別（0: なし, 1: 一重, 2: 二重, 0x21: 会計一重, 0x22: 会計二重）
    pub underline: u8,
    pub color_index: u16,
}

/// XFレコードの内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct XfRecord {
    pub font_index: u16,
    pub format_index: u16,
    pub is_style: bool,
    pub horizontal: u8,
    pub vertical: u8,
    /// 罫線種別（左, 右, 上, 下）
    pub borders: [u8; 4],
    pub fill_pattern: u8,
    pub fill_foreground: u16,
    pub fill_background: u16,
}

/// 数式の計算結果
#[derive(Debug, Clone, PartialEq)]
pub(super) enum FormulaResult {
    Number(f64),
    /// 文字列結果（直後にSTRINGレコードが続く）
    Text,
    Boolean(bool),
    Error(u8),
    Empty,
}

/// 行レコードの内容
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct RowRecord {
    pub index: u32,
    pub first_column: u16,
    /// 最後の列 + 1
    pub last_column: u16,
    /// 高さ（twip）。`None`は既定の高さ
    pub height: Option<u16>,
}

/// BIFF8レコードの書き込みバッファ
#[derive(Debug, Default)]
pub(super) struct BiffWriter {
    buf: Vec<u8>,
}

impl BiffWriter {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// 現在のストリーム位置
    pub(super) fn position(&self) -> usize {
        self.buf.len()
    }

    pub(super) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// 既に書き込んだ位置の4バイト値を書き換える
    pub(super) fn patch_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        let target = self.buf.get_mut(offset..offset + 4).ok_or_else(|| {
            XlsBridgeError::Save(format!("patch offset {} is outside the stream", offset))
        })?;
        target.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn record(&mut self, id: u16, data: &[u8]) -> Result<()> {
        if data.len() > MAX_RECORD_DATA {
            return Err(XlsBridgeError::Save(format!(
                "record 0x{:04X} exceeds {} bytes ({} bytes)",
                id,
                MAX_RECORD_DATA,
                data.len()
            )));
        }
        self.buf.extend_from_slice(&id.to_le_bytes());
        self.buf.extend_from_slice(&(data.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub(super) fn bof(&mut self, substream: u16) -> Result<()> {
        let mut data = Vec::with_capacity(16);
        data.extend_from_slice(&0x0600u16.to_le_bytes()); // BIFF8
        data.extend_from_slice(&substream.to_le_bytes());
        data.extend_from_slice(&0x0DBBu16.to_le_bytes()); // build
        data.extend_from_slice(&0x07CCu16.to_le_bytes()); // year
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x0006u32.to_le_bytes());
        self.record(BOF, &data)
    }

    pub(super) fn eof(&mut self) -> Result<()> {
        self.record(EOF, &[])
    }

    pub(super) fn codepage(&mut self, codepage: u16) -> Result<()> {
        self.record(CODEPAGE, &codepage.to_le_bytes())
    }

    pub(super) fn date1904(&mut self, enabled: bool) -> Result<()> {
        self.record(DATE1904, &u16::from(enabled).to_le_bytes())
    }

    pub(super) fn window1(&mut self) -> Result<()> {
        let fields: [u16; 9] = [0, 0, 0x3000, 0x1E00, 0x0038, 0, 0, 1, 0x0258];
        let data: Vec<u8> = fields.iter().flat_map(|f| f.to_le_bytes()).collect();
        self.record(WINDOW1, &data)
    }

    pub(super) fn font(&mut self, font: &FontRecord) -> Result<()> {
        let mut data = Vec::with_capacity(16 + font.name.len() * 2);
        data.extend_from_slice(&font.height.to_le_bytes());
        let flags: u16 = if font.italic { 0x0002 } else { 0 };
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&font.color_index.to_le_bytes());
        let weight: u16 = if font.bold { 700 } else { 400 };
        data.extend_from_slice(&weight.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes()); // escapement
        data.push(font.underline);
        data.extend_from_slice(&[0, 0, 0]); // family, charset, reserved
        data.extend_from_slice(&short_unicode_string(&font.name, "font name")?);
        self.record(FONT, &data)
    }

    pub(super) fn format(&mut self, id: u16, code: &str) -> Result<()> {
        let mut data = id.to_le_bytes().to_vec();
        data.extend_from_slice(&unicode_string(code, "number format")?);
        self.record(FORMAT, &data)
    }

    pub(super) fn xf(&mut self, xf: &XfRecord) -> Result<()> {
        let mut data = Vec::with_capacity(20);
        data.extend_from_slice(&xf.font_index.to_le_bytes());
        data.extend_from_slice(&xf.format_index.to_le_bytes());
        // 種別と保護（スタイルXFは親なし、セルXFは親スタイル0）
        let kind: u16 = if xf.is_style { 0xFFF5 } else { 0x0001 };
        data.extend_from_slice(&kind.to_le_bytes());
        data.push((xf.horizontal & 0x07) | ((xf.vertical & 0x07) << 4));
        data.push(0); // rotation
        data.push(0); // indent
        // セルXFではすべての属性を親から上書きする
        data.push(if xf.is_style { 0 } else { 0xFC });

        let [left, right, top, bottom] = xf.borders.map(|b| u16::from(b & 0x0F));
        let border_styles = left | (right << 4) | (top << 8) | (bottom << 12);
        data.extend_from_slice(&border_styles.to_le_bytes());

        let color = |style: u16| -> u16 { if style == 0 { 0 } else { 0x08 } };
        let palette = color(left) | (color(right) << 7);
        data.extend_from_slice(&palette.to_le_bytes());
        let extra = u32::from(color(top))
            | (u32::from(color(bottom)) << 7)
            | (u32::from(xf.fill_pattern & 0x3F) << 26);
        data.extend_from_slice(&extra.to_le_bytes());

        let fill = (xf.fill_foreground & 0x7F) | ((xf.fill_background & 0x7F) << 7);
        data.extend_from_slice(&fill.to_le_bytes());
        self.record(XF, &data)
    }

    /// 組み込みスタイル（Normal）を登録するSTYLEレコード
    pub(super) fn builtin_style(&mut self, xf_index: u16, style_id: u8) -> Result<()> {
        let mut data = ((xf_index & 0x0FFF) | 0x8000).to_le_bytes().to_vec();
        data.push(style_id);
        data.push(0xFF);
        self.record(STYLE, &data)
    }

    /// BOUNDSHEETレコードを書き込む
    ///
    /// # 戻り値
    ///
    /// シートのBOF位置を後で書き込むためのオフセット
    pub(super) fn boundsheet(&mut self, name: &str) -> Result<usize> {
        let mut data = 0u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0u16.to_le_bytes()); // visible worksheet
        data.extend_from_slice(&short_unicode_string(name, "sheet name")?);
        let offset = self.position() + 4;
        self.record(BOUNDSHEET, &data)?;
        Ok(offset)
    }

    /// 共有文字列テーブルを書き込む（必要に応じてCONTINUEレコードに分割）
    ///
    /// 文字列の先頭（文字数とフラグ）はレコードをまたがない。文字データが
    /// CONTINUEレコードにまたがる場合、続きの先頭にフラグを1バイト書き込む。
    pub(super) fn sst(&mut self, strings: &[String], total: u32) -> Result<()> {
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut current = Vec::with_capacity(MAX_RECORD_DATA);
        current.extend_from_slice(&total.to_le_bytes());
        current.extend_from_slice(&(strings.len() as u32).to_le_bytes());

        for text in strings {
            let (cch, flags, chars) = encode_chars(text);
            let cch = u16::try_from(cch).map_err(|_| too_long("shared string", text))?;
            let char_size = if flags == 0 { 1 } else { 2 };

            if MAX_RECORD_DATA - current.len() < 3 + char_size {
                chunks.push(std::mem::take(&mut current));
            }
            current.extend_from_slice(&cch.to_le_bytes());
            current.push(flags);

            let mut rest: &[u8] = &chars;
            while !rest.is_empty() {
                let room = MAX_RECORD_DATA - current.len();
                // UTF-16の文字を分割しない
                let take = (room - room % char_size).min(rest.len());
                if take == 0 {
                    chunks.push(std::mem::take(&mut current));
                    current.push(flags);
                    continue;
                }
                current.extend_from_slice(&rest[..take]);
                rest = &rest[take..];
            }
        }
        chunks.push(current);

        for (i, chunk) in chunks.iter().enumerate() {
            self.record(if i == 0 { SST } else { CONTINUE }, chunk)?;
        }
        Ok(())
    }

    pub(super) fn wsbool(&mut self) -> Result<()> {
        self.record(WSBOOL, &0x04C1u16.to_le_bytes())
    }

    /// 列幅（1/256文字単位）
    pub(super) fn colinfo(&mut self, column: u16, width: u16) -> Result<()> {
        let fields: [u16; 6] = [column, column, width, 0x000F, 0, 0];
        let data: Vec<u8> = fields.iter().flat_map(|f| f.to_le_bytes()).collect();
        self.record(COLINFO, &data)
    }

    /// 使用範囲（終端はいずれも最後のインデックス + 1）
    pub(super) fn dimensions(
        &mut self,
        first_row: u32,
        last_row: u32,
        first_column: u16,
        last_column: u16,
    ) -> Result<()> {
        let mut data = Vec::with_capacity(14);
        data.extend_from_slice(&first_row.to_le_bytes());
        data.extend_from_slice(&last_row.to_le_bytes());
        data.extend_from_slice(&first_column.to_le_bytes());
        data.extend_from_slice(&last_column.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        self.record(DIMENSIONS, &data)
    }

    pub(super) fn row(&mut self, row: &RowRecord) -> Result<()> {
        let mut data = Vec::with_capacity(16);
        data.extend_from_slice(&row_u16(row.index)?.to_le_bytes());
        data.extend_from_slice(&row.first_column.to_le_bytes());
        data.extend_from_slice(&row.last_column.to_le_bytes());
        data.extend_from_slice(&row.height.unwrap_or(0x00FF).to_le_bytes());
        data.extend_from_slice(&[0, 0, 0, 0]);
        // 予約ビット8は常に1、独自の高さを持つ行はfUnsynced
        let flags: u16 = 0x0100 | if row.height.is_some() { 0x0040 } else { 0 };
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&0x000Fu16.to_le_bytes());
        self.record(ROW, &data)
    }

    fn cell_header(row: u32, column: u16, xf_index: u16) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(20);
        data.extend_from_slice(&row_u16(row)?.to_le_bytes());
        data.extend_from_slice(&column.to_le_bytes());
        data.extend_from_slice(&xf_index.to_le_bytes());
        Ok(data)
    }

    pub(super) fn number(&mut self, row: u32, column: u16, xf_index: u16, value: f64) -> Result<()> {
        let mut data = Self::cell_header(row, column, xf_index)?;
        data.extend_from_slice(&value.to_le_bytes());
        self.record(NUMBER, &data)
    }

    pub(super) fn label_sst(
        &mut self,
        row: u32,
        column: u16,
        xf_index: u16,
        sst_index: u32,
    ) -> Result<()> {
        let mut data = Self::cell_header(row, column, xf_index)?;
        data.extend_from_slice(&sst_index.to_le_bytes());
        self.record(LABELSST, &data)
    }

    /// 書式のみを持つ空白セル
    pub(super) fn blank(&mut self, row: u32, column: u16, xf_index: u16) -> Result<()> {
        let data = Self::cell_header(row, column, xf_index)?;
        self.record(BLANK, &data)
    }

    pub(super) fn boolean(&mut self, row: u32, column: u16, xf_index: u16, value: bool) -> Result<()> {
        let mut data = Self::cell_header(row, column, xf_index)?;
        data.extend_from_slice(&[u8::from(value), 0]);
        self.record(BOOLERR, &data)
    }

    pub(super) fn error(&mut self, row: u32, column: u16, xf_index: u16, code: u8) -> Result<()> {
        let mut data = Self::cell_header(row, column, xf_index)?;
        data.extend_from_slice(&[code, 1]);
        self.record(BOOLERR, &data)
    }

    /// 数式レコード（`tokens`は逆ポーランド順のPtg列）
    pub(super) fn formula(
        &mut self,
        row: u32,
        column: u16,
        xf_index: u16,
        result: &FormulaResult,
        tokens: &[u8],
    ) -> Result<()> {
        let mut data = Self::cell_header(row, column, xf_index)?;
        let special = |kind: u8, value: u8| [kind, 0, value, 0, 0, 0, 0xFF, 0xFF];
        let value = match result {
            FormulaResult::Number(n) => n.to_le_bytes(),
            FormulaResult::Text => special(0x00, 0),
            FormulaResult::Boolean(b) => special(0x01, u8::from(*b)),
            FormulaResult::Error(code) => special(0x02, *code),
            FormulaResult::Empty => special(0x03, 0),
        };
        data.extend_from_slice(&value);
        // 常に再計算させる
        data.extend_from_slice(&0x0003u16.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        let cce = u16::try_from(tokens.len()).map_err(|_| {
            XlsBridgeError::Save(format!("formula tokens exceed {} bytes", u16::MAX))
        })?;
        data.extend_from_slice(&cce.to_le_bytes());
        data.extend_from_slice(tokens);
        self.record(FORMULA, &data)
    }

    /// 直前の数式の文字列結果
    pub(super) fn string(&mut self, text: &str) -> Result<()> {
        self.record(STRING, &unicode_string(text, "formula result")?)
    }

    pub(super) fn window2(&mut self, frozen: bool, selected: bool) -> Result<()> {
        let mut flags: u16 = 0x00B6;
        if frozen {
            flags |= 0x0008 | 0x0100;
        }
        if selected {
            flags |= 0x0200 | 0x0400;
        }
        let fields: [u16; 9] = [flags, 0, 0, 0x0040, 0, 0, 0, 0, 0];
        let data: Vec<u8> = fields.iter().flat_map(|f| f.to_le_bytes()).collect();
        self.record(WINDOW2, &data)
    }

    /// ペイン（固定時は列数・行数、分割時はtwip単位の位置）
    pub(super) fn pane(
        &mut self,
        x: u16,
        y: u16,
        top_row: u32,
        leftmost_column: u16,
        active: u8,
    ) -> Result<()> {
        let mut data = Vec::with_capacity(10);
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data.extend_from_slice(&row_u16(top_row)?.to_le_bytes());
        data.extend_from_slice(&leftmost_column.to_le_bytes());
        data.push(active);
        data.push(0);
        self.record(PANE, &data)
    }

    /// 結合範囲（行・列の両端を含む）を1027件ずつ書き込む
    pub(super) fn merged_cells(&mut self, ranges: &[(u32, u32, u16, u16)]) -> Result<()> {
        for chunk in ranges.chunks(MAX_MERGED_RANGES) {
            let mut data = Vec::with_capacity(2 + chunk.len() * 8);
            data.extend_from_slice(&(chunk.len() as u16).to_le_bytes());
            for &(first_row, last_row, first_col, last_col) in chunk {
                data.extend_from_slice(&row_u16(first_row)?.to_le_bytes());
                data.extend_from_slice(&row_u16(last_row)?.to_le_bytes());
                data.extend_from_slice(&first_col.to_le_bytes());
                data.extend_from_slice(&last_col.to_le_bytes());
            }
            self.record(MERGEDCELLS, &data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(bytes: &[u8]) -> Vec<(u16, Vec<u8>)> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos + 4 <= bytes.len() {
            let id = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
            let len = u16::from_le_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
            out.push((id, bytes[pos + 4..pos + 4 + len].to_vec()));
            pos += 4 + len;
        }
        out
    }

    #[test]
    fn test_bof_layout() {
        let mut writer = BiffWriter::new();
        writer.bof(SUBSTREAM_WORKSHEET).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(&bytes[..4], &[0x09, 0x08, 16, 0]);
        assert_eq!(&bytes[4..8], &[0x00, 0x06, 0x10, 0x00]);
    }

    #[test]
    fn test_encode_latin1_and_utf16() {
        assert_eq!(encode_chars("abc"), (3, 0, b"abc".to_vec()));
        assert_eq!(encode_chars("é"), (1, 0, vec![0xE9]));
        let (cch, flags, bytes) = encode_chars("表");
        assert_eq!((cch, flags), (1, 1));
        assert_eq!(bytes, 0x8868u16.to_le_bytes().to_vec());
    }

    #[test]
    fn test_boundsheet_patch_offset() {
        let mut writer = BiffWriter::new();
        writer.eof().unwrap();
        let offset = writer.boundsheet("Data").unwrap();
        assert_eq!(offset, 8);
        writer.patch_u32(offset, 0x1234).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(&bytes[8..12], &0x1234u32.to_le_bytes());
        assert!(BiffWriter::new().patch_u32(0, 1).is_err());
    }

    #[test]
    fn test_sst_splits_into_continue_records() {
        let strings: Vec<String> = (0..3).map(|i| format!("{}", i).repeat(5000)).collect();
        let mut writer = BiffWriter::new();
        writer.sst(&strings, 3).unwrap();
        let recs = records(&writer.into_inner());

        assert_eq!(recs[0].0, SST);
        assert!(recs[1..].iter().all(|(id, _)| *id == CONTINUE));
        assert!(recs.iter().all(|(_, data)| data.len() <= MAX_RECORD_DATA));
        let payload: usize = recs.iter().map(|(_, data)| data.len()).sum();
        // 8バイトのヘッダ + 文字列ごとの3バイト + 文字データ + 継続フラグ
        assert_eq!(payload, 8 + 3 * (3 + 5000) + (recs.len() - 1));
    }

    #[test]
    fn test_sst_never_splits_utf16_characters() {
        let strings = vec!["x".repeat(8212), "表".repeat(10)];
        let mut writer = BiffWriter::new();
        writer.sst(&strings, 2).unwrap();
        let recs = records(&writer.into_inner());
        assert_eq!(recs.len(), 2);
        // 残り1バイトでは2バイト文字を書けないため、2つ目の文字列は継続レコードから始まる
        assert_eq!(recs[1].1[..3], [10, 0, 1]);
    }

    #[test]
    fn test_merged_cells_chunked() {
        let ranges: Vec<(u32, u32, u16, u16)> = (0..1030).map(|i| (i * 2, i * 2 + 1, 0, 1)).collect();
        let mut writer = BiffWriter::new();
        writer.merged_cells(&ranges).unwrap();
        let recs = records(&writer.into_inner());
        assert_eq!(recs.len(), 2);
        assert_eq!(u16::from_le_bytes([recs[0].1[0], recs[0].1[1]]), 1027);
        assert_eq!(u16::from_le_bytes([recs[1].1[0], recs[1].1[1]]), 3);
    }

    #[test]
    fn test_row_index_limit() {
        let mut writer = BiffWriter::new();
        assert!(writer.number(65_535, 0, 15, 1.0).is_ok());
        assert!(matches!(
            writer.number(65_536, 0, 15, 1.0),
            Err(XlsBridgeError::Save(_))
        ));
    }

    #[test]
    fn test_formula_string_result() {
        let mut writer = BiffWriter::new();
        writer
            .formula(0, 1, 15, &FormulaResult::Text, &[0x1E, 1, 0])
            .unwrap();
        let recs = records(&writer.into_inner());
        let data = &recs[0].1;
        assert_eq!(recs[0].0, FORMULA);
        assert_eq!(&data[6..14], &[0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
        assert_eq!(&data[20..22], &3u16.to_le_bytes());
    }
}
