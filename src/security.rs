//! Security Module
//!
//! 読み込み時のリソース制限を実装するモジュール。
//! 巨大な入力ファイルやシート数の多いワークブックによるメモリ枯渇を防ぎます。

use std::io::Read;

use crate::error::{Result, XlsBridgeError};

/// セキュリティ設定
///
/// ファイル読み込み時のリソース制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
    /// ワークブック内の最大シート数
    /// デフォルト: 1024
    pub max_sheet_count: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
            max_sheet_count: 1024,
        }
    }
}

impl SecurityConfig {
    /// デフォルトのセキュリティ設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力サイズの上限を設定
    pub fn with_max_input_file_size(mut self, bytes: u64) -> Self {
        self.max_input_file_size = bytes;
        self
    }

    /// シート数の上限を設定
    pub fn with_max_sheet_count(mut self, count: usize) -> Self {
        self.max_sheet_count = count;
        self
    }

    /// 上限までリーダーを読み込む
    ///
    /// 上限を1バイトでも超えた時点で読み込みを打ち切ります。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<u8>)` - 読み込んだバイト列
    /// * `Err(XlsBridgeError::SecurityViolation)` - 入力が上限を超えた場合
    pub(crate) fn read_limited<R: Read>(&self, reader: R) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(self.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(XlsBridgeError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                self.max_input_file_size
            )));
        }
        Ok(buffer)
    }

    /// シート数を検証する
    pub(crate) fn check_sheet_count(&self, count: usize) -> Result<()> {
        if count > self.max_sheet_count {
            return Err(XlsBridgeError::SecurityViolation(format!(
                "Sheet count exceeds maximum: {} (max: {})",
                count, self.max_sheet_count
            )));
        }
        Ok(())
    }
}
