//! Row Sequencer Module
//!
//! 追記型の書き込みで使用する、シート名ごとの行インデックス割り当て。

use std::collections::HashMap;

/// シート名ごとの次の空き行インデックス
///
/// 各シートのインデックスは0から始まり、`next_index`の呼び出しごとに1ずつ増えます。
/// シート同士は互いに独立しています。
#[derive(Debug, Default, Clone)]
pub struct RowSequencer {
    next: HashMap<String, u32>,
}

impl RowSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の行インデックスを割り当てる
    ///
    /// 割り当てたインデックスは、行の作成に失敗しても再利用されません。
    pub fn next_index(&mut self, sheet: &str) -> u32 {
        let counter = self.next.entry(sheet.to_string()).or_insert(0);
        let index = *counter;
        *counter = counter.saturating_add(1);
        index
    }

    /// 次に割り当てられるインデックス（割り当ては行わない）
    pub fn peek(&self, sheet: &str) -> u32 {
        self.next.get(sheet).copied().unwrap_or(0)
    }

    /// すべてのシートのカウンターを破棄する
    pub fn reset(&mut self) {
        self.next.clear();
    }
}
