//! Sheet Model
//!
//! シート・行と、シート単位のレイアウト情報（結合範囲、ペイン、保護、列幅）。

use std::collections::BTreeMap;

use crate::api::PanePosition;
use crate::error::{Result, XlsBridgeError};
use crate::model::cell::Cell;
use crate::types::{CellCoord, CellRange};

/// 行
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: u32,
    height: Option<f64>,
    cells: BTreeMap<u16, Cell>,
}

impl Row {
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            height: None,
            cells: BTreeMap::new(),
        }
    }

    /// 0始まりの行インデックス
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 行の高さ（ポイント）。未設定なら既定の高さ
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    pub fn cell(&self, column: u16) -> Option<&Cell> {
        self.cells.get(&column)
    }

    pub fn cell_mut(&mut self, column: u16) -> Option<&mut Cell> {
        self.cells.get_mut(&column)
    }

    /// 列順のセル
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// セルを設定する（同じ列の既存セルは置き換えられる）
    pub fn set_cell(&mut self, cell: Cell) {
        self.cells.insert(cell.column, cell);
    }

    pub fn remove_cell(&mut self, column: u16) -> Option<Cell> {
        self.cells.remove(&column)
    }

    /// 最後のセルの列インデックス + 1（セルがなければ0）
    pub fn cell_count(&self) -> usize {
        self.last_column().map_or(0, |c| usize::from(c) + 1)
    }

    /// 実際に存在するセルの数
    pub fn physical_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn last_column(&self) -> Option<u16> {
        self.cells.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn shift_columns(&mut self, at: u16, count: u16, insert: bool) {
        let cells = std::mem::take(&mut self.cells);
        for (column, mut cell) in cells {
            let target = if column < at {
                Some(column)
            } else if insert {
                column.checked_add(count)
            } else if column < at.saturating_add(count) {
                None
            } else {
                Some(column - count)
            };
            if let Some(target) = target {
                cell.column = target;
                self.cells.insert(target, cell);
            }
        }
    }
}

/// ウィンドウ枠
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pane {
    /// 固定ペイン（列・行の数で分割）
    Freeze {
        col_split: u16,
        row_split: u32,
        /// 右側ペインの左端に表示する列
        leftmost_column: u16,
        /// 下側ペインの上端に表示する行
        top_row: u32,
    },
    /// 分割ペイン（位置はtwip単位 = 1/20ポイント）
    Split {
        x_split_pos: u32,
        y_split_pos: u32,
        leftmost_column: u16,
        top_row: u32,
        active_pane: PanePosition,
    },
}

/// シート保護
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protection {
    pub password: String,
}

/// シート
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
    merged: Vec<CellRange>,
    pane: Option<Pane>,
    protection: Option<Protection>,
    column_widths: BTreeMap<u16, f64>,
}

impl Sheet {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
            merged: Vec::new(),
            pane: None,
            protection: None,
            column_widths: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 行インデックス順の行
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    pub fn row_mut(&mut self, index: u32) -> Option<&mut Row> {
        self.rows.get_mut(&index)
    }

    /// 指定したインデックスに新しい行を作成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(&mut Row)` - 作成された行
    /// * `Err(XlsBridgeError::RowExists)` - 同じインデックスの行が既に存在する場合
    pub fn create_row(&mut self, index: u32) -> Result<&mut Row> {
        match self.rows.entry(index) {
            std::collections::btree_map::Entry::Occupied(_) => Err(XlsBridgeError::RowExists {
                sheet: self.name.clone(),
                row: index,
            }),
            std::collections::btree_map::Entry::Vacant(slot) => Ok(slot.insert(Row::new(index))),
        }
    }

    /// 行を取得し、存在しなければ作成する
    pub(crate) fn row_or_create(&mut self, index: u32) -> &mut Row {
        self.rows.entry(index).or_insert_with(|| Row::new(index))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// 全行のうち、実際に存在するセル数の最大値
    pub fn max_physical_cell_count(&self) -> usize {
        self.rows
            .values()
            .map(Row::physical_cell_count)
            .max()
            .unwrap_or(0)
    }

    /// 結合範囲を追加する
    ///
    /// 単一セルの範囲と、既存の結合範囲と重なる範囲は拒否されます。
    pub fn add_merged_region(&mut self, range: CellRange) -> Result<()> {
        if range.is_single_cell() {
            return Err(XlsBridgeError::UnsupportedOperation(format!(
                "cannot merge a single cell in sheet '{}'",
                self.name
            )));
        }
        if let Some(existing) = self.merged.iter().find(|m| m.overlaps(&range)) {
            return Err(XlsBridgeError::UnsupportedOperation(format!(
                "merged region {:?}..{:?} overlaps {:?}..{:?} in sheet '{}'",
                range.start, range.end, existing.start, existing.end, self.name
            )));
        }
        self.merged.push(range);
        Ok(())
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    pub fn pane(&self) -> Option<&Pane> {
        self.pane.as_ref()
    }

    pub(crate) fn set_pane(&mut self, pane: Pane) {
        self.pane = Some(pane);
    }

    pub fn protection(&self) -> Option<&Protection> {
        self.protection.as_ref()
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_some()
    }

    pub(crate) fn protect(&mut self, password: &str) {
        self.protection = Some(Protection {
            password: password.to_string(),
        });
    }

    /// 列幅（文字数単位）を設定する
    pub fn set_column_width(&mut self, column: u16, width: f64) {
        self.column_widths.insert(column, width);
    }

    pub fn column_width(&self, column: u16) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }

    /// 列順の`(列, 幅)`
    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }

    fn ensure_unprotected(&self) -> Result<()> {
        if self.is_protected() {
            return Err(XlsBridgeError::SheetProtected(self.name.clone()));
        }
        Ok(())
    }

    /// `at`の位置に`count`行を挿入し、以降の行を下にずらす
    pub fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.ensure_unprotected()?;
        let rows = std::mem::take(&mut self.rows);
        for (index, mut row) in rows {
            let target = if index < at {
                index
            } else {
                index.saturating_add(count)
            };
            row.index = target;
            self.rows.insert(target, row);
        }
        for range in &mut self.merged {
            if range.start.row >= at {
                range.start.row = range.start.row.saturating_add(count);
            }
            if range.end.row >= at {
                range.end.row = range.end.row.saturating_add(count);
            }
        }
        Ok(())
    }

    /// `at`から`count`行を削除し、以降の行を上に詰める
    ///
    /// 削除範囲にかかる結合範囲は破棄されます。
    pub fn delete_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.ensure_unprotected()?;
        let end = at.saturating_add(count);
        let rows = std::mem::take(&mut self.rows);
        for (index, mut row) in rows {
            if index < at {
                self.rows.insert(index, row);
            } else if index >= end {
                row.index = index - count;
                self.rows.insert(row.index, row);
            }
        }
        self.merged
            .retain(|range| range.end.row < at || range.start.row >= end);
        for range in &mut self.merged {
            if range.start.row >= end {
                range.start.row -= count;
                range.end.row -= count;
            }
        }
        Ok(())
    }

    /// `at`の位置に`count`列を挿入し、以降の列を右にずらす
    pub fn insert_columns(&mut self, at: u16, count: u16) -> Result<()> {
        self.ensure_unprotected()?;
        for row in self.rows.values_mut() {
            row.shift_columns(at, count, true);
        }
        let widths = std::mem::take(&mut self.column_widths);
        for (column, width) in widths {
            let target = if column < at {
                Some(column)
            } else {
                column.checked_add(count)
            };
            if let Some(target) = target {
                self.column_widths.insert(target, width);
            }
        }
        for range in &mut self.merged {
            if range.start.col >= at {
                range.start.col = range.start.col.saturating_add(count);
            }
            if range.end.col >= at {
                range.end.col = range.end.col.saturating_add(count);
            }
        }
        Ok(())
    }

    /// `at`から`count`列を削除し、以降の列を左に詰める
    pub fn delete_columns(&mut self, at: u16, count: u16) -> Result<()> {
        self.ensure_unprotected()?;
        let end = at.saturating_add(count);
        for row in self.rows.values_mut() {
            row.shift_columns(at, count, false);
        }
        let widths = std::mem::take(&mut self.column_widths);
        for (column, width) in widths {
            if column < at {
                self.column_widths.insert(column, width);
            } else if column >= end {
                self.column_widths.insert(column - count, width);
            }
        }
        self.merged
            .retain(|range| range.end.col < at || range.start.col >= end);
        for range in &mut self.merged {
            if range.start.col >= end {
                range.start.col -= count;
                range.end.col -= count;
            }
        }
        Ok(())
    }

    /// 座標のセルを含む結合範囲
    pub fn merged_region_at(&self, coord: CellCoord) -> Option<&CellRange> {
        self.merged.iter().find(|range| range.contains(coord))
    }
}
