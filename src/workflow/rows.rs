//! 未保存の編集行
//!
//! 各行は作成時に採番される `RowId` を持ち、削除は位置ではなくIDで行う。

/// 編集行の識別子（作成順に単調増加、再利用しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

/// 食品名とカロリー値の組（どちらも入力途中のテキスト）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableRow {
    pub id: RowId,
    pub food_name: String,
    pub calories: String,
}

#[derive(Debug, Default)]
pub struct EditableRows {
    rows: Vec<EditableRow>,
    next_id: u64,
}

impl EditableRows {
    pub fn push(&mut self, food_name: impl Into<String>, calories: impl Into<String>) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(EditableRow {
            id,
            food_name: food_name.into(),
            calories: calories.into(),
        });
        id
    }

    pub fn remove(&mut self, id: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn get(&self, id: RowId) -> Option<&EditableRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn as_slice(&self) -> &[EditableRow] {
        &self.rows
    }

    pub fn as_mut_slice(&mut self) -> &mut [EditableRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
