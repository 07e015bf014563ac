//! 要求・応答履歴の一覧

use tracing::{info, warn};

use crate::error::Result;
use crate::store::{AnalysisRequest, RecordStore, TIMESTAMP_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryColumn {
    Id,
    Prompt,
    Response,
    Timestamp,
}

impl HistoryColumn {
    pub const ALL: [HistoryColumn; 4] = [
        HistoryColumn::Id,
        HistoryColumn::Prompt,
        HistoryColumn::Response,
        HistoryColumn::Timestamp,
    ];

    pub fn title(self) -> &'static str {
        match self {
            HistoryColumn::Id => "ID",
            HistoryColumn::Prompt => "Prompt",
            HistoryColumn::Response => "Response",
            HistoryColumn::Timestamp => "Timestamp",
        }
    }
}

/// 文字数で切り詰め、切った場合は末尾に `…` を付ける
pub fn truncated(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[derive(Debug, Default)]
pub struct HistoryView {
    rows: Vec<AnalysisRequest>,
    selected: Option<(usize, HistoryColumn)>,
}

impl HistoryView {
    /// 一覧を再読込。失敗時は以前の内容を残してエラーを返す
    pub fn refresh(&mut self, store: &RecordStore) -> Result<usize> {
        match store.list_analysis_requests() {
            Ok(rows) => {
                info!(rows = rows.len(), "history loaded");
                self.rows = rows;
                self.selected = None;
                Ok(self.rows.len())
            }
            Err(err) => {
                warn!(error = %err, "history refresh failed; keeping previous rows");
                Err(err)
            }
        }
    }

    pub fn rows(&self) -> &[AnalysisRequest] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// セルの全文（応答が NULL なら空文字）
    pub fn cell_text(&self, row: usize, column: HistoryColumn) -> Option<String> {
        let request = self.rows.get(row)?;
        Some(match column {
            HistoryColumn::Id => request.id.to_string(),
            HistoryColumn::Prompt => request.prompt.clone(),
            HistoryColumn::Response => request.response.clone().unwrap_or_default(),
            HistoryColumn::Timestamp => request.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    /// セルを選択して全文を返す（詳細表示とクリップボード用）
    pub fn select_cell(&mut self, row: usize, column: HistoryColumn) -> Option<String> {
        let text = self.cell_text(row, column)?;
        self.selected = Some((row, column));
        info!(row, column = column.title(), "history cell selected");
        Some(text)
    }

    pub fn selected(&self) -> Option<(usize, HistoryColumn)> {
        self.selected
    }

    /// 選択中セルの全文
    pub fn detail_text(&self) -> String {
        self.selected
            .and_then(|(row, column)| self.cell_text(row, column))
            .unwrap_or_default()
    }
}
