//! 記録ストア（SQLite）
//!
//! 操作ごとに接続を開き、1文だけ実行して閉じる。
//! 失敗はログに残してから呼び出し元へ返す。

mod models;

pub use models::{AnalysisRequest, CalorieEntry, DailyTotal, DATE_FORMAT, TIMESTAMP_FORMAT};

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use tracing::{debug, error, info};

use crate::error::{CalorieAiError, Result};
use models::{parse_date, parse_timestamp};

const SCHEMA: &str = include_str!("schema.sql");

/// ログ用に先頭だけ切り出す
fn preview(text: &str) -> String {
    text.chars().take(30).collect()
}

fn row_to_analysis_request(row: &Row) -> Result<AnalysisRequest> {
    let timestamp: String = row.get("timestamp")?;
    Ok(AnalysisRequest {
        id: row.get("id")?,
        prompt: row.get("prompt")?,
        response: row.get("response")?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
    })
}

fn row_to_calorie_entry(row: &Row) -> Result<CalorieEntry> {
    let date: String = row.get("date")?;
    let timestamp: String = row.get("timestamp")?;
    Ok(CalorieEntry {
        id: row.get("id")?,
        food_name: row.get("food_name")?,
        calories: row.get("calories")?,
        date: parse_date(&date, "date")?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
    })
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// ストアを開き、テーブルを用意する（失敗は起動時の致命的エラー）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        store.initialize()?;
        info!(path = %store.path.display(), "record store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 接続を開いてタスクを実行し、スコープを抜けたら必ず閉じる
    fn with_connection<T, F>(&self, operation: &'static str, task: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let result = Connection::open(&self.path)
            .map_err(CalorieAiError::from)
            .and_then(|conn| task(&conn));

        if let Err(err) = &result {
            error!(operation, path = %self.path.display(), error = %err, "store operation failed");
        }
        result
    }

    /// 2テーブルを作成（既にあれば何もしない）
    pub fn initialize(&self) -> Result<()> {
        self.with_connection("initialize", |conn| {
            conn.execute_batch(SCHEMA)?;
            info!("tables ready (gpt_requests, calories)");
            Ok(())
        })
    }

    pub fn create_analysis_request(
        &self,
        image: &[u8],
        prompt: &str,
        response: Option<&str>,
    ) -> Result<i64> {
        self.with_connection("create_analysis_request", |conn| {
            conn.execute(
                "INSERT INTO gpt_requests (image, prompt, response) VALUES (?1, ?2, ?3)",
                params![image, prompt, response],
            )?;
            let id = conn.last_insert_rowid();
            info!(
                id,
                prompt = %preview(prompt),
                response = %response.map(preview).unwrap_or_default(),
                "gpt_requests row inserted"
            );
            Ok(id)
        })
    }

    /// 新しい順（id降順）
    pub fn list_analysis_requests(&self) -> Result<Vec<AnalysisRequest>> {
        self.with_connection("list_analysis_requests", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, prompt, response, timestamp FROM gpt_requests ORDER BY id DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut requests = Vec::new();
            while let Some(row) = rows.next()? {
                requests.push(row_to_analysis_request(row)?);
            }
            info!(rows = requests.len(), "gpt_requests loaded");
            Ok(requests)
        })
    }

    pub fn create_calorie_entry(&self, food_name: &str, calories: i64, date: NaiveDate) -> Result<i64> {
        self.with_connection("create_calorie_entry", |conn| {
            let date_text = date.format(DATE_FORMAT).to_string();
            conn.execute(
                "INSERT INTO calories (food_name, calories, date) VALUES (?1, ?2, ?3)",
                params![food_name, calories, date_text],
            )?;
            let id = conn.last_insert_rowid();
            info!(id, food_name, calories, date = %date_text, "calories row inserted");
            Ok(id)
        })
    }

    /// 複数行を1トランザクションで追加。途中で失敗したら1行も残さない
    pub fn create_calorie_entries(&self, entries: &[(String, i64)], date: NaiveDate) -> Result<Vec<i64>> {
        self.with_connection("create_calorie_entries", |conn| {
            let date_text = date.format(DATE_FORMAT).to_string();
            let tx = conn.unchecked_transaction()?;
            let mut ids = Vec::with_capacity(entries.len());
            {
                let mut stmt =
                    tx.prepare("INSERT INTO calories (food_name, calories, date) VALUES (?1, ?2, ?3)")?;
                for (food_name, calories) in entries {
                    stmt.execute(params![food_name, calories, date_text])?;
                    ids.push(tx.last_insert_rowid());
                    debug!(food_name = %food_name, calories, "calories row staged");
                }
            }
            tx.commit()?;
            info!(rows = ids.len(), date = %date_text, "calories rows inserted");
            Ok(ids)
        })
    }

    /// 新しい順（id降順）
    pub fn list_calorie_entries(&self) -> Result<Vec<CalorieEntry>> {
        self.with_connection("list_calorie_entries", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, food_name, calories, date, timestamp FROM calories ORDER BY id DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_calorie_entry(row)?);
            }
            info!(rows = entries.len(), "calories loaded");
            Ok(entries)
        })
    }

    /// 該当行を削除。存在しないidは何もせず `Ok(false)`
    pub fn delete_calorie_entry(&self, id: i64) -> Result<bool> {
        self.with_connection("delete_calorie_entry", |conn| {
            let affected = conn.execute("DELETE FROM calories WHERE id = ?1", params![id])?;
            if affected == 0 {
                debug!(id, "no calories row to delete");
            } else {
                info!(id, "calories row deleted");
            }
            Ok(affected > 0)
        })
    }

    /// 日付ごとの合計（日付昇順）
    pub fn sum_calories_by_date(&self) -> Result<Vec<DailyTotal>> {
        self.with_connection("sum_calories_by_date", |conn| {
            let mut stmt = conn.prepare(
                "SELECT date, SUM(calories) FROM calories GROUP BY date ORDER BY date",
            )?;
            let mut rows = stmt.query([])?;
            let mut totals = Vec::new();
            while let Some(row) = rows.next()? {
                let date: String = row.get(0)?;
                let total: Option<i64> = row.get(1)?;
                totals.push(DailyTotal {
                    date: parse_date(&date, "date")?,
                    total: total.unwrap_or(0),
                });
            }
            info!(days = totals.len(), "daily calorie totals loaded");
            Ok(totals)
        })
    }
}
