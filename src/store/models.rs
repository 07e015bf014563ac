use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{CalorieAiError, Result};

/// SQLite の CURRENT_TIMESTAMP 形式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 記述サービスへの要求1件（画像本体は一覧では返さない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub id: i64,
    pub prompt: String,
    pub response: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// 保存済みのカロリー記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalorieEntry {
    pub id: i64,
    pub food_name: String,
    pub calories: i64,
    pub date: NaiveDate,
    pub timestamp: NaiveDateTime,
}

/// 日付ごとのカロリー合計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: i64,
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|err| CalorieAiError::CorruptRow(format!("invalid {column} '{value}': {err}")))
}

pub(crate) fn parse_date(value: &str, column: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|err| CalorieAiError::CorruptRow(format!("invalid {column} '{value}': {err}")))
}
