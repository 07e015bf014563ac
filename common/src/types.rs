//! 解析結果の型定義
//!
//! 記述サービスが返すJSONの形:
//! - FoodReply: `{"output": [...]}` のトップレベル
//! - FoodItem: 食品名とカロリーの1組

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 記述サービスの応答本体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodReply {
    /// 検出された食品（食品写真でなければ空）
    pub output: Vec<FoodItem>,
}

/// 食品1件
///
/// `calories` はサービスによって文字列でも数値でも返るため、
/// 編集欄にそのまま入れられるよう常にテキストとして保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_name: String,

    #[serde(deserialize_with = "calories_as_text")]
    pub calories: String,
}

fn calories_as_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "calories must be a string or number, got {other}"
        ))),
    }
}
