//! 記述サービス応答パーサー
//!
//! 応答テキストからコードフェンスを取り除き、
//! `{"output": [...]}` 形式のJSONをパースする

use crate::error::{Error, Result};
use crate::types::FoodReply;

/// コードフェンス記号を除去
///
/// "```json" と "```" をすべて取り除き、前後の空白をトリムする。
///
/// # Examples
/// ```
/// use calorie_ai_common::strip_code_fences;
///
/// let reply = "```json\n{\"output\": []}\n```";
/// assert_eq!(strip_code_fences(reply), "{\"output\": []}");
/// ```
pub fn strip_code_fences(reply: &str) -> String {
    reply.replace("```json", "").replace("```", "").trim().to_string()
}

/// テキストから最も外側の `{...}` を抽出
///
/// # Returns
/// * `Ok(&str)` - 抽出されたJSONオブジェクト文字列
/// * `Err` - `{` と `}` の組が見つからない場合
pub fn extract_json_object(text: &str) -> Result<&str> {
    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end >= start {
                return Ok(&text[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONオブジェクトが見つかりません".into()))
}

/// 記述サービス応答をパース
///
/// 抽出優先順位:
/// 1. フェンス除去後のテキスト全体
/// 2. その中の最も外側の `{...}`
///
/// `output` キーが無い場合や配列でない場合はエラー。
pub fn parse_food_reply(reply: &str) -> Result<FoodReply> {
    let stripped = strip_code_fences(reply);

    match serde_json::from_str::<FoodReply>(&stripped) {
        Ok(parsed) => Ok(parsed),
        Err(first_err) => {
            let Ok(object) = extract_json_object(&stripped) else {
                return Err(Error::Json(first_err));
            };
            if object.len() == stripped.len() {
                return Err(Error::Json(first_err));
            }
            Ok(serde_json::from_str::<FoodReply>(object)?)
        }
    }
}
