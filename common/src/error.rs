//! 応答パースのエラー型

use thiserror::Error;

/// 記述サービスの応答を読み取れなかった理由
#[derive(Error, Debug)]
pub enum Error {
    /// JSONとして不正、または `output` の形が違う
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSONオブジェクト自体が見つからない
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
