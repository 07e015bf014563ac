use crate::error::{CalorieAiError, Result};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "app.db";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOG_FILTER: &str = "calorie_ai_rust=info,calorie_desktop=info";

/// 起動時に一度だけ組み立て、各コンポーネントへ参照で渡す設定
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub db_path: PathBuf,
    pub model: String,
    pub api_base_url: String,
    pub log_filter: String,
    pub json_logs: bool,
}

impl Config {
    /// 環境変数から読み込み（APIキー未設定は致命的エラー）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("OPENAI_API_KEY").ok_or(CalorieAiError::MissingApiKey)?;

        let api_base_url = non_blank("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(CalorieAiError::Config(format!(
                "OPENAI_BASE_URL はhttp(s)のURLである必要があります: {api_base_url}"
            )));
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            db_path: PathBuf::from(non_blank("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into())),
            model: non_blank("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            api_base_url,
            log_filter: non_blank("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
            json_logs: lookup("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
        })
    }
}
