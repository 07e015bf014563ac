//! OpenAI Chat Completions 連携
//!
//! 画像をBase64のData URLにして指示文と一緒に送信し、
//! 最初の候補のテキストをそのまま返す。リトライはしない。

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ImageDescriber;
use crate::config::Config;
use crate::error::{CalorieAiError, Result};

/// Chat Completions リクエスト
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Part {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat Completions レスポンス
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// 拡張子からMIMEタイプを推定（不明なら image/jpeg）
fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

fn to_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

fn build_request(model: &str, instruction: &str, data_url: String) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![Message {
            role: "user",
            content: vec![
                Part::Text { text: instruction.to_string() },
                Part::ImageUrl { image_url: ImageUrl { url: data_url } },
            ],
        }],
    }
}

/// 最初の候補のテキストを取り出す（空白のみなら None）
fn extract_reply(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
}

pub struct OpenAiDescriber {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiDescriber {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.api_base_url),
        }
    }
}

impl ImageDescriber for OpenAiDescriber {
    fn describe(&self, image_path: &Path, instruction: &str) -> Result<Option<String>> {
        let bytes = std::fs::read(image_path).map_err(|e| {
            CalorieAiError::ImageLoad(format!("{}: {}", image_path.display(), e))
        })?;
        let request = build_request(
            &self.model,
            instruction,
            to_data_url(&bytes, mime_type_for(image_path)),
        );

        info!(path = %image_path.display(), model = %self.model, bytes = bytes.len(), "requesting image description");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| CalorieAiError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%status, "description service returned an error status");
            return Err(CalorieAiError::ApiCall(format!("status {}: {}", status, body)));
        }

        let payload: ChatResponse = response
            .json()
            .map_err(|e| CalorieAiError::ReplyMalformed(e.to_string()))?;

        let reply = extract_reply(payload);
        info!(
            chars = reply.as_ref().map(|r| r.chars().count()).unwrap_or(0),
            "image description received"
        );
        Ok(reply)
    }
}
