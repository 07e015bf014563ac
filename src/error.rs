use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalorieAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 OPENAI_API_KEY または .env ファイルを確認してください")]
    MissingApiKey,

    #[error("ストレージエラー: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("保存データが不正: {0}")]
    CorruptRow(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が選択されていません")]
    NoImage,

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ReplyMalformed(String),

    #[error("カロリー値が数値ではありません: {food_name} = {value:?}")]
    InvalidCalories { food_name: String, value: String },
}

pub type Result<T> = std::result::Result<T, CalorieAiError>;
