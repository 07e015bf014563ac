//! Calorie AI Common Library
//!
//! デスクトップ版とコアライブラリで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod parser;
pub mod prompts;

pub use types::{FoodItem, FoodReply};
pub use error::{Error, Result};
pub use parser::{extract_json_object, parse_food_reply, strip_code_fences};
pub use prompts::FOOD_ANALYSIS_PROMPT;
