mod openai;

pub use openai::OpenAiDescriber;

use crate::error::Result;
use std::path::Path;

/// 画像と指示文を外部の記述サービスへ送り、応答テキストを受け取る
///
/// コードフェンスの除去は呼び出し側の責務。
pub trait ImageDescriber {
    /// サービスが何も返さなかった場合は `Ok(None)`
    fn describe(&self, image_path: &Path, instruction: &str) -> Result<Option<String>>;
}

impl<T: ImageDescriber + ?Sized> ImageDescriber for &T {
    fn describe(&self, image_path: &Path, instruction: &str) -> Result<Option<String>> {
        (**self).describe(image_path, instruction)
    }
}

impl<T: ImageDescriber + ?Sized> ImageDescriber for Box<T> {
    fn describe(&self, image_path: &Path, instruction: &str) -> Result<Option<String>> {
        (**self).describe(image_path, instruction)
    }
}
