//! Text recognition trait

use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait TextRecognizer: Send + Sync + 'static {
    /// Extract plain text from an image. Empty text is a valid result.
    async fn extract_text(&self, image: &[u8], file_name: &str) -> Result<String>;
}
