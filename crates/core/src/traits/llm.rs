//! Language model trait

use async_trait::async_trait;

use crate::Result;

/// Text generation backend
///
/// The output is untrusted: it is expected, not guaranteed, to contain one
/// JSON object.
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate a completion for a single prompt
    ///
    /// Fails with `Error::Generation` on transport failure, timeout or a
    /// non-success status.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}
