use crate::errors::CoreError;
use crate::models::AnalysisRequest;

/// Response from an AI backend call.
#[derive(Debug)]
pub struct BackendResponse {
    /// The model's reply text (expected to be the analysis JSON).
    pub text: String,
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens produced.
    pub output_tokens: u64,
}

/// Trait for vision analysis backends. Sync only — callers that must not block
/// run it on a worker thread.
pub trait AnalysisBackend {
    /// Send one image with its prompt and return the raw reply text.
    /// `json_schema` constrains the reply shape when the backend supports it.
    fn execute(
        &self,
        image: &AnalysisRequest,
        prompt: &str,
        json_schema: &str,
    ) -> Result<BackendResponse, CoreError>;
}
