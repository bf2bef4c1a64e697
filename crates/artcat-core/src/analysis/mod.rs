pub mod backend;
pub mod gemini;
pub mod prompts;

use std::path::Path;

use crate::encode;
use crate::errors::CoreError;
use crate::models::{AnalysisRequest, ArtAnalysis};
use crate::util::truncate_for_error;

use backend::AnalysisBackend;

/// Response schema handed to the model for constrained decoding.
/// Uses the OpenAPI subset Gemini accepts (upper-case type names).
pub const ART_ANALYSIS_SCHEMA: &str = r##"{
  "type": "OBJECT",
  "properties": {
    "technicalScores": {
      "type": "ARRAY",
      "items": {
        "type": "OBJECT",
        "properties": {
          "category": {"type": "STRING", "description": "Categoría técnica (ej. Perspectiva, Teoría del Color, Anatomía, Sombreado, Composición)"},
          "score": {"type": "NUMBER", "description": "Puntuación sobre 100"},
          "fullMark": {"type": "NUMBER", "description": "Siempre 100"}
        },
        "required": ["category", "score", "fullMark"]
      }
    },
    "detectedPatterns": {
      "type": "ARRAY",
      "items": {"type": "STRING"},
      "description": "Patrones visuales detectados (ej. 'Proporción Áurea', 'Composición Triangular', 'Colores Complementarios', 'Tramado')"
    },
    "colorPalette": {
      "type": "ARRAY",
      "items": {"type": "STRING"},
      "description": "Códigos hexadecimales de los colores dominantes detectados en la obra"
    },
    "feedback": {
      "type": "OBJECT",
      "properties": {
        "strengths": {"type": "ARRAY", "items": {"type": "STRING"}, "description": "Lista de fortalezas técnicas en español"},
        "improvements": {"type": "ARRAY", "items": {"type": "STRING"}, "description": "Lista de áreas de mejora en español"},
        "tips": {"type": "ARRAY", "items": {"type": "STRING"}, "description": "Consejos prácticos para mejorar en español"}
      },
      "required": ["strengths", "improvements", "tips"]
    },
    "catCommentary": {
      "type": "STRING",
      "description": "Un comentario corto, ingenioso y en primera persona de la personalidad 'Gato Artista'. Alentador pero técnicamente estricto. Usa juegos de palabras sobre arte si es posible. Todo en Español."
    }
  },
  "required": ["technicalScores", "detectedPatterns", "feedback", "catCommentary", "colorPalette"]
}"##;

/// Run one analysis of an already-encoded image.
pub fn analyze(
    backend: &dyn AnalysisBackend,
    request: &AnalysisRequest,
) -> Result<ArtAnalysis, CoreError> {
    let prompt = prompts::build_critic_prompt();
    let response = backend.execute(request, &prompt, ART_ANALYSIS_SCHEMA)?;

    tracing::debug!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        result_chars = response.text.len(),
        "analysis reply received"
    );

    parse_analysis_response(&response.text)
}

/// Read, encode and analyze an image file.
pub fn analyze_file(backend: &dyn AnalysisBackend, path: &Path) -> Result<ArtAnalysis, CoreError> {
    let request = encode::read_image(path)?;
    analyze(backend, &request)
}

/// Parse the reply strictly: it must be a complete `ArtAnalysis` JSON object
/// that also passes value validation. Nothing is repaired or defaulted.
pub fn parse_analysis_response(text: &str) -> Result<ArtAnalysis, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyResponse);
    }
    let analysis: ArtAnalysis = serde_json::from_str(trimmed).map_err(|e| {
        CoreError::Parse(format!(
            "failed to parse AI response as JSON: {e}\nresponse text: {}",
            truncate_for_error(trimmed, 1500)
        ))
    })?;
    analysis.validate()?;
    Ok(analysis)
}
