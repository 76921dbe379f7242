//! Clip commentary.

use montage_services::TextGenerator;

use crate::error::PipelineError;
use crate::logging::StageLogger;

/// Prompt sent for every clip.
pub const HYPE_PROMPT: &str = "Generate ONE short sentence of hype commentary for a Valorant game highlight. Maximum 12 words. Just the commentary sentence, nothing else.";

/// Commentary used when generation fails or returns nothing usable.
pub const FALLBACK_COMMENTARY: &str = "Nice play!";

pub const MAX_TOKENS: u32 = 100;
pub const TEMPERATURE: f32 = 0.7;

/// Last non-empty line of a model reply with surrounding quotes removed.
pub fn clean_commentary(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).rfind(|l| !l.is_empty())?;
    let cleaned = line.trim_matches(|c: char| c == '"' || c == '\'').trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Generate commentary for one clip, falling back to [`FALLBACK_COMMENTARY`].
pub async fn generate_commentary(generator: &dyn TextGenerator, logger: &StageLogger) -> String {
    match generator.generate(HYPE_PROMPT, MAX_TOKENS, TEMPERATURE).await {
        Ok(raw) => clean_commentary(&raw).unwrap_or_else(|| {
            logger.log_warning("text generation returned no usable commentary");
            FALLBACK_COMMENTARY.to_string()
        }),
        Err(e) => {
            let err = PipelineError::transient("commentary", e);
            logger.log_warning(&format!("{}; using stock commentary", err));
            FALLBACK_COMMENTARY.to_string()
        }
    }
}
