//! Turns an upstream `generateContent` response into the relay's answer shape.

use tracing::warn;

use crate::errors::RelayError;
use crate::llm_client::{Candidate, GenerateContentResponse, GroundingAttribution};
use crate::relay::models::{RelayResponse, Source};

/// Maximum number of sources returned to the caller.
pub const MAX_SOURCES: usize = 5;

const NO_CONTENT_MESSAGE: &str = "No content generated.";

/// Extracts the first candidate's text (verbatim) and its sources.
/// A response without usable text becomes `ContentUnavailable`.
pub fn extract_answer(response: &GenerateContentResponse) -> Result<RelayResponse, RelayError> {
    let candidate = response.first_candidate();

    if let Some(text) = candidate.and_then(Candidate::text) {
        let sources = candidate.map(extract_sources).unwrap_or_default();
        return Ok(RelayResponse {
            text: text.to_string(),
            sources,
        });
    }

    let block_reason = match candidate {
        Some(candidate) => candidate.block_reason(),
        None => response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref()),
    };

    let message = match block_reason {
        Some(reason) => format!("Blocked by Safety: {reason}"),
        None => NO_CONTENT_MESSAGE.to_string(),
    };

    warn!(
        finish_reason = candidate.and_then(|c| c.finish_reason.as_deref()),
        "Upstream returned no usable content: {message}"
    );

    Err(RelayError::ContentUnavailable(message))
}

/// Grounding sources in upstream order, incomplete entries dropped, capped at
/// `MAX_SOURCES`. Falls back to `groundingChunks` when no attributions exist.
pub fn extract_sources(candidate: &Candidate) -> Vec<Source> {
    let Some(metadata) = candidate.grounding_metadata.as_ref() else {
        return Vec::new();
    };

    let entries = if metadata.grounding_attributions.is_empty() {
        &metadata.grounding_chunks
    } else {
        &metadata.grounding_attributions
    };

    entries
        .iter()
        .filter_map(to_source)
        .take(MAX_SOURCES)
        .collect()
}

fn to_source(attribution: &GroundingAttribution) -> Option<Source> {
    let web = attribution.web.as_ref()?;
    let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
    let title = web.title.as_deref().filter(|t| !t.is_empty())?;

    Some(Source {
        uri: uri.to_string(),
        title: title.to_string(),
    })
}
