//! Ordered precondition checks for an inbound relay request.
//!
//! Stages run in a fixed order and the first failure wins:
//! credential → method → prompt. Nothing past a failed stage runs, so a
//! rejected request never reaches the upstream API.

use axum::http::Method;

use crate::errors::RelayError;
use crate::llm_client::LlmClient;
use crate::relay::models::InboundRequest;

/// A request that passed every check, ready for the upstream call.
pub struct ValidatedRequest<'a> {
    pub llm: &'a LlmClient,
    pub prompt: String,
}

pub fn validate<'a>(
    llm: Option<&'a LlmClient>,
    method: &Method,
    body: &[u8],
) -> Result<ValidatedRequest<'a>, RelayError> {
    let llm = require_credential(llm)?;
    require_post(method)?;
    let prompt = require_prompt(body)?;

    Ok(ValidatedRequest { llm, prompt })
}

fn require_credential(llm: Option<&LlmClient>) -> Result<&LlmClient, RelayError> {
    llm.ok_or(RelayError::Configuration)
}

fn require_post(method: &Method) -> Result<(), RelayError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(RelayError::MethodNotAllowed)
    }
}

/// Unparseable bodies are treated the same as a body without a prompt.
fn require_prompt(body: &[u8]) -> Result<String, RelayError> {
    serde_json::from_slice::<InboundRequest>(body)
        .ok()
        .and_then(|req| req.prompt().map(str::to_string))
        .ok_or(RelayError::MissingPrompt)
}
