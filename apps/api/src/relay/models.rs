use serde::{Deserialize, Serialize};

/// Inbound body. `prompt` stays untyped so that `null`, `false`, numbers and
/// empty strings all land in the same "missing prompt" rejection.
#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    #[serde(default)]
    pub prompt: serde_json::Value,
}

impl InboundRequest {
    /// The prompt, if it is a non-empty string.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_str().filter(|p| !p.is_empty())
    }
}

/// A web page the model grounded its answer on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Successful relay body.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub text: String,
    pub sources: Vec<Source>,
}
