// Prompt relay: validate the inbound request, make one upstream call,
// normalize the answer into `{ text, sources }`.
// All upstream calls go through llm_client — no direct HTTP calls here.

pub mod extract;
pub mod handlers;
pub mod models;
pub mod validation;
