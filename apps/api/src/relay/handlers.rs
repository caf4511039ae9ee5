//! Axum route handler for the relay endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    Json,
};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::RelayError;
use crate::relay::extract::extract_answer;
use crate::relay::models::RelayResponse;
use crate::relay::validation::validate;
use crate::state::AppState;

/// ANY /api/generate
///
/// Mounted for every method so that configuration and method errors come
/// back in the relay's own JSON shape. Pipeline: validate → one upstream
/// call → extract `{ text, sources }`.
///
/// A body that cannot be buffered (over the size limit, broken stream) is
/// treated as empty, so it still gets the pipeline's JSON errors in order.
pub async fn handle_relay(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RelayResponse>, RelayError> {
    let request_id = Uuid::new_v4();

    async move {
        let body = body.unwrap_or_else(|rejection| {
            warn!(status = %rejection.status(), "Unreadable request body: {rejection}");
            Bytes::new()
        });

        let request = validate(state.llm.as_ref(), &method, &body)?;

        let response = request.llm.generate(&request.prompt).await?;
        let answer = extract_answer(&response)?;

        info!(sources = answer.sources.len(), "Relayed prompt");

        Ok::<_, RelayError>(Json(answer))
    }
    .instrument(info_span!("relay", %request_id))
    .await
}
