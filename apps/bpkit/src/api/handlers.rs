//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers. Every request
//! builds its own blueprint; the only shared state is the read-only catalog.

use super::{
    AppState,
    types::{
        DecodeResponse, EncodeRequest, EncodeResponse, ErrorResponse, ExchangeRequest,
        HealthResponse, InspectResponse, PackRequest, PackResponse, status_for,
    },
};
use crate::ops::pack_values;
use axum::{Json, extract::State, http::StatusCode};
use bpkit_core::{Blueprint, BlueprintError};

/// Handler result: JSON body or an error status with [`ErrorResponse`].
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn reject(e: BlueprintError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_for(&e);
    tracing::debug!("Request rejected ({}): {}", status, e);
    (status, Json(ErrorResponse::from(&e)))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.catalog.len()))
}

// =============================================================================
// DECODE / ENCODE HANDLERS
// =============================================================================

/// Decode an exchange string into its document.
pub async fn decode_handler(Json(request): Json<ExchangeRequest>) -> ApiResult<DecodeResponse> {
    let document = bpkit_core::decode(&request.exchange).map_err(reject)?;
    Ok(Json(DecodeResponse { document }))
}

/// Encode a document into an exchange string.
pub async fn encode_handler(Json(request): Json<EncodeRequest>) -> ApiResult<EncodeResponse> {
    let exchange = if request.normalize {
        Blueprint::from_document(&request.document)
            .and_then(|bp| bp.to_exchange_string())
            .map_err(reject)?
    } else {
        bpkit_core::encode(&request.document).map_err(reject)?
    };
    Ok(Json(EncodeResponse { exchange }))
}

// =============================================================================
// INSPECT HANDLER
// =============================================================================

/// Summarize a blueprint.
pub async fn inspect_handler(Json(request): Json<ExchangeRequest>) -> ApiResult<InspectResponse> {
    let bp = Blueprint::from_exchange_string(&request.exchange).map_err(reject)?;
    Ok(Json(InspectResponse::of(&bp)))
}

// =============================================================================
// PACK HANDLER
// =============================================================================

/// Pack values into a constant-combinator blueprint using the server catalog.
pub async fn pack_handler(
    State(state): State<AppState>,
    Json(request): Json<PackRequest>,
) -> ApiResult<PackResponse> {
    let packed =
        pack_values(&state.catalog, &request.values, request.label.as_deref()).map_err(reject)?;
    let exchange = packed.blueprint.to_exchange_string().map_err(reject)?;
    tracing::info!(
        "Packed {} values into {} section(s)",
        packed.filters,
        packed.sections
    );
    Ok(Json(PackResponse {
        exchange,
        filters: packed.filters,
        sections: packed.sections,
    }))
}
