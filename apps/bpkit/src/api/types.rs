//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use axum::http::StatusCode;
use bpkit_core::{BlueprintError, Document};
use serde::{Deserialize, Serialize};

pub use crate::ops::BlueprintSummary as InspectResponse;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Slots in the loaded signal catalog.
    pub catalog_slots: usize,
}

impl HealthResponse {
    pub fn new(catalog_slots: usize) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            catalog_slots,
        }
    }
}

// =============================================================================
// DECODE / INSPECT
// =============================================================================

/// Request carrying an exchange string (`/decode`, `/inspect`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub exchange: String,
}

/// Decoded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub document: Document,
}

// =============================================================================
// ENCODE
// =============================================================================

/// Document to encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub document: Document,
    /// Parse as a blueprint first, applying the sparse output rules.
    #[serde(default)]
    pub normalize: bool,
}

/// Encoded exchange string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub exchange: String,
}

// =============================================================================
// PACK
// =============================================================================

/// Values to pack into a constant combinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackRequest {
    pub values: Vec<i32>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Packed blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackResponse {
    pub exchange: String,
    pub filters: usize,
    pub sections: usize,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error kind (`decode`, `structural`, ...).
    pub kind: String,
    /// Failing stage for decode errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl From<&BlueprintError> for ErrorResponse {
    fn from(e: &BlueprintError) -> Self {
        Self {
            error: e.to_string(),
            kind: e.kind().to_string(),
            stage: e.decode_stage().map(|s| s.to_string()),
        }
    }
}

/// HTTP status for a core error.
///
/// Malformed input is 400, well-formed input the model rejects is 422, and
/// failures to produce output are 500.
pub fn status_for(e: &BlueprintError) -> StatusCode {
    match e {
        BlueprintError::Decode { .. }
        | BlueprintError::Structural(_)
        | BlueprintError::InvalidConnectCode(_)
        | BlueprintError::InvalidWireColor(_)
        | BlueprintError::IconIndexOutOfRange(_) => StatusCode::BAD_REQUEST,
        BlueprintError::UnassignedEntity
        | BlueprintError::UnknownEntity(_)
        | BlueprintError::DuplicateEntityNumber(_)
        | BlueprintError::CatalogLookup(_)
        | BlueprintError::WrongBehavior { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BlueprintError::Encode(_) | BlueprintError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
