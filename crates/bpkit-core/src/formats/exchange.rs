//! # Exchange String Format
//!
//! The text form a blueprint takes on the clipboard.
//!
//! Format: `"0" + Base64(zlib(UTF-8 JSON))`.
//! - 1 char: version marker (`'0'`)
//! - rest: standard, padded Base64 of a zlib-wrapped DEFLATE stream
//!
//! ## Limits
//!
//! Decoding validates size before and during work:
//! - The string length is checked before Base64 decoding
//! - Inflation stops once the output passes `MAX_INFLATED_SIZE`
//!
//! Every stage failure is reported with its [`DecodeStage`]; no partial
//! document is ever returned.

use crate::primitives::{FORMAT_VERSION, MAX_EXCHANGE_STRING_LEN, MAX_INFLATED_SIZE};
use crate::{BlueprintError, BlueprintResult, DecodeStage, Document};
use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, Decompress, FlushDecompress, Status, write::ZlibEncoder};
use std::io::Write;

/// Compression level used for new strings; matches what the game writes.
const COMPRESSION_LEVEL: u32 = 9;

/// Output growth step while inflating.
const INFLATE_CHUNK: usize = 64 * 1024;

// =============================================================================
// ENCODE
// =============================================================================

/// Serialize a document into an exchange string.
///
/// This is a pure transformation with no side effects.
pub fn encode(document: &Document) -> BlueprintResult<String> {
    let json = serde_json::to_vec(document).map_err(|e| BlueprintError::Encode(e.to_string()))?;

    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(json.len() / 4),
        Compression::new(COMPRESSION_LEVEL),
    );
    encoder
        .write_all(&json)
        .map_err(|e| BlueprintError::Encode(format!("compression failed: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| BlueprintError::Encode(format!("compression failed: {}", e)))?;

    let mut out = String::with_capacity(1 + compressed.len().div_ceil(3) * 4);
    out.push(FORMAT_VERSION);
    STANDARD.encode_string(&compressed, &mut out);
    Ok(out)
}

// =============================================================================
// DECODE
// =============================================================================

/// Parse an exchange string into a document.
///
/// Surrounding whitespace (a trailing newline from a paste) is ignored. A
/// single leading `'0'` is stripped; any other first character is read as
/// part of an unversioned Base64 payload.
pub fn decode(exchange: &str) -> BlueprintResult<Document> {
    let trimmed = exchange.trim();

    if trimmed.len() > MAX_EXCHANGE_STRING_LEN {
        return Err(BlueprintError::decode(
            DecodeStage::Base64,
            format!(
                "string length {} exceeds maximum allowed {}",
                trimmed.len(),
                MAX_EXCHANGE_STRING_LEN
            ),
        ));
    }

    let payload = trimmed.strip_prefix(FORMAT_VERSION).unwrap_or(trimmed);
    let compressed = STANDARD
        .decode(payload)
        .map_err(|e| BlueprintError::decode(DecodeStage::Base64, e))?;

    let json = inflate(&compressed, MAX_INFLATED_SIZE)?;

    serde_json::from_slice(&json).map_err(|e| BlueprintError::decode(DecodeStage::Json, e))
}

/// Inflate a complete zlib stream, refusing truncated input and output
/// larger than `limit` bytes.
///
/// Runs without a flush hint so the stream may span any number of output
/// chunks; a call that makes no progress means the input ended early.
fn inflate(compressed: &[u8], limit: u64) -> BlueprintResult<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out: Vec<u8> = Vec::with_capacity(compressed.len().saturating_mul(4).min(INFLATE_CHUNK));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity().max(INFLATE_CHUNK));
        }

        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let input = compressed.get(before_in as usize..).unwrap_or_default();

        let status = inflater
            .decompress_vec(input, &mut out, FlushDecompress::None)
            .map_err(|e| BlueprintError::decode(DecodeStage::Inflate, e))?;

        if inflater.total_out() > limit {
            return Err(BlueprintError::decode(
                DecodeStage::Inflate,
                format!("inflated payload exceeds maximum allowed {} bytes", limit),
            ));
        }

        if status == Status::StreamEnd {
            return Ok(out);
        }

        if inflater.total_in() == before_in && inflater.total_out() == before_out {
            return Err(BlueprintError::decode(
                DecodeStage::Inflate,
                "compressed stream is truncated",
            ));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
