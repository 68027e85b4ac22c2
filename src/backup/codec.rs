//! Backup encoding and decoding
//!
//! Bundles are written as a single UTF-8 JSON object. Decoding upgrades
//! older documents first and reports every failure as
//! [`PlannerError::MalformedBackup`].

use crate::error::{PlannerError, PlannerResult};

use super::dto::BackupBundle;
use super::migrate::{self, FormatVersion};

/// Encode a bundle as indented JSON
pub fn encode(bundle: &BackupBundle) -> PlannerResult<Vec<u8>> {
    encode_with(bundle, true)
}

/// Encode a bundle, indented or on a single line
pub fn encode_with(bundle: &BackupBundle, pretty: bool) -> PlannerResult<Vec<u8>> {
    let result = if pretty {
        serde_json::to_vec_pretty(bundle)
    } else {
        serde_json::to_vec(bundle)
    };
    result.map_err(|e| PlannerError::Json(format!("Failed to encode backup: {}", e)))
}

/// Decode a backup document
pub fn decode(bytes: &[u8]) -> PlannerResult<BackupBundle> {
    decode_versioned(bytes).map(|(bundle, _)| bundle)
}

/// Decode a backup document, also returning the format version it declared
pub fn decode_versioned(bytes: &[u8]) -> PlannerResult<(BackupBundle, FormatVersion)> {
    let mut document: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| PlannerError::MalformedBackup(format!("not valid JSON: {}", e)))?;

    let version = migrate::upgrade(&mut document)?;

    let bundle = serde_json::from_value(document)
        .map_err(|e| PlannerError::MalformedBackup(e.to_string()))?;

    Ok((bundle, version))
}
