/// CBOR persistence for pending changes and snapshots.
///
/// A client keeps its pending change (both halves) and the last snapshot it
/// fetched on disk between attempts. Both are stored as CBOR via ciborium;
/// decoding refuses input larger than `MAX_ENCODED_CHANGE_BYTES`.
use serde::{de::DeserializeOwned, Serialize};

use crate::groups::change::{ChangeError, GroupChange, OpaqueChange};
use crate::groups::limits::MAX_ENCODED_CHANGE_BYTES;
use crate::groups::snapshot::GroupSnapshot;

// ---------------------------------------------------------------------------
// CBOR helpers
// ---------------------------------------------------------------------------

/// CBOR-encode a value to bytes.
pub fn cbor_encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ChangeError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| ChangeError::CborEncode(e.to_string()))?;
    Ok(buf)
}

/// CBOR-decode a value from bytes.
pub fn cbor_decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ChangeError> {
    if bytes.len() > MAX_ENCODED_CHANGE_BYTES {
        return Err(ChangeError::EncodedTooLarge {
            size: bytes.len(),
            max: MAX_ENCODED_CHANGE_BYTES,
        });
    }
    ciborium::from_reader(bytes).map_err(|e| ChangeError::CborDecode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Typed wrappers
// ---------------------------------------------------------------------------

impl OpaqueChange {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChangeError> {
        cbor_encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChangeError> {
        cbor_decode(bytes)
    }
}

impl GroupChange {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChangeError> {
        cbor_encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChangeError> {
        cbor_decode(bytes)
    }
}

impl GroupSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChangeError> {
        cbor_encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChangeError> {
        cbor_decode(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
