/// Identity type for group members.
///
/// - `MemberId`: 16-byte opaque member identity (the raw bytes of the
///   member's service UUID). Compared byte-for-byte; used as a map key.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// MemberId
// ---------------------------------------------------------------------------

/// Opaque member identity: the member's UUID as raw bytes.
///
/// The same identity is used for full members, pending invites and join
/// requests; the group authority guarantees a given identity sits in at most
/// one of those sets at a time.
///
/// Ordering is byte-wise, which matches the UUID's own ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub [u8; 16]);

impl MemberId {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        MemberId(bytes)
    }

    /// Create from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        MemberId(*uuid.as_bytes())
    }

    /// Random identity (v4 UUID). Useful for fixtures and local drafts.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Interpret the identity as a UUID.
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// Hex-encode for display/storage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the 32-char hex form produced by `to_hex`.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(MemberId(bytes))
    }

    /// Label used in log lines. Identities only reach the log with `debug-logs`.
    pub(crate) fn log_label(&self) -> String {
        if cfg!(feature = "debug-logs") {
            self.to_hex()
        } else {
            "<member>".to_string()
        }
    }
}

impl From<Uuid> for MemberId {
    fn from(uuid: Uuid) -> Self {
        MemberId::from_uuid(uuid)
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = hex::encode(&self.0[..4]);
        f.debug_tuple("MemberId").field(&format_args!("{}", short)).finish()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
