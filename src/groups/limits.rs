/// Pending-change guardrails.
///
/// Bounds how large a persisted change or snapshot may be when read back from
/// storage. Resolution itself accepts any aligned change.

/// Max size of a CBOR-encoded change or snapshot accepted by the decoder.
pub const MAX_ENCODED_CHANGE_BYTES: usize = 4 * 1024 * 1024; // 4 MB
