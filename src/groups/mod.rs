/// Group change conflict resolution: last-writer-wins rebase of pending changes.
///
/// A pending change is described twice: as plaintext (what it means) and as an
/// opaque, encrypted counterpart (what the server stores). When a newer group
/// revision wins the race, the pending change is re-checked against that
/// revision kind by kind. Actions that are already in effect or no longer
/// apply are removed; adds that raced with an invite become promotions.
///
/// # Module structure
/// - `ids`: MemberId identity type
/// - `limits`: Guardrail constants for pending changes
/// - `snapshot`: GroupSnapshot, member records, roles and access levels
/// - `actions`: ActionKind enumeration and plaintext action payloads
/// - `change`: GroupChange / OpaqueChange / PairedChange, emptiness, ChangeError
/// - `index`: MembershipIndex lookup tables built per resolution
/// - `resolve`: ConflictResolver, resolve_conflict, prepare_resubmission
/// - `codec`: CBOR encoding for persisted changes (cbor feature)
pub mod actions;
pub mod change;
#[cfg(feature = "cbor")]
pub mod codec;
pub mod ids;
pub mod index;
pub mod limits;
pub mod resolve;
pub mod snapshot;

// Re-export core types for convenience
pub use actions::{
    ActionKind, ApprovedMember, NewMember, NewPendingMember, NewRequestingMember, OpaqueAction,
    ProfileKeyChange, PromotedMember, RoleChange,
};
pub use change::{change_is_empty, ChangeError, GroupChange, OpaqueChange, Paired, PairedChange};
#[cfg(feature = "cbor")]
pub use codec::{cbor_decode, cbor_encode};
pub use ids::MemberId;
pub use index::MembershipIndex;
pub use limits::MAX_ENCODED_CHANGE_BYTES;
pub use resolve::{
    prepare_resubmission, resolve_conflict, ConflictResolver, ResolveStats, Resubmission,
};
pub use snapshot::{
    AccessControl, AccessLevel, GroupSnapshot, Member, PendingMember, RequestingMember, Role,
};
