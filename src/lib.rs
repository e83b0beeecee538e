//! # Shield Groups
//!
//! **Last-writer-wins conflict resolution for pending group changes.**
//!
//! A client that authors a group change (add a member, rename the group,
//! change an access level, ...) submits it against a specific group revision.
//! If another client commits first, the server rejects the submission and the
//! client has to rebase its change onto the new group state. This crate does
//! that rebase:
//!
//! - Actions that are already in effect are **dropped** (adding someone who is
//!   already a member, renaming the group to its current title).
//! - Actions whose target disappeared are **dropped** (removing someone who
//!   already left).
//! - Adding someone who was invited in the meantime is **converted** into
//!   promoting that pending invite.
//!
//! Decisions are made on the plaintext view of the change; the opaque
//! (encrypted) actions are only kept, dropped, or moved, never inspected.
//!
//! ## Quick Start
//!
//! ```rust
//! use shield_groups::groups::{
//!     prepare_resubmission, GroupChange, GroupSnapshot, OpaqueChange, Resubmission,
//! };
//!
//! let snapshot = GroupSnapshot::new(7, "Team Chat");
//! let mut plaintext = GroupChange::default();
//! let mut opaque = OpaqueChange::default();
//! plaintext.new_title = Some("Team Chat".into());
//! opaque.modify_title = Some(b"encrypted-title".to_vec().into());
//!
//! // Renaming to the current title is a no-op, so there is nothing to resubmit.
//! let outcome = prepare_resubmission(&snapshot, &plaintext, &opaque).unwrap();
//! assert!(matches!(outcome, Resubmission::Abandon));
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`groups::ids`] | `MemberId` identity type |
//! | [`groups::snapshot`] | Confirmed group state: members, invites, join requests, settings |
//! | [`groups::actions`] | The 17 action kinds and their plaintext payloads |
//! | [`groups::change`] | Plaintext, opaque and paired change sets; emptiness check |
//! | [`groups::index`] | Per-call membership lookup tables |
//! | [`groups::resolve`] | The conflict resolver and resubmission decision |
//! | [`groups::codec`] | CBOR persistence of changes and snapshots |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cbor` | Yes | CBOR encoding of changes (adds `ciborium`) |
//! | `debug-logs` | No | Include member identities (hex) in debug logs |

// Crate-level lint configuration: suppress stylistic warnings that don't affect correctness.
#![allow(
    clippy::empty_line_after_doc_comments,
    clippy::doc_lazy_continuation
)]

// ── Public modules ──────────────────────────────────────────────────────────

/// Group state, change sets, and last-writer-wins conflict resolution.
pub mod groups;

// ── Re-exports for convenience ──────────────────────────────────────────────

pub use groups::{
    change_is_empty, prepare_resubmission, resolve_conflict, ActionKind, ChangeError,
    ConflictResolver, GroupChange, GroupSnapshot, MemberId, OpaqueChange, PairedChange,
    Resubmission,
};

// ── Library metadata ────────────────────────────────────────────────────────

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
pub fn version() -> &'static str {
    VERSION
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
        assert!(version().contains('.'));
    }

    #[test]
    fn test_empty_change_is_empty() {
        assert!(change_is_empty(&OpaqueChange::default()));
        assert!(GroupChange::default().is_empty());
    }
}
