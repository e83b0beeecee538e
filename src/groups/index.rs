/// Membership lookup tables over a group snapshot.
///
/// Built once per resolution from a `GroupSnapshot` and only queried after
/// that. One map per membership set, keyed by `MemberId`.

use std::collections::HashMap;

use crate::groups::ids::MemberId;
use crate::groups::snapshot::{GroupSnapshot, Member, PendingMember, RequestingMember};

#[derive(Clone, Debug)]
pub struct MembershipIndex<'a> {
    full: HashMap<MemberId, &'a Member>,
    pending: HashMap<MemberId, &'a PendingMember>,
    requesting: HashMap<MemberId, &'a RequestingMember>,
}

impl<'a> MembershipIndex<'a> {
    pub fn new(snapshot: &'a GroupSnapshot) -> Self {
        let full = snapshot.members.iter().map(|m| (m.id, m)).collect();
        let pending = snapshot.pending_members.iter().map(|m| (m.id, m)).collect();
        let requesting = snapshot
            .requesting_members
            .iter()
            .map(|m| (m.id, m))
            .collect();

        MembershipIndex {
            full,
            pending,
            requesting,
        }
    }

    pub fn full_member(&self, id: &MemberId) -> Option<&'a Member> {
        self.full.get(id).copied()
    }

    pub fn pending_member(&self, id: &MemberId) -> Option<&'a PendingMember> {
        self.pending.get(id).copied()
    }

    pub fn requesting_member(&self, id: &MemberId) -> Option<&'a RequestingMember> {
        self.requesting.get(id).copied()
    }

    pub fn is_full_member(&self, id: &MemberId) -> bool {
        self.full.contains_key(id)
    }

    pub fn is_pending_member(&self, id: &MemberId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn is_requesting_member(&self, id: &MemberId) -> bool {
        self.requesting.contains_key(id)
    }

    /// (full, pending, requesting) counts.
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.full.len(), self.pending.len(), self.requesting.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
