/// Confirmed group state, the snapshot a pending change is rebased onto.
///
/// A `GroupSnapshot` is a point-in-time read of the authoritative group state
/// at some revision: settings (title, avatar, disappearing-message timer,
/// access control) plus the three membership sets: full members, pending
/// (invited) members and requesting (join-request) members.

use serde::{Deserialize, Serialize};

use crate::groups::ids::MemberId;

// ---------------------------------------------------------------------------
// Role, AccessLevel
// ---------------------------------------------------------------------------

/// Member role. Discriminants are the wire values.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Role {
    Default = 1,
    Administrator = 2,
}

impl Role {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Role::Default),
            2 => Some(Role::Administrator),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Who may perform a class of group edits. Discriminants are the wire values.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AccessLevel {
    Any = 1,
    Member = 2,
    Administrator = 3,
    /// Nobody. Used to switch the invite link off.
    Unsatisfiable = 4,
}

impl AccessLevel {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AccessLevel::Any),
            2 => Some(AccessLevel::Member),
            3 => Some(AccessLevel::Administrator),
            4 => Some(AccessLevel::Unsatisfiable),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The three access-control settings of a group.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessControl {
    /// Who may change title, avatar and timer.
    pub attributes: AccessLevel,
    /// Who may add members.
    pub members: AccessLevel,
    /// Who may join through the invite link (Any = no approval needed).
    pub add_from_invite_link: AccessLevel,
}

impl Default for AccessControl {
    /// Settings of a freshly created group: members edit, invite link off.
    fn default() -> Self {
        AccessControl {
            attributes: AccessLevel::Member,
            members: AccessLevel::Member,
            add_from_invite_link: AccessLevel::Unsatisfiable,
        }
    }
}

// ---------------------------------------------------------------------------
// Member records
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub role: Role,
    pub profile_key: Vec<u8>,
    /// Revision at which this member joined.
    pub joined_at_revision: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PendingMember {
    pub id: MemberId,
    /// Role the member will have once the invite is promoted.
    pub role: Role,
    pub added_by: MemberId,
    pub timestamp_ms: u64,
    /// Credential presentation the inviter attached; opaque to resolution.
    pub invite_presentation: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RequestingMember {
    pub id: MemberId,
    pub profile_key: Vec<u8>,
    pub timestamp_ms: u64,
    pub request_presentation: Vec<u8>,
}

// ---------------------------------------------------------------------------
// GroupSnapshot
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GroupSnapshot {
    /// Authority-assigned revision; strictly increasing per committed change.
    pub revision: u32,
    pub title: String,
    /// Opaque avatar reference (CDN key); empty when unset.
    pub avatar: String,
    /// Disappearing-message timer; 0 = off.
    pub disappearing_timer_secs: u32,
    pub access_control: AccessControl,
    pub members: Vec<Member>,
    pub pending_members: Vec<PendingMember>,
    pub requesting_members: Vec<RequestingMember>,
}

impl GroupSnapshot {
    /// Empty group at `revision` with default settings.
    pub fn new(revision: u32, title: impl Into<String>) -> Self {
        GroupSnapshot {
            revision,
            title: title.into(),
            avatar: String::new(),
            disappearing_timer_secs: 0,
            access_control: AccessControl::default(),
            members: Vec::new(),
            pending_members: Vec::new(),
            requesting_members: Vec::new(),
        }
    }

    /// Add a full member (builder style).
    pub fn with_member(mut self, id: MemberId, role: Role, profile_key: &[u8]) -> Self {
        self.members.push(Member {
            id,
            role,
            profile_key: profile_key.to_vec(),
            joined_at_revision: self.revision,
        });
        self
    }

    /// Add a pending (invited) member with no presentation (builder style).
    pub fn with_pending_member(self, id: MemberId, role: Role, added_by: MemberId) -> Self {
        self.with_invite(PendingMember {
            id,
            role,
            added_by,
            timestamp_ms: 0,
            invite_presentation: Vec::new(),
        })
    }

    /// Add a fully specified pending invite.
    pub fn with_invite(mut self, invite: PendingMember) -> Self {
        self.pending_members.push(invite);
        self
    }

    /// Add a requesting (join-request) member with no presentation (builder style).
    pub fn with_requesting_member(self, id: MemberId, profile_key: &[u8]) -> Self {
        self.with_join_request(RequestingMember {
            id,
            profile_key: profile_key.to_vec(),
            timestamp_ms: 0,
            request_presentation: Vec::new(),
        })
    }

    /// Add a fully specified join request.
    pub fn with_join_request(mut self, request: RequestingMember) -> Self {
        self.requesting_members.push(request);
        self
    }

    /// Total number of identities across the three membership sets.
    pub fn population(&self) -> usize {
        self.members.len() + self.pending_members.len() + self.requesting_members.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(Role::Default.as_u8(), 1);
        assert_eq!(Role::Administrator.as_u8(), 2);
        assert_eq!(Role::from_u8(2), Some(Role::Administrator));
        assert_eq!(Role::from_u8(0), None);
    }

    #[test]
    fn test_access_level_wire_values() {
        for level in [
            AccessLevel::Any,
            AccessLevel::Member,
            AccessLevel::Administrator,
            AccessLevel::Unsatisfiable,
        ] {
            assert_eq!(AccessLevel::from_u8(level.as_u8()), Some(level));
        }
        assert_eq!(AccessLevel::from_u8(0), None);
        assert_eq!(AccessLevel::from_u8(5), None);
    }

    #[test]
    fn test_default_access_control() {
        let acl = AccessControl::default();
        assert_eq!(acl.attributes, AccessLevel::Member);
        assert_eq!(acl.members, AccessLevel::Member);
        assert_eq!(acl.add_from_invite_link, AccessLevel::Unsatisfiable);
    }

    #[test]
    fn test_snapshot_builder() {
        let a = MemberId::from_bytes([1; 16]);
        let b = MemberId::from_bytes([2; 16]);
        let c = MemberId::from_bytes([3; 16]);

        let snapshot = GroupSnapshot::new(4, "Team Chat")
            .with_member(a, Role::Administrator, b"pk-a")
            .with_pending_member(b, Role::Default, a)
            .with_requesting_member(c, b"pk-c");

        assert_eq!(snapshot.revision, 4);
        assert_eq!(snapshot.title, "Team Chat");
        assert_eq!(snapshot.members[0].joined_at_revision, 4);
        assert_eq!(snapshot.pending_members[0].added_by, a);
        assert_eq!(snapshot.requesting_members[0].profile_key, b"pk-c".to_vec());
        assert_eq!(snapshot.population(), 3);
    }

    #[test]
    fn test_invite_and_request_presentations_are_kept() {
        let a = MemberId::from_bytes([1; 16]);
        let b = MemberId::from_bytes([2; 16]);
        let c = MemberId::from_bytes([3; 16]);

        let snapshot = GroupSnapshot::new(9, "Team Chat")
            .with_invite(PendingMember {
                id: b,
                role: Role::Default,
                added_by: a,
                timestamp_ms: 1_700_000_000_000,
                invite_presentation: b"invite-cred".to_vec(),
            })
            .with_join_request(RequestingMember {
                id: c,
                profile_key: b"pk-c".to_vec(),
                timestamp_ms: 1_700_000_000_500,
                request_presentation: b"request-cred".to_vec(),
            })
            .with_pending_member(a, Role::Default, c);

        assert_eq!(snapshot.pending_members[0].invite_presentation, b"invite-cred".to_vec());
        assert!(snapshot.pending_members[1].invite_presentation.is_empty());
        assert_eq!(
            snapshot.requesting_members[0].request_presentation,
            b"request-cred".to_vec()
        );
        assert_eq!(snapshot.population(), 3);
    }
}
