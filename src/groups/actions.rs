/// Group change action kinds and their plaintext payloads.
///
/// A group change is a bag of actions, grouped by kind. There are exactly 17
/// kinds, each identified on the wire by a fixed field number (3..=19). Ten
/// kinds are lists (any number of actions); seven are scalar settings that are
/// either present once or absent.
///
/// The plaintext payload types here describe *what* an action does and are
/// what the resolver decides on. `OpaqueAction` is the encrypted counterpart
/// the server stores; it is never inspected, only kept, dropped or moved.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::groups::change::ChangeError;
use crate::groups::ids::MemberId;
use crate::groups::snapshot::Role;

// ---------------------------------------------------------------------------
// ActionKind enum
// ---------------------------------------------------------------------------

/// The kind of a group change action, in wire order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    // Full membership
    AddMember,
    DeleteMember,
    ModifyMemberRole,
    ModifyMemberProfileKey,

    // Invites
    AddPendingMember,
    DeletePendingMember,
    PromotePendingMember,

    // Settings (scalar)
    ModifyTitle,
    ModifyAvatar,
    ModifyDisappearingTimer,
    ModifyAttributesAccess,
    ModifyMemberAccess,
    ModifyInviteLinkAccess,

    // Join requests
    AddRequestingMember,
    DeleteRequestingMember,
    PromoteRequestingMember,

    // Invite link (scalar)
    ModifyInviteLinkPassword,
}

impl ActionKind {
    /// Every kind, ordered by field number.
    pub const ALL: [ActionKind; 17] = [
        ActionKind::AddMember,
        ActionKind::DeleteMember,
        ActionKind::ModifyMemberRole,
        ActionKind::ModifyMemberProfileKey,
        ActionKind::AddPendingMember,
        ActionKind::DeletePendingMember,
        ActionKind::PromotePendingMember,
        ActionKind::ModifyTitle,
        ActionKind::ModifyAvatar,
        ActionKind::ModifyDisappearingTimer,
        ActionKind::ModifyAttributesAccess,
        ActionKind::ModifyMemberAccess,
        ActionKind::ModifyInviteLinkAccess,
        ActionKind::AddRequestingMember,
        ActionKind::DeleteRequestingMember,
        ActionKind::PromoteRequestingMember,
        ActionKind::ModifyInviteLinkPassword,
    ];

    /// Historical wire field number. Must not change.
    pub fn field_number(&self) -> u32 {
        match self {
            ActionKind::AddMember => 3,
            ActionKind::DeleteMember => 4,
            ActionKind::ModifyMemberRole => 5,
            ActionKind::ModifyMemberProfileKey => 6,
            ActionKind::AddPendingMember => 7,
            ActionKind::DeletePendingMember => 8,
            ActionKind::PromotePendingMember => 9,
            ActionKind::ModifyTitle => 10,
            ActionKind::ModifyAvatar => 11,
            ActionKind::ModifyDisappearingTimer => 12,
            ActionKind::ModifyAttributesAccess => 13,
            ActionKind::ModifyMemberAccess => 14,
            ActionKind::ModifyInviteLinkAccess => 15,
            ActionKind::AddRequestingMember => 16,
            ActionKind::DeleteRequestingMember => 17,
            ActionKind::PromoteRequestingMember => 18,
            ActionKind::ModifyInviteLinkPassword => 19,
        }
    }

    pub fn from_field_number(field: u32) -> Option<Self> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.field_number() == field)
    }

    /// Scalar kinds hold at most one action; list kinds hold any number.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ActionKind::ModifyTitle
                | ActionKind::ModifyAvatar
                | ActionKind::ModifyDisappearingTimer
                | ActionKind::ModifyAttributesAccess
                | ActionKind::ModifyMemberAccess
                | ActionKind::ModifyInviteLinkAccess
                | ActionKind::ModifyInviteLinkPassword
        )
    }

    /// Returns true for kinds that target a specific member identity.
    pub fn is_membership(&self) -> bool {
        !self.is_scalar()
    }

    /// Stable name for logs and interop.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::AddMember => "AddMember",
            ActionKind::DeleteMember => "DeleteMember",
            ActionKind::ModifyMemberRole => "ModifyMemberRole",
            ActionKind::ModifyMemberProfileKey => "ModifyMemberProfileKey",
            ActionKind::AddPendingMember => "AddPendingMember",
            ActionKind::DeletePendingMember => "DeletePendingMember",
            ActionKind::PromotePendingMember => "PromotePendingMember",
            ActionKind::ModifyTitle => "ModifyTitle",
            ActionKind::ModifyAvatar => "ModifyAvatar",
            ActionKind::ModifyDisappearingTimer => "ModifyDisappearingTimer",
            ActionKind::ModifyAttributesAccess => "ModifyAttributesAccess",
            ActionKind::ModifyMemberAccess => "ModifyMemberAccess",
            ActionKind::ModifyInviteLinkAccess => "ModifyInviteLinkAccess",
            ActionKind::AddRequestingMember => "AddRequestingMember",
            ActionKind::DeleteRequestingMember => "DeleteRequestingMember",
            ActionKind::PromoteRequestingMember => "PromoteRequestingMember",
            ActionKind::ModifyInviteLinkPassword => "ModifyInviteLinkPassword",
        }
    }
}

impl TryFrom<u32> for ActionKind {
    type Error = ChangeError;

    fn try_from(field: u32) -> Result<Self, Self::Error> {
        ActionKind::from_field_number(field).ok_or(ChangeError::UnknownFieldNumber(field))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.field_number())
    }
}

// ---------------------------------------------------------------------------
// Plaintext payload types
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewMember {
    pub id: MemberId,
    pub role: Role,
    pub profile_key: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoleChange {
    pub id: MemberId,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProfileKeyChange {
    pub id: MemberId,
    pub profile_key: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewPendingMember {
    pub id: MemberId,
    pub role: Role,
}

/// A pending invite being accepted into full membership.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PromotedMember {
    pub id: MemberId,
    pub profile_key: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewRequestingMember {
    pub id: MemberId,
    pub profile_key: Vec<u8>,
}

/// A join request being approved, with the role it is approved into.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ApprovedMember {
    pub id: MemberId,
    pub role: Role,
}

impl From<NewMember> for PromotedMember {
    fn from(member: NewMember) -> Self {
        PromotedMember {
            id: member.id,
            profile_key: member.profile_key,
        }
    }
}

impl From<NewRequestingMember> for PromotedMember {
    fn from(member: NewRequestingMember) -> Self {
        PromotedMember {
            id: member.id,
            profile_key: member.profile_key,
        }
    }
}

// ---------------------------------------------------------------------------
// OpaqueAction
// ---------------------------------------------------------------------------

/// One encrypted action as stored by the server. Indivisible.
///
/// The bytes carry the member presentation (or encrypted setting value) the
/// server verifies. An add-member presentation is also a valid
/// promote-pending-member presentation, so converting an action between those
/// kinds moves the token unchanged.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Default)]
pub struct OpaqueAction(pub Vec<u8>);

impl OpaqueAction {
    pub fn new(bytes: Vec<u8>) -> Self {
        OpaqueAction(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for OpaqueAction {
    fn from(bytes: Vec<u8>) -> Self {
        OpaqueAction(bytes)
    }
}

impl From<&[u8]> for OpaqueAction {
    fn from(bytes: &[u8]) -> Self {
        OpaqueAction(bytes.to_vec())
    }
}

impl fmt::Debug for OpaqueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.0[..self.0.len().min(4)];
        write!(f, "OpaqueAction({} bytes, {}..)", self.0.len(), hex::encode(prefix))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_numbers_are_contiguous_and_ordered() {
        for (i, kind) in ActionKind::ALL.iter().enumerate() {
            assert_eq!(kind.field_number(), i as u32 + 3);
        }
    }

    #[test]
    fn test_from_field_number() {
        assert_eq!(ActionKind::from_field_number(3), Some(ActionKind::AddMember));
        assert_eq!(
            ActionKind::from_field_number(9),
            Some(ActionKind::PromotePendingMember)
        );
        assert_eq!(
            ActionKind::from_field_number(19),
            Some(ActionKind::ModifyInviteLinkPassword)
        );
        assert_eq!(ActionKind::from_field_number(2), None);
        assert_eq!(ActionKind::from_field_number(20), None);
    }

    #[test]
    fn test_try_from_unknown_field() {
        match ActionKind::try_from(42) {
            Err(ChangeError::UnknownFieldNumber(42)) => {}
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(ActionKind::try_from(16).unwrap(), ActionKind::AddRequestingMember);
    }

    #[test]
    fn test_scalar_classification() {
        let scalar: Vec<_> = ActionKind::ALL.iter().filter(|k| k.is_scalar()).collect();
        assert_eq!(scalar.len(), 7);
        assert!(ActionKind::ModifyInviteLinkPassword.is_scalar());
        assert!(!ActionKind::PromoteRequestingMember.is_scalar());
        assert!(ActionKind::DeletePendingMember.is_membership());
    }

    #[test]
    fn test_display_includes_field_number() {
        assert_eq!(ActionKind::ModifyTitle.to_string(), "ModifyTitle(10)");
    }

    #[test]
    fn test_conversions_to_promoted_member() {
        let id = MemberId::from_bytes([5; 16]);
        let promoted: PromotedMember = NewMember {
            id,
            role: Role::Administrator,
            profile_key: b"pk".to_vec(),
        }
        .into();
        assert_eq!(promoted.id, id);
        assert_eq!(promoted.profile_key, b"pk".to_vec());

        let promoted: PromotedMember = NewRequestingMember {
            id,
            profile_key: b"pk2".to_vec(),
        }
        .into();
        assert_eq!(promoted.profile_key, b"pk2".to_vec());
    }

    #[test]
    fn test_opaque_action_debug_is_truncated() {
        let action = OpaqueAction::from(vec![0xde, 0xad, 0xbe, 0xef, 0x01, 0x02]);
        assert_eq!(format!("{:?}", action), "OpaqueAction(6 bytes, deadbeef..)");
        assert_eq!(action.len(), 6);
        assert!(!action.is_empty());
    }
}
