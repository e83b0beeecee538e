/// Group change sets in their three forms.
///
/// - `GroupChange`: the plaintext, i.e. what each action means.
/// - `OpaqueChange`: what the server stores, one `OpaqueAction` per action,
///   laid out exactly like the plaintext (same kinds, same lengths, same order).
/// - `PairedChange`: both zipped together per action. Built once from the two
///   halves with `PairedChange::pair`, which is where misalignment is caught;
///   afterwards the halves cannot drift apart.
///
/// Emptiness: a change is empty iff all 17 kinds report a zero count.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::groups::actions::{
    ActionKind, ApprovedMember, NewMember, NewPendingMember, NewRequestingMember, OpaqueAction,
    ProfileKeyChange, PromotedMember, RoleChange,
};
use crate::groups::ids::MemberId;
use crate::groups::snapshot::AccessLevel;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ChangeError {
    #[error("Plaintext and opaque change disagree on {kind}: {plaintext} vs {opaque} actions")]
    Misaligned {
        kind: ActionKind,
        plaintext: usize,
        opaque: usize,
    },

    #[error("Unknown action field number: {0}")]
    UnknownFieldNumber(u32),

    #[error("Group revision counter exhausted at {0}")]
    RevisionExhausted(u32),

    #[error("Encoded change exceeds max size ({size} > {max})")]
    EncodedTooLarge { size: usize, max: usize },

    #[error("CBOR encoding failed: {0}")]
    CborEncode(String),

    #[error("CBOR decoding failed: {0}")]
    CborDecode(String),
}

// ---------------------------------------------------------------------------
// GroupChange (plaintext)
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupChange {
    pub add_members: Vec<NewMember>,
    pub delete_members: Vec<MemberId>,
    pub modify_member_roles: Vec<RoleChange>,
    pub modify_profile_keys: Vec<ProfileKeyChange>,
    pub add_pending_members: Vec<NewPendingMember>,
    pub delete_pending_members: Vec<MemberId>,
    pub promote_pending_members: Vec<PromotedMember>,
    pub new_title: Option<String>,
    pub new_avatar: Option<String>,
    pub new_timer_secs: Option<u32>,
    pub new_attributes_access: Option<AccessLevel>,
    pub new_member_access: Option<AccessLevel>,
    pub new_invite_link_access: Option<AccessLevel>,
    pub add_requesting_members: Vec<NewRequestingMember>,
    pub delete_requesting_members: Vec<MemberId>,
    pub promote_requesting_members: Vec<ApprovedMember>,
    pub new_invite_link_password: Option<Vec<u8>>,
}

impl GroupChange {
    /// Number of actions of `kind` (0 or 1 for scalar kinds).
    pub fn count(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::AddMember => self.add_members.len(),
            ActionKind::DeleteMember => self.delete_members.len(),
            ActionKind::ModifyMemberRole => self.modify_member_roles.len(),
            ActionKind::ModifyMemberProfileKey => self.modify_profile_keys.len(),
            ActionKind::AddPendingMember => self.add_pending_members.len(),
            ActionKind::DeletePendingMember => self.delete_pending_members.len(),
            ActionKind::PromotePendingMember => self.promote_pending_members.len(),
            ActionKind::ModifyTitle => presence(&self.new_title),
            ActionKind::ModifyAvatar => presence(&self.new_avatar),
            ActionKind::ModifyDisappearingTimer => presence(&self.new_timer_secs),
            ActionKind::ModifyAttributesAccess => presence(&self.new_attributes_access),
            ActionKind::ModifyMemberAccess => presence(&self.new_member_access),
            ActionKind::ModifyInviteLinkAccess => presence(&self.new_invite_link_access),
            ActionKind::AddRequestingMember => self.add_requesting_members.len(),
            ActionKind::DeleteRequestingMember => self.delete_requesting_members.len(),
            ActionKind::PromoteRequestingMember => self.promote_requesting_members.len(),
            ActionKind::ModifyInviteLinkPassword => presence(&self.new_invite_link_password),
        }
    }

    /// True iff there are no actions of any kind.
    pub fn is_empty(&self) -> bool {
        all_kinds_empty(|kind| self.count(kind))
    }
}

// ---------------------------------------------------------------------------
// OpaqueChange
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OpaqueChange {
    /// Revision this change is submitted for (base revision + 1).
    pub revision: u32,
    pub add_members: Vec<OpaqueAction>,
    pub delete_members: Vec<OpaqueAction>,
    pub modify_member_roles: Vec<OpaqueAction>,
    pub modify_profile_keys: Vec<OpaqueAction>,
    pub add_pending_members: Vec<OpaqueAction>,
    pub delete_pending_members: Vec<OpaqueAction>,
    pub promote_pending_members: Vec<OpaqueAction>,
    pub modify_title: Option<OpaqueAction>,
    pub modify_avatar: Option<OpaqueAction>,
    pub modify_disappearing_timer: Option<OpaqueAction>,
    pub modify_attributes_access: Option<OpaqueAction>,
    pub modify_member_access: Option<OpaqueAction>,
    pub modify_invite_link_access: Option<OpaqueAction>,
    pub add_requesting_members: Vec<OpaqueAction>,
    pub delete_requesting_members: Vec<OpaqueAction>,
    pub promote_requesting_members: Vec<OpaqueAction>,
    pub modify_invite_link_password: Option<OpaqueAction>,
}

impl OpaqueChange {
    /// The actions of `kind`, in order.
    pub fn actions(&self, kind: ActionKind) -> Vec<&OpaqueAction> {
        match kind {
            ActionKind::AddMember => self.add_members.iter().collect(),
            ActionKind::DeleteMember => self.delete_members.iter().collect(),
            ActionKind::ModifyMemberRole => self.modify_member_roles.iter().collect(),
            ActionKind::ModifyMemberProfileKey => self.modify_profile_keys.iter().collect(),
            ActionKind::AddPendingMember => self.add_pending_members.iter().collect(),
            ActionKind::DeletePendingMember => self.delete_pending_members.iter().collect(),
            ActionKind::PromotePendingMember => self.promote_pending_members.iter().collect(),
            ActionKind::ModifyTitle => self.modify_title.iter().collect(),
            ActionKind::ModifyAvatar => self.modify_avatar.iter().collect(),
            ActionKind::ModifyDisappearingTimer => self.modify_disappearing_timer.iter().collect(),
            ActionKind::ModifyAttributesAccess => self.modify_attributes_access.iter().collect(),
            ActionKind::ModifyMemberAccess => self.modify_member_access.iter().collect(),
            ActionKind::ModifyInviteLinkAccess => self.modify_invite_link_access.iter().collect(),
            ActionKind::AddRequestingMember => self.add_requesting_members.iter().collect(),
            ActionKind::DeleteRequestingMember => self.delete_requesting_members.iter().collect(),
            ActionKind::PromoteRequestingMember => {
                self.promote_requesting_members.iter().collect()
            }
            ActionKind::ModifyInviteLinkPassword => {
                self.modify_invite_link_password.iter().collect()
            }
        }
    }

    /// Number of actions of `kind` (0 or 1 for scalar kinds).
    pub fn count(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::AddMember => self.add_members.len(),
            ActionKind::DeleteMember => self.delete_members.len(),
            ActionKind::ModifyMemberRole => self.modify_member_roles.len(),
            ActionKind::ModifyMemberProfileKey => self.modify_profile_keys.len(),
            ActionKind::AddPendingMember => self.add_pending_members.len(),
            ActionKind::DeletePendingMember => self.delete_pending_members.len(),
            ActionKind::PromotePendingMember => self.promote_pending_members.len(),
            ActionKind::ModifyTitle => presence(&self.modify_title),
            ActionKind::ModifyAvatar => presence(&self.modify_avatar),
            ActionKind::ModifyDisappearingTimer => presence(&self.modify_disappearing_timer),
            ActionKind::ModifyAttributesAccess => presence(&self.modify_attributes_access),
            ActionKind::ModifyMemberAccess => presence(&self.modify_member_access),
            ActionKind::ModifyInviteLinkAccess => presence(&self.modify_invite_link_access),
            ActionKind::AddRequestingMember => self.add_requesting_members.len(),
            ActionKind::DeleteRequestingMember => self.delete_requesting_members.len(),
            ActionKind::PromoteRequestingMember => self.promote_requesting_members.len(),
            ActionKind::ModifyInviteLinkPassword => presence(&self.modify_invite_link_password),
        }
    }

    /// True iff there are no actions of any kind.
    pub fn is_empty(&self) -> bool {
        all_kinds_empty(|kind| self.count(kind))
    }
}

/// True iff `change` carries no actions; nothing left worth submitting.
pub fn change_is_empty(change: &OpaqueChange) -> bool {
    change.is_empty()
}

// ---------------------------------------------------------------------------
// PairedChange
// ---------------------------------------------------------------------------

/// One action: its plaintext meaning and its opaque token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Paired<S> {
    pub semantic: S,
    pub opaque: OpaqueAction,
}

impl<S> Paired<S> {
    pub fn new(semantic: S, opaque: OpaqueAction) -> Self {
        Paired { semantic, opaque }
    }

    /// Same opaque token, different plaintext meaning (used by kind conversions).
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Paired<T> {
        Paired {
            semantic: f(self.semantic),
            opaque: self.opaque,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PairedChange {
    pub revision: u32,
    pub add_members: Vec<Paired<NewMember>>,
    pub delete_members: Vec<Paired<MemberId>>,
    pub modify_member_roles: Vec<Paired<RoleChange>>,
    pub modify_profile_keys: Vec<Paired<ProfileKeyChange>>,
    pub add_pending_members: Vec<Paired<NewPendingMember>>,
    pub delete_pending_members: Vec<Paired<MemberId>>,
    pub promote_pending_members: Vec<Paired<PromotedMember>>,
    pub new_title: Option<Paired<String>>,
    pub new_avatar: Option<Paired<String>>,
    pub new_timer_secs: Option<Paired<u32>>,
    pub new_attributes_access: Option<Paired<AccessLevel>>,
    pub new_member_access: Option<Paired<AccessLevel>>,
    pub new_invite_link_access: Option<Paired<AccessLevel>>,
    pub add_requesting_members: Vec<Paired<NewRequestingMember>>,
    pub delete_requesting_members: Vec<Paired<MemberId>>,
    pub promote_requesting_members: Vec<Paired<ApprovedMember>>,
    pub new_invite_link_password: Option<Paired<Vec<u8>>>,
}

impl PairedChange {
    /// Zip the plaintext and opaque halves of a change, action by action.
    ///
    /// The two halves must have been produced together: same kinds, same
    /// lengths, same order. A length mismatch in any kind is reported as
    /// `ChangeError::Misaligned` for the first offending kind in wire order;
    /// nothing is truncated or padded.
    pub fn pair(plaintext: GroupChange, opaque: OpaqueChange) -> Result<Self, ChangeError> {
        Ok(PairedChange {
            revision: opaque.revision,
            add_members: zip_list(ActionKind::AddMember, plaintext.add_members, opaque.add_members)?,
            delete_members: zip_list(
                ActionKind::DeleteMember,
                plaintext.delete_members,
                opaque.delete_members,
            )?,
            modify_member_roles: zip_list(
                ActionKind::ModifyMemberRole,
                plaintext.modify_member_roles,
                opaque.modify_member_roles,
            )?,
            modify_profile_keys: zip_list(
                ActionKind::ModifyMemberProfileKey,
                plaintext.modify_profile_keys,
                opaque.modify_profile_keys,
            )?,
            add_pending_members: zip_list(
                ActionKind::AddPendingMember,
                plaintext.add_pending_members,
                opaque.add_pending_members,
            )?,
            delete_pending_members: zip_list(
                ActionKind::DeletePendingMember,
                plaintext.delete_pending_members,
                opaque.delete_pending_members,
            )?,
            promote_pending_members: zip_list(
                ActionKind::PromotePendingMember,
                plaintext.promote_pending_members,
                opaque.promote_pending_members,
            )?,
            new_title: zip_scalar(ActionKind::ModifyTitle, plaintext.new_title, opaque.modify_title)?,
            new_avatar: zip_scalar(
                ActionKind::ModifyAvatar,
                plaintext.new_avatar,
                opaque.modify_avatar,
            )?,
            new_timer_secs: zip_scalar(
                ActionKind::ModifyDisappearingTimer,
                plaintext.new_timer_secs,
                opaque.modify_disappearing_timer,
            )?,
            new_attributes_access: zip_scalar(
                ActionKind::ModifyAttributesAccess,
                plaintext.new_attributes_access,
                opaque.modify_attributes_access,
            )?,
            new_member_access: zip_scalar(
                ActionKind::ModifyMemberAccess,
                plaintext.new_member_access,
                opaque.modify_member_access,
            )?,
            new_invite_link_access: zip_scalar(
                ActionKind::ModifyInviteLinkAccess,
                plaintext.new_invite_link_access,
                opaque.modify_invite_link_access,
            )?,
            add_requesting_members: zip_list(
                ActionKind::AddRequestingMember,
                plaintext.add_requesting_members,
                opaque.add_requesting_members,
            )?,
            delete_requesting_members: zip_list(
                ActionKind::DeleteRequestingMember,
                plaintext.delete_requesting_members,
                opaque.delete_requesting_members,
            )?,
            promote_requesting_members: zip_list(
                ActionKind::PromoteRequestingMember,
                plaintext.promote_requesting_members,
                opaque.promote_requesting_members,
            )?,
            new_invite_link_password: zip_scalar(
                ActionKind::ModifyInviteLinkPassword,
                plaintext.new_invite_link_password,
                opaque.modify_invite_link_password,
            )?,
        })
    }

    /// Split back into the plaintext and opaque halves.
    pub fn into_parts(self) -> (GroupChange, OpaqueChange) {
        let (add_members, opaque_add_members) = unzip_list(self.add_members);
        let (delete_members, opaque_delete_members) = unzip_list(self.delete_members);
        let (modify_member_roles, opaque_modify_member_roles) =
            unzip_list(self.modify_member_roles);
        let (modify_profile_keys, opaque_modify_profile_keys) =
            unzip_list(self.modify_profile_keys);
        let (add_pending_members, opaque_add_pending_members) =
            unzip_list(self.add_pending_members);
        let (delete_pending_members, opaque_delete_pending_members) =
            unzip_list(self.delete_pending_members);
        let (promote_pending_members, opaque_promote_pending_members) =
            unzip_list(self.promote_pending_members);
        let (new_title, modify_title) = unzip_scalar(self.new_title);
        let (new_avatar, modify_avatar) = unzip_scalar(self.new_avatar);
        let (new_timer_secs, modify_disappearing_timer) = unzip_scalar(self.new_timer_secs);
        let (new_attributes_access, modify_attributes_access) =
            unzip_scalar(self.new_attributes_access);
        let (new_member_access, modify_member_access) = unzip_scalar(self.new_member_access);
        let (new_invite_link_access, modify_invite_link_access) =
            unzip_scalar(self.new_invite_link_access);
        let (add_requesting_members, opaque_add_requesting_members) =
            unzip_list(self.add_requesting_members);
        let (delete_requesting_members, opaque_delete_requesting_members) =
            unzip_list(self.delete_requesting_members);
        let (promote_requesting_members, opaque_promote_requesting_members) =
            unzip_list(self.promote_requesting_members);
        let (new_invite_link_password, modify_invite_link_password) =
            unzip_scalar(self.new_invite_link_password);

        let plaintext = GroupChange {
            add_members,
            delete_members,
            modify_member_roles,
            modify_profile_keys,
            add_pending_members,
            delete_pending_members,
            promote_pending_members,
            new_title,
            new_avatar,
            new_timer_secs,
            new_attributes_access,
            new_member_access,
            new_invite_link_access,
            add_requesting_members,
            delete_requesting_members,
            promote_requesting_members,
            new_invite_link_password,
        };

        let opaque = OpaqueChange {
            revision: self.revision,
            add_members: opaque_add_members,
            delete_members: opaque_delete_members,
            modify_member_roles: opaque_modify_member_roles,
            modify_profile_keys: opaque_modify_profile_keys,
            add_pending_members: opaque_add_pending_members,
            delete_pending_members: opaque_delete_pending_members,
            promote_pending_members: opaque_promote_pending_members,
            modify_title,
            modify_avatar,
            modify_disappearing_timer,
            modify_attributes_access,
            modify_member_access,
            modify_invite_link_access,
            add_requesting_members: opaque_add_requesting_members,
            delete_requesting_members: opaque_delete_requesting_members,
            promote_requesting_members: opaque_promote_requesting_members,
            modify_invite_link_password,
        };

        (plaintext, opaque)
    }

    pub fn into_plaintext(self) -> GroupChange {
        self.into_parts().0
    }

    pub fn into_opaque(self) -> OpaqueChange {
        self.into_parts().1
    }

    /// Number of actions of `kind` (0 or 1 for scalar kinds).
    pub fn count(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::AddMember => self.add_members.len(),
            ActionKind::DeleteMember => self.delete_members.len(),
            ActionKind::ModifyMemberRole => self.modify_member_roles.len(),
            ActionKind::ModifyMemberProfileKey => self.modify_profile_keys.len(),
            ActionKind::AddPendingMember => self.add_pending_members.len(),
            ActionKind::DeletePendingMember => self.delete_pending_members.len(),
            ActionKind::PromotePendingMember => self.promote_pending_members.len(),
            ActionKind::ModifyTitle => presence(&self.new_title),
            ActionKind::ModifyAvatar => presence(&self.new_avatar),
            ActionKind::ModifyDisappearingTimer => presence(&self.new_timer_secs),
            ActionKind::ModifyAttributesAccess => presence(&self.new_attributes_access),
            ActionKind::ModifyMemberAccess => presence(&self.new_member_access),
            ActionKind::ModifyInviteLinkAccess => presence(&self.new_invite_link_access),
            ActionKind::AddRequestingMember => self.add_requesting_members.len(),
            ActionKind::DeleteRequestingMember => self.delete_requesting_members.len(),
            ActionKind::PromoteRequestingMember => self.promote_requesting_members.len(),
            ActionKind::ModifyInviteLinkPassword => presence(&self.new_invite_link_password),
        }
    }

    /// True iff there are no actions of any kind.
    pub fn is_empty(&self) -> bool {
        all_kinds_empty(|kind| self.count(kind))
    }

    /// Total number of actions across all kinds.
    pub fn total_actions(&self) -> usize {
        ActionKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn presence<T>(value: &Option<T>) -> usize {
    usize::from(value.is_some())
}

fn all_kinds_empty(count: impl Fn(ActionKind) -> usize) -> bool {
    ActionKind::ALL.iter().all(|kind| count(*kind) == 0)
}

fn zip_list<S>(
    kind: ActionKind,
    semantic: Vec<S>,
    opaque: Vec<OpaqueAction>,
) -> Result<Vec<Paired<S>>, ChangeError> {
    if semantic.len() != opaque.len() {
        log::warn!(
            "Misaligned change: {} has {} plaintext vs {} opaque actions",
            kind,
            semantic.len(),
            opaque.len()
        );
        return Err(ChangeError::Misaligned {
            kind,
            plaintext: semantic.len(),
            opaque: opaque.len(),
        });
    }

    Ok(semantic
        .into_iter()
        .zip(opaque)
        .map(|(semantic, opaque)| Paired { semantic, opaque })
        .collect())
}

fn zip_scalar<S>(
    kind: ActionKind,
    semantic: Option<S>,
    opaque: Option<OpaqueAction>,
) -> Result<Option<Paired<S>>, ChangeError> {
    match (semantic, opaque) {
        (Some(semantic), Some(opaque)) => Ok(Some(Paired { semantic, opaque })),
        (None, None) => Ok(None),
        (semantic, opaque) => {
            log::warn!("Misaligned change: {} present on one side only", kind);
            Err(ChangeError::Misaligned {
                kind,
                plaintext: presence(&semantic),
                opaque: presence(&opaque),
            })
        }
    }
}

fn unzip_list<S>(entries: Vec<Paired<S>>) -> (Vec<S>, Vec<OpaqueAction>) {
    entries
        .into_iter()
        .map(|entry| (entry.semantic, entry.opaque))
        .unzip()
}

fn unzip_scalar<S>(entry: Option<Paired<S>>) -> (Option<S>, Option<OpaqueAction>) {
    match entry {
        Some(entry) => (Some(entry.semantic), Some(entry.opaque)),
        None => (None, None),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::snapshot::Role;

    fn id(n: u8) -> MemberId {
        MemberId::from_bytes([n; 16])
    }

    fn token(tag: &str) -> OpaqueAction {
        OpaqueAction::from(tag.as_bytes())
    }

    /// A change with one action of every kind, in both halves.
    fn full_change() -> (GroupChange, OpaqueChange) {
        let plaintext = GroupChange {
            add_members: vec![NewMember {
                id: id(1),
                role: Role::Default,
                profile_key: b"pk1".to_vec(),
            }],
            delete_members: vec![id(2)],
            modify_member_roles: vec![RoleChange {
                id: id(3),
                role: Role::Administrator,
            }],
            modify_profile_keys: vec![ProfileKeyChange {
                id: id(4),
                profile_key: b"pk4".to_vec(),
            }],
            add_pending_members: vec![NewPendingMember {
                id: id(5),
                role: Role::Default,
            }],
            delete_pending_members: vec![id(6)],
            promote_pending_members: vec![PromotedMember {
                id: id(7),
                profile_key: b"pk7".to_vec(),
            }],
            new_title: Some("Title".into()),
            new_avatar: Some("cdn/avatar".into()),
            new_timer_secs: Some(3600),
            new_attributes_access: Some(AccessLevel::Administrator),
            new_member_access: Some(AccessLevel::Administrator),
            new_invite_link_access: Some(AccessLevel::Any),
            add_requesting_members: vec![NewRequestingMember {
                id: id(8),
                profile_key: b"pk8".to_vec(),
            }],
            delete_requesting_members: vec![id(9)],
            promote_requesting_members: vec![ApprovedMember {
                id: id(10),
                role: Role::Default,
            }],
            new_invite_link_password: Some(b"secret".to_vec()),
        };

        let opaque = OpaqueChange {
            revision: 12,
            add_members: vec![token("f3")],
            delete_members: vec![token("f4")],
            modify_member_roles: vec![token("f5")],
            modify_profile_keys: vec![token("f6")],
            add_pending_members: vec![token("f7")],
            delete_pending_members: vec![token("f8")],
            promote_pending_members: vec![token("f9")],
            modify_title: Some(token("f10")),
            modify_avatar: Some(token("f11")),
            modify_disappearing_timer: Some(token("f12")),
            modify_attributes_access: Some(token("f13")),
            modify_member_access: Some(token("f14")),
            modify_invite_link_access: Some(token("f15")),
            add_requesting_members: vec![token("f16")],
            delete_requesting_members: vec![token("f17")],
            promote_requesting_members: vec![token("f18")],
            modify_invite_link_password: Some(token("f19")),
        };

        (plaintext, opaque)
    }

    #[test]
    fn test_default_changes_are_empty() {
        assert!(GroupChange::default().is_empty());
        assert!(OpaqueChange::default().is_empty());
        assert!(PairedChange::default().is_empty());
        assert!(change_is_empty(&OpaqueChange::default()));
    }

    #[test]
    fn test_every_kind_defeats_emptiness() {
        let (_, full) = full_change();
        for kind in ActionKind::ALL {
            // Keep only `kind` by rebuilding a change with that one kind populated.
            let mut single = OpaqueChange::default();
            match kind {
                ActionKind::AddMember => single.add_members = full.add_members.clone(),
                ActionKind::DeleteMember => single.delete_members = full.delete_members.clone(),
                ActionKind::ModifyMemberRole => {
                    single.modify_member_roles = full.modify_member_roles.clone()
                }
                ActionKind::ModifyMemberProfileKey => {
                    single.modify_profile_keys = full.modify_profile_keys.clone()
                }
                ActionKind::AddPendingMember => {
                    single.add_pending_members = full.add_pending_members.clone()
                }
                ActionKind::DeletePendingMember => {
                    single.delete_pending_members = full.delete_pending_members.clone()
                }
                ActionKind::PromotePendingMember => {
                    single.promote_pending_members = full.promote_pending_members.clone()
                }
                ActionKind::ModifyTitle => single.modify_title = full.modify_title.clone(),
                ActionKind::ModifyAvatar => single.modify_avatar = full.modify_avatar.clone(),
                ActionKind::ModifyDisappearingTimer => {
                    single.modify_disappearing_timer = full.modify_disappearing_timer.clone()
                }
                ActionKind::ModifyAttributesAccess => {
                    single.modify_attributes_access = full.modify_attributes_access.clone()
                }
                ActionKind::ModifyMemberAccess => {
                    single.modify_member_access = full.modify_member_access.clone()
                }
                ActionKind::ModifyInviteLinkAccess => {
                    single.modify_invite_link_access = full.modify_invite_link_access.clone()
                }
                ActionKind::AddRequestingMember => {
                    single.add_requesting_members = full.add_requesting_members.clone()
                }
                ActionKind::DeleteRequestingMember => {
                    single.delete_requesting_members = full.delete_requesting_members.clone()
                }
                ActionKind::PromoteRequestingMember => {
                    single.promote_requesting_members = full.promote_requesting_members.clone()
                }
                ActionKind::ModifyInviteLinkPassword => {
                    single.modify_invite_link_password = full.modify_invite_link_password.clone()
                }
            }
            assert!(!single.is_empty(), "{} alone should make the change non-empty", kind);
            assert_eq!(single.count(kind), 1);
            assert_eq!(
                ActionKind::ALL.iter().map(|k| single.count(*k)).sum::<usize>(),
                1
            );
        }
    }

    #[test]
    fn test_revision_alone_does_not_count() {
        let change = OpaqueChange {
            revision: 99,
            ..Default::default()
        };
        assert!(change.is_empty());
    }

    #[test]
    fn test_pair_and_split_preserves_both_halves() {
        let (plaintext, opaque) = full_change();
        let paired = PairedChange::pair(plaintext.clone(), opaque.clone()).unwrap();

        assert_eq!(paired.revision, 12);
        assert_eq!(paired.total_actions(), 17);
        for kind in ActionKind::ALL {
            assert_eq!(paired.count(kind), plaintext.count(kind));
            assert_eq!(paired.count(kind), opaque.count(kind));
        }
        assert_eq!(paired.add_members[0].opaque, token("f3"));
        assert_eq!(paired.new_title.as_ref().unwrap().semantic, "Title");

        let (plaintext_back, opaque_back) = paired.into_parts();
        assert_eq!(plaintext_back, plaintext);
        assert_eq!(opaque_back, opaque);
    }

    #[test]
    fn test_pair_rejects_list_length_mismatch() {
        let (plaintext, mut opaque) = full_change();
        opaque.delete_pending_members.push(token("extra"));

        match PairedChange::pair(plaintext, opaque) {
            Err(ChangeError::Misaligned {
                kind,
                plaintext,
                opaque,
            }) => {
                assert_eq!(kind, ActionKind::DeletePendingMember);
                assert_eq!(plaintext, 1);
                assert_eq!(opaque, 2);
            }
            other => panic!("expected Misaligned, got {:?}", other),
        }
    }

    #[test]
    fn test_pair_rejects_scalar_on_one_side() {
        let (mut plaintext, opaque) = full_change();
        plaintext.new_avatar = None;

        match PairedChange::pair(plaintext, opaque) {
            Err(ChangeError::Misaligned {
                kind,
                plaintext,
                opaque,
            }) => {
                assert_eq!(kind, ActionKind::ModifyAvatar);
                assert_eq!((plaintext, opaque), (0, 1));
            }
            other => panic!("expected Misaligned, got {:?}", other),
        }
    }

    #[test]
    fn test_pair_accepts_large_aligned_kind() {
        let ids: Vec<MemberId> = (0..5_000).map(|_| MemberId::random()).collect();
        let plaintext = GroupChange {
            delete_members: ids.clone(),
            ..Default::default()
        };
        let opaque = OpaqueChange {
            delete_members: vec![token("t"); 5_000],
            ..Default::default()
        };

        let paired = PairedChange::pair(plaintext, opaque).unwrap();
        assert_eq!(paired.delete_members.len(), 5_000);
        assert_eq!(paired.delete_members[4_999].semantic, ids[4_999]);
    }

    #[test]
    fn test_misaligned_error_message_names_kind() {
        let err = ChangeError::Misaligned {
            kind: ActionKind::AddMember,
            plaintext: 2,
            opaque: 1,
        };
        assert_eq!(
            err.to_string(),
            "Plaintext and opaque change disagree on AddMember(3): 2 vs 1 actions"
        );
    }

    #[test]
    fn test_opaque_actions_accessor() {
        let (_, opaque) = full_change();
        assert_eq!(opaque.actions(ActionKind::ModifyTitle), vec![&token("f10")]);
        assert_eq!(opaque.actions(ActionKind::AddMember), vec![&token("f3")]);
        assert!(OpaqueChange::default()
            .actions(ActionKind::ModifyInviteLinkPassword)
            .is_empty());
    }

    #[test]
    fn test_paired_map_keeps_token() {
        let paired = Paired::new(
            NewMember {
                id: id(1),
                role: Role::Default,
                profile_key: b"pk".to_vec(),
            },
            token("p1"),
        );
        let promoted = paired.map(PromotedMember::from);
        assert_eq!(promoted.opaque, token("p1"));
        assert_eq!(promoted.semantic.id, id(1));
    }
}
