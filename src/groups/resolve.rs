/// Conflict resolver: rebase a pending change onto a newer group snapshot.
///
/// Last writer wins, field by field:
/// - Settings (title, avatar, timer, access levels) are carried forward only
///   if they still differ from the snapshot.
/// - Membership actions are carried forward only if they still do something:
///   adding someone already in the group, or removing someone already gone,
///   is dropped.
/// - Adding someone (directly or by join request) who was invited in the
///   meantime becomes a promotion of that invite. The opaque token moves to
///   the promote-pending list unchanged.
/// - The invite-link password is always carried forward.
///
/// Every kind is decided by its own function against the same
/// `MembershipIndex`. Surviving actions keep their relative order. The
/// promote-pending list is rebuilt as: join-request conversions (in original
/// order), then the promotions the change already had, then add-member
/// conversions (last action first).

use crate::groups::actions::{ActionKind, NewMember, NewRequestingMember, PromotedMember};
use crate::groups::change::{ChangeError, GroupChange, OpaqueChange, Paired, PairedChange};
use crate::groups::index::MembershipIndex;
use crate::groups::snapshot::GroupSnapshot;

// ---------------------------------------------------------------------------
// ResolveStats
// ---------------------------------------------------------------------------

/// What a resolution pass did to a change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Actions removed as no longer applicable.
    pub dropped: usize,
    /// Add actions turned into pending-member promotions.
    pub converted: usize,
}

impl ResolveStats {
    /// True if the change came through untouched.
    pub fn is_unchanged(&self) -> bool {
        self.dropped == 0 && self.converted == 0
    }
}

// ---------------------------------------------------------------------------
// ConflictResolver
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ConflictResolver<'a> {
    snapshot: &'a GroupSnapshot,
    index: MembershipIndex<'a>,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(snapshot: &'a GroupSnapshot) -> Self {
        ConflictResolver {
            snapshot,
            index: MembershipIndex::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> &'a GroupSnapshot {
        self.snapshot
    }

    /// Rebase `change` onto the snapshot. The result may be empty.
    pub fn resolve(&self, change: PairedChange) -> PairedChange {
        self.resolve_with_stats(change).0
    }

    /// Same as `resolve`, also reporting how many actions were dropped or converted.
    pub fn resolve_with_stats(&self, change: PairedChange) -> (PairedChange, ResolveStats) {
        let mut stats = ResolveStats::default();
        let snapshot = self.snapshot;
        let index = &self.index;

        // Full membership (fields 3-6)
        let (add_members, promoted_adds) = self.resolve_add_members(change.add_members, &mut stats);
        let delete_members = keep_where(
            ActionKind::DeleteMember,
            change.delete_members,
            &mut stats,
            |id| index.is_full_member(id),
        );
        let modify_member_roles = keep_where(
            ActionKind::ModifyMemberRole,
            change.modify_member_roles,
            &mut stats,
            |c| index.full_member(&c.id).is_some_and(|m| m.role != c.role),
        );
        let modify_profile_keys = keep_where(
            ActionKind::ModifyMemberProfileKey,
            change.modify_profile_keys,
            &mut stats,
            |c| {
                index
                    .full_member(&c.id)
                    .is_some_and(|m| m.profile_key != c.profile_key)
            },
        );

        // Invites (fields 7-9)
        let add_pending_members = keep_where(
            ActionKind::AddPendingMember,
            change.add_pending_members,
            &mut stats,
            |m| !index.is_full_member(&m.id) && !index.is_pending_member(&m.id),
        );
        let delete_pending_members = keep_where(
            ActionKind::DeletePendingMember,
            change.delete_pending_members,
            &mut stats,
            |id| index.is_pending_member(id),
        );
        let kept_promotions = keep_where(
            ActionKind::PromotePendingMember,
            change.promote_pending_members,
            &mut stats,
            |m| index.is_pending_member(&m.id),
        );

        // Settings (fields 10-15)
        let new_title = clear_if_unchanged(
            ActionKind::ModifyTitle,
            change.new_title,
            &snapshot.title,
            &mut stats,
        );
        let new_avatar = clear_if_unchanged(
            ActionKind::ModifyAvatar,
            change.new_avatar,
            &snapshot.avatar,
            &mut stats,
        );
        let new_timer_secs = clear_if_unchanged(
            ActionKind::ModifyDisappearingTimer,
            change.new_timer_secs,
            &snapshot.disappearing_timer_secs,
            &mut stats,
        );
        let new_attributes_access = clear_if_unchanged(
            ActionKind::ModifyAttributesAccess,
            change.new_attributes_access,
            &snapshot.access_control.attributes,
            &mut stats,
        );
        let new_member_access = clear_if_unchanged(
            ActionKind::ModifyMemberAccess,
            change.new_member_access,
            &snapshot.access_control.members,
            &mut stats,
        );
        let new_invite_link_access = clear_if_unchanged(
            ActionKind::ModifyInviteLinkAccess,
            change.new_invite_link_access,
            &snapshot.access_control.add_from_invite_link,
            &mut stats,
        );

        // Join requests (fields 16-18)
        let (add_requesting_members, promoted_requests) =
            self.resolve_add_requesting_members(change.add_requesting_members, &mut stats);
        let delete_requesting_members = keep_where(
            ActionKind::DeleteRequestingMember,
            change.delete_requesting_members,
            &mut stats,
            |id| index.is_requesting_member(id),
        );
        let promote_requesting_members = keep_where(
            ActionKind::PromoteRequestingMember,
            change.promote_requesting_members,
            &mut stats,
            |m| index.is_requesting_member(&m.id),
        );

        // Field 19 has nothing in the snapshot to compare against.
        let new_invite_link_password = change.new_invite_link_password;

        let mut promote_pending_members =
            Vec::with_capacity(promoted_requests.len() + kept_promotions.len() + promoted_adds.len());
        promote_pending_members.extend(promoted_requests);
        promote_pending_members.extend(kept_promotions);
        promote_pending_members.extend(promoted_adds);

        log::info!(
            "Rebased change onto revision {}: {} action(s) dropped, {} converted",
            snapshot.revision,
            stats.dropped,
            stats.converted
        );

        let resolved = PairedChange {
            revision: change.revision,
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

        (resolved, stats)
    }

    /// Field 3. Returns (still-valid adds, adds turned into promotions).
    ///
    /// Promotions come back last action first.
    fn resolve_add_members(
        &self,
        entries: Vec<Paired<NewMember>>,
        stats: &mut ResolveStats,
    ) -> (Vec<Paired<NewMember>>, Vec<Paired<PromotedMember>>) {
        let mut kept = Vec::with_capacity(entries.len());
        let mut promoted = Vec::new();

        for entry in entries {
            let id = entry.semantic.id;
            if self.index.is_full_member(&id) {
                log::debug!("AddMember: {} already a member, dropping", id.log_label());
                stats.dropped += 1;
            } else if self.index.is_pending_member(&id) {
                log::debug!(
                    "AddMember: {} was invited meanwhile, promoting the invite",
                    id.log_label()
                );
                stats.converted += 1;
                promoted.push(entry.map(PromotedMember::from));
            } else {
                kept.push(entry);
            }
        }

        promoted.reverse();
        (kept, promoted)
    }

    /// Field 16. Returns (still-valid join requests, requests turned into promotions).
    ///
    /// Promotions come back in original order.
    fn resolve_add_requesting_members(
        &self,
        entries: Vec<Paired<NewRequestingMember>>,
        stats: &mut ResolveStats,
    ) -> (Vec<Paired<NewRequestingMember>>, Vec<Paired<PromotedMember>>) {
        let mut kept = Vec::with_capacity(entries.len());
        let mut promoted = Vec::new();

        for entry in entries {
            let id = entry.semantic.id;
            if self.index.is_full_member(&id) {
                log::debug!(
                    "AddRequestingMember: {} already a member, dropping",
                    id.log_label()
                );
                stats.dropped += 1;
            } else if self.index.is_pending_member(&id) {
                log::debug!(
                    "AddRequestingMember: {} was invited meanwhile, promoting the invite",
                    id.log_label()
                );
                stats.converted += 1;
                promoted.push(entry.map(PromotedMember::from));
            } else {
                kept.push(entry);
            }
        }

        (kept, promoted)
    }
}

// ---------------------------------------------------------------------------
// Per-kind helpers
// ---------------------------------------------------------------------------

/// Keep the actions that still apply, in their original order.
fn keep_where<S>(
    kind: ActionKind,
    entries: Vec<Paired<S>>,
    stats: &mut ResolveStats,
    still_applies: impl Fn(&S) -> bool,
) -> Vec<Paired<S>> {
    let before = entries.len();
    let kept: Vec<Paired<S>> = entries
        .into_iter()
        .filter(|entry| still_applies(&entry.semantic))
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        log::debug!("{}: dropped {} action(s) already in effect", kind, dropped);
        stats.dropped += dropped;
    }
    kept
}

/// Clear a setting change whose target value is already current.
fn clear_if_unchanged<S: PartialEq>(
    kind: ActionKind,
    entry: Option<Paired<S>>,
    current: &S,
    stats: &mut ResolveStats,
) -> Option<Paired<S>> {
    match entry {
        Some(entry) if entry.semantic == *current => {
            log::debug!("{}: value already current, clearing", kind);
            stats.dropped += 1;
            None
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Rebase a pending change, given as its plaintext and opaque halves.
///
/// The halves must line up kind by kind; otherwise `ChangeError::Misaligned`
/// is returned and nothing is resolved. The inputs are left untouched.
pub fn resolve_conflict(
    snapshot: &GroupSnapshot,
    plaintext: &GroupChange,
    opaque: &OpaqueChange,
) -> Result<OpaqueChange, ChangeError> {
    let paired = PairedChange::pair(plaintext.clone(), opaque.clone())?;
    Ok(ConflictResolver::new(snapshot).resolve(paired).into_opaque())
}

/// What to do with a pending change after a lost race.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resubmission {
    /// Submit this change. Its revision is the snapshot revision + 1.
    Submit(OpaqueChange),
    /// Everything the change wanted is already in effect.
    Abandon,
}

/// Rebase a pending change and decide whether it is still worth submitting.
pub fn prepare_resubmission(
    snapshot: &GroupSnapshot,
    plaintext: &GroupChange,
    opaque: &OpaqueChange,
) -> Result<Resubmission, ChangeError> {
    let mut resolved = resolve_conflict(snapshot, plaintext, opaque)?;

    if resolved.is_empty() {
        log::info!(
            "Pending change fully superseded at revision {}, abandoning",
            snapshot.revision
        );
        return Ok(Resubmission::Abandon);
    }

    resolved.revision = snapshot
        .revision
        .checked_add(1)
        .ok_or(ChangeError::RevisionExhausted(snapshot.revision))?;
    Ok(Resubmission::Submit(resolved))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
