use std::collections::HashSet;

use derive_more::{Display, Error};
use mongo_document::Document;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::enums::GroupRole;

/// A group document.
///
/// Every transition below keeps `owner ∈ admins ⊆ members` and
/// `requests ∩ members = ∅`. Writes go through `Group::apply` inside
/// `Group::modify`, so the invariants are checked again on the exact
/// revision being written.
#[derive(Debug, Clone, Document, Serialize, Deserialize)]
#[document(collection = "groups", versioned)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id:         ObjectId,
    pub group_name: String,
    pub owner:      ObjectId,
    pub admins:     HashSet<ObjectId>,
    pub members:    HashSet<ObjectId>,
    pub followers:  HashSet<ObjectId>,
    pub requests:   HashSet<ObjectId>,
    #[serde(default)]
    pub revision:   i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GroupError {
    #[display("You are not an admin")]
    NotAdmin,
    #[display("You are not the owner")]
    NotOwner,
    #[display("The user is not in the group")]
    NotMember,
    #[display("The user is not in a request")]
    NotRequested,
    #[display("The only admin of a group cannot leave it")]
    SoleAdmin,
    #[display("The owner cannot leave the group without transferring it")]
    OwnerCannotLeave,
    #[display("The change would leave the group inconsistent")]
    Inconsistent
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinLeave {
    Requested,
    Cancelled,
    Left
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestResponse {
    Accepted,
    Rejected,
    /// the user had no pending request, nothing changed
    NotRequested
}

impl Group {
    pub fn new(group_name: String, owner: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            group_name,
            owner,
            admins: HashSet::from([owner]),
            members: HashSet::from([owner]),
            followers: HashSet::from([owner]),
            requests: HashSet::new(),
            revision: 0
        }
    }

    pub fn roles_of(&self, user: &ObjectId) -> GroupRole {
        let mut roles = GroupRole::None;

        for (set, role) in [
            (&self.followers, GroupRole::Follower),
            (&self.requests, GroupRole::Requested),
            (&self.members, GroupRole::Member),
            (&self.admins, GroupRole::Admin)
        ] {
            if set.contains(user) {
                roles |= role;
            }
        }

        if self.owner == *user {
            roles |= GroupRole::Owner;
        }

        roles
    }

    /// Every user referenced by the group, for resolving usernames.
    pub fn user_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        std::iter::once(self.owner)
            .chain(self.admins.iter().copied())
            .chain(self.members.iter().copied())
            .chain(self.followers.iter().copied())
            .chain(self.requests.iter().copied())
    }

    /// Runs one transition on a copy and keeps the result only if it
    /// succeeded and still holds the invariants.
    pub fn apply<T>(
        &mut self,
        transition: impl FnOnce(&mut Group) -> Result<T, GroupError>
    ) -> Result<T, GroupError> {
        let mut next = self.clone();

        let outcome = transition(&mut next)?;

        if !next.holds_invariants() {
            return Err(GroupError::Inconsistent);
        }

        *self = next;

        Ok(outcome)
    }

    pub fn holds_invariants(&self) -> bool {
        self.admins.contains(&self.owner) &&
            self.members.contains(&self.owner) &&
            self.admins.is_subset(&self.members) &&
            self.requests.is_disjoint(&self.members)
    }

    /// One action for joining and leaving: members leave, pending requests
    /// are cancelled, anyone else files a request.
    pub fn join_or_leave(
        &mut self,
        user: ObjectId
    ) -> Result<JoinLeave, GroupError> {
        if self.members.contains(&user) {
            if self.admins.len() == 1 && self.admins.contains(&user) {
                return Err(GroupError::SoleAdmin);
            }

            if self.owner == user {
                return Err(GroupError::OwnerCannotLeave);
            }

            self.members.remove(&user);
            self.admins.remove(&user);

            return Ok(JoinLeave::Left);
        }

        if self.requests.remove(&user) {
            return Ok(JoinLeave::Cancelled);
        }

        self.requests.insert(user);

        Ok(JoinLeave::Requested)
    }

    pub fn respond(
        &mut self,
        responder: &ObjectId,
        user: ObjectId,
        accept: bool
    ) -> Result<RequestResponse, GroupError> {
        if !self.admins.contains(responder) {
            return Err(GroupError::NotAdmin);
        }

        if !self.requests.remove(&user) {
            return Ok(RequestResponse::NotRequested);
        }

        if !accept {
            return Ok(RequestResponse::Rejected);
        }

        self.members.insert(user);
        self.followers.insert(user);

        Ok(RequestResponse::Accepted)
    }

    /// Returns false when the user already was an admin.
    pub fn promote_admin(
        &mut self,
        promoter: &ObjectId,
        user: ObjectId
    ) -> Result<bool, GroupError> {
        if !self.admins.contains(promoter) {
            return Err(GroupError::NotAdmin);
        }

        if !self.members.contains(&user) {
            return Err(GroupError::NotMember);
        }

        Ok(self.admins.insert(user))
    }

    /// The previous owner keeps their admin and member status.
    pub fn transfer_owner(
        &mut self,
        owner: &ObjectId,
        user: ObjectId
    ) -> Result<(), GroupError> {
        if self.owner != *owner {
            return Err(GroupError::NotOwner);
        }

        if !self.members.contains(&user) {
            return Err(GroupError::NotMember);
        }

        self.admins.insert(user);
        self.followers.insert(user);
        self.requests.remove(&user);
        self.owner = user;

        Ok(())
    }

    /// Returns whether the user follows the group afterwards.
    pub fn toggle_follow(&mut self, user: ObjectId) -> bool {
        if self.followers.remove(&user) {
            false
        } else {
            self.followers.insert(user);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_member() -> (Group, ObjectId, ObjectId) {
        let owner = ObjectId::new();
        let member = ObjectId::new();

        let mut group = Group::new("rustaceans".to_string(), owner);

        group.join_or_leave(member).unwrap();
        group.respond(&owner, member, true).unwrap();

        (group, owner, member)
    }

    #[test]
    fn creation_puts_owner_everywhere_but_requests() {
        let owner = ObjectId::new();
        let group = Group::new("rustaceans".to_string(), owner);

        assert_eq!(group.roles_of(&owner).pretty_name(), "Owner");
        assert!(group.followers.contains(&owner));
        assert!(group.requests.is_empty());
        assert!(group.holds_invariants());
    }

    #[test]
    fn joining_twice_cancels_the_request() {
        let owner = ObjectId::new();
        let user = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        assert_eq!(group.join_or_leave(user), Ok(JoinLeave::Requested));
        assert_eq!(group.roles_of(&user).pretty_name(), "Requested");
        assert_eq!(group.requests.len(), 1);

        assert_eq!(group.join_or_leave(user), Ok(JoinLeave::Cancelled));
        assert_eq!(group.roles_of(&user).pretty_name(), "None");
        assert!(group.requests.is_empty());
        assert!(group.holds_invariants());
    }

    #[test]
    fn accepting_adds_member_and_follower_once() {
        let owner = ObjectId::new();
        let user = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        group.toggle_follow(user);
        group.join_or_leave(user).unwrap();

        assert_eq!(
            group.respond(&owner, user, true),
            Ok(RequestResponse::Accepted)
        );
        assert_eq!(group.roles_of(&user).pretty_name(), "Member");
        assert_eq!(group.followers.len(), 2);
        assert!(group.requests.is_empty());
        assert!(group.holds_invariants());
    }

    #[test]
    fn rejecting_removes_only_the_request() {
        let owner = ObjectId::new();
        let user = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        group.join_or_leave(user).unwrap();

        assert_eq!(
            group.respond(&owner, user, false),
            Ok(RequestResponse::Rejected)
        );
        assert_eq!(group.roles_of(&user).pretty_name(), "None");
        assert!(!group.followers.contains(&user));
    }

    #[test]
    fn responding_without_a_request_changes_nothing() {
        let owner = ObjectId::new();
        let stranger = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);
        let before = group.clone();

        for accept in [true, false] {
            assert_eq!(
                group.respond(&owner, stranger, accept),
                Ok(RequestResponse::NotRequested)
            );
        }

        assert_eq!(group.members, before.members);
        assert_eq!(group.followers, before.followers);
        assert_eq!(group.requests, before.requests);
    }

    #[test]
    fn only_admins_respond() {
        let (mut group, _, member) = group_with_member();
        let user = ObjectId::new();

        group.join_or_leave(user).unwrap();

        assert_eq!(
            group.respond(&member, user, true),
            Err(GroupError::NotAdmin)
        );
        assert!(group.requests.contains(&user));
    }

    #[test]
    fn sole_admin_cannot_leave() {
        let owner = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);
        let before = group.clone();

        assert_eq!(group.join_or_leave(owner), Err(GroupError::SoleAdmin));
        assert_eq!(group.members, before.members);
        assert_eq!(group.admins, before.admins);
    }

    #[test]
    fn owner_cannot_leave_even_with_other_admins() {
        let (mut group, owner, member) = group_with_member();

        group.promote_admin(&owner, member).unwrap();

        assert_eq!(
            group.join_or_leave(owner),
            Err(GroupError::OwnerCannotLeave)
        );
        assert!(group.holds_invariants());
    }

    #[test]
    fn admins_leave_both_sets() {
        let (mut group, owner, member) = group_with_member();

        group.promote_admin(&owner, member).unwrap();

        assert_eq!(group.join_or_leave(member), Ok(JoinLeave::Left));
        assert!(!group.members.contains(&member));
        assert!(!group.admins.contains(&member));
        assert!(group.holds_invariants());
    }

    #[test]
    fn promotion_requires_admin_and_membership() {
        let (mut group, owner, member) = group_with_member();
        let stranger = ObjectId::new();

        assert_eq!(
            group.promote_admin(&member, member),
            Err(GroupError::NotAdmin)
        );
        assert_eq!(
            group.promote_admin(&owner, stranger),
            Err(GroupError::NotMember)
        );
        assert_eq!(group.promote_admin(&owner, member), Ok(true));
        assert_eq!(group.promote_admin(&owner, member), Ok(false));
        assert_eq!(group.roles_of(&member).pretty_name(), "Admin");
        assert!(group.holds_invariants());
    }

    #[test]
    fn transfer_keeps_previous_owner_as_admin() {
        let (mut group, owner, member) = group_with_member();

        assert_eq!(
            group.transfer_owner(&member, member),
            Err(GroupError::NotOwner)
        );

        group.transfer_owner(&owner, member).unwrap();

        assert_eq!(group.owner, member);
        assert_eq!(group.roles_of(&member).pretty_name(), "Owner");
        assert_eq!(group.roles_of(&owner).pretty_name(), "Admin");
        assert!(group.followers.contains(&member));
        assert_eq!(group.admins.len(), 2);
        assert!(group.holds_invariants());
    }

    #[test]
    fn transfer_requires_a_member() {
        let owner = ObjectId::new();
        let user = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        group.join_or_leave(user).unwrap();

        assert_eq!(
            group.transfer_owner(&owner, user),
            Err(GroupError::NotMember)
        );
        assert_eq!(group.owner, owner);
    }

    #[test]
    fn following_is_independent_of_membership() {
        let owner = ObjectId::new();
        let user = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        assert!(group.toggle_follow(user));
        assert_eq!(group.roles_of(&user).pretty_name(), "None");
        assert!(group.roles_of(&user).contains(GroupRole::Follower));
        assert!(!group.toggle_follow(user));
        assert!(group.roles_of(&user).is_empty());
    }

    #[test]
    fn apply_keeps_successful_transitions() {
        let owner = ObjectId::new();
        let user = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        assert_eq!(
            group.apply(|group| group.join_or_leave(user)),
            Ok(JoinLeave::Requested)
        );
        assert!(group.requests.contains(&user));
    }

    #[test]
    fn apply_discards_rejected_transitions() {
        let owner = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);

        assert_eq!(
            group.apply(|group| {
                group.followers.clear();

                group.join_or_leave(owner)
            }),
            Err(GroupError::SoleAdmin)
        );
        assert!(group.followers.contains(&owner));
    }

    #[test]
    fn apply_refuses_inconsistent_results() {
        let owner = ObjectId::new();
        let stranger = ObjectId::new();
        let mut group = Group::new("rustaceans".to_string(), owner);
        let before = group.clone();

        assert_eq!(
            group.apply(|group| {
                group.owner = stranger;

                Ok(())
            }),
            Err(GroupError::Inconsistent)
        );
        assert_eq!(group.owner, before.owner);

        assert_eq!(
            group.apply(|group| {
                group.requests.insert(owner);

                Ok(())
            }),
            Err(GroupError::Inconsistent)
        );
        assert!(group.requests.is_empty());
    }
}
