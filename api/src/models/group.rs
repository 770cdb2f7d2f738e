use std::collections::{HashMap, HashSet};

use bson::oid::ObjectId;
use fritter_core::db::{Group, MongoError, User};
use serde::Serialize;

/// A group with every user reference resolved to a username, plus where
/// the viewing user stands in it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupModel {
    #[serde(rename = "_id")]
    id:         String,
    group_name: String,
    owner:      String,
    admins:     Vec<String>,
    members:    Vec<String>,
    followers:  Vec<String>,
    requests:   Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role:       Option<&'static str>
}

fn names_of(
    ids: &HashSet<ObjectId>,
    usernames: &HashMap<ObjectId, String>
) -> Vec<String> {
    let mut names = ids
        .iter()
        .filter_map(|id| usernames.get(id).cloned())
        .collect::<Vec<_>>();

    names.sort();

    names
}

impl GroupModel {
    pub fn with_usernames(
        group: Group,
        usernames: &HashMap<ObjectId, String>,
        viewer: Option<&ObjectId>
    ) -> Self {
        let role = viewer.map(|viewer| group.roles_of(viewer).pretty_name());

        Self {
            id:         group.id.to_hex(),
            owner:      usernames.get(&group.owner).cloned().unwrap_or_default(),
            admins:     names_of(&group.admins, usernames),
            members:    names_of(&group.members, usernames),
            followers:  names_of(&group.followers, usernames),
            requests:   names_of(&group.requests, usernames),
            group_name: group.group_name,
            role
        }
    }

    pub async fn from_group(
        group: Group,
        viewer: Option<&ObjectId>
    ) -> Result<Self, MongoError> {
        let usernames = User::usernames(group.user_ids()).await?;

        Ok(Self::with_usernames(group, &usernames, viewer))
    }

    pub async fn from_groups(
        groups: Vec<Group>,
        viewer: Option<&ObjectId>
    ) -> Result<Vec<Self>, MongoError> {
        let usernames =
            User::usernames(groups.iter().flat_map(|group| group.user_ids()))
                .await?;

        Ok(groups
            .into_iter()
            .map(|group| Self::with_usernames(group, &usernames, viewer))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_usernames_and_drops_unknown_users() {
        let (owner, member, ghost) =
            (ObjectId::new(), ObjectId::new(), ObjectId::new());

        let mut group = Group::new("rustaceans".to_string(), owner);

        group.join_or_leave(member).unwrap();
        group.respond(&owner, member, true).unwrap();
        group.join_or_leave(ghost).unwrap();

        let usernames = HashMap::from([
            (owner, "ferris".to_string()),
            (member, "alice".to_string())
        ]);

        let model =
            GroupModel::with_usernames(group.clone(), &usernames, None);

        assert_eq!(
            serde_json::to_value(&model).unwrap(),
            json!({
                "_id": group.id.to_hex(),
                "groupName": "rustaceans",
                "owner": "ferris",
                "admins": ["ferris"],
                "members": ["alice", "ferris"],
                "followers": ["alice", "ferris"],
                "requests": []
            })
        );
    }

    #[test]
    fn reports_the_viewers_standing() {
        let (owner, member, stranger) =
            (ObjectId::new(), ObjectId::new(), ObjectId::new());

        let mut group = Group::new("rustaceans".to_string(), owner);

        group.join_or_leave(member).unwrap();
        group.respond(&owner, member, true).unwrap();
        group.join_or_leave(stranger).unwrap();

        let usernames = HashMap::new();

        for (viewer, role) in [
            (owner, "Owner"),
            (member, "Member"),
            (stranger, "Requested"),
            (ObjectId::new(), "None")
        ] {
            let model = GroupModel::with_usernames(
                group.clone(),
                &usernames,
                Some(&viewer)
            );

            assert_eq!(serde_json::to_value(&model).unwrap()["role"], role);
        }
    }
}
