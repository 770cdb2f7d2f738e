use bitflags::bitflags;
use serde_repr::{Deserialize_repr, Serialize_repr};

bitflags! {
    /// Every set of a group a user appears in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GroupRole: u8 {
        const None = 0;
        const Follower = 1 << 0;
        const Requested = 1 << 1;
        const Member = 1 << 2;
        const Admin = 1 << 3;
        const Owner = 1 << 4;
    }
}

impl GroupRole {
    pub fn pretty_name(self) -> &'static str {
        if self.contains(GroupRole::Owner) {
            "Owner"
        } else if self.contains(GroupRole::Admin) {
            "Admin"
        } else if self.contains(GroupRole::Member) {
            "Member"
        } else if self.contains(GroupRole::Requested) {
            "Requested"
        } else {
            "None"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ParentKind {
    Freet   = 0,
    Comment = 1
}

impl ParentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParentKind::Freet => "freet",
            ParentKind::Comment => "comment"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_role_wins() {
        assert_eq!(
            (GroupRole::Member | GroupRole::Admin | GroupRole::Owner)
                .pretty_name(),
            "Owner"
        );
        assert_eq!(
            (GroupRole::Follower | GroupRole::Member).pretty_name(),
            "Member"
        );
        assert_eq!(GroupRole::Follower.pretty_name(), "None");
    }
}
