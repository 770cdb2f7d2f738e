use fritter_core::db::Like;
use serde::Serialize;

#[derive(Serialize)]
pub struct LikeModel {
    #[serde(rename = "_id")]
    id:     String,
    freet:  String,
    hidden: bool
}

/// Likes given by one user; `hidden` is only filled in for the user
/// themself.
#[derive(Serialize)]
pub struct UserLikesModel {
    pub hidden: Option<Vec<LikeModel>>,
    pub public: Vec<LikeModel>
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreetLikesModel {
    pub hidden_likes: u64,
    pub public_likes: u64,
    pub hidden_liked: bool,
    pub liked:        bool
}

impl From<Like> for LikeModel {
    fn from(like: Like) -> Self {
        Self {
            id:     like.id.to_hex(),
            freet:  like.freet_id.to_hex(),
            hidden: like.hidden
        }
    }
}

impl FreetLikesModel {
    pub fn new(hidden_likes: u64, public_likes: u64, own: Option<&Like>) -> Self {
        Self {
            hidden_likes,
            public_likes,
            hidden_liked: own.is_some_and(|like| like.hidden),
            liked: own.is_some_and(|like| !like.hidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use bson::oid::ObjectId;
    use serde_json::json;

    use super::*;

    #[test]
    fn own_like_sets_exactly_one_flag() {
        let like = Like::new(ObjectId::new(), ObjectId::new(), true);

        let counts = FreetLikesModel::new(1, 4, Some(&like));

        assert_eq!(
            serde_json::to_value(&counts).unwrap(),
            json!({
                "hiddenLikes": 1,
                "publicLikes": 4,
                "hiddenLiked": true,
                "liked": false
            })
        );

        let counts = FreetLikesModel::new(0, 0, None);

        assert!(!counts.hidden_liked && !counts.liked);
    }
}
