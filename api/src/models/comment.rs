use std::collections::HashMap;

use bson::oid::ObjectId;
use fritter_core::db::{Comment, MongoError, User};
use serde::Serialize;

use super::format_date;

#[derive(Serialize)]
pub struct ParentModel {
    kind: &'static str,
    id:   String
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentModel {
    #[serde(rename = "_id")]
    id:           String,
    author:       String,
    parent:       ParentModel,
    date_created: String,
    content:      String
}

impl CommentModel {
    pub fn with_usernames(
        comment: Comment,
        usernames: &HashMap<ObjectId, String>
    ) -> Self {
        Self {
            id:           comment.id.to_hex(),
            author:       usernames
                .get(&comment.user_id)
                .cloned()
                .unwrap_or_default(),
            parent:       ParentModel {
                kind: comment.parent.kind.as_str(),
                id:   comment.parent.id.to_hex()
            },
            date_created: format_date(comment.date_created),
            content:      comment.content
        }
    }

    pub async fn from_comment(comment: Comment) -> Result<Self, MongoError> {
        let usernames = User::usernames([comment.user_id]).await?;

        Ok(Self::with_usernames(comment, &usernames))
    }

    pub async fn from_comments(
        comments: Vec<Comment>
    ) -> Result<Vec<Self>, MongoError> {
        let usernames =
            User::usernames(comments.iter().map(|comment| comment.user_id))
                .await?;

        Ok(comments
            .into_iter()
            .map(|comment| Self::with_usernames(comment, &usernames))
            .collect())
    }
}
