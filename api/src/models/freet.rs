use std::collections::HashMap;

use bson::oid::ObjectId;
use fritter_core::db::{Freet, MongoError, User};
use serde::Serialize;

use super::format_date;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreetModel {
    #[serde(rename = "_id")]
    id:            String,
    author:        String,
    content:       String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id:      Option<String>,
    date_created:  String,
    date_modified: String
}

impl FreetModel {
    pub fn with_usernames(
        freet: Freet,
        usernames: &HashMap<ObjectId, String>
    ) -> Self {
        Self {
            id:            freet.id.to_hex(),
            author:        usernames
                .get(&freet.author_id)
                .cloned()
                .unwrap_or_default(),
            content:       freet.content,
            group_id:      freet.group_id.map(|id| id.to_hex()),
            date_created:  format_date(freet.date_created),
            date_modified: format_date(freet.date_modified)
        }
    }

    pub async fn from_freet(freet: Freet) -> Result<Self, MongoError> {
        let usernames = User::usernames([freet.author_id]).await?;

        Ok(Self::with_usernames(freet, &usernames))
    }

    pub async fn from_freets(freets: Vec<Freet>) -> Result<Vec<Self>, MongoError> {
        let usernames =
            User::usernames(freets.iter().map(|freet| freet.author_id)).await?;

        Ok(freets
            .into_iter()
            .map(|freet| Self::with_usernames(freet, &usernames))
            .collect())
    }
}
