use std::collections::{HashMap, HashSet};

use mongo_document::Document;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::MongoError;

#[derive(Debug, Clone, Document, Serialize, Deserialize)]
#[document(collection = "users")]
pub struct User {
    #[serde(rename = "_id")]
    pub id:          ObjectId,
    pub username:    String,
    /// bcrypt hash
    pub password:    String,
    pub date_joined: DateTime
}

impl User {
    pub fn new(username: String, password: String) -> Self {
        Self {
            id: ObjectId::new(),
            username,
            password,
            date_joined: DateTime::now()
        }
    }

    pub async fn find_by_username(
        username: &str
    ) -> Result<Option<User>, MongoError> {
        User::find_one(doc! {"username": username}).await
    }

    /// Maps ids to usernames; ids of deleted users are left out.
    pub async fn usernames(
        ids: impl IntoIterator<Item = ObjectId>
    ) -> Result<HashMap<ObjectId, String>, MongoError> {
        let ids = ids
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(User::find(doc! {"_id": {"$in": ids}})
            .await?
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect())
    }
}
