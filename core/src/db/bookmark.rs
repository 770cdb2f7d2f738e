use mongo_document::Document;
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::MongoError;

/// A named folder of freets; one per user and folder name.
#[derive(Debug, Clone, Document, Serialize, Deserialize)]
#[document(collection = "bookmarks", versioned)]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id:       ObjectId,
    pub user_id:  ObjectId,
    pub folder:   String,
    pub freets:   Vec<ObjectId>,
    #[serde(default)]
    pub revision: i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed
}

impl Bookmark {
    pub fn new(user_id: ObjectId, folder: String) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            folder,
            freets: Vec::new(),
            revision: 0
        }
    }

    pub fn toggle(&mut self, freet_id: ObjectId) -> Toggled {
        let before = self.freets.len();

        self.freets.retain(|id| *id != freet_id);

        if self.freets.len() == before {
            self.freets.push(freet_id);
            Toggled::Added
        } else {
            Toggled::Removed
        }
    }

    /// Pulls a deleted freet out of every folder.
    pub async fn remove_freet_everywhere(
        freet_id: ObjectId
    ) -> Result<u64, MongoError> {
        Bookmark::update_many(
            doc! { "freets": freet_id },
            doc! {
                "$pull": { "freets": freet_id },
                "$inc": { "revision": 1 }
            }
        )
        .await
    }
}
