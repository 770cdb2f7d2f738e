use mongo_document::Document;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::{Bookmark, Like, MongoError};

#[derive(Debug, Clone, Document, Serialize, Deserialize)]
#[document(collection = "freets")]
pub struct Freet {
    #[serde(rename = "_id")]
    pub id:            ObjectId,
    pub author_id:     ObjectId,
    pub content:       String,
    pub group_id:      Option<ObjectId>,
    pub date_created:  DateTime,
    pub date_modified: DateTime
}

impl Freet {
    pub fn new(
        author_id: ObjectId,
        content: String,
        group_id: Option<ObjectId>
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: ObjectId::new(),
            author_id,
            content,
            group_id,
            date_created: now,
            date_modified: now
        }
    }

    /// Deletes the freet along with its likes and every bookmark entry
    /// pointing at it. Returns false if the freet was already gone.
    pub async fn delete_cascade(freet_id: ObjectId) -> Result<bool, MongoError> {
        if Freet::delete_one(doc! {"_id": freet_id}).await? == 0 {
            return Ok(false);
        }

        Like::delete_many(doc! {"freet_id": freet_id}).await?;

        Bookmark::remove_freet_everywhere(freet_id).await?;

        Ok(true)
    }
}
