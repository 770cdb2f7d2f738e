use mongo_document::Document;
use mongodb::bson::{DateTime, Document as BsonDocument, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::enums::ParentKind;

/// What a comment replies to. The kind is stored with the id so children
/// can be looked up without knowing which collection the id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    pub kind: ParentKind,
    pub id:   ObjectId
}

#[derive(Debug, Clone, Document, Serialize, Deserialize)]
#[document(collection = "comments")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id:           ObjectId,
    pub user_id:      ObjectId,
    pub parent:       Parent,
    pub date_created: DateTime,
    pub content:      String
}

impl Parent {
    pub fn freet(id: ObjectId) -> Self {
        Self {
            kind: ParentKind::Freet,
            id
        }
    }

    pub fn comment(id: ObjectId) -> Self {
        Self {
            kind: ParentKind::Comment,
            id
        }
    }

    /// Matches the comments attached to this parent.
    pub fn children_query(&self) -> BsonDocument {
        doc! {
            "parent.kind": self.kind as i32,
            "parent.id": self.id
        }
    }
}

impl Comment {
    pub fn new(user_id: ObjectId, parent: Parent, content: String) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            parent,
            date_created: DateTime::now(),
            content
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{Bson, to_document};

    use super::*;

    #[test]
    fn parent_is_stored_tagged() {
        let freet = ObjectId::new();
        let comment = Comment::new(
            ObjectId::new(),
            Parent::freet(freet),
            "hello".to_string()
        );

        let stored = to_document(&comment).unwrap();
        let parent = stored.get_document("parent").unwrap();

        assert_eq!(parent.get("id"), Some(&Bson::ObjectId(freet)));
        assert_eq!(parent.get("kind"), Some(&Bson::Int32(0)));
        assert!(stored.contains_key("_id"));
    }

    #[test]
    fn same_id_different_kind_is_a_different_parent() {
        let id = ObjectId::new();

        assert_ne!(Parent::freet(id), Parent::comment(id));
        assert_ne!(
            Parent::freet(id).children_query(),
            Parent::comment(id).children_query()
        );
        assert_eq!(
            Parent::comment(id).children_query().get_i32("parent.kind"),
            Ok(1)
        );
    }
}
