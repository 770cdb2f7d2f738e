use std::convert::Infallible;

use mongo_document::Document;
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::{ModifyError, MongoError, is_duplicate_key};

#[derive(Debug, Clone, PartialEq, Document, Serialize, Deserialize)]
#[document(collection = "likes")]
pub struct Like {
    #[serde(rename = "_id")]
    pub id:        ObjectId,
    pub author_id: ObjectId,
    pub freet_id:  ObjectId,
    pub hidden:    bool
}

/// What a like request does given the like the user already has.
#[derive(Debug, PartialEq)]
pub enum LikeAction {
    Create,
    Remove(Like),
    SetHidden(Like)
}

#[derive(Debug)]
pub enum LikeToggled {
    Created(Like),
    Updated(Like),
    Removed
}

impl LikeAction {
    pub fn decide(existing: Option<Like>, hidden: bool) -> Self {
        match existing {
            None => LikeAction::Create,
            Some(like) if like.hidden == hidden => LikeAction::Remove(like),
            Some(like) => LikeAction::SetHidden(like)
        }
    }
}

impl Like {
    pub fn new(author_id: ObjectId, freet_id: ObjectId, hidden: bool) -> Self {
        Self {
            id: ObjectId::new(),
            author_id,
            freet_id,
            hidden
        }
    }

    /// Likes, un-likes or flips the visibility of the user's like.
    ///
    /// Each branch is a single write conditioned on the state it was decided
    /// from; losing a race reports `Conflict` instead of leaving two likes.
    pub async fn toggle(
        author_id: ObjectId,
        freet_id: ObjectId,
        hidden: bool
    ) -> Result<LikeToggled, ModifyError<Infallible>> {
        toggle_in(&MongoLikes, author_id, freet_id, hidden).await
    }
}

/// The writes a like toggle needs. Each write reports whether it landed.
pub(crate) trait LikeStore {
    async fn find(
        &self,
        author_id: ObjectId,
        freet_id: ObjectId
    ) -> Result<Option<Like>, MongoError>;

    /// false when the unique index already holds a like for the pair
    async fn create(&self, like: &Like) -> Result<bool, MongoError>;

    /// false when the like is gone or its visibility changed
    async fn remove(&self, like: &Like) -> Result<bool, MongoError>;

    async fn set_hidden(
        &self,
        like: &Like,
        hidden: bool
    ) -> Result<bool, MongoError>;
}

struct MongoLikes;

impl LikeStore for MongoLikes {
    async fn find(
        &self,
        author_id: ObjectId,
        freet_id: ObjectId
    ) -> Result<Option<Like>, MongoError> {
        Like::find_one(doc! {
            "author_id": author_id,
            "freet_id": freet_id
        })
        .await
    }

    async fn create(&self, like: &Like) -> Result<bool, MongoError> {
        match like.insert().await {
            Ok(()) => Ok(true),
            Err(error) if is_duplicate_key(&error) => Ok(false),
            Err(error) => Err(error)
        }
    }

    async fn remove(&self, like: &Like) -> Result<bool, MongoError> {
        Ok(Like::delete_one(doc! {"_id": like.id, "hidden": like.hidden})
            .await? ==
            1)
    }

    async fn set_hidden(
        &self,
        like: &Like,
        hidden: bool
    ) -> Result<bool, MongoError> {
        Ok(Like::update_one(
            doc! { "_id": like.id, "hidden": like.hidden },
            doc! { "$set": { "hidden": hidden } }
        )
        .await? ==
            1)
    }
}

pub(crate) async fn toggle_in(
    store: &impl LikeStore,
    author_id: ObjectId,
    freet_id: ObjectId,
    hidden: bool
) -> Result<LikeToggled, ModifyError<Infallible>> {
    let existing = store.find(author_id, freet_id).await?;

    match LikeAction::decide(existing, hidden) {
        LikeAction::Create => {
            let like = Like::new(author_id, freet_id, hidden);

            match store.create(&like).await? {
                true => Ok(LikeToggled::Created(like)),
                false => Err(ModifyError::Conflict)
            }
        }
        LikeAction::Remove(like) => match store.remove(&like).await? {
            true => Ok(LikeToggled::Removed),
            false => Err(ModifyError::Conflict)
        },
        LikeAction::SetHidden(mut like) => {
            match store.set_hidden(&like, hidden).await? {
                true => {
                    like.hidden = hidden;

                    Ok(LikeToggled::Updated(like))
                }
                false => Err(ModifyError::Conflict)
            }
        }
    }
}
