use actix_web::{HttpResponse, Responder, delete, get, post, web};
use bson::doc;
use fritter_core::db::{Like, LikeToggled};
use serde::Deserialize;
use serde_json::json;

use super::{require_freet, require_user};
use crate::{
    error::ErrorResponse,
    models::{FreetLikesModel, LikeModel, Session, UserLikesModel}
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/likes")
            .service(get_likes)
            .service(toggle_like)
            .service(delete_like)
    );
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeQuery {
    freet_id: Option<String>,
    username: Option<String>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeBody {
    freet_id: String,
    #[serde(default)]
    hidden:   bool
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnlikeBody {
    freet_id: String
}

#[get("")]
async fn get_likes(
    session: Option<Session>,
    query: web::Query<LikeQuery>
) -> Result<impl Responder, ErrorResponse> {
    let caller = session.map(|session| session.user_id);

    if let Some(username) = &query.username {
        let user = require_user(username, 404).await?;

        let likes = Like::find(doc! {"author_id": user.id}).await?;

        let (hidden, public): (Vec<_>, Vec<_>) =
            likes.into_iter().partition(|like| like.hidden);

        return Ok(HttpResponse::Ok().json(UserLikesModel {
            hidden: (caller == Some(user.id))
                .then(|| hidden.into_iter().map(LikeModel::from).collect()),
            public: public.into_iter().map(LikeModel::from).collect()
        }));
    }

    let Some(freet_id) = &query.freet_id else {
        return Err(ErrorResponse::new(400, "No freet ID or username input"));
    };

    let freet = require_freet(freet_id).await?;

    let (hidden_likes, public_likes) = tokio::join!(
        Like::count_documents(doc! {"freet_id": freet.id, "hidden": true}),
        Like::count_documents(doc! {"freet_id": freet.id, "hidden": false})
    );

    let own = match caller {
        Some(caller) => {
            Like::find_one(doc! {"author_id": caller, "freet_id": freet.id})
                .await?
        }
        None => None
    };

    Ok(HttpResponse::Ok().json(FreetLikesModel::new(
        hidden_likes?,
        public_likes?,
        own.as_ref()
    )))
}

/// Likes the freet, un-likes it, or switches the like's visibility.
#[post("")]
async fn toggle_like(
    session: Session,
    body: web::Json<LikeBody>
) -> Result<impl Responder, ErrorResponse> {
    let freet = require_freet(&body.freet_id).await?;

    let response = match Like::toggle(session.user_id, freet.id, body.hidden)
        .await?
    {
        LikeToggled::Created(like) => json!({
            "message": "Your like was created successfully.",
            "like": LikeModel::from(like)
        }),
        LikeToggled::Updated(like) => json!({
            "message": "Your like was updated successfully.",
            "like": LikeModel::from(like)
        }),
        LikeToggled::Removed => json!({
            "message": "Your like was deleted successfully."
        })
    };

    Ok(HttpResponse::Created().json(response))
}

#[delete("")]
async fn delete_like(
    session: Session,
    body: web::Json<UnlikeBody>
) -> Result<impl Responder, ErrorResponse> {
    let freet = require_freet(&body.freet_id).await?;

    if Like::delete_one(doc! {"author_id": session.user_id, "freet_id": freet.id})
        .await? ==
        0
    {
        return Err(ErrorResponse::new(
            404,
            format!(
                "This user has not liked freet with freet id {}",
                body.freet_id
            )
        ));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Your like was deleted successfully."
    })))
}
