use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use bson::{DateTime, doc};
use fritter_core::db::{Freet, Group};
use serde::Deserialize;
use serde_json::json;

use super::{require_freet, require_user};
use crate::{
    error::ErrorResponse,
    models::{FreetModel, Session},
    validate
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/freets")
            .service(get_freets)
            .service(get_group_freets)
            .service(create_freet)
            .service(update_freet)
            .service(delete_freet)
    );
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FreetQuery {
    freet_id: Option<String>,
    author:   Option<String>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupFreetQuery {
    #[serde(deserialize_with = "validate::trimmed")]
    group_name: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FreetBody {
    content:  String,
    group_id: Option<String>
}

#[derive(Deserialize)]
struct ContentBody {
    content: String
}

/// The freet, if `user_id` wrote it.
async fn require_author(
    freet_id: &str,
    user_id: bson::oid::ObjectId
) -> Result<Freet, ErrorResponse> {
    let freet = require_freet(freet_id).await?;

    if freet.author_id != user_id {
        return Err(ErrorResponse::new(
            403,
            "Cannot modify other users' freets."
        ));
    }

    Ok(freet)
}

#[get("")]
async fn get_freets(
    query: web::Query<FreetQuery>
) -> Result<impl Responder, ErrorResponse> {
    if let Some(freet_id) = &query.freet_id {
        let freet = require_freet(freet_id).await?;

        return Ok(HttpResponse::Ok().json(FreetModel::from_freet(freet).await?));
    }

    let filter = match query.author.as_deref().map(str::trim) {
        Some("") => {
            return Err(ErrorResponse::new(
                400,
                "Provided author username must be nonempty."
            ));
        }
        Some(author) => {
            let user = require_user(author, 404).await?;

            doc! {"author_id": user.id}
        }
        None => doc! {}
    };

    let freets = Freet::find_sorted(filter, doc! {"date_modified": -1}).await?;

    Ok(HttpResponse::Ok().json(FreetModel::from_freets(freets).await?))
}

#[get("/groups")]
async fn get_group_freets(
    query: web::Query<GroupFreetQuery>
) -> Result<impl Responder, ErrorResponse> {
    let group = Group::find_one(doc! {"group_name": &query.group_name})
        .await?
        .ok_or_else(|| {
            ErrorResponse::new(
                404,
                format!("Group with {} does not exist.", query.group_name)
            )
        })?;

    let freets = Freet::find_sorted(
        doc! {"group_id": group.id},
        doc! {"date_modified": -1}
    )
    .await?;

    Ok(HttpResponse::Ok().json(FreetModel::from_freets(freets).await?))
}

#[post("")]
async fn create_freet(
    session: Session,
    body: web::Json<FreetBody>
) -> Result<impl Responder, ErrorResponse> {
    validate::content(&body.content, "Freet")?;

    let group_id = match &body.group_id {
        Some(group_id) => {
            let id = validate::object_id(group_id, "Group")?;

            let group = Group::find_one(doc! {"_id": id}).await?.ok_or_else(
                || {
                    ErrorResponse::new(
                        404,
                        format!("Group with group ID {group_id} does not exist.")
                    )
                }
            )?;

            if !group.members.contains(&session.user_id) {
                return Err(ErrorResponse::new(
                    403,
                    "Only members can post to a group."
                ));
            }

            Some(group.id)
        }
        None => None
    };

    let freet = Freet::new(session.user_id, body.content.clone(), group_id);

    freet.insert().await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Your freet was created successfully.",
        "freet": FreetModel::from_freet(freet).await?
    })))
}

#[patch("/{freet_id}")]
async fn update_freet(
    session: Session,
    freet_id: web::Path<String>,
    body: web::Json<ContentBody>
) -> Result<impl Responder, ErrorResponse> {
    validate::content(&body.content, "Freet")?;

    let mut freet = require_author(&freet_id, session.user_id).await?;

    freet.content = body.content.clone();
    freet.date_modified = DateTime::now();

    if Freet::update_one(
        doc! {"_id": freet.id, "author_id": session.user_id},
        doc! {"$set": {
            "content": &freet.content,
            "date_modified": freet.date_modified
        }}
    )
    .await? ==
        0
    {
        return Err(ErrorResponse::new(
            404,
            format!("Freet with freet ID {freet_id} does not exist.")
        ));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Your freet was updated successfully.",
        "freet": FreetModel::from_freet(freet).await?
    })))
}

#[delete("/{freet_id}")]
async fn delete_freet(
    session: Session,
    freet_id: web::Path<String>
) -> Result<impl Responder, ErrorResponse> {
    let freet = require_author(&freet_id, session.user_id).await?;

    // ? likes and bookmark entries go with it, comments stay
    if !Freet::delete_cascade(freet.id).await? {
        return Err(ErrorResponse::new(
            404,
            format!("Freet with freet ID {freet_id} does not exist.")
        ));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Your freet was deleted successfully."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_name_query_is_trimmed() {
        let query =
            web::Query::<GroupFreetQuery>::from_query("groupName=%20rust%20")
                .unwrap();

        assert_eq!(query.group_name, "rust");
    }
}
