use std::convert::Infallible;

use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use bson::doc;
use fritter_core::db::{Bookmark, Toggled, is_duplicate_key};
use serde::Deserialize;
use serde_json::json;

use super::require_freet;
use crate::{
    error::ErrorResponse,
    models::{BookmarkModel, Session},
    validate
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookmarks")
            .service(get_bookmarks)
            .service(create_folder)
            .service(toggle_bookmark)
            .service(delete_folder)
    );
}

#[derive(Deserialize)]
struct FolderQuery {
    folder: Option<String>
}

#[derive(Deserialize)]
struct FolderBody {
    #[serde(deserialize_with = "validate::trimmed")]
    folder: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleBody {
    #[serde(deserialize_with = "validate::trimmed")]
    folder:   String,
    freet_id: String
}

fn folder_not_found(folder: &str) -> ErrorResponse {
    ErrorResponse::new(404, format!("Folder {folder} does not exist."))
}

#[get("")]
async fn get_bookmarks(
    session: Session,
    query: web::Query<FolderQuery>
) -> Result<impl Responder, ErrorResponse> {
    if let Some(folder) = query.folder.as_deref().map(str::trim) {
        let bookmark = Bookmark::find_one(doc! {
            "user_id": session.user_id,
            "folder": folder
        })
        .await?
        .ok_or_else(|| folder_not_found(folder))?;

        return Ok(HttpResponse::Ok().json(BookmarkModel::from(bookmark)));
    }

    let bookmarks = Bookmark::find_sorted(
        doc! {"user_id": session.user_id},
        doc! {"folder": 1}
    )
    .await?;

    Ok(HttpResponse::Ok().json(
        bookmarks
            .into_iter()
            .map(BookmarkModel::from)
            .collect::<Vec<_>>()
    ))
}

#[post("")]
async fn create_folder(
    session: Session,
    body: web::Json<FolderBody>
) -> Result<impl Responder, ErrorResponse> {
    let folder = validate::name(&body.folder, "Folder")?;

    let exists = || {
        ErrorResponse::new(404, format!("Folder {folder} already exists."))
    };

    if Bookmark::find_one(doc! {"user_id": session.user_id, "folder": &folder})
        .await?
        .is_some()
    {
        return Err(exists());
    }

    let bookmark = Bookmark::new(session.user_id, folder.clone());

    match bookmark.insert().await {
        Ok(()) => {}
        Err(error) if is_duplicate_key(&error) => return Err(exists()),
        Err(error) => return Err(error.into())
    }

    Ok(HttpResponse::Created().json(json!({
        "message": "Your folder was created successfully.",
        "bookmark": BookmarkModel::from(bookmark)
    })))
}

/// Adds the freet to the folder, or takes it out if it is already there.
#[put("")]
async fn toggle_bookmark(
    session: Session,
    body: web::Json<ToggleBody>
) -> Result<impl Responder, ErrorResponse> {
    let freet = require_freet(&body.freet_id).await?;

    let (bookmark, toggled) = Bookmark::modify(
        doc! {"user_id": session.user_id, "folder": &body.folder},
        |bookmark| Ok::<_, Infallible>(bookmark.toggle(freet.id))
    )
    .await?
    .ok_or_else(|| folder_not_found(&body.folder))?;

    Ok(HttpResponse::Created().json(json!({
        "message": match toggled {
            Toggled::Added => "The freet was added to your folder.",
            Toggled::Removed => "The freet was removed from your folder."
        },
        "bookmark": BookmarkModel::from(bookmark)
    })))
}

#[delete("")]
async fn delete_folder(
    session: Session,
    body: web::Json<FolderBody>
) -> Result<impl Responder, ErrorResponse> {
    if Bookmark::delete_one(doc! {
        "user_id": session.user_id,
        "folder": &body.folder
    })
    .await? ==
        0
    {
        return Err(folder_not_found(&body.folder));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Your folder was deleted successfully."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_names_in_bodies_are_trimmed() {
        let body: ToggleBody = serde_json::from_value(json!({
            "folder": " school ",
            "freetId": "64b7f0c2a1b2c3d4e5f60718"
        }))
        .unwrap();

        assert_eq!(body.folder, "school");

        let body: FolderBody =
            serde_json::from_value(json!({"folder": "school\n"})).unwrap();

        assert_eq!(body.folder, "school");
    }
}
