use actix_web::{HttpResponse, Responder, delete, get, post, web};
use bson::doc;
use fritter_core::db::{Comment, Freet, Parent, ParentKind};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ErrorResponse,
    models::{CommentModel, Session},
    validate
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .service(get_comments)
            .service(create_comment)
            .service(delete_comment)
    );
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParentQuery {
    freet_id:   Option<String>,
    comment_id: Option<String>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentBody {
    #[serde(flatten)]
    parent:  ParentQuery,
    content: String
}

impl ParentQuery {
    /// Exactly one of the two ids names the parent.
    fn target(&self) -> Result<(ParentKind, &str), ErrorResponse> {
        match (&self.freet_id, &self.comment_id) {
            (Some(freet_id), None) => {
                Ok((ParentKind::Freet, freet_id.as_str()))
            }
            (None, Some(comment_id)) => {
                Ok((ParentKind::Comment, comment_id.as_str()))
            }
            (None, None) => {
                Err(ErrorResponse::new(400, "No comment or freet ID input"))
            }
            (Some(_), Some(_)) => Err(ErrorResponse::new(
                400,
                "A comment belongs to either a freet or a comment, not both"
            ))
        }
    }

    async fn resolve(&self) -> Result<Parent, ErrorResponse> {
        let (kind, id) = self.target()?;

        let label = match kind {
            ParentKind::Freet => "Freet",
            ParentKind::Comment => "Comment"
        };

        let object_id = validate::object_id(id, label)?;

        let exists = match kind {
            ParentKind::Freet => {
                Freet::find_one(doc! {"_id": object_id}).await?.is_some()
            }
            ParentKind::Comment => {
                Comment::find_one(doc! {"_id": object_id}).await?.is_some()
            }
        };

        if !exists {
            return Err(ErrorResponse::new(
                404,
                format!(
                    "{label} with {} ID {id} does not exist.",
                    kind.as_str()
                )
            ));
        }

        Ok(Parent {
            kind,
            id: object_id
        })
    }
}

#[get("")]
async fn get_comments(
    query: web::Query<ParentQuery>
) -> Result<impl Responder, ErrorResponse> {
    let parent = query.resolve().await?;

    let comments =
        Comment::find_sorted(parent.children_query(), doc! {"date_created": 1})
            .await?;

    Ok(HttpResponse::Ok().json(CommentModel::from_comments(comments).await?))
}

#[post("")]
async fn create_comment(
    session: Session,
    body: web::Json<CommentBody>
) -> Result<impl Responder, ErrorResponse> {
    validate::content(&body.content, "Comment")?;

    let parent = body.parent.resolve().await?;

    let comment = Comment::new(session.user_id, parent, body.content.clone());

    comment.insert().await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Your comment was created successfully.",
        "comment": CommentModel::from_comment(comment).await?
    })))
}

#[delete("/{comment_id}")]
async fn delete_comment(
    session: Session,
    comment_id: web::Path<String>
) -> Result<impl Responder, ErrorResponse> {
    let id = validate::object_id(&comment_id, "Comment")?;

    let comment = Comment::find_one(doc! {"_id": id}).await?.ok_or_else(|| {
        ErrorResponse::new(
            404,
            format!("Comment with comment ID {comment_id} does not exist.")
        )
    })?;

    if comment.user_id != session.user_id {
        return Err(ErrorResponse::new(
            403,
            "Cannot modify other users' comments."
        ));
    }

    Comment::delete_one(doc! {"_id": id, "user_id": session.user_id}).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Your comment was deleted successfully."
    })))
}
