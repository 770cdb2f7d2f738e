mod bookmark;
mod comment;
mod freet;
mod group;
mod like;
mod user;

use actix_web::{error::InternalError, web};
use bson::doc;
use fritter_core::db::{Freet, User};

pub use bookmark::config as bookmark;
pub use comment::config as comment;
pub use freet::config as freet;
pub use group::config as group;
pub use like::config as like;
pub use user::config as user;

use crate::{error::ErrorResponse, validate};

/// Malformed bodies and queries answer with the same `{error}` shape as
/// every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _request| {
        let detail = error.to_string();

        InternalError::from_response(
            error,
            actix_web::ResponseError::error_response(&ErrorResponse::new(
                400, detail
            ))
        )
        .into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|error, _request| {
        let detail = error.to_string();

        InternalError::from_response(
            error,
            actix_web::ResponseError::error_response(&ErrorResponse::new(
                400, detail
            ))
        )
        .into()
    })
}

/// Looks a user up by name; the status for an unknown name differs per
/// resource.
async fn require_user(username: &str, status: u16) -> Result<User, ErrorResponse> {
    User::find_by_username(username).await?.ok_or_else(|| {
        ErrorResponse::new(
            status,
            format!("A user with username {username} does not exist.")
        )
    })
}

async fn require_freet(freet_id: &str) -> Result<Freet, ErrorResponse> {
    let id = validate::object_id(freet_id, "Freet")?;

    Freet::find_one(doc! {"_id": id}).await?.ok_or_else(|| {
        ErrorResponse::new(
            404,
            format!("Freet with freet ID {freet_id} does not exist.")
        )
    })
}
