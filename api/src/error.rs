use std::convert::Infallible;

use actix_web::{
    HttpResponse,
    ResponseError,
    http::StatusCode
};
use derive_more::Display;
use fritter_core::{
    db::{GroupError, ModifyError, MongoError},
    redis::RedisError
};
use serde_json::json;

#[derive(Debug, Display)]
#[display("status: {status}, detail: {detail}")]
pub struct ErrorResponse {
    pub status:  u16,
    pub detail:  String,
    pub headers: actix_web::http::header::HeaderMap
}

impl Default for ErrorResponse {
    fn default() -> Self {
        ErrorResponse {
            status:  500,
            detail:  "Internal Server Error".to_string(),
            headers: actix_web::http::header::HeaderMap::new()
        }
    }
}

impl ErrorResponse {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        ErrorResponse {
            status,
            detail: detail.into(),
            ..Default::default()
        }
    }
}

impl ResponseError for ErrorResponse {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let mut response =
            HttpResponse::build(self.status_code()).json(json!({
                "error": self.detail
            }));

        for (key, value) in self.headers.iter() {
            response.headers_mut().insert(key.clone(), value.clone());
        }

        response
    }
}

impl From<MongoError> for ErrorResponse {
    fn from(_error: MongoError) -> Self {
        ErrorResponse {
            status: 500,
            detail: "Database Error".to_string(),
            ..Default::default()
        }
    }
}

impl From<RedisError> for ErrorResponse {
    fn from(_error: RedisError) -> Self {
        ErrorResponse {
            status: 500,
            detail: "Database Error".to_string(),
            ..Default::default()
        }
    }
}

impl From<tokio::task::JoinError> for ErrorResponse {
    fn from(_error: tokio::task::JoinError) -> Self {
        ErrorResponse::default()
    }
}

impl From<bcrypt::BcryptError> for ErrorResponse {
    fn from(_error: bcrypt::BcryptError) -> Self {
        ErrorResponse {
            status: 500,
            detail: "Hashing Error".to_string(),
            ..Default::default()
        }
    }
}

impl From<GroupError> for ErrorResponse {
    fn from(error: GroupError) -> Self {
        let status = match error {
            GroupError::NotAdmin | GroupError::NotOwner => 405,
            GroupError::NotMember | GroupError::NotRequested => 406,
            GroupError::SoleAdmin | GroupError::OwnerCannotLeave => 407,
            GroupError::Inconsistent => 500
        };

        ErrorResponse::new(status, error.to_string())
    }
}

impl From<Infallible> for ErrorResponse {
    fn from(error: Infallible) -> Self {
        match error {}
    }
}

impl<E> From<ModifyError<E>> for ErrorResponse
where ErrorResponse: From<E>
{
    fn from(error: ModifyError<E>) -> Self {
        match error {
            ModifyError::Rejected(error) => error.into(),
            ModifyError::Conflict => ErrorResponse::new(
                409,
                "The resource was modified by another request, try again."
            ),
            ModifyError::Mongo(error) => error.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn renders_error_body_with_status() {
        let response =
            ErrorResponse::new(413, "too long").error_response();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = to_bytes(response.into_body()).await.unwrap();

        assert_eq!(body, r#"{"error":"too long"}"#);
    }

    #[test]
    fn group_errors_map_to_their_statuses() {
        assert_eq!(ErrorResponse::from(GroupError::NotAdmin).status, 405);
        assert_eq!(ErrorResponse::from(GroupError::NotOwner).status, 405);
        assert_eq!(ErrorResponse::from(GroupError::NotMember).status, 406);
        assert_eq!(ErrorResponse::from(GroupError::NotRequested).status, 406);
        assert_eq!(ErrorResponse::from(GroupError::SoleAdmin).status, 407);
        assert_eq!(
            ErrorResponse::from(GroupError::OwnerCannotLeave).status,
            407
        );
        assert_eq!(ErrorResponse::from(GroupError::Inconsistent).status, 500);
    }

    #[test]
    fn lost_races_are_conflicts() {
        let error: ErrorResponse =
            ModifyError::<GroupError>::Conflict.into();

        assert_eq!(error.status, 409);

        let error: ErrorResponse =
            ModifyError::Rejected(GroupError::SoleAdmin).into();

        assert_eq!(error.status, 407);
    }
}
