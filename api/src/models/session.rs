use std::pin::Pin;

use actix_web::{
    FromRequest,
    HttpRequest,
    cookie::{Cookie, SameSite, time::Duration}
};
use bson::oid::ObjectId;
use fritter_core::{
    crypto::{hash_token, new_session_token},
    env,
    redis::{drop_session, load_session, store_session}
};

use crate::error::ErrorResponse;

pub const SESSION_COOKIE: &str = "fritter_session";

/// The signed-in user, resolved from the session cookie.
#[derive(Debug)]
pub struct Session {
    pub user_id: ObjectId,
    token_hash:  String
}

pub enum SessionError {
    Expired,
    DatabaseError
}

impl Session {
    pub async fn from_token(token: &str) -> Result<Self, SessionError> {
        let token_hash = hash_token(token);

        let user_id = match load_session(&token_hash).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Err(SessionError::Expired),
            Err(_) => return Err(SessionError::DatabaseError)
        };

        let user_id =
            ObjectId::parse_str(&user_id).map_err(|_| SessionError::Expired)?;

        Ok(Self {
            user_id,
            token_hash
        })
    }

    /// Opens a session for `user_id` and returns the cookie carrying it.
    pub async fn start(
        user_id: ObjectId
    ) -> Result<Cookie<'static>, ErrorResponse> {
        let token = new_session_token();

        store_session(&hash_token(&token), &user_id.to_hex(), env().session_ttl)
            .await?;

        Ok(Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(!env().dev)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(env().session_ttl))
            .finish())
    }

    /// Forgets the session and returns a cookie that clears it client side.
    pub async fn end(self) -> Result<Cookie<'static>, ErrorResponse> {
        drop_session(&self.token_hash).await?;

        let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();

        cookie.make_removal();

        Ok(cookie)
    }
}

impl FromRequest for Session {
    type Error = ErrorResponse;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        request: &HttpRequest,
        _payload: &mut actix_web::dev::Payload
    ) -> Self::Future {
        let Some(token) = request
            .cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
        else {
            return Box::pin(async {
                Err(ErrorResponse::new(
                    403,
                    "You must be logged in to complete this action."
                ))
            });
        };

        Box::pin(async move {
            match Session::from_token(&token).await {
                Ok(session) => Ok(session),
                Err(SessionError::Expired) => Err(ErrorResponse::new(
                    403,
                    "Your session has expired, please log in again."
                )),
                Err(SessionError::DatabaseError) => Err(ErrorResponse {
                    status: 500,
                    detail: "Database error".to_string(),
                    ..Default::default()
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn missing_cookie_is_forbidden() {
        let request = TestRequest::default().to_http_request();

        let error = Session::extract(&request).await.unwrap_err();

        assert_eq!(error.status, 403);
    }

    #[actix_web::test]
    async fn empty_cookie_is_forbidden() {
        let request = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, ""))
            .to_http_request();

        let error = Session::extract(&request).await.unwrap_err();

        assert_eq!(error.status, 403);
    }
}
