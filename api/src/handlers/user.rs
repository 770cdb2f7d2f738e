use actix_web::{HttpResponse, Responder, delete, get, post, web};
use bson::doc;
use fritter_core::db::{User, is_duplicate_key};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ErrorResponse,
    models::{Session, UserModel},
    validate
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(create_user)
            .service(get_session)
            .service(sign_in)
            .service(sign_out)
    );
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String
}

fn already_signed_in() -> ErrorResponse {
    ErrorResponse::new(403, "You are already signed in.")
}

#[post("")]
async fn create_user(
    session: Option<Session>,
    body: web::Json<Credentials>
) -> Result<impl Responder, ErrorResponse> {
    if session.is_some() {
        return Err(already_signed_in());
    }

    let Credentials { username, password } = body.into_inner();

    validate::username(&username)?;
    validate::password(&password)?;

    let taken = || {
        ErrorResponse::new(409, "An account with this username already exists.")
    };

    if User::find_by_username(&username).await?.is_some() {
        return Err(taken());
    }

    let hash = tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
    })
    .await??;

    let user = User::new(username, hash);

    match user.insert().await {
        Ok(()) => {}
        Err(error) if is_duplicate_key(&error) => return Err(taken()),
        Err(error) => return Err(error.into())
    }

    let cookie = Session::start(user.id).await?;

    Ok(HttpResponse::Created().cookie(cookie).json(json!({
        "message": format!(
            "Your account was created successfully. You have been logged in \
             as {}",
            user.username
        ),
        "user": UserModel::from(user)
    })))
}

/// The signed-in user, or `null`.
#[get("/session")]
async fn get_session(
    session: Option<Session>
) -> Result<impl Responder, ErrorResponse> {
    let user = match session {
        Some(session) => User::find_one(doc! {"_id": session.user_id}).await?,
        None => None
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": "Your session info was found successfully.",
        "user": user.map(UserModel::from)
    })))
}

#[post("/session")]
async fn sign_in(
    session: Option<Session>,
    body: web::Json<Credentials>
) -> Result<impl Responder, ErrorResponse> {
    if session.is_some() {
        return Err(already_signed_in());
    }

    let Credentials { username, password } = body.into_inner();

    let invalid = || ErrorResponse::new(401, "Invalid username or password.");

    let Some(user) = User::find_by_username(&username).await? else {
        return Err(invalid());
    };

    let hash = user.password.clone();

    if !tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await??
    {
        return Err(invalid());
    }

    let cookie = Session::start(user.id).await?;

    Ok(HttpResponse::Created().cookie(cookie).json(json!({
        "message": "You have logged in successfully.",
        "user": UserModel::from(user)
    })))
}

#[delete("/session")]
async fn sign_out(session: Session) -> Result<impl Responder, ErrorResponse> {
    let cookie = session.end().await?;

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "message": "You have been logged out successfully."
    })))
}
