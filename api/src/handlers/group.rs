use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use bson::doc;
use fritter_core::db::{
    Group,
    GroupError,
    RequestResponse,
    is_duplicate_key
};
use serde::Deserialize;
use serde_json::json;

use super::require_user;
use crate::{
    error::ErrorResponse,
    models::{GroupModel, Session},
    validate
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/groups")
            .service(get_groups)
            .service(create_group)
            .service(update_group)
            .service(add_admin)
            .service(change_owner)
            .service(toggle_follow)
            .service(delete_group)
    );
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupQuery {
    username:   Option<String>,
    group_name: Option<String>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupBody {
    #[serde(deserialize_with = "validate::trimmed")]
    group_name: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupUpdateBody {
    #[serde(deserialize_with = "validate::trimmed")]
    group_name: String,
    /// set when an admin answers a join request
    #[serde(default)]
    response:   bool,
    username:   Option<String>,
    #[serde(default)]
    accept:     bool
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupUserBody {
    #[serde(deserialize_with = "validate::trimmed")]
    group_name: String,
    username:   String
}

fn group_not_found(group_name: &str) -> ErrorResponse {
    ErrorResponse::new(
        404,
        format!("Group with {group_name} does not exist.")
    )
}

/// Applies one state transition to the named group under compare-and-swap.
/// A transition that would break the membership invariants is never written.
async fn transition<T>(
    group_name: &str,
    mut apply: impl FnMut(&mut Group) -> Result<T, GroupError>
) -> Result<(Group, T), ErrorResponse> {
    Group::modify(doc! {"group_name": group_name}, |group| {
        group.apply(&mut apply)
    })
    .await?
    .ok_or_else(|| group_not_found(group_name))
}

#[get("")]
async fn get_groups(
    session: Option<Session>,
    query: web::Query<GroupQuery>
) -> Result<impl Responder, ErrorResponse> {
    let viewer = session.map(|session| session.user_id);

    if let Some(group_name) = query.group_name.as_deref().map(str::trim) {
        let group = Group::find_one(doc! {"group_name": group_name})
            .await?
            .ok_or_else(|| group_not_found(group_name))?;

        return Ok(HttpResponse::Ok()
            .json(GroupModel::from_group(group, viewer.as_ref()).await?));
    }

    let username = query.username.as_deref().unwrap_or_default();

    let user = require_user(username, 400).await?;

    let groups =
        Group::find_sorted(doc! {"members": user.id}, doc! {"group_name": 1})
            .await?;

    Ok(HttpResponse::Ok()
        .json(GroupModel::from_groups(groups, viewer.as_ref()).await?))
}

#[post("")]
async fn create_group(
    session: Session,
    body: web::Json<GroupBody>
) -> Result<impl Responder, ErrorResponse> {
    let group_name = validate::name(&body.group_name, "Group")?;

    let exists = || {
        ErrorResponse::new(
            404,
            format!("Group with {group_name} already exists.")
        )
    };

    if Group::find_one(doc! {"group_name": &group_name})
        .await?
        .is_some()
    {
        return Err(exists());
    }

    let group = Group::new(group_name.clone(), session.user_id);

    match group.insert().await {
        Ok(()) => {}
        Err(error) if is_duplicate_key(&error) => return Err(exists()),
        Err(error) => return Err(error.into())
    }

    Ok(HttpResponse::Created().json(json!({
        "message": "Your group was created successfully.",
        "group": GroupModel::from_group(group, Some(&session.user_id)).await?
    })))
}

/// Joins, leaves or cancels a request for the caller; with `response` set,
/// an admin accepts or rejects `username`'s request instead.
#[put("")]
async fn update_group(
    session: Session,
    body: web::Json<GroupUpdateBody>
) -> Result<impl Responder, ErrorResponse> {
    let group = if body.response {
        let username = body.username.as_deref().unwrap_or_default();

        let user = require_user(username, 400).await?;

        let (group, _) = transition(&body.group_name, |group| {
            match group.respond(&session.user_id, user.id, body.accept)? {
                RequestResponse::NotRequested => Err(GroupError::NotRequested),
                response => Ok(response)
            }
        })
        .await
        .map_err(|error| match error.status {
            406 => ErrorResponse::new(
                406,
                format!("{username} is not in a request")
            ),
            _ => error
        })?;

        group
    } else {
        let (group, _) = transition(&body.group_name, |group| {
            group.join_or_leave(session.user_id)
        })
        .await?;

        group
    };

    Ok(HttpResponse::Created().json(json!({
        "message": "Your group was edited successfully.",
        "group": GroupModel::from_group(group, Some(&session.user_id)).await?
    })))
}

#[put("/admins")]
async fn add_admin(
    session: Session,
    body: web::Json<GroupUserBody>
) -> Result<impl Responder, ErrorResponse> {
    let user = require_user(&body.username, 400).await?;

    let (group, _) = transition(&body.group_name, |group| {
        group.promote_admin(&session.user_id, user.id)
    })
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "You added a new admin successfully.",
        "group": GroupModel::from_group(group, Some(&session.user_id)).await?
    })))
}

#[put("/owner")]
async fn change_owner(
    session: Session,
    body: web::Json<GroupUserBody>
) -> Result<impl Responder, ErrorResponse> {
    let user = require_user(&body.username, 400).await?;

    let (group, _) = transition(&body.group_name, |group| {
        group.transfer_owner(&session.user_id, user.id)
    })
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Changed owner successfully.",
        "group": GroupModel::from_group(group, Some(&session.user_id)).await?
    })))
}

#[put("/followers")]
async fn toggle_follow(
    session: Session,
    body: web::Json<GroupBody>
) -> Result<impl Responder, ErrorResponse> {
    let (group, following) = transition(&body.group_name, |group| {
        Ok(group.toggle_follow(session.user_id))
    })
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": if following {
            "You are now following the group."
        } else {
            "You are no longer following the group."
        },
        "group": GroupModel::from_group(group, Some(&session.user_id)).await?
    })))
}

#[delete("")]
async fn delete_group(
    session: Session,
    body: web::Json<GroupBody>
) -> Result<impl Responder, ErrorResponse> {
    let group = Group::find_one(doc! {"group_name": &body.group_name})
        .await?
        .ok_or_else(|| group_not_found(&body.group_name))?;

    if group.owner != session.user_id {
        return Err(GroupError::NotOwner.into());
    }

    // ? filtering on owner too so a transfer that lands in between wins
    if Group::delete_one(doc! {"_id": group.id, "owner": session.user_id})
        .await? ==
        0
    {
        return Err(GroupError::NotOwner.into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "The group has been deleted successfully."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_names_in_bodies_are_trimmed() {
        let body: GroupBody =
            serde_json::from_value(json!({"groupName": " rustaceans  "}))
                .unwrap();

        assert_eq!(body.group_name, "rustaceans");

        let body: GroupUpdateBody = serde_json::from_value(json!({
            "groupName": "\trustaceans",
            "response": true,
            "username": "ferris",
            "accept": true
        }))
        .unwrap();

        assert_eq!(body.group_name, "rustaceans");

        let body: GroupUserBody = serde_json::from_value(json!({
            "groupName": "rustaceans ",
            "username": "ferris"
        }))
        .unwrap();

        assert_eq!(body.group_name, "rustaceans");
    }
}
