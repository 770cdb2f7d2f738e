use fritter_core::db::User;
use serde::Serialize;

use super::format_date;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    #[serde(rename = "_id")]
    id:          String,
    username:    String,
    date_joined: String
}

impl From<User> for UserModel {
    fn from(user: User) -> Self {
        Self {
            id:          user.id.to_hex(),
            username:    user.username,
            date_joined: format_date(user.date_joined)
        }
    }
}
