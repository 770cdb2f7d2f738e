mod bookmark;
mod comment;
mod freet;
mod group;
mod like;
mod session;
mod user;

use bson::DateTime;

pub use bookmark::BookmarkModel;
pub use comment::CommentModel;
pub use freet::FreetModel;
pub use group::GroupModel;
pub use like::{FreetLikesModel, LikeModel, UserLikesModel};
pub use session::Session;
pub use user::UserModel;

/// e.g. "October 17th 2026, 3:04:05 pm"
pub fn format_date(date: DateTime) -> String {
    let date = date.to_chrono();

    let day = date.format("%-d").to_string();

    let suffix = match day.as_str() {
        "1" | "21" | "31" => "st",
        "2" | "22" => "nd",
        "3" | "23" => "rd",
        _ => "th"
    };

    format!(
        "{} {day}{suffix} {}",
        date.format("%B"),
        date.format("%Y, %-I:%M:%S %P")
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn dates_read_like_the_frontend_expects() {
        let date = DateTime::from_chrono(
            Utc.with_ymd_and_hms(2026, 10, 2, 15, 4, 5).unwrap()
        );

        assert_eq!(format_date(date), "October 2nd 2026, 3:04:05 pm");

        let date = DateTime::from_chrono(
            Utc.with_ymd_and_hms(2026, 1, 11, 0, 30, 0).unwrap()
        );

        assert_eq!(format_date(date), "January 11th 2026, 12:30:00 am");
    }
}
