use bson::oid::ObjectId;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::ErrorResponse;

pub const MAX_CONTENT_LENGTH: usize = 140;

lazy_static::lazy_static! {
    static ref USERNAME_PATTERN: Regex = Regex::new(r"^\w+$").unwrap();
    static ref PASSWORD_PATTERN: Regex = Regex::new(r"^\S+$").unwrap();
}

/// Freet and comment bodies: something besides whitespace, at most 140
/// characters.
pub fn content(content: &str, kind: &str) -> Result<(), ErrorResponse> {
    if content.trim().is_empty() {
        return Err(ErrorResponse::new(
            400,
            format!("{kind} content must be at least one character long.")
        ));
    }

    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ErrorResponse::new(
            413,
            format!(
                "{kind} content must be no more than {MAX_CONTENT_LENGTH} \
                 characters."
            )
        ));
    }

    Ok(())
}

pub fn username(username: &str) -> Result<(), ErrorResponse> {
    if !USERNAME_PATTERN.is_match(username) {
        return Err(ErrorResponse::new(
            400,
            "Username must be a nonempty alphanumeric string."
        ));
    }

    Ok(())
}

pub fn password(password: &str) -> Result<(), ErrorResponse> {
    if !PASSWORD_PATTERN.is_match(password) {
        return Err(ErrorResponse::new(
            400,
            "Password must be a nonempty string without spaces."
        ));
    }

    Ok(())
}

/// Group and folder names, trimmed.
pub fn name(name: &str, kind: &str) -> Result<String, ErrorResponse> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ErrorResponse::new(
            400,
            format!("{kind} name must be nonempty.")
        ));
    }

    Ok(name.to_string())
}

/// Group and folder names in request bodies, trimmed the same way `name`
/// stores them so lookups match what was created.
pub fn trimmed<'de, D: Deserializer<'de>>(
    deserializer: D
) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

/// A malformed id can't name anything that exists, so it is a 404 like
/// any other unknown id.
pub fn object_id(id: &str, kind: &str) -> Result<ObjectId, ErrorResponse> {
    ObjectId::parse_str(id).map_err(|_| {
        ErrorResponse::new(
            404,
            format!("{kind} with {} ID {id} does not exist.", kind.to_lowercase())
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_at_the_limit_is_accepted() {
        assert!(content(&"a".repeat(140), "Comment").is_ok());
        assert!(content(&"é".repeat(140), "Comment").is_ok());
    }

    #[test]
    fn content_over_the_limit_is_too_large() {
        let error = content(&"a".repeat(141), "Comment").unwrap_err();

        assert_eq!(error.status, 413);
    }

    #[test]
    fn blank_content_is_rejected() {
        for blank in ["", "   ", "\n\t"] {
            let error = content(blank, "Comment").unwrap_err();

            assert_eq!(error.status, 400);
            assert!(error.detail.starts_with("Comment content"));
        }
    }

    #[test]
    fn usernames_are_word_characters() {
        assert!(username("freet_lover42").is_ok());
        assert!(username("").is_err());
        assert!(username("two words").is_err());
        assert!(username("semi;colon").is_err());
    }

    #[test]
    fn passwords_have_no_whitespace() {
        assert!(password("hunter2!").is_ok());
        assert!(password("").is_err());
        assert!(password("pass word").is_err());
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(name("  school ", "Folder").unwrap(), "school");
        assert_eq!(name("   ", "Folder").unwrap_err().status, 400);
    }

    #[test]
    fn body_names_match_stored_names() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(deserialize_with = "trimmed")]
            folder: String
        }

        let body: Body =
            serde_json::from_str(r#"{"folder": "  school "}"#).unwrap();

        assert_eq!(body.folder, name("  school ", "Folder").unwrap());
    }

    #[test]
    fn malformed_ids_are_not_found() {
        let error = object_id("nope", "Freet").unwrap_err();

        assert_eq!(error.status, 404);
        assert_eq!(error.detail, "Freet with freet ID nope does not exist.");

        let id = ObjectId::new();

        assert_eq!(object_id(&id.to_hex(), "Freet").unwrap(), id);
    }
}
