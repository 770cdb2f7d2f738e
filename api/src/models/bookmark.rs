use fritter_core::db::Bookmark;
use serde::Serialize;

#[derive(Serialize)]
pub struct BookmarkModel {
    #[serde(rename = "_id")]
    id:     String,
    folder: String,
    freets: Vec<String>
}

impl From<Bookmark> for BookmarkModel {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            id:     bookmark.id.to_hex(),
            folder: bookmark.folder,
            freets: bookmark.freets.iter().map(|id| id.to_hex()).collect()
        }
    }
}
