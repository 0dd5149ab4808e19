//! Typed patch descriptors for the catalog tables.
//!
//! These are the safe construction path for [`ConditionalUpdate`]: every
//! setter keeps its column name and value together, so the positional
//! filtering hazard of raw field/value arrays cannot arise. A handler
//! validates the raw document first, deserializes into one of these, and
//! hands the resulting update to a store client.

use crate::update::ConditionalUpdate;
use serde::Deserialize;

/// Patchable user columns. Usernames are create-only and deliberately
/// absent here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub password: Option<String>,
    pub name: Option<String>,
}

impl UserPatch {
    pub const TABLE: &'static str = "users";

    pub fn into_update(self, id: i64) -> ConditionalUpdate {
        ConditionalUpdate::new(Self::TABLE, id)
            .set_opt("password", self.password)
            .set_opt("name", self.name)
    }
}

/// Patchable book columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn13: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub isbn10: Option<String>,
    pub published: Option<String>,
    #[serde(rename = "pageCount")]
    pub page_count: Option<i64>,
    pub language: Option<String>,
}

impl BookPatch {
    pub const TABLE: &'static str = "books";

    pub fn into_update(self, id: i64) -> ConditionalUpdate {
        ConditionalUpdate::new(Self::TABLE, id)
            .set_opt("title", self.title)
            .set_opt("isbn13", self.isbn13)
            .set_opt("author", self.author)
            .set_opt("description", self.description)
            .set_opt("category", self.category)
            .set_opt("isbn10", self.isbn10)
            .set_opt("published", self.published)
            .set_opt("pagecount", self.page_count)
            .set_opt("language", self.language)
    }
}

/// Patchable read columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadPatch {
    #[serde(rename = "bookId")]
    pub book_id: Option<i64>,
    pub rating: Option<i64>,
    pub review: Option<String>,
}

impl ReadPatch {
    pub const TABLE: &'static str = "reads";

    pub fn into_update(self, id: i64) -> ConditionalUpdate {
        ConditionalUpdate::new(Self::TABLE, id)
            .set_opt("book_id", self.book_id)
            .set_opt("rating", self.rating)
            .set_opt("review", self.review)
    }
}
