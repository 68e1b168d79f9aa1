//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book with its current availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    /// Title
    #[serde(rename = "judul")]
    pub title: String,
    /// Author
    #[serde(rename = "penulis")]
    pub author: String,
    /// Publication year
    #[serde(rename = "tahun")]
    pub year: i32,
    /// True when no active loan references the book
    pub is_available: bool,
}

/// Create or fully replace a book
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[serde(rename = "judul")]
    #[validate(length(min = 1, max = 120, message = "Title must be 1 to 120 characters"))]
    pub title: String,
    #[serde(rename = "penulis")]
    #[validate(length(min = 1, max = 100, message = "Author must be 1 to 100 characters"))]
    pub author: String,
    #[serde(rename = "tahun")]
    pub year: i32,
}

/// Partial book update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookPatch {
    #[serde(rename = "judul")]
    pub title: Option<String>,
    #[serde(rename = "penulis")]
    pub author: Option<String>,
    #[serde(rename = "tahun")]
    pub year: Option<i32>,
}

impl BookPatch {
    /// Merge the patch over the current book
    pub fn apply(self, current: &Book) -> BookInput {
        BookInput {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            author: self.author.unwrap_or_else(|| current.author.clone()),
            year: self.year.unwrap_or(current.year),
        }
    }
}

/// Book list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Search in title or author
    pub search: Option<String>,
    /// Availability filter (true/false)
    pub available: Option<String>,
}

impl BookQuery {
    /// Parsed availability filter; unrecognized values are ignored
    pub fn availability(&self) -> Option<bool> {
        match self.available.as_deref().map(str::to_lowercase).as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        let available = query.availability();
        BookFilter {
            search: query.search.filter(|s| !s.trim().is_empty()),
            available,
            match_year: false,
        }
    }
}

/// Filter applied by the books store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Case-insensitive substring of title or author
    pub search: Option<String>,
    /// Some(true) = available only, Some(false) = borrowed only
    pub available: Option<bool>,
    /// Also match the search term against the publication year
    pub match_year: bool,
}
