//! Template-facing projections of the stored records.

use serde::Serialize;

use crate::db::models::{Author, Book, BookDetails};
use crate::utils::date::format_date;

/// A book as the templates see it: hex ids, formatted dates, and the cover
/// as an inline data URI. Missing values are left out so templates can test
/// for them with `if` and `default`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub publish_date: String,
    pub page_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_path: Option<String>,
}

impl BookView {
    pub fn new(book: &Book, author_name: Option<String>) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: book.title.clone(),
            author_id: book.author.to_hex(),
            author_name,
            publish_date: format_date(&book.publish_date),
            page_count: book.page_count,
            description: book.description.clone(),
            cover_image_path: book.cover_image_path(),
        }
    }

    pub fn list(books: &[Book]) -> Vec<Self> {
        books.iter().map(|book| Self::new(book, None)).collect()
    }
}

impl From<&BookDetails> for BookView {
    fn from(details: &BookDetails) -> Self {
        Self::new(&details.book, details.author_name.clone())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub name: String,
}

impl AuthorView {
    pub fn list(authors: &[Author]) -> Vec<Self> {
        authors.iter().map(Self::from).collect()
    }
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: author.name.clone(),
        }
    }
}
