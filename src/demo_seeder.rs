use chrono::Utc;

use crate::db::author_repository::AuthorRepository;
use crate::db::book_repository::BookRepository;
use crate::db::models::{Author, Book, BookFields};
use crate::error::AppError;
use crate::utils::date::parse_date;

/// Authors and one book each, as (author, title, publish date, pages, description).
const DEMO_CATALOG: &[(&str, &str, &str, i32, &str)] = &[
    (
        "Frank Herbert",
        "Dune",
        "1965-08-01",
        412,
        "A desert planet, a noble family and the spice that binds an empire.",
    ),
    (
        "Ursula K. Le Guin",
        "The Left Hand of Darkness",
        "1969-03-01",
        304,
        "An envoy to a winter world learns what it means to belong.",
    ),
    (
        "Octavia E. Butler",
        "Kindred",
        "1979-06-01",
        264,
        "A writer is pulled back in time to antebellum Maryland.",
    ),
];

/// Fill an empty catalog with a few authors and books.
///
/// Does nothing when at least one author already exists, so it is safe to run
/// on every start.
pub async fn seed_demo_data(
    authors: &dyn AuthorRepository,
    books: &dyn BookRepository,
) -> Result<(), AppError> {
    if authors.count().await? > 0 {
        tracing::info!("Catalog already has authors, skipping demo seeding.");
        return Ok(());
    }

    tracing::info!("Starting demo data seeding...");

    for (name, title, published, pages, description) in DEMO_CATALOG {
        let author_id = authors
            .insert(Author {
                id: None,
                name: name.to_string(),
            })
            .await?;

        let book = Book::new(
            BookFields {
                title: title.to_string(),
                author: author_id,
                publish_date: parse_date(published)?,
                page_count: *pages,
                description: Some(description.to_string()),
            },
            Utc::now(),
        );
        books.insert(book).await?;
        tracing::info!("Seeded '{}' by {}.", title, name);
    }

    tracing::info!("Demo data seeding complete.");
    Ok(())
}
