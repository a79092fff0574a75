use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::db::author_repository::AuthorRepository;
use crate::db::book_repository::BookRepository;
use crate::rendering::templates::Templates;
use crate::routes::{authors, books, index};

/// Shared handles every request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub book_repo: Arc<dyn BookRepository>,
    pub author_repo: Arc<dyn AuthorRepository>,
    pub templates: Arc<Templates>,
}

/// Build the catalog router.
///
/// `PUT` and `DELETE` on `/books/{id}` are only reachable from browser forms
/// once the router is wrapped with [`crate::method_override::override_method`].
pub fn build_router(state: AppState, public_dir: &str) -> Router {
    Router::new()
        .route("/", get(index::index_handler))
        .route(
            "/books",
            get(books::list_books_handler).post(books::create_book_handler),
        )
        .route("/books/new", get(books::new_book_handler))
        .route(
            "/books/{id}",
            get(books::show_book_handler)
                .put(books::update_book_handler)
                .delete(books::delete_book_handler),
        )
        .route("/books/{id}/edit", get(books::edit_book_handler))
        .route(
            "/authors",
            get(authors::list_authors_handler).post(authors::create_author_handler),
        )
        .route("/authors/new", get(authors::new_author_handler))
        .route("/authors/{id}", get(authors::show_author_handler))
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) fn test_server(
    books: crate::db::book_repository::MockBookRepository,
    authors: crate::db::author_repository::MockAuthorRepository,
) -> axum_test::TestServer {
    let state = AppState {
        book_repo: Arc::new(books),
        author_repo: Arc::new(authors),
        templates: Arc::new(Templates::new().expect("templates should compile")),
    };
    let router = build_router(state, "public");
    axum_test::TestServer::builder()
        .build(router)
}
