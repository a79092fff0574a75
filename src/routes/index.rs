use axum::extract::State;
use axum::response::Html;
use tera::Context;

use crate::app::AppState;
use crate::error::AppError;
use crate::rendering::views::BookView;

/// How many books the landing page shows.
pub const RECENT_BOOKS_LIMIT: i64 = 10;

/// Axum handler for `GET /`.
///
/// A failing store query is logged and the page renders with no books.
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let books = match state.book_repo.recent(RECENT_BOOKS_LIMIT).await {
        Ok(books) => books,
        Err(e) => {
            tracing::error!("Error while pulling recent books: {e}");
            Vec::new()
        }
    };

    let mut context = Context::new();
    context.insert("books", &BookView::list(&books));
    state.templates.render("index.html", &context)
}
