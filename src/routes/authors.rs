use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use tera::Context;

use crate::app::AppState;
use crate::db::models::{parse_object_id, AuthorForm, AuthorSearch};
use crate::error::AppError;
use crate::rendering::templates::Templates;
use crate::rendering::views::{AuthorView, BookView};
use crate::routes::redirect;

/// How many books the author page shows.
pub const AUTHOR_BOOKS_LIMIT: i64 = 6;

fn render_new_page(
    templates: &Templates,
    form: &AuthorForm,
    error_message: Option<&str>,
) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("author", form);
    if let Some(message) = error_message {
        context.insert("errorMessage", message);
    }
    templates.render("authors/new.html", &context)
}

/// Axum handler for `GET /authors`.
pub async fn list_authors_handler(
    State(state): State<AppState>,
    search: Result<Query<AuthorSearch>, QueryRejection>,
) -> Response {
    let rendered = async {
        let Query(search) = search.map_err(|e| AppError::Validation(e.body_text()))?;
        let authors = state
            .author_repo
            .search(search.name().map(str::to_string))
            .await?;

        let mut context = Context::new();
        context.insert("authors", &AuthorView::list(&authors));
        context.insert("searchOptions", &search);
        state.templates.render("authors/index.html", &context)
    }
    .await;

    match rendered {
        Ok(html) => html.into_response(),
        Err(e) => {
            tracing::warn!("Author search failed: {e}");
            redirect("/")
        }
    }
}

/// Axum handler for `GET /authors/new`.
pub async fn new_author_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_new_page(&state.templates, &AuthorForm::default(), None)
}

/// Axum handler for `POST /authors`.
pub async fn create_author_handler(
    State(state): State<AppState>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            tracing::warn!("Rejected author form: {}", e.body_text());
            let html = render_new_page(
                &state.templates,
                &AuthorForm::default(),
                Some("Error creating Author"),
            )?;
            return Ok(html.into_response());
        }
    };

    let created = async {
        let author = form.parse()?;
        state.author_repo.insert(author).await
    }
    .await;

    match created {
        Ok(id) => {
            tracing::info!("Created author {}", id);
            Ok(redirect(&format!("/authors/{}", id.to_hex())))
        }
        Err(e) => {
            tracing::warn!("Failed to create author: {e}");
            let html = render_new_page(&state.templates, &form, Some("Error creating Author"))?;
            Ok(html.into_response())
        }
    }
}

/// Axum handler for `GET /authors/{id}`.
pub async fn show_author_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let rendered = async {
        let oid = parse_object_id(&id)?;
        let author = state
            .author_repo
            .find_by_id(&oid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author '{id}' not found")))?;
        let books = state
            .book_repo
            .find_by_author(&oid, AUTHOR_BOOKS_LIMIT)
            .await?;

        let mut context = Context::new();
        context.insert("author", &AuthorView::from(&author));
        context.insert("books", &BookView::list(&books));
        state.templates.render("authors/show.html", &context)
    }
    .await;

    match rendered {
        Ok(html) => html.into_response(),
        Err(e) => {
            tracing::warn!("Failed to show author '{id}': {e}");
            redirect("/")
        }
    }
}
