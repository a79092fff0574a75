use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tera::Context;

use crate::app::AppState;
use crate::cover::save_cover;
use crate::db::author_repository::AuthorRepository;
use crate::db::book_repository::BookRepository;
use crate::db::models::{parse_object_id, Book, BookDetails, BookForm, BookSearch};
use crate::error::AppError;
use crate::rendering::templates::Templates;
use crate::rendering::views::{AuthorView, BookView};
use crate::routes::redirect;

/// The two variants of the book form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPage {
    New,
    Edit,
}

impl FormPage {
    fn template(self) -> &'static str {
        match self {
            FormPage::New => "books/new.html",
            FormPage::Edit => "books/edit.html",
        }
    }

    fn error_message(self) -> &'static str {
        match self {
            FormPage::New => "Error Creating Book",
            FormPage::Edit => "Error Updating Book",
        }
    }
}

/// Render the new or edit form with the full author list.
///
/// The author list is loaded on every render. If it cannot be loaded, or the
/// page fails to render, the user is sent back to the book list.
pub async fn render_form_page(
    templates: &Templates,
    authors: &dyn AuthorRepository,
    page: FormPage,
    form: &BookForm,
    book_id: Option<&ObjectId>,
    has_error: bool,
) -> Response {
    let rendered = async {
        let authors = authors.list_all().await?;

        let mut context = Context::new();
        context.insert("authors", &AuthorView::list(&authors));
        context.insert("book", form);
        if let Some(id) = book_id {
            context.insert("bookId", &id.to_hex());
        }
        if has_error {
            context.insert("errorMessage", page.error_message());
        }
        templates.render(page.template(), &context)
    }
    .await;

    match rendered {
        Ok(html) => html.into_response(),
        Err(e) => {
            tracing::warn!("Failed to render book form: {e}");
            redirect("/books")
        }
    }
}

fn render_show_page(
    templates: &Templates,
    details: &BookDetails,
    error_message: Option<&str>,
) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("book", &BookView::from(details));
    if let Some(message) = error_message {
        context.insert("errorMessage", message);
    }
    templates.render("books/show.html", &context)
}

/// Build a book from the submitted form, decode its cover and insert it.
pub async fn create_book(repo: &dyn BookRepository, form: &BookForm) -> Result<ObjectId, AppError> {
    let fields = form.parse()?;
    let mut book = Book::new(fields, Utc::now());
    if let Some(cover) = form.cover_payload() {
        save_cover(&mut book, cover);
    }
    repo.insert(book).await
}

/// Overwrite a loaded book with the submitted form and save it.
///
/// The cover is only touched when a cover payload was submitted.
pub async fn update_book(
    repo: &dyn BookRepository,
    mut book: Book,
    form: &BookForm,
) -> Result<ObjectId, AppError> {
    let id = book
        .id
        .ok_or_else(|| AppError::Internal("Loaded book has no id".into()))?;

    book.apply(form.parse()?);
    if let Some(cover) = form.cover_payload() {
        save_cover(&mut book, cover);
    }
    repo.update(&book).await?;
    Ok(id)
}

async fn load_book(repo: &dyn BookRepository, id: &str) -> Result<(ObjectId, Book), AppError> {
    let oid = parse_object_id(id)?;
    let book = repo
        .find_by_id(&oid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book '{id}' not found")))?;
    Ok((oid, book))
}

async fn load_details(repo: &dyn BookRepository, id: &str) -> Result<BookDetails, AppError> {
    let oid = parse_object_id(id)?;
    repo.find_details(&oid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book '{id}' not found")))
}

/// Axum handler for `GET /books`.
pub async fn list_books_handler(
    State(state): State<AppState>,
    search: Result<Query<BookSearch>, QueryRejection>,
) -> Response {
    let rendered = async {
        let Query(search) = search.map_err(|e| AppError::Validation(e.body_text()))?;
        let filter = search.to_filter()?;
        let books = state.book_repo.search(&filter).await?;

        let mut context = Context::new();
        context.insert("books", &BookView::list(&books));
        context.insert("searchOptions", &search);
        state.templates.render("books/index.html", &context)
    }
    .await;

    match rendered {
        Ok(html) => html.into_response(),
        Err(e) => {
            tracing::warn!("Book search failed: {e}");
            redirect("/")
        }
    }
}

/// Axum handler for `GET /books/new`.
pub async fn new_book_handler(State(state): State<AppState>) -> Response {
    render_form_page(
        &state.templates,
        state.author_repo.as_ref(),
        FormPage::New,
        &BookForm::default(),
        None,
        false,
    )
    .await
}

/// Axum handler for `POST /books`.
pub async fn create_book_handler(
    State(state): State<AppState>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            tracing::warn!("Rejected book form: {}", e.body_text());
            return render_form_page(
                &state.templates,
                state.author_repo.as_ref(),
                FormPage::New,
                &BookForm::default(),
                None,
                true,
            )
            .await;
        }
    };

    match create_book(state.book_repo.as_ref(), &form).await {
        Ok(id) => {
            tracing::info!("Created book {}", id);
            redirect(&format!("/books/{}", id.to_hex()))
        }
        Err(e) => {
            tracing::warn!("Failed to create book: {e}");
            render_form_page(
                &state.templates,
                state.author_repo.as_ref(),
                FormPage::New,
                &form,
                None,
                true,
            )
            .await
        }
    }
}

/// Axum handler for `GET /books/{id}`.
pub async fn show_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let rendered = async {
        let details = load_details(state.book_repo.as_ref(), &id).await?;
        render_show_page(&state.templates, &details, None)
    }
    .await;

    match rendered {
        Ok(html) => html.into_response(),
        Err(e) => {
            tracing::warn!("Failed to show book '{id}': {e}");
            redirect("/")
        }
    }
}

/// Axum handler for `GET /books/{id}/edit`.
pub async fn edit_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match load_book(state.book_repo.as_ref(), &id).await {
        Ok((oid, book)) => {
            render_form_page(
                &state.templates,
                state.author_repo.as_ref(),
                FormPage::Edit,
                &BookForm::from_book(&book),
                Some(&oid),
                false,
            )
            .await
        }
        Err(e) => {
            tracing::warn!("Failed to load book '{id}' for editing: {e}");
            redirect("/")
        }
    }
}

/// Axum handler for `PUT /books/{id}`.
pub async fn update_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Response {
    let (oid, book) = match load_book(state.book_repo.as_ref(), &id).await {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!("Failed to load book '{id}' for update: {e}");
            return redirect("/");
        }
    };

    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            tracing::warn!("Rejected update form for book '{id}': {}", e.body_text());
            return render_form_page(
                &state.templates,
                state.author_repo.as_ref(),
                FormPage::Edit,
                &BookForm::from_book(&book),
                Some(&oid),
                true,
            )
            .await;
        }
    };

    match update_book(state.book_repo.as_ref(), book, &form).await {
        Ok(oid) => redirect(&format!("/books/{}", oid.to_hex())),
        Err(e) => {
            tracing::warn!("Failed to update book '{id}': {e}");
            render_form_page(
                &state.templates,
                state.author_repo.as_ref(),
                FormPage::Edit,
                &form,
                Some(&oid),
                true,
            )
            .await
        }
    }
}

/// Axum handler for `DELETE /books/{id}`.
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let details = match load_details(state.book_repo.as_ref(), &id).await {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!("Failed to load book '{id}' for removal: {e}");
            return redirect("/");
        }
    };

    let removed = match details.book.id {
        Some(oid) => state.book_repo.delete(&oid).await.and_then(|deleted| {
            if deleted {
                Ok(())
            } else {
                Err(AppError::NotFound(format!("Book '{id}' was already removed")))
            }
        }),
        None => Err(AppError::Internal("Loaded book has no id".into())),
    };

    match removed {
        Ok(()) => {
            tracing::info!("Removed book {id}");
            redirect("/books")
        }
        Err(e) => {
            tracing::warn!("Failed to remove book '{id}': {e}");
            match render_show_page(&state.templates, &details, Some("Unable to remove book")) {
                Ok(html) => html.into_response(),
                Err(e) => {
                    tracing::warn!("Failed to render book '{id}': {e}");
                    redirect("/")
                }
            }
        }
    }
}
