use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppError;

/// Page templates, embedded into the binary.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("books/_grid.html", include_str!("../../templates/books/_grid.html")),
    (
        "books/_form_fields.html",
        include_str!("../../templates/books/_form_fields.html"),
    ),
    ("books/index.html", include_str!("../../templates/books/index.html")),
    ("books/new.html", include_str!("../../templates/books/new.html")),
    ("books/edit.html", include_str!("../../templates/books/edit.html")),
    ("books/show.html", include_str!("../../templates/books/show.html")),
    ("authors/index.html", include_str!("../../templates/authors/index.html")),
    ("authors/new.html", include_str!("../../templates/authors/new.html")),
    ("authors/show.html", include_str!("../../templates/authors/show.html")),
];

/// The compiled template set shared by all handlers.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compile the embedded templates. Fails on any syntax error.
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render a page to HTML.
    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}
