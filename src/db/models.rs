use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::utils::date::{format_date, parse_date};

/// A book record stored in the `books` collection.
///
/// Field names follow the camelCase layout already used by existing catalog
/// data (`publishDate`, `coverImageType`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier. `None` until the record is inserted.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    /// Reference to an [`Author`] by identifier. Not checked for existence.
    pub author: ObjectId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub publish_date: DateTime<Utc>,
    pub page_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw cover bytes. Set together with `cover_image_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<Binary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_type: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Build a new, not yet persisted, book from validated form fields.
    pub fn new(fields: BookFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: fields.title,
            author: fields.author,
            publish_date: fields.publish_date,
            page_count: fields.page_count,
            description: fields.description,
            cover_image: None,
            cover_image_type: None,
            created_at,
        }
    }

    /// Overwrite the editable fields. The cover is left untouched.
    pub fn apply(&mut self, fields: BookFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.publish_date = fields.publish_date;
        self.page_count = fields.page_count;
        self.description = fields.description;
    }

    /// Replace the cover image and its MIME type together.
    pub fn set_cover(&mut self, bytes: Vec<u8>, mime_type: &str) {
        self.cover_image = Some(Binary {
            subtype: BinarySubtype::Generic,
            bytes,
        });
        self.cover_image_type = Some(mime_type.to_string());
    }

    /// Inline `data:` URI for the cover, if the book has one.
    pub fn cover_image_path(&self) -> Option<String> {
        use base64::Engine;

        match (&self.cover_image, &self.cover_image_type) {
            (Some(image), Some(mime_type)) => Some(format!(
                "data:{};charset=utf-8;base64,{}",
                mime_type,
                base64::engine::general_purpose::STANDARD.encode(&image.bytes)
            )),
            _ => None,
        }
    }
}

/// A book joined with the name of its author.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDetails {
    pub book: Book,
    /// `None` when the referenced author no longer exists.
    pub author_name: Option<String>,
}

/// An author record stored in the `authors` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
}

/// Book fields after type coercion, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub author: ObjectId,
    pub publish_date: DateTime<Utc>,
    pub page_count: i32,
    pub description: Option<String>,
}

/// The urlencoded body of the create and update forms.
///
/// Every field is kept as submitted so a failed save can re-render the form
/// with the user's input intact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub page_count: String,
    #[serde(default)]
    pub description: String,
    /// JSON cover payload (`{"data": <base64>, "type": <mime>}`).
    #[serde(default, skip_serializing)]
    pub cover: Option<String>,
}

impl BookForm {
    /// Pre-fill the form from a stored book (edit page).
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.to_hex(),
            publish_date: format_date(&book.publish_date),
            page_count: book.page_count.to_string(),
            description: book.description.clone().unwrap_or_default(),
            cover: None,
        }
    }

    /// The cover payload, if one was actually submitted.
    pub fn cover_payload(&self) -> Option<&str> {
        self.cover.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Coerce the submitted strings into typed book fields.
    pub fn parse(&self) -> Result<BookFields, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }

        let author = ObjectId::parse_str(self.author.trim()).map_err(|_| {
            AppError::Validation(format!("Invalid author id '{}'", self.author))
        })?;

        let publish_date = parse_date(&self.publish_date)?;

        let page_count = self.page_count.trim().parse::<i32>().map_err(|_| {
            AppError::Validation(format!("Invalid page count '{}'", self.page_count))
        })?;

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(BookFields {
            title: title.to_string(),
            author,
            publish_date,
            page_count,
            description,
        })
    }
}

/// Query parameters of the book search form.
///
/// Absent parameters are not serialized, so templates can fall back to
/// empty inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_after: Option<String>,
}

impl BookSearch {
    /// Turn the raw parameters into a typed filter. Empty values count as absent.
    pub fn to_filter(&self) -> Result<BookFilter, AppError> {
        Ok(BookFilter {
            title: non_empty(&self.title).map(str::to_string),
            published_before: non_empty(&self.published_before)
                .map(parse_date)
                .transpose()?,
            published_after: non_empty(&self.published_after)
                .map(parse_date)
                .transpose()?,
        })
    }
}

/// Typed book filter. All present conditions must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Inclusive upper bound on the publish date.
    pub published_before: Option<DateTime<Utc>>,
    /// Inclusive lower bound on the publish date.
    pub published_after: Option<DateTime<Utc>>,
}

/// The urlencoded body of the author form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorForm {
    #[serde(default)]
    pub name: String,
}

impl AuthorForm {
    pub fn parse(&self) -> Result<Author, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        Ok(Author {
            id: None,
            name: name.to_string(),
        })
    }
}

/// Query parameters of the author search form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AuthorSearch {
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

/// Parse a hex identifier taken from a URL path.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::NotFound(format!("No record with id '{id}'")))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
