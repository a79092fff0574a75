use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};

use crate::db::models::{Book, BookDetails, BookFilter};
use crate::error::AppError;

/// Repository trait for book operations.
///
/// This trait allows mocking the database layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// The most recently created books, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<Book>, AppError>;

    /// All books matching the filter.
    async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, AppError>;

    /// Find a book by its identifier.
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, AppError>;

    /// Find a book and resolve its author's name in the same query.
    async fn find_details(&self, id: &ObjectId) -> Result<Option<BookDetails>, AppError>;

    /// Newest books referencing the given author.
    async fn find_by_author(&self, author: &ObjectId, limit: i64) -> Result<Vec<Book>, AppError>;

    /// Insert a new book and return its store-assigned identifier.
    async fn insert(&self, book: Book) -> Result<ObjectId, AppError>;

    /// Replace a stored book. Fails with `NotFound` if it no longer exists.
    async fn update(&self, book: &Book) -> Result<(), AppError>;

    /// Delete a book. Returns `false` if nothing was deleted.
    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError>;
}

/// Build the MongoDB query document for a book filter.
///
/// The title is matched literally: regex metacharacters in user input are
/// escaped before building the case-insensitive pattern.
pub fn filter_document(filter: &BookFilter) -> Document {
    let mut query = Document::new();

    if let Some(title) = &filter.title {
        query.insert(
            "title",
            doc! { "$regex": regex::escape(title), "$options": "i" },
        );
    }

    let mut publish_date = Document::new();
    if let Some(before) = filter.published_before {
        publish_date.insert("$lte", BsonDateTime::from_chrono(before));
    }
    if let Some(after) = filter.published_after {
        publish_date.insert("$gte", BsonDateTime::from_chrono(after));
    }
    if !publish_date.is_empty() {
        query.insert("publishDate", publish_date);
    }

    query
}

/// MongoDB implementation of the BookRepository.
pub struct MongoBookRepository {
    collection: mongodb::Collection<Book>,
}

impl MongoBookRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("books"),
        }
    }

    async fn collect(
        &self,
        filter: Document,
        options: mongodb::options::FindOptions,
    ) -> Result<Vec<Book>, AppError> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn recent(&self, limit: i64) -> Result<Vec<Book>, AppError> {
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .build();

        self.collect(doc! {}, options).await
    }

    async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, AppError> {
        use mongodb::options::FindOptions;

        self.collect(filter_document(filter), FindOptions::default())
            .await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, AppError> {
        self.collection
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_details(&self, id: &ObjectId) -> Result<Option<BookDetails>, AppError> {
        use futures::TryStreamExt;

        let pipeline = vec![
            doc! { "$match": { "_id": *id } },
            doc! { "$limit": 1 },
            doc! { "$lookup": {
                "from": "authors",
                "localField": "author",
                "foreignField": "_id",
                "as": "authorRef",
            } },
            doc! { "$addFields": { "authorName": { "$arrayElemAt": ["$authorRef.name", 0] } } },
            doc! { "$project": { "authorRef": 0 } },
        ];

        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(mut document) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let author_name = match document.remove("authorName") {
            Some(Bson::String(name)) => Some(name),
            _ => None,
        };
        let book: Book = mongodb::bson::from_document(document)
            .map_err(|e| AppError::Database(format!("Malformed book document: {e}")))?;

        Ok(Some(BookDetails { book, author_name }))
    }

    async fn find_by_author(&self, author: &ObjectId, limit: i64) -> Result<Vec<Book>, AppError> {
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .build();

        self.collect(doc! { "author": *author }, options).await
    }

    async fn insert(&self, book: Book) -> Result<ObjectId, AppError> {
        let result = self
            .collection
            .insert_one(&book)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Database("Inserted book has no ObjectId".into()))
    }

    async fn update(&self, book: &Book) -> Result<(), AppError> {
        let id = book
            .id
            .ok_or_else(|| AppError::Internal("Cannot update a book without an id".into()))?;

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, book)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Book '{}' no longer exists", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": *id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}
