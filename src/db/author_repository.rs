use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use crate::db::models::Author;
use crate::error::AppError;

/// Repository trait for author operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// All authors, sorted by name. Used to populate the book forms.
    async fn list_all(&self) -> Result<Vec<Author>, AppError>;

    /// Authors whose name contains `name` (case-insensitive), or all authors.
    async fn search(&self, name: Option<String>) -> Result<Vec<Author>, AppError>;

    /// Find an author by its identifier.
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Author>, AppError>;

    /// Insert a new author and return its store-assigned identifier.
    async fn insert(&self, author: Author) -> Result<ObjectId, AppError>;

    /// Number of stored authors.
    async fn count(&self) -> Result<u64, AppError>;
}

/// MongoDB implementation of the AuthorRepository.
pub struct MongoAuthorRepository {
    collection: mongodb::Collection<Author>,
}

impl MongoAuthorRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("authors"),
        }
    }
}

#[async_trait]
impl AuthorRepository for MongoAuthorRepository {
    async fn list_all(&self) -> Result<Vec<Author>, AppError> {
        self.search(None).await
    }

    async fn search(&self, name: Option<String>) -> Result<Vec<Author>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let filter = match name {
            Some(name) => doc! { "name": { "$regex": regex::escape(&name), "$options": "i" } },
            None => Document::new(),
        };
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();

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

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Author>, AppError> {
        self.collection
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert(&self, author: Author) -> Result<ObjectId, AppError> {
        let result = self
            .collection
            .insert_one(&author)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Database("Inserted author has no ObjectId".into()))
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
